use crate::geometry::{Point, Rect, SourcePoint};

// ── Display Mapping ─────────────────────────────────────────────────────────

/// Where the uniformly scaled source image sits inside the display surface.
/// Derived state: recompute it whenever the surface or the image changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMapping {
    pub offset_x: i32,
    pub offset_y: i32,
    pub scaled_width: i32,
    pub scaled_height: i32,
    pub scale: f64,
}

impl DisplayMapping {
    /// Letterboxes a `source` sized image into a `display` sized surface.
    /// Returns None when either size has a non-positive dimension.
    pub fn fit(display: (i32, i32), source: (u32, u32)) -> Option<Self> {
        let (dw, dh) = display;
        let (sw, sh) = source;
        if dw <= 0 || dh <= 0 || sw == 0 || sh == 0 {
            return None;
        }
        let (dw64, dh64, sw64, sh64) = (dw as i64, dh as i64, sw as i64, sh as i64);

        // Compare dw/sw against dh/sh without floats so the limiting axis is
        // filled exactly and the other one is floored.
        let (scaled_w, scaled_h, scale) = if dw64 * sh64 <= dh64 * sw64 {
            (dw64, sh64 * dw64 / sw64, dw as f64 / sw as f64)
        } else {
            (sw64 * dh64 / sh64, dh64, dh as f64 / sh as f64)
        };
        let scaled_width = scaled_w.max(1) as i32;
        let scaled_height = scaled_h.max(1) as i32;

        Some(Self {
            offset_x: (dw - scaled_width) / 2,
            offset_y: (dh - scaled_height) / 2,
            scaled_width,
            scaled_height,
            scale,
        })
    }
}

// ── Coordinate Mapper ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    mapping: DisplayMapping,
    source_width: u32,
    source_height: u32,
}

impl CoordinateMapper {
    pub fn new(display: (i32, i32), source: (u32, u32)) -> Option<Self> {
        let mapping = DisplayMapping::fit(display, source)?;
        Some(Self {
            mapping,
            source_width: source.0,
            source_height: source.1,
        })
    }

    pub fn mapping(&self) -> &DisplayMapping {
        &self.mapping
    }

    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// The letterboxed image area on the display surface.
    pub fn image_rect(&self) -> Rect {
        let m = &self.mapping;
        Rect {
            x1: m.offset_x,
            y1: m.offset_y,
            x2: m.offset_x + m.scaled_width,
            y2: m.offset_y + m.scaled_height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        let r = self.image_rect();
        p.x >= r.x1 && p.x < r.x2 && p.y >= r.y1 && p.y < r.y2
    }

    /// Projects a display point into source pixels. Points outside the image
    /// area are first clamped onto its nearest edge pixel.
    pub fn to_source(&self, p: Point) -> SourcePoint {
        let m = &self.mapping;
        SourcePoint::new(
            display_to_source(p.x, m.offset_x, m.scaled_width, self.source_width),
            display_to_source(p.y, m.offset_y, m.scaled_height, self.source_height),
        )
    }

    /// Places a source pixel on the display surface. `to_display(to_source(p))`
    /// lands within `ceil(scaled / (source - 1))` display pixels of `p` on each
    /// axis, which is one pixel unless the image is shown enlarged.
    pub fn to_display(&self, p: SourcePoint) -> Point {
        let m = &self.mapping;
        Point::new(
            source_to_display(p.x, m.offset_x, m.scaled_width, self.source_width),
            source_to_display(p.y, m.offset_y, m.scaled_height, self.source_height),
        )
    }
}

fn display_to_source(v: i32, offset: i32, scaled: i32, source: u32) -> i32 {
    let clamped = v.clamp(offset, offset + scaled - 1);
    let fraction = (clamped - offset) as f64 / scaled as f64;
    // `source - 1` makes the last source index the far anchor.
    (fraction * (source as f64 - 1.0)).round() as i32
}

fn source_to_display(v: i32, offset: i32, scaled: i32, source: u32) -> i32 {
    if source <= 1 {
        return offset;
    }
    let last = source as i32 - 1;
    let fraction = v.clamp(0, last) as f64 / last as f64;
    let d = offset + (fraction * scaled as f64).round() as i32;
    d.min(offset + scaled - 1)
}
