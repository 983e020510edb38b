use crate::export::ExportRecord;
use crate::geometry::{Point, Rect};
use crate::mapping::CoordinateMapper;
use crate::rects::{PointerHandler, RectManager};

/// A committed box as it was drawn, with the mapping in force at that moment.
/// Never rewritten, so any number of resizes project from the same reference.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchor {
    rect: Rect,
    mapper: CoordinateMapper,
}

impl Anchor {
    fn display_in(&self, mapper: &CoordinateMapper) -> Rect {
        if *mapper == self.mapper {
            return self.rect;
        }
        let project = |p: Point| mapper.to_display(self.mapper.to_source(p));
        Rect::from_corners(project(self.rect.min()), project(self.rect.max()))
    }
}

// ── Annotation Canvas ───────────────────────────────────────────────────────

/// The boxes of one loaded image together with the display mapping they are
/// shown through. Hosts feed it surface sizes and pointer events.
#[derive(Clone, Debug)]
pub struct AnnotationCanvas {
    source: (u32, u32),
    rects: RectManager,
    anchors: Vec<Anchor>,
    mapper: Option<CoordinateMapper>,
}

impl AnnotationCanvas {
    pub fn new(source: (u32, u32)) -> Self {
        Self {
            source,
            rects: RectManager::new(),
            anchors: Vec::new(),
            mapper: None,
        }
    }

    /// Fits the image into a `display` sized surface. Committed boxes are
    /// re-projected from where they were drawn; the box in progress follows
    /// the surface, or is dropped when the surface becomes unusable.
    pub fn resize(&mut self, display: (i32, i32)) -> Option<CoordinateMapper> {
        let mapper = CoordinateMapper::new(display, self.source);
        if mapper == self.mapper {
            return mapper;
        }
        match (self.mapper, mapper) {
            (Some(old), Some(new)) => self
                .rects
                .remap_draft(|p| new.to_display(old.to_source(p))),
            _ => self.rects.cancel_draft(),
        }
        if let Some(new) = &mapper {
            let anchors = &self.anchors;
            self.rects
                .relayout(|i, r| anchors.get(i).map_or(r, |a| a.display_in(new)));
        }
        self.mapper = mapper;
        mapper
    }

    pub fn mapper(&self) -> Option<&CoordinateMapper> {
        self.mapper.as_ref()
    }

    pub fn rects(&self) -> &RectManager {
        &self.rects
    }

    pub fn toggle(&mut self, active: bool) {
        self.rects.toggle(active);
    }

    pub fn delete_last(&mut self) -> Option<Rect> {
        self.anchors.pop();
        self.rects.delete_last()
    }

    pub fn reset(&mut self) {
        self.anchors.clear();
        self.rects.reset();
    }

    /// Source-pixel corners of every box, numbered from 1. Uses the mapping
    /// each box was drawn with, so the result does not depend on the current
    /// surface size or on whether the image is displayed at all.
    pub fn export_records(&self) -> Vec<ExportRecord> {
        self.anchors
            .iter()
            .zip(1u32..)
            .map(|(a, index)| ExportRecord::project(index, &a.rect, &a.mapper))
            .collect()
    }
}

impl PointerHandler for AnnotationCanvas {
    fn on_pointer_down(&mut self, pos: Point) {
        if self.mapper.is_some() {
            self.rects.on_pointer_down(pos);
        }
    }

    fn on_pointer_move(&mut self, pos: Point) {
        self.rects.on_pointer_move(pos);
    }

    fn on_pointer_up(&mut self, pos: Point) {
        let Some(mapper) = self.mapper else {
            self.rects.cancel_draft();
            return;
        };
        if let Some(rect) = self.rects.commit(pos.x, pos.y) {
            self.anchors.push(Anchor { rect, mapper });
            log::debug!("committed box #{} {:?}", self.anchors.len(), rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SourcePoint;

    fn canvas(source: (u32, u32), display: (i32, i32)) -> AnnotationCanvas {
        let mut c = AnnotationCanvas::new(source);
        c.resize(display);
        c.toggle(true);
        c
    }

    fn drag(c: &mut AnnotationCanvas, from: (i32, i32), to: (i32, i32)) {
        c.on_pointer_down(Point::new(from.0, from.1));
        c.on_pointer_move(Point::new(to.0, to.1));
        c.on_pointer_up(Point::new(to.0, to.1));
    }

    #[test]
    fn long_resize_sequences_do_not_move_boxes() {
        let mut c = canvas((2000, 1000), (1000, 1000));
        drag(&mut c, (101, 301), (803, 607));
        let drawn = c.rects().rects()[0];
        let before = c.export_records();
        assert_eq!(before[0].tl, SourcePoint::new(202, 102));

        let shrink = (300..=1000).rev().step_by(7);
        let grow = (300..=1000).step_by(7);
        for width in shrink.chain(grow) {
            c.resize((width, 1000));
            assert_eq!(c.export_records(), before, "width {width}");

            let mapper = *c.mapper().unwrap();
            let shown = c.rects().rects()[0];
            let tl = mapper.to_source(shown.min());
            // One display pixel spans about 2000 / width source pixels.
            let slack = 2000 / width + 2;
            assert!(
                (tl.x - 202).abs() <= slack && (tl.y - 102).abs() <= slack,
                "width {width}: {tl:?}"
            );
        }

        c.resize((1000, 1000));
        assert_eq!(c.rects().rects(), &[drawn]);
        assert_eq!(c.export_records(), before);
    }

    #[test]
    fn export_does_not_need_a_displayed_image() {
        let mut c = canvas((100, 100), (100, 100));
        drag(&mut c, (10, 10), (50, 50));
        let before = c.export_records();

        assert!(c.resize((0, 0)).is_none());
        assert_eq!(c.export_records(), before);
        assert_eq!(before[0].bounding_box(), (10, 10, 50, 50));
    }

    #[test]
    fn pointer_is_ignored_without_a_mapping() {
        let mut c = AnnotationCanvas::new((100, 100));
        c.toggle(true);
        drag(&mut c, (10, 10), (50, 50));
        assert!(c.rects().is_empty());
        assert!(c.export_records().is_empty());
    }

    #[test]
    fn deleting_and_resetting_keep_numbering_in_step() {
        let mut c = canvas((100, 100), (100, 100));
        drag(&mut c, (10, 10), (20, 20));
        drag(&mut c, (30, 30), (40, 40));
        c.delete_last();
        drag(&mut c, (60, 60), (80, 80));

        let records = c.export_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].index, 2);
        assert_eq!(records[1].bounding_box(), (59, 59, 79, 79));

        c.reset();
        assert!(c.rects().is_empty());
        assert!(c.export_records().is_empty());
    }

    #[test]
    fn box_in_progress_follows_or_is_dropped_on_resize() {
        let mut c = canvas((100, 100), (100, 100));
        c.on_pointer_down(Point::new(20, 20));
        c.on_pointer_move(Point::new(40, 40));

        c.resize((200, 200));
        let preview = c.rects().preview().unwrap();
        assert!((preview.x1 - 40).abs() <= 2 && (preview.x2 - 80).abs() <= 2);

        c.resize((0, 200));
        assert!(!c.rects().is_drawing());
        c.on_pointer_up(Point::new(90, 90));
        assert!(c.rects().is_empty());
    }
}
