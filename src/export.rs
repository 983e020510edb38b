use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::RgbImage;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geometry::{Rect, SourcePoint};
use crate::mapping::CoordinateMapper;

/// Column order shared by the annotator and the cropper.
pub const CSV_HEADER: [&str; 9] = [
    "index", "tl_x", "tl_y", "tr_x", "tr_y", "br_x", "br_y", "bl_x", "bl_y",
];

// ── Records ─────────────────────────────────────────────────────────────────

/// One exported box: its 1-based position and its corners in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportRecord {
    pub index: u32,
    pub tl: SourcePoint,
    pub tr: SourcePoint,
    pub br: SourcePoint,
    pub bl: SourcePoint,
}

impl ExportRecord {
    /// Axis-aligned bounds `(x1, y1, x2, y2)` of the four corners. Rotated
    /// corners silently widen into their bounding box.
    pub fn bounding_box(&self) -> (i32, i32, i32, i32) {
        let corners = [self.tl, self.tr, self.br, self.bl];
        let xs = corners.map(|p| p.x);
        let ys = corners.map(|p| p.y);
        (
            xs.into_iter().min().unwrap_or_default(),
            ys.into_iter().min().unwrap_or_default(),
            xs.into_iter().max().unwrap_or_default(),
            ys.into_iter().max().unwrap_or_default(),
        )
    }

    /// Projects the corners of a display rectangle into source pixels.
    pub fn project(index: u32, rect: &Rect, mapper: &CoordinateMapper) -> Self {
        let [tl, tr, br, bl] = rect.corners().map(|p| mapper.to_source(p));
        Self {
            index,
            tl,
            tr,
            br,
            bl,
        }
    }
}

pub fn export_records(rects: &[Rect], mapper: &CoordinateMapper) -> Vec<ExportRecord> {
    rects
        .iter()
        .zip(1u32..)
        .map(|(rect, index)| ExportRecord::project(index, rect, mapper))
        .collect()
}

// ── CSV ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    index: u32,
    #[serde(deserialize_with = "truncating_int")]
    tl_x: i32,
    #[serde(deserialize_with = "truncating_int")]
    tl_y: i32,
    #[serde(deserialize_with = "truncating_int")]
    tr_x: i32,
    #[serde(deserialize_with = "truncating_int")]
    tr_y: i32,
    #[serde(deserialize_with = "truncating_int")]
    br_x: i32,
    #[serde(deserialize_with = "truncating_int")]
    br_y: i32,
    #[serde(deserialize_with = "truncating_int")]
    bl_x: i32,
    #[serde(deserialize_with = "truncating_int")]
    bl_y: i32,
}

/// Accepts `120` as well as `120.0`, truncating toward zero.
fn truncating_int<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i32, D::Error> {
    let v = f64::deserialize(d)?;
    if !v.is_finite() {
        return Err(serde::de::Error::custom(format!("{v} is not a coordinate")));
    }
    Ok(v.trunc() as i32)
}

impl From<&ExportRecord> for CsvRow {
    fn from(r: &ExportRecord) -> Self {
        Self {
            index: r.index,
            tl_x: r.tl.x,
            tl_y: r.tl.y,
            tr_x: r.tr.x,
            tr_y: r.tr.y,
            br_x: r.br.x,
            br_y: r.br.y,
            bl_x: r.bl.x,
            bl_y: r.bl.y,
        }
    }
}

impl From<CsvRow> for ExportRecord {
    fn from(r: CsvRow) -> Self {
        Self {
            index: r.index,
            tl: SourcePoint::new(r.tl_x, r.tl_y),
            tr: SourcePoint::new(r.tr_x, r.tr_y),
            br: SourcePoint::new(r.br_x, r.br_y),
            bl: SourcePoint::new(r.bl_x, r.bl_y),
        }
    }
}

fn encode_csv(records: &[ExportRecord]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in records {
        wtr.serialize(CsvRow::from(r))?;
    }
    wtr.into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Writes `records` to `path`. Nothing is written when the list is empty or
/// serialization fails.
pub fn write_csv(path: &Path, records: &[ExportRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(Error::NoRectangles);
    }
    let bytes = encode_csv(records).map_err(|source| Error::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))?;
    log::info!("wrote {} boxes to {}", records.len(), path.display());
    Ok(())
}

/// Reads every row of a box CSV. Any bad row fails the whole read.
pub fn read_csv(path: &Path) -> Result<Vec<ExportRecord>> {
    let csv_err = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::Reader::from_path(path).map_err(csv_err)?;
    let records = rdr
        .deserialize::<CsvRow>()
        .map(|row| row.map(ExportRecord::from))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_err)?;
    log::debug!("read {} boxes from {}", records.len(), path.display());
    Ok(records)
}

// ── Export Bundle ───────────────────────────────────────────────────────────

/// A folder holding a copy of the annotated image and its box CSV.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportBundle {
    pub dir: PathBuf,
    pub image_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Writes `<export_root>/<stem>_<YYYYMMDD_HHMMSS>/{<stem>.png, boxes.csv}`.
///
/// `image` is the source path together with its decoded pixels. Both
/// preconditions (an image, at least one record) are checked before anything
/// touches the disk, and a failed write removes the half-built folder.
pub fn export_bundle(
    config: &Config,
    image: Option<(&Path, &RgbImage)>,
    records: &[ExportRecord],
    now: DateTime<Local>,
) -> Result<ExportBundle> {
    let (source_path, pixels) = image.ok_or(Error::NoImage)?;
    if records.is_empty() {
        return Err(Error::NoRectangles);
    }

    let stem = source_path
        .file_stem()
        .unwrap_or_default()
        .to_str()
        .unwrap_or("image")
        .to_string();
    let dir = unique_dir(
        &config.export_root,
        &format!("{}_{}", stem, now.format("%Y%m%d_%H%M%S")),
    );
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let bundle = ExportBundle {
        image_path: dir.join(format!("{stem}.png")),
        csv_path: dir.join(&config.csv_file_name),
        dir,
    };
    let written = pixels
        .save(&bundle.image_path)
        .map_err(|source| Error::ImageEncode {
            path: bundle.image_path.clone(),
            source,
        })
        .and_then(|()| write_csv(&bundle.csv_path, records));

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_dir_all(&bundle.dir) {
            log::warn!("could not remove {}: {cleanup}", bundle.dir.display());
        }
        return Err(e);
    }
    log::info!("exported bundle to {}", bundle.dir.display());
    Ok(bundle)
}

fn unique_dir(root: &Path, name: &str) -> PathBuf {
    let mut dir = root.join(name);
    let mut n = 2;
    while dir.exists() {
        dir = root.join(format!("{name}_{n}"));
        n += 1;
    }
    dir
}
