use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, RgbImage};

use crate::error::{Error, Result};
use crate::export::{read_csv, ExportRecord};

/// File name of the crop written for CSV row `index`.
pub fn crop_file_name(index: u32) -> String {
    format!("cropped_{index:03}.png")
}

/// Pixel region `[x, x + width) x [y, y + height)` inside the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRegion {
    pub index: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Turns a record's corner bounds into a region clipped to the image, the
/// way slicing `[y1:y2, x1:x2]` would. Empty regions are rejected.
pub fn crop_region(record: &ExportRecord, image_width: u32, image_height: u32) -> Result<CropRegion> {
    let (x1, y1, x2, y2) = record.bounding_box();
    let clip = |v: i32, max: u32| (v.max(0) as u32).min(max);
    let (left, right) = (clip(x1, image_width), clip(x2, image_width));
    let (top, bottom) = (clip(y1, image_height), clip(y2, image_height));

    if right <= left || bottom <= top {
        return Err(Error::EmptyRegion {
            index: record.index,
            x1,
            y1,
            x2,
            y2,
            width: image_width,
            height: image_height,
        });
    }
    Ok(CropRegion {
        index: record.index,
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}

/// Row indices that appear more than once, in the order their repeats occur.
/// Each repeat overwrites the crop file written for the earlier row.
pub fn reused_indices(regions: &[CropRegion]) -> Vec<u32> {
    let mut seen = HashSet::new();
    regions
        .iter()
        .filter(|r| !seen.insert(r.index))
        .map(|r| r.index)
        .collect()
}

fn open_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Crops every box listed in `csv_path` out of `image_path` into `out_dir`
/// as `cropped_NNN.png`, returning the written paths in row order.
///
/// The whole CSV is validated before the first crop is written.
pub fn crop_from_csv(image_path: &Path, csv_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let img = open_rgb(image_path)?;
    let (w, h) = img.dimensions();
    log::info!("cropping {} ({w}x{h})", image_path.display());

    let regions = read_csv(csv_path)?
        .iter()
        .map(|r| crop_region(r, w, h))
        .collect::<Result<Vec<_>>>()?;

    for index in reused_indices(&regions) {
        log::warn!(
            "index {index} appears more than once; {} will hold the last such row",
            crop_file_name(index)
        );
    }

    fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;

    let mut written = Vec::with_capacity(regions.len());
    for region in &regions {
        let out_path = out_dir.join(crop_file_name(region.index));
        imageops::crop_imm(&img, region.x, region.y, region.width, region.height)
            .to_image()
            .save(&out_path)
            .map_err(|source| Error::ImageEncode {
                path: out_path.clone(),
                source,
            })?;
        log::debug!(
            "box {} -> {} ({}x{})",
            region.index,
            out_path.display(),
            region.width,
            region.height
        );
        written.push(out_path);
    }
    log::info!("wrote {} crops to {}", written.len(), out_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SourcePoint;

    fn record(x1: i32, y1: i32, x2: i32, y2: i32) -> ExportRecord {
        ExportRecord {
            index: 4,
            tl: SourcePoint::new(x1, y1),
            tr: SourcePoint::new(x2, y1),
            br: SourcePoint::new(x2, y2),
            bl: SourcePoint::new(x1, y2),
        }
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(crop_file_name(1), "cropped_001.png");
        assert_eq!(crop_file_name(42), "cropped_042.png");
        assert_eq!(crop_file_name(1234), "cropped_1234.png");
    }

    #[test]
    fn region_excludes_the_far_edge() {
        let r = crop_region(&record(10, 10, 50, 50), 100, 100).unwrap();
        assert_eq!(r, CropRegion { index: 4, x: 10, y: 10, width: 40, height: 40 });
    }

    #[test]
    fn region_is_clipped_to_the_image() {
        let r = crop_region(&record(-5, 90, 30, 140), 100, 100).unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (0, 90, 30, 10));
    }

    #[test]
    fn repeated_indices_are_reported_once_per_repeat() {
        let region = |index| CropRegion { index, x: 0, y: 0, width: 1, height: 1 };
        let regions = [region(1), region(2), region(1), region(3), region(1)];
        assert_eq!(reused_indices(&regions), vec![1, 1]);
        assert!(reused_indices(&regions[..2]).is_empty());
    }

    #[test]
    fn regions_without_pixels_are_rejected() {
        for rec in [record(10, 10, 10, 50), record(120, 0, 150, 20), record(0, -30, 20, -1)] {
            assert!(matches!(
                crop_region(&rec, 100, 100),
                Err(Error::EmptyRegion { index: 4, .. })
            ));
        }
    }
}
