//! Rectangle annotation for document images: map pointer input on a
//! letterboxed view back to source pixels, keep the drawn boxes, export their
//! corners to CSV, and crop them back out of the image later.

pub mod canvas;
pub mod config;
pub mod crop;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod mapping;
pub mod rects;

pub use canvas::AnnotationCanvas;
pub use config::Config;
pub use crop::{crop_from_csv, crop_file_name, CropRegion};
pub use error::{Error, Result};
pub use export::{export_bundle, export_records, read_csv, write_csv, ExportBundle, ExportRecord, CSV_HEADER};
pub use geometry::{Point, Rect, SourcePoint};
pub use layout::{menu_layout, window_geometry, MenuLayout, ScreenSize, WindowGeometry};
pub use mapping::{CoordinateMapper, DisplayMapping};
pub use rects::{DrawState, PointerHandler, RectManager, MIN_RECT_SIZE};
