//! Application configuration.

use std::path::PathBuf;

use crate::layout::ScreenSize;

/// Image file extensions offered by the open dialog.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "webp", "tiff"];

pub const DEFAULT_EXPORT_ROOT: &str = "exports";
pub const DEFAULT_CSV_FILE_NAME: &str = "boxes.csv";
/// Share of the screen the main window covers on each axis.
pub const DEFAULT_WINDOW_FRACTION: f32 = 0.8;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Parent folder of the per-export bundle folders
    pub export_root: PathBuf,
    pub csv_file_name: String,
    pub screen: ScreenSize,
    pub window_fraction: f32,
    /// Image to open straight away, skipping the main menu
    pub initial_image: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export_root: PathBuf::from(DEFAULT_EXPORT_ROOT),
            csv_file_name: DEFAULT_CSV_FILE_NAME.to_string(),
            screen: ScreenSize::default(),
            window_fraction: DEFAULT_WINDOW_FRACTION,
            initial_image: None,
        }
    }
}
