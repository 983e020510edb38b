//! Unified error type for annotation, export and cropping.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image file could not be read or decoded
    #[error("failed to decode image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image {}: {source}", .path.display())]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Missing column, malformed number, or unreadable CSV file
    #[error("invalid box CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no image is loaded")]
    NoImage,

    #[error("no boxes to export")]
    NoRectangles,

    /// A CSV row whose box does not overlap the image
    #[error("box {index} ({x1},{y1})-({x2},{y2}) selects no pixels of a {width}x{height} image")]
    EmptyRegion {
        index: u32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        width: u32,
        height: u32,
    },

    #[error("invalid screen size {0:?}, expected WIDTHxHEIGHT")]
    InvalidScreenSize(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
