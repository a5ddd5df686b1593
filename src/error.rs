//! Error type shared by every part of the crate.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, GtruthError>;

#[derive(thiserror::Error, Debug)]
pub enum GtruthError {
    /// A bounding rectangle was requested for an empty set of rectangles.
    #[error("cannot compute the bounding rectangle of an empty set")]
    EmptyInput,

    #[error("zoom factor {0} is not allowed")]
    InvalidFactor(f64),

    #[error("export aborted: {0}")]
    ExportAborted(String),

    #[error("'{}' is not a {expected} file", path.display())]
    WrongFileType { path: PathBuf, expected: &'static str },

    #[error("malformed boxes file: {0}")]
    MalformedBoxes(String),

    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GtruthError {
    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::ExportAborted(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedBoxes(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
