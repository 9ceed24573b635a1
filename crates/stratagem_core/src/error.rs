use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid color: '{0}' (expected #rrggbb)")]
    InvalidColor(String),

    #[error("No cards found in {0}")]
    EmptyDeck(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CoreError {
    /// Errors the pipeline reports and keeps going on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::Image(_) | CoreError::InvalidColor(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Maps a missing file to `InputNotFound`, every other IO error to `Io`.
pub(crate) fn open_error(path: &std::path::Path, err: std::io::Error) -> CoreError {
    if err.kind() == std::io::ErrorKind::NotFound {
        CoreError::InputNotFound {
            path: path.to_path_buf(),
        }
    } else {
        CoreError::Io(err)
    }
}
