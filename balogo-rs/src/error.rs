use balogo_canvas2d::Canvas2dError;
use std::path::PathBuf;

/// Result type for logo operations.
pub type LogoResult<T> = Result<T, LogoError>;

#[derive(Debug, thiserror::Error)]
pub enum LogoError {
    #[error("Canvas error: {0}")]
    Canvas(#[from] Canvas2dError),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mark asset: {0}")]
    Asset(String),

    #[error("Font loading failed: {0}")]
    FontLoad(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("Session closed: {0}")]
    SessionClosed(String),
}

impl LogoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LogoError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for LogoError {
    fn from(err: serde_json::Error) -> Self {
        LogoError::Settings(err.to_string())
    }
}

impl From<reqwest::Error> for LogoError {
    fn from(err: reqwest::Error) -> Self {
        LogoError::FontLoad(err.to_string())
    }
}

impl From<usvg::Error> for LogoError {
    fn from(err: usvg::Error) -> Self {
        LogoError::Asset(err.to_string())
    }
}
