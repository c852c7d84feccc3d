use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApodError {
    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("download error: {0}")]
    Download(String),

    #[error("unexpected JSON shape: expected an array")]
    NotAnArray,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ApodError {
    fn from(e: reqwest::Error) -> Self {
        ApodError::Fetch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApodError>;
