//! APOD Gallery - shared core for the desktop gallery and the batch downloader

pub mod constants;
pub mod downloader;
pub mod error;
pub mod feed;
pub mod gallery;
pub mod types;
pub mod utils;

pub use error::{ApodError, Result};
pub use types::{Entry, Feed};
