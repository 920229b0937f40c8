use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} rejected upload with status {status}")]
    Status { url: String, status: u16 },
}

/// Domain interface for sending a processed image to its destination.
pub trait ImageUploader: Send {
    fn upload(&self, path: &Path) -> Result<(), UploadError>;
}
