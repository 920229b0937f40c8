use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::Form;
use reqwest::StatusCode;

use crate::upload::domain::image_uploader::{ImageUploader, UploadError};

/// Posts a file as a single multipart field.
///
/// The camera firmware answers `200 OK` on success; any other status is an
/// [`UploadError::Status`]. Nothing is retried.
pub struct MultipartUploader {
    client: reqwest::blocking::Client,
    url: String,
    field_name: String,
}

impl MultipartUploader {
    pub fn new(
        url: impl Into<String>,
        field_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UploadError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
            field_name: field_name.into(),
        })
    }
}

impl ImageUploader for MultipartUploader {
    fn upload(&self, path: &Path) -> Result<(), UploadError> {
        let form = Form::new()
            .file(self.field_name.clone(), path)
            .map_err(|e| UploadError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|e| UploadError::Request {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UploadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploader() -> MultipartUploader {
        MultipartUploader::new("http://127.0.0.1:9/upload", "plain", Duration::from_secs(2))
            .unwrap()
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = uploader().upload(Path::new("/nonexistent/processed_image.jpg"));
        assert!(matches!(result, Err(UploadError::Read { .. })));
    }

    #[test]
    fn test_unreachable_endpoint_is_request_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_image.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let result = uploader().upload(&path);
        assert!(matches!(result, Err(UploadError::Request { .. })));
    }
}
