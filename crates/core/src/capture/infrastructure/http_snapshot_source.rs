use std::time::Duration;

use reqwest::StatusCode;

use crate::capture::domain::snapshot_source::{CaptureError, SnapshotSource};

/// Fetches snapshots with a blocking GET against the camera's capture URL.
///
/// Only `200 OK` counts as a capture; any other status is reported as
/// [`CaptureError::Status`] so the Acquirer skips the cycle.
pub struct HttpSnapshotSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CaptureError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CaptureError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&self) -> Result<Vec<u8>, CaptureError> {
        let request_err = |source| CaptureError::Request {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().map_err(request_err)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(CaptureError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(request_err)?;
        Ok(bytes.to_vec())
    }
}
