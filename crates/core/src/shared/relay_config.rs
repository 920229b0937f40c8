use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    APP_DIR_NAME, CAPTURED_IMAGE_FILENAME, CAPTURE_ENDPOINT, DEFAULT_CAMERA_HOST,
    PROCESSED_IMAGE_FILENAME, UPLOAD_ENDPOINT, UPLOAD_FIELD_NAME,
};

/// Longest accepted interval, wait or timeout: one day.
const MAX_DURATION_SECS: f64 = 86_400.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime policy for the relay. Every field has a default, so a config
/// file only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Camera host, optionally with port (`192.168.1.10:8080`).
    pub host: String,
    pub capture_path: PathBuf,
    pub processed_path: PathBuf,
    pub capture_interval_secs: f64,
    pub capture_timeout_secs: f64,
    pub signal_wait_secs: f64,
    pub upload_timeout_secs: f64,
    pub upload_field: String,
    /// Unclaimed captures kept before the oldest is superseded.
    pub queue_capacity: usize,
    pub confidence: f64,
    pub min_face_size: u32,
    pub enhance: bool,
    pub box_color: [u8; 3],
    pub box_thickness: u32,
    pub model_dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CAMERA_HOST.to_string(),
            capture_path: PathBuf::from(CAPTURED_IMAGE_FILENAME),
            processed_path: PathBuf::from(PROCESSED_IMAGE_FILENAME),
            capture_interval_secs: 5.0,
            capture_timeout_secs: 10.0,
            signal_wait_secs: 5.0,
            upload_timeout_secs: 10.0,
            upload_field: UPLOAD_FIELD_NAME.to_string(),
            queue_capacity: 1,
            confidence: 0.5,
            min_face_size: 30,
            enhance: false,
            box_color: [0, 0, 255],
            box_thickness: 2,
            model_dir: None,
        }
    }
}

impl RelayConfig {
    /// Loads config from `path`, or from the default location when `path`
    /// is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        let durations = [
            ("capture_interval_secs", self.capture_interval_secs),
            ("capture_timeout_secs", self.capture_timeout_secs),
            ("signal_wait_secs", self.signal_wait_secs),
            ("upload_timeout_secs", self.upload_timeout_secs),
        ];
        for (name, secs) in durations {
            if !secs.is_finite() || secs <= 0.0 || secs > MAX_DURATION_SECS {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 0 and {MAX_DURATION_SECS} seconds, got {secs}"
                )));
            }
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::Invalid(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        if self.box_thickness == 0 {
            return Err(ConfigError::Invalid("box_thickness must be at least 1".into()));
        }
        if self.upload_field.is_empty() {
            return Err(ConfigError::Invalid("upload_field must not be empty".into()));
        }
        Ok(())
    }

    pub fn capture_url(&self) -> String {
        format!("http://{}/{CAPTURE_ENDPOINT}", self.host)
    }

    pub fn upload_url(&self) -> String {
        format!("http://{}/{UPLOAD_ENDPOINT}", self.host)
    }

    pub fn capture_interval(&self) -> Duration {
        Duration::from_secs_f64(self.capture_interval_secs)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.capture_timeout_secs)
    }

    pub fn signal_wait(&self) -> Duration {
        Duration::from_secs_f64(self.signal_wait_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.upload_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_match_camera_firmware() {
        let config = RelayConfig::default();
        assert_eq!(config.capture_url(), "http://192.168.254.176/capture");
        assert_eq!(config.upload_url(), "http://192.168.254.176/upload");
        assert_eq!(config.upload_field, "plain");
        assert_eq!(config.capture_interval(), Duration::from_secs(5));
        assert_eq!(config.capture_timeout(), Duration::from_secs(10));
        assert_eq!(config.signal_wait(), Duration::from_secs(5));
        assert_eq!(config.capture_path, PathBuf::from("captured_image.jpg"));
        assert_eq!(config.processed_path, PathBuf::from("processed_image.jpg"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "host": "10.0.0.7:8080", "enhance": true }"#).unwrap();

        let config = RelayConfig::load(Some(&path)).unwrap();
        assert_eq!(config.host, "10.0.0.7:8080");
        assert!(config.enhance);
        assert_eq!(config.min_face_size, 30);
        assert_eq!(config.capture_url(), "http://10.0.0.7:8080/capture");
    }

    #[test]
    fn test_json_roundtrip() {
        let config = RelayConfig {
            queue_capacity: 3,
            model_dir: Some(PathBuf::from("/opt/models")),
            ..RelayConfig::default()
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: RelayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = RelayConfig::load(Some(Path::new("/nonexistent/camrelay.json")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            RelayConfig::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[rstest]
    #[case::empty_host(RelayConfig { host: " ".into(), ..RelayConfig::default() })]
    #[case::zero_interval(RelayConfig { capture_interval_secs: 0.0, ..RelayConfig::default() })]
    #[case::negative_wait(RelayConfig { signal_wait_secs: -1.0, ..RelayConfig::default() })]
    #[case::nan_timeout(RelayConfig { upload_timeout_secs: f64::NAN, ..RelayConfig::default() })]
    #[case::unrepresentable_interval(RelayConfig { capture_interval_secs: 1e20, ..RelayConfig::default() })]
    #[case::interval_overflows_instant(RelayConfig { capture_interval_secs: 1e19, ..RelayConfig::default() })]
    #[case::huge_wait(RelayConfig { signal_wait_secs: 1e19, ..RelayConfig::default() })]
    #[case::infinite_timeout(RelayConfig { capture_timeout_secs: f64::INFINITY, ..RelayConfig::default() })]
    #[case::zero_capacity(RelayConfig { queue_capacity: 0, ..RelayConfig::default() })]
    #[case::confidence_too_high(RelayConfig { confidence: 1.5, ..RelayConfig::default() })]
    #[case::zero_thickness(RelayConfig { box_thickness: 0, ..RelayConfig::default() })]
    #[case::empty_field(RelayConfig { upload_field: String::new(), ..RelayConfig::default() })]
    fn test_validate_rejects(#[case] config: RelayConfig) {
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_accepts_one_day_interval() {
        let config = RelayConfig {
            capture_interval_secs: 86_400.0,
            ..RelayConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.capture_interval(), Duration::from_secs(86_400));
    }
}
