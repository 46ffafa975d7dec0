//! Session preferences read once when a preview generator is created.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_PREVIEW_COUNT: u32 = 10;
const MAX_PREVIEW_COUNT: u32 = 60;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const MIN_POLL_INTERVAL_MS: u64 = 50;
const DEFAULT_SCRATCH_MAX_AGE_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPreferences {
    /// Number of evenly spaced preview points per title. Default 10.
    pub preview_count: Option<u32>,
    /// Engine log verbosity for preview encode sessions. Default 1.
    pub logging_level: Option<u8>,
    /// Force the deinterlace filter on when extracting still previews. Default false.
    pub deinterlace_previews: Option<bool>,
    /// Engine state poll cadence in milliseconds. Default 500.
    pub poll_interval_ms: Option<u64>,
    /// Parent of the per-process scratch directory. Default: system temp dir.
    pub scratch_root: Option<PathBuf>,
    /// Scratch directories of other processes older than this are removed
    /// when a generator is created. Default one day.
    pub scratch_max_age_secs: Option<u64>,
}

impl PreviewPreferences {
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        let prefs = Self::from_json_str(&text)?;
        log::debug!(
            target: "tiny_preview::config",
            "loaded preferences from {}: {:?}",
            path.display(),
            prefs
        );
        Ok(prefs)
    }

    pub fn effective_preview_count(&self) -> u32 {
        self.preview_count
            .unwrap_or(DEFAULT_PREVIEW_COUNT)
            .clamp(1, MAX_PREVIEW_COUNT)
    }

    pub fn effective_logging_level(&self) -> u8 {
        self.logging_level.unwrap_or(1)
    }

    pub fn effective_deinterlace_previews(&self) -> bool {
        self.deinterlace_previews.unwrap_or(false)
    }

    pub fn effective_poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
                .max(MIN_POLL_INTERVAL_MS),
        )
    }

    pub fn effective_scratch_root(&self) -> PathBuf {
        self.scratch_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn effective_scratch_max_age(&self) -> Duration {
        Duration::from_secs(
            self.scratch_max_age_secs
                .unwrap_or(DEFAULT_SCRATCH_MAX_AGE_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let prefs = PreviewPreferences::default();
        assert_eq!(prefs.effective_preview_count(), 10);
        assert_eq!(prefs.effective_logging_level(), 1);
        assert!(!prefs.effective_deinterlace_previews());
        assert_eq!(prefs.effective_poll_interval(), Duration::from_millis(500));
        assert_eq!(prefs.effective_scratch_root(), std::env::temp_dir());
        assert_eq!(prefs.effective_scratch_max_age(), Duration::from_secs(86_400));
    }

    #[test]
    fn parses_camel_case_json() {
        let prefs = PreviewPreferences::from_json_str(
            r#"{"previewCount": 30, "loggingLevel": 2, "deinterlacePreviews": true, "scratchRoot": "/var/tmp"}"#,
        )
        .unwrap();
        assert_eq!(prefs.effective_preview_count(), 30);
        assert_eq!(prefs.effective_logging_level(), 2);
        assert!(prefs.effective_deinterlace_previews());
        assert_eq!(prefs.effective_scratch_root(), PathBuf::from("/var/tmp"));
    }

    #[test]
    fn preview_count_is_clamped() {
        let zero = PreviewPreferences {
            preview_count: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.effective_preview_count(), 1);
        let huge = PreviewPreferences {
            preview_count: Some(500),
            ..Default::default()
        };
        assert_eq!(huge.effective_preview_count(), 60);
    }

    #[test]
    fn poll_interval_has_floor() {
        let prefs = PreviewPreferences {
            poll_interval_ms: Some(1),
            ..Default::default()
        };
        assert_eq!(prefs.effective_poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn scratch_max_age_parses_seconds() {
        let prefs = PreviewPreferences::from_json_str(r#"{"scratchMaxAgeSecs": 0}"#).unwrap();
        assert_eq!(prefs.effective_scratch_max_age(), Duration::ZERO);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = PreviewPreferences::from_json_str("{\"previewCount\": \"ten\"}").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"previewCount": 12}"#).expect("write");
        let prefs = PreviewPreferences::load(&path).unwrap();
        assert_eq!(prefs.effective_preview_count(), 12);
    }
}
