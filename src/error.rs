//! App error type for preview generation. Implements Display and Serialize for hosts.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Preview index {index} is out of range (capacity {capacity})")]
    InvalidIndex { index: u32, capacity: u32 },

    #[error("A preview encode is already in progress")]
    EncodeInProgress,

    #[error("Unsupported container for preview: {0}")]
    UnsupportedContainer(String),

    #[error("Scratch directory unavailable: {0}")]
    Scratch(String),

    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Engine {operation} failed: {detail}")]
    Engine {
        operation: &'static str,
        detail: String,
    },

    #[error("Preview encode failed (engine error {code})")]
    EncodeFailed { code: i32 },

    #[error("Invalid preferences: {0}")]
    Config(String),
}

impl AppError {
    pub fn engine(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Engine {
            operation,
            detail: detail.into(),
        }
    }

    /// True for failures raised before anything reached the engine.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AppError::InvalidIndex { .. }
                | AppError::EncodeInProgress
                | AppError::UnsupportedContainer(_)
                | AppError::Scratch(_)
        )
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            AppError::EncodeFailed { code } => {
                let json = serde_json::json!({
                    "summary": "Preview encode failed.",
                    "detail": format!("engine error {}", code),
                });
                serializer.serialize_str(&json.to_string())
            }
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_index_message_names_capacity() {
        let e = AppError::InvalidIndex {
            index: 12,
            capacity: 10,
        };
        assert_eq!(
            e.to_string(),
            "Preview index 12 is out of range (capacity 10)"
        );
        assert!(e.is_precondition());
    }

    #[test]
    fn engine_errors_are_not_preconditions() {
        let e = AppError::engine("submit", "queue full");
        assert_eq!(e.to_string(), "Engine submit failed: queue full");
        assert!(!e.is_precondition());
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&AppError::EncodeInProgress).unwrap();
        assert_eq!(json, "\"A preview encode is already in progress\"");
    }

    #[test]
    fn encode_failed_serializes_summary_and_detail() {
        let json = serde_json::to_value(AppError::EncodeFailed { code: 3 }).unwrap();
        let inner: serde_json::Value = serde_json::from_str(json.as_str().unwrap()).unwrap();
        assert_eq!(inner["summary"], "Preview encode failed.");
        assert_eq!(inner["detail"], "engine error 3");
    }

    #[test]
    fn json_errors_become_config_errors() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Config(_)));
    }
}
