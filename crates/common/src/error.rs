//! Error types shared across Snapstrip crates.

use std::path::PathBuf;

/// Top-level error type for Snapstrip operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapstripError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    /// The video source has no usable frame yet (no dimensions).
    #[error("Capture source unavailable: {message}")]
    CaptureUnavailable { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Upload error: {message}")]
    Upload { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SnapstripError.
pub type SnapstripResult<T> = Result<T, SnapstripError>;

impl SnapstripError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn capture_unavailable(msg: impl Into<String>) -> Self {
        Self::CaptureUnavailable {
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload {
            message: msg.into(),
        }
    }

    /// Whether this error means "no frame right now" rather than a real failure.
    pub fn is_capture_unavailable(&self) -> bool {
        matches!(self, Self::CaptureUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = SnapstripError::decode("frame 3 is not a PNG");
        assert_eq!(err.to_string(), "Decode error: frame 3 is not a PNG");
    }

    #[test]
    fn test_capture_unavailable_is_distinguishable() {
        assert!(SnapstripError::capture_unavailable("0x0 source").is_capture_unavailable());
        assert!(!SnapstripError::capture("boom").is_capture_unavailable());
    }
}
