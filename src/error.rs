//! Error taxonomy for scanning operations.

use thiserror::Error;

/// Errors produced while scanning files.
///
/// Every variant except `Config` is scoped to a single file and never aborts
/// a batch.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("{path}: no scanner for extension '{extension}'")]
    UnsupportedLanguage { path: String, extension: String },

    #[error("{path}: invalid UTF-8 at byte {offset}")]
    Decode { path: String, offset: usize },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: scanner failed: {message}")]
    Internal { path: String, message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl ScanError {
    /// Stable identifier for structured reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage { .. } => "unsupported_language",
            Self::Decode { .. } => "decode_error",
            Self::Io { .. } => "io_error",
            Self::Internal { .. } => "internal_scanner_error",
            Self::Config { .. } => "config_error",
        }
    }

    /// The file this error belongs to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnsupportedLanguage { path, .. }
            | Self::Decode { path, .. }
            | Self::Io { path, .. }
            | Self::Internal { path, .. } => Some(path),
            Self::Config { .. } => None,
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for scanning operations.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_path() {
        let err = ScanError::Decode {
            path: "a.rs".to_string(),
            offset: 3,
        };
        assert_eq!(err.kind(), "decode_error");
        assert_eq!(err.path(), Some("a.rs"));
        assert_eq!(err.to_string(), "a.rs: invalid UTF-8 at byte 3");

        let err = ScanError::config("workers must be at least 1");
        assert_eq!(err.kind(), "config_error");
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_io_display() {
        let err = ScanError::io(
            "missing.py",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.kind(), "io_error");
        assert!(err.to_string().starts_with("missing.py: "));
    }
}
