//! Error types shared by every crate of the recommendation core.
//!
//! The core has no recoverable internal failures: everything reported here is
//! a caller error (bad argument, empty collection, bad configuration) or a
//! failure of the host-side snapshot loader.

use thiserror::Error;

/// Errors that can occur while computing recommendations.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// A required argument was missing, malformed or out of range
    #[error("Invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    /// A required collection was empty
    #[error("Invalid argument `{param}`: collection must not be empty")]
    EmptyCollection { param: &'static str },

    /// I/O error while reading a snapshot file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Snapshot file could not be decoded
    #[error("Failed to parse snapshot {path}: {source}")]
    SnapshotParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RecommendError {
    /// Shorthand for building an [`RecommendError::InvalidArgument`].
    pub fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }

    /// True for every variant in the InvalidArgument family, including empty
    /// collections.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::EmptyCollection { .. }
        )
    }

    /// Name of the offending parameter, when the error is about one.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { param, .. } | Self::EmptyCollection { param } => Some(param),
            _ => None,
        }
    }
}

/// Convenience type alias for Results in the recommendation core
pub type Result<T> = std::result::Result<T, RecommendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_names_param() {
        let err = RecommendError::EmptyCollection { param: "embeddings" };
        assert!(err.is_invalid_argument());
        assert_eq!(err.param(), Some("embeddings"));
        assert!(err.to_string().contains("embeddings"));
    }

    #[test]
    fn test_io_error_is_not_invalid_argument() {
        let err: RecommendError = std::io::Error::other("boom").into();
        assert!(!err.is_invalid_argument());
        assert!(err.param().is_none());
    }
}
