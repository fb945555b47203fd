use thiserror::Error;

/// Message returned for any unexpected storage failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error occurred.";

/// Outcome of a failed catalog operation.
///
/// Storage details never appear in these messages; they are logged where the
/// failure is converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PodcastError {
    /// A referenced podcast, episode or user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input outside its allowed range.
    #[error("{0}")]
    Validation(String),

    /// Unexpected store failure.
    #[error("Internal server error occurred.")]
    Internal,

    /// Named failure of a specific operation, e.g. "Could not subscribe podcast".
    #[error("{0}")]
    Operation(String),
}

impl PodcastError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PodcastError::NotFound(_) => "not_found",
            PodcastError::Validation(_) => "validation",
            PodcastError::Internal => "internal",
            PodcastError::Operation(_) => "operation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_message_is_generic() {
        assert_eq!(PodcastError::Internal.to_string(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(PodcastError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(PodcastError::Validation("x".into()).kind(), "validation");
        assert_eq!(PodcastError::Operation("x".into()).kind(), "operation");
    }
}
