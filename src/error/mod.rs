//! Error types for research brief generation.

use thiserror::Error;

/// Primary error type for all operations in this crate.
///
/// Provider, search and store failures surface here unmodified; the only
/// condition handled locally is an agent run that produced no assistant
/// message (see [`crate::brief::FALLBACK_BRIEF`]).
#[derive(Error, Debug)]
pub enum BriefError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Agent loop exceeded {0} model turns without a final answer")]
    IterationLimit(usize),

    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Unknown,
}

impl BriefError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether a caller could reasonably retry. This crate never retries itself.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(BriefError::api(401, "nope").category(), ErrorCategory::Authentication);
        assert_eq!(BriefError::api(429, "slow").category(), ErrorCategory::RateLimit);
        assert_eq!(BriefError::api(529, "overloaded").category(), ErrorCategory::Server);
        assert_eq!(BriefError::api(400, "bad").category(), ErrorCategory::Api);
    }

    #[test]
    fn retryable_errors() {
        assert!(BriefError::RateLimited { retry_after_ms: None }.is_retryable());
        assert!(BriefError::Timeout(10).is_retryable());
        assert!(!BriefError::Configuration("x".into()).is_retryable());
        assert!(!BriefError::IterationLimit(25).is_retryable());
    }

    #[test]
    fn tool_failures_are_not_retryable() {
        let err = BriefError::ToolExecution {
            tool_name: "tavily_search_results_json".into(),
            message: "tool not found".into(),
        };
        assert_eq!(err.category(), ErrorCategory::ToolExecution);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Tool execution error: tavily_search_results_json: tool not found"
        );
    }
}
