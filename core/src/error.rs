//! The adapter's error taxonomy (spec §7), concretized as one enum rather
//! than prose categories so the host can match on it programmatically.

use responses_sdk::SdkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// Network reset/timeout, or an HTTP-level failure in
    /// {429, 502, 503, 504} — retryable under the retry envelope.
    #[error("transient failure calling the responses API: {message}")]
    Transient {
        status: Option<u16>,
        message: String,
        retry_after: Option<String>,
        ratelimit_reset: Option<String>,
    },

    /// `context_length_exceeded` — non-retryable, resets chaining.
    #[error("context window exceeded: {message}")]
    ContextOverflow { message: String },

    /// Missing/non-array `output`, empty `output`, or empty translated
    /// content. Resets chaining.
    #[error("responses API protocol violation (chain_was_active={chain_was_active}): {message}")]
    Protocol {
        chain_was_active: bool,
        message: String,
    },

    /// The response reached a terminal `failed` (or `cancelled`, per the
    /// adapter's design note) status.
    #[error("response failed: {message}")]
    Terminal { message: String },

    /// Missing or otherwise invalid construction-time configuration,
    /// e.g. no API key. Detected lazily on first use.
    #[error("adapter is not configured: {message}")]
    Configuration { message: String },

    /// Returned text matched a configured model-confusion pattern.
    #[error("garbled output detected (chain_was_active={chain_was_active}, pattern={matched_pattern})")]
    Garbled {
        chain_was_active: bool,
        matched_pattern: String,
    },
}

impl AdapterError {
    /// Whether the retry envelope should retry this error at all. Also
    /// consulted with `retry_all_errors` at the call site.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdapterError::Transient { status, message, .. } => {
                matches!(status, Some(429) | Some(502) | Some(503) | Some(504))
                    || message.contains("fetch failed")
                    || message.contains("ECONNRESET")
                    || message.contains("ETIMEDOUT")
            }
            _ => false,
        }
    }
}

/// Maps a wire-level [`SdkError`] into the adapter's taxonomy. Lives
/// outside `Pipeline` so it can be called without borrowing adapter
/// state; callers are responsible for the state resets each category
/// implies (resetting `lastResponseId` on `ContextOverflow`, etc).
pub fn classify_sdk_error(err: &SdkError) -> AdapterError {
    if err.code() == Some("context_length_exceeded") {
        return AdapterError::ContextOverflow {
            message: format!(
                "the conversation exceeds this model's context window ({}). Enable \
                 auto-compaction or call manualCompact to shorten it before retrying.",
                err.message()
            ),
        };
    }

    if err.is_connection_failure() {
        return AdapterError::Transient {
            status: err.status(),
            message: err.message(),
            retry_after: err.retry_after().map(str::to_string),
            ratelimit_reset: err.ratelimit_reset().map(str::to_string),
        };
    }

    match err {
        SdkError::Api { status, message, body, retry_after, ratelimit_reset, .. } => {
            AdapterError::Transient {
                status: Some(*status),
                message: format!("{message} (body: {body})"),
                retry_after: retry_after.clone(),
                ratelimit_reset: ratelimit_reset.clone(),
            }
        }
        other => AdapterError::Transient {
            status: None,
            message: other.to_string(),
            retry_after: None,
            ratelimit_reset: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_retryable() {
        let err = AdapterError::Transient {
            status: Some(429),
            message: "rate limited".to_string(),
            retry_after: None,
            ratelimit_reset: None,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn fetch_failed_substring_is_retryable() {
        let err = AdapterError::Transient {
            status: None,
            message: "fetch failed".to_string(),
            retry_after: None,
            ratelimit_reset: None,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn context_overflow_is_not_retryable() {
        let err = AdapterError::ContextOverflow {
            message: "too long".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_400_is_not_retryable() {
        let err = AdapterError::Transient {
            status: Some(400),
            message: "bad request".to_string(),
            retry_after: None,
            ratelimit_reset: None,
        };
        assert!(!err.is_retryable());
    }
}
