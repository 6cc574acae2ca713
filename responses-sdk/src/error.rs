use thiserror::Error;

/// Errors surfaced by the SDK's two HTTP operations.
///
/// This type intentionally knows nothing about the host adapter's error
/// taxonomy (`core::error::AdapterError`) — it only reports what happened
/// on the wire. The adapter maps it into its own taxonomy at the call
/// site, the same separation the teacher draws between a provider SDK's
/// `Error` and the host-facing adapter error.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request to the responses API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response body was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("responses API returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        body: String,
        retry_after: Option<String>,
        ratelimit_reset: Option<String>,
    },
}

impl SdkError {
    /// HTTP status code, when the error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Transport(err) => err.status().map(|s| s.as_u16()),
            SdkError::Decode(_) => None,
        }
    }

    /// Machine-readable error code from the API body, if present.
    pub fn code(&self) -> Option<&str> {
        match self {
            SdkError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Human-readable message, falling back to the Display impl for
    /// transport/decode failures.
    pub fn message(&self) -> String {
        match self {
            SdkError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// `Retry-After` (or `x-ratelimit-reset` / `ratelimit-reset`) header
    /// value, carried verbatim so the caller can apply its own delta- vs.
    /// absolute-timestamp parsing rules.
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            SdkError::Api { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }

    pub fn ratelimit_reset(&self) -> Option<&str> {
        match self {
            SdkError::Api { ratelimit_reset, .. } => ratelimit_reset.as_deref(),
            _ => None,
        }
    }

    /// Whether this looks like a connection-level failure (reset, timed
    /// out, or the generic "fetch failed" the spec calls out), as opposed
    /// to a well-formed non-2xx response.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            SdkError::Transport(err) => {
                err.is_timeout() || err.is_connect() || err.to_string().contains("fetch failed")
            }
            _ => false,
        }
    }
}
