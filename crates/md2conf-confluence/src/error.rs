//! Error types for Confluence integration.

/// Error from Confluence API operations.
///
/// Status codes are mapped onto semantic variants so callers can tell an
/// authentication problem from a concurrent edit without parsing bodies.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfluenceError {
    /// HTTP request failed before a response arrived (DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] ureq::Error),

    /// Credentials rejected (401) or insufficient permissions (403).
    #[error("authentication failed (HTTP {status}): {body}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Addressed content does not exist (404).
    #[error("not found: {body}")]
    NotFound {
        /// Response body.
        body: String,
    },

    /// Version conflict, usually a concurrent edit (409).
    #[error("conflict: {body}")]
    Conflict {
        /// Response body.
        body: String,
    },

    /// Any other error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfluenceError {
    /// Classify an error response by status code.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Authentication { status, body },
            404 => Self::NotFound { body },
            409 => Self::Conflict { body },
            _ => Self::HttpResponse { status, body },
        }
    }

    /// HTTP status code, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::HttpResponse { status, .. } => {
                Some(*status)
            }
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Transport(_) | Self::Json(_) => None,
        }
    }

    /// Whether repeating the request later could succeed.
    ///
    /// True for transport failures, rate limiting and server errors.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::HttpResponse { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
