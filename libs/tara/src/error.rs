//! Broker error taxonomy
//!
//! Every failure of the login flow surfaces as one [`TaraError`]. The variant
//! says which protocol step failed; the `source` chain keeps the underlying
//! cause (transport error, JSON error, or an inner `TaraError`).

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Status carried by a [`TaraError::Polling`] when the attempts ran out.
pub const TIMEOUT_STATUS: &str = "TIMEOUT";

/// Why the final accept step did not produce a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcceptFailure {
    #[error("Failed to accept authentication.")]
    Request,

    #[error("Authentication acceptance failed due to rate limiting (429).")]
    RateLimited,

    #[error("Failed to accept authentication: broker answered HTTP {0}.")]
    UnexpectedStatus(u16),

    #[error("Could not determine the final URL after redirects to parse the token.")]
    MissingFinalUrl,

    #[error("Authentication token not found in the redirect URL.")]
    MissingToken,
}

#[derive(Debug, Error)]
pub enum TaraError {
    /// CSRF token missing, session initialization failed, or no live session.
    #[error("{message}")]
    Session {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The ID-code submission could not be completed or parsed.
    #[error("{message}")]
    Login {
        message: String,
        /// Raw body of the broker's response, when there was one.
        response_body: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// Poll request failed, the broker reported an unknown status, or the
    /// attempts ran out (status [`TIMEOUT_STATUS`]).
    #[error("{message}")]
    Polling {
        message: String,
        status: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// The accept step failed.
    #[error("{failure}")]
    Broker {
        failure: AcceptFailure,
        #[source]
        source: Option<BoxError>,
    },
}

impl TaraError {
    pub fn session(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Session {
            message: message.into(),
            source,
        }
    }

    pub fn login(
        message: impl Into<String>,
        response_body: Option<String>,
        source: Option<BoxError>,
    ) -> Self {
        Self::Login {
            message: message.into(),
            response_body,
            source,
        }
    }

    pub fn polling(
        message: impl Into<String>,
        status: Option<String>,
        source: Option<BoxError>,
    ) -> Self {
        Self::Polling {
            message: message.into(),
            status,
            source,
        }
    }

    pub fn broker(failure: AcceptFailure, source: Option<BoxError>) -> Self {
        Self::Broker { failure, source }
    }

    /// Broker status carried by a polling error.
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Polling { status, .. } => status.as_deref(),
            _ => None,
        }
    }

    /// Raw response body carried by a login error.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Login { response_body, .. } => response_body.as_deref(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.status() == Some(TIMEOUT_STATUS)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::Broker {
                failure: AcceptFailure::RateLimited,
                ..
            }
        )
    }
}

/// Result type alias for broker operations
pub type TaraResult<T> = Result<T, TaraError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_polling_timeout_tag() {
        let err = TaraError::polling(
            "Authentication polling timed out.",
            Some(TIMEOUT_STATUS.to_string()),
            None,
        );
        assert!(err.is_timeout());
        assert_eq!(err.status(), Some("TIMEOUT"));
        assert_eq!(err.to_string(), "Authentication polling timed out.");
    }

    #[test]
    fn test_rate_limited_message() {
        let err = TaraError::broker(AcceptFailure::RateLimited, None);
        assert!(err.is_rate_limited());
        assert_eq!(
            err.to_string(),
            "Authentication acceptance failed due to rate limiting (429)."
        );
    }

    #[test]
    fn test_source_chain_is_kept() {
        let inner = TaraError::session("CSRF token not found in the response body.", None);
        let outer = TaraError::login(
            "An error occurred during Smart-ID login.",
            None,
            Some(Box::new(inner)),
        );

        let source = outer.source().unwrap();
        assert_eq!(
            source.to_string(),
            "CSRF token not found in the response body."
        );
        assert!(outer.response_body().is_none());
        assert!(outer.status().is_none());
    }
}
