use thiserror::Error;

/// Errors raised by [`PipesClient`](super::PipesClient).
///
/// Messages never include the API token.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token could not be turned into a request header.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection failure, timeout, or other transport-level problem.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body did not match the expected model.
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Errors worth retrying while the API converges after a recent write.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => matches!(status, 404 | 409 | 429 | 500..=599),
            Self::Network(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "API error (403): Forbidden");
    }

    #[test]
    fn test_auth_error_display() {
        let err = ApiError::Auth {
            message: "Invalid token format".to_string(),
        };
        assert_eq!(err.to_string(), "authentication failed: Invalid token format");
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [404, 409, 429, 500, 502, 503] {
            let err = ApiError::Api {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "{} should be retryable", status);
        }
        for status in [400, 401, 403, 422] {
            let err = ApiError::Api {
                status,
                message: String::new(),
            };
            assert!(!err.is_retryable(), "{} should not be retryable", status);
        }
    }

    #[test]
    fn test_decode_error_is_not_retryable() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::Decode {
            context: "workspace".to_string(),
            source,
        };
        assert!(!err.is_retryable());
        assert!(err.status().is_none());
        assert!(err.to_string().starts_with("failed to decode workspace"));
    }
}
