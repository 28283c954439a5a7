/// Client error types
///
/// Distinguishes errors the backend reported (with an HTTP status and the
/// server's `{error}` message) from transport and local failures, so the
/// state layer can treat a 401 during session hydration differently from
/// a network outage.
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-success status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The server's error message
        message: String,
    },

    /// The request never produced a usable response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the expected shape
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reading or writing the local session file failed
    #[error("Session storage error: {0}")]
    Session(#[from] std::io::Error),

    /// An action was requested without a logged-in session
    #[error("Not logged in")]
    NotLoggedIn,
}

impl ClientError {
    /// Whether this is an authentication failure from the backend
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

/// Convenience alias for client results
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unauthorized() {
        let unauthorized = ClientError::Api {
            status: 401,
            message: "Invalid token".to_string(),
        };
        assert!(unauthorized.is_unauthorized());

        let not_found = ClientError::Api {
            status: 404,
            message: "Task not found".to_string(),
        };
        assert!(!not_found.is_unauthorized());
        assert!(!ClientError::NotLoggedIn.is_unauthorized());
    }

    #[test]
    fn test_api_error_displays_server_message() {
        let err = ClientError::Api {
            status: 409,
            message: "Email is already in use".to_string(),
        };
        assert_eq!(err.to_string(), "Email is already in use");
    }
}
