use std::fmt;

/// API errors with user-friendly messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network-level failure (connection, timeout, DNS)
    Network(String),
    /// Non-success HTTP status other than 404
    RequestFailed { path: String, status: u16 },
    /// HTTP 404
    NotFound { path: String },
    /// Response body was not the JSON we expected
    Parse { path: String, details: String },
    /// A request URL could not be built from the configured base
    InvalidUrl(String),
}

impl ApiError {
    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(details) => {
                if details.contains("timed out") {
                    "Request timed out. Please try again.".into()
                } else if details.contains("dns") || details.contains("resolve") {
                    "Network error: Could not reach server.".into()
                } else {
                    format!("Network error: {details}")
                }
            }
            Self::RequestFailed { path, status } => format!("Request failed: {path} ({status})"),
            Self::NotFound { path } => format!("Request failed: {path} (404)"),
            Self::Parse { path, .. } => format!("Request failed: {path} (invalid response body)"),
            Self::InvalidUrl(details) => format!("Invalid API URL: {details}"),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The HTTP status the server answered with, if it answered at all.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub(crate) fn from_status(path: &str, status: u16) -> Self {
        if status == 404 {
            Self::NotFound { path: path.into() }
        } else {
            Self::RequestFailed {
                path: path.into(),
                status,
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timed out".into())
        } else if err.is_connect() {
            Self::Network("connection failed".into())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished_from_other_statuses() {
        let missing = ApiError::from_status("/api/story/abc", 404);
        let broken = ApiError::from_status("/api/story/abc", 500);

        assert!(missing.is_not_found());
        assert!(!broken.is_not_found());
        assert_eq!(missing.status(), Some(404));
        assert_eq!(broken.status(), Some(500));
    }

    #[test]
    fn request_failed_message_carries_path_and_status() {
        let err = ApiError::from_status("/api/stories?page=2", 502);
        assert_eq!(err.to_string(), "Request failed: /api/stories?page=2 (502)");
    }

    #[test]
    fn network_errors_have_no_status() {
        let err = ApiError::Network("request timed out".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.user_message(), "Request timed out. Please try again.");
    }
}
