//! Error kinds for promptcraft operations

use std::fmt;

/// What went wrong, coarse enough to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Catch-all for states that should not happen
    Unexpected,
    /// Credentials file missing or empty
    CredentialsMissing,
    /// A caller passed something unusable
    InvalidArgument,

    // Remote services
    /// Non-success HTTP status other than 401 / 429
    ApiFailed,
    /// HTTP 401, the API key was rejected
    AuthenticationFailed,
    /// HTTP 429
    RateLimited,
    /// The request never got an answer
    NetworkFailed,

    // Job polling
    /// The poll deadline passed before a terminal state was observed
    Timeout,
    /// The poll loop was cancelled
    Cancelled,

    // Local files
    FileNotFound,
    PermissionDenied,
    IoFailed,

    /// A response body did not have the expected shape
    ParseFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::CredentialsMissing => "CredentialsMissing",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::ApiFailed => "ApiFailed",
            ErrorKind::AuthenticationFailed => "AuthenticationFailed",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::NetworkFailed => "NetworkFailed",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::ParseFailed => "ParseFailed",
        }
    }

    /// Rate limits and transport failures may clear up on their own
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::NetworkFailed | ErrorKind::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Cancelled.to_string(), "Cancelled");
        assert_eq!(ErrorKind::AuthenticationFailed.to_string(), "AuthenticationFailed");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ErrorKind::NetworkFailed.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(!ErrorKind::ApiFailed.is_retryable());
        assert!(!ErrorKind::Cancelled.is_retryable());
    }
}
