//! promptcraft-core error helpers
//!
//! Re-exports promptcraft-error and adds constructors for the remote boundary.

pub use promptcraft_error::{Error, ErrorKind, ErrorStatus, Result};

/// Map a non-success HTTP status and body to an Error.
pub fn from_status(status: u16, body: impl Into<String>) -> Error {
    let body = body.into();
    match status {
        401 => Error::new(ErrorKind::AuthenticationFailed, "API key rejected")
            .with_context("status", status.to_string()),
        429 => Error::new(ErrorKind::RateLimited, body).with_context("status", status.to_string()),
        _ => Error::api_failed(status, body),
    }
}

/// Wrap a transport-level reqwest failure.
pub fn network(err: reqwest::Error) -> Error {
    Error::network_failed(err.to_string()).set_source(err)
}

/// Wrap a JSON body that could not be decoded into the expected shape.
pub fn parse(err: serde_json::Error) -> Error {
    Error::parse_failed(err.to_string()).set_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(from_status(401, "nope").kind(), ErrorKind::AuthenticationFailed);

        let err = from_status(429, "slow down");
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.is_retryable());

        let err = from_status(503, "unavailable");
        assert_eq!(err.kind(), ErrorKind::ApiFailed);
        assert_eq!(err.context_value("status"), Some("503"));
        assert_eq!(err.message(), "unavailable");
    }
}
