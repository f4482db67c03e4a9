//! The promptcraft Error type

use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// Error returned by every promptcraft operation.
///
/// Carries the [`ErrorKind`], a message, the operation that failed (earlier
/// operations are kept in the context as `called`), key/value context such as
/// the HTTP status or job id, and the underlying error when there is one.
///
/// ```rust
/// use promptcraft_error::{Error, ErrorKind, ErrorStatus};
///
/// let err = Error::new(ErrorKind::RateLimited, "too many requests")
///     .with_operation("responses::create")
///     .with_context("status", "429");
///
/// assert_eq!(err.status(), ErrorStatus::Temporary);
/// assert_eq!(err.context_value("status"), Some("429"));
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Derived from the kind: only rate limits and network failures are temporary.
    pub fn status(&self) -> ErrorStatus {
        if self.kind.is_retryable() {
            ErrorStatus::Temporary
        } else {
            ErrorStatus::Permanent
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.status().is_retryable()
    }

    /// Innermost-last name of the failing operation, `""` when unset
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// First context value stored under `key`
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    /// Name the failing operation. A previously set operation moves into the
    /// context under `called`.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Attach the underlying error. Set at most once.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }
}

/// `Kind (status) at op, context { k: v } => message`
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.status())?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }

        if let Some(((first_key, first_value), rest)) = self.context.split_first() {
            write!(f, ", context {{ {}: {}", first_key, first_value)?;
            for (key, value) in rest {
                write!(f, ", {}: {}", key, value)?;
            }
            f.write_str(" }")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.status())?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }
        if !self.message.is_empty() {
            write!(f, "\n  message: {}", self.message)?;
        }
        for (key, value) in &self.context {
            write!(f, "\n  {}: {}", key, value)?;
        }
        if let Some(source) = &self.source {
            write!(f, "\n  source: {:?}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// The only implicit conversion; remote errors go through the constructors below.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

impl Error {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// No usable API key in the file at `path`
    pub fn credentials_missing(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(ErrorKind::CredentialsMissing, format!("no API key in '{}'", path))
            .with_context("path", path)
    }

    /// Non-success HTTP answer; the status goes into the context
    pub fn api_failed(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ApiFailed, message).with_context("status", status.to_string())
    }

    pub fn network_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkFailed, message)
    }

    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }
}
