//! # promptcraft-error
//!
//! One error type for every promptcraft crate, in the OpenDAL style.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., AuthenticationFailed, Timeout)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use promptcraft_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ApiFailed, "server returned 500")
//!         .with_operation("videos::retrieve")
//!         .with_context("video_id", "video_123")
//!         .with_context("status", "500"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, promptcraft_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using promptcraft Error
pub type Result<T> = std::result::Result<T, Error>;
