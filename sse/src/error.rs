//! Error types for the `sse` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding
//! an `ErrorKind` and an optional source. Fan-out never produces errors; only
//! structural operations (subscribe) can fail.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Kinds of errors the hub can report to a subscribing transport.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The hub has been closed; new listeners could never be drained.
    Closed,
    /// A listener with the same id is already registered in the same bucket.
    DuplicateListener { bucket: String, listener_id: String },
    /// Group listeners need a non-empty key; an empty one can never be published to.
    EmptyGroupKey,
}

impl Error {
    pub(crate) fn closed() -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::Closed,
        }
    }

    pub(crate) fn empty_group_key() -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::EmptyGroupKey,
        }
    }

    pub(crate) fn duplicate_listener(bucket: &str, listener_id: &str) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::DuplicateListener {
                bucket: bucket.to_string(),
                listener_id: listener_id.to_string(),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Closed => write!(f, "SSE hub is closed"),
            ErrorKind::DuplicateListener {
                bucket,
                listener_id,
            } => write!(
                f,
                "listener {listener_id} is already registered for {bucket}"
            ),
            ErrorKind::EmptyGroupKey => write!(f, "group key must not be empty"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
