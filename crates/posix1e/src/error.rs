//! crates/posix1e/src/error.rs
//!
//! Error types for ACL operations.

use std::io;

use thiserror::Error;

/// Result type for ACL operations.
pub type AclResult<T> = Result<T, AclError>;

/// Errors that can occur while manipulating an ACL.
///
/// The three variants separate "your input was malformed" from "the backend
/// refused this operation" from "this view no longer has a live record":
///
/// - [`AclError::InvalidArgument`] covers preconditions checkable without
///   touching the backend (multiple construction sources, an entry passed to
///   the wrong ACL, a default-ACL apply aimed at a file descriptor).
/// - [`AclError::Backend`] wraps the failing primitive together with the
///   operation that triggered it. The OS error code, when one exists, is
///   available through [`AclError::os_error`].
/// - [`AclError::Uninitialized`] is returned by accessors on an [`Entry`] or
///   [`Permset`] whose backing record has been deleted or replaced.
///
/// [`Entry`]: crate::Entry
/// [`Permset`]: crate::Permset
#[derive(Debug, Error)]
pub enum AclError {
    /// A caller-supplied argument violated a precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An ACL backend primitive failed.
    #[error("failed to {op}: {source}")]
    Backend {
        /// The operation being performed when the failure occurred.
        op: &'static str,
        /// The underlying error reported by the backend.
        #[source]
        source: io::Error,
    },

    /// The entry or permission set is not backed by a live ACL record.
    #[error("entry is not backed by a live ACL record")]
    Uninitialized,
}

impl AclError {
    /// Wraps a backend failure with the operation that triggered it.
    pub(crate) fn backend(op: &'static str, source: io::Error) -> Self {
        Self::Backend { op, source }
    }

    /// Returns the originating OS error code, if this is a backend failure
    /// that carries one.
    #[must_use]
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Self::Backend { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
