//! Error types for the course index.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying the index.
#[derive(Debug, Error)]
pub enum Error {
    /// A structural assumption of the tree or its indices did not hold. This is always a bug in
    /// the index, never bad input.
    #[error("internal invariant violated: {0}")]
    InvariantViolated(String),

    /// A subject was queried that no insert ever registered.
    #[error("subject {0:?} is not registered in the subject index")]
    UnknownSubject(String),

    /// The query stream contained an opcode this index doesn't serve.
    #[error("unknown query opcode {0:?}")]
    UnknownOpcode(String),

    /// A query field was missing or couldn't be parsed.
    #[error("malformed {field}: {token:?}")]
    Malformed {
        /// Name of the field being read.
        field: &'static str,
        /// The offending token (empty if the input ended).
        token: String,
    },

    /// The input ended before the announced number of queries was read.
    #[error("input ended after {processed} of {expected} queries")]
    Truncated {
        /// Number of queries announced by the header line.
        expected: usize,
        /// Number of queries actually processed.
        processed: usize,
    },

    /// The process-wide logger could not be installed.
    #[error("logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),

    /// I/O failure reading queries or writing responses.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvariantViolated`].
    pub(crate) fn invariant(what: impl Into<String>) -> Self {
        Self::InvariantViolated(what.into())
    }

    /// Whether this error reports a logic defect in the index rather than a problem with the
    /// input. These are reported per query and the batch carries on.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolated(_) | Self::UnknownSubject(_))
    }
}
