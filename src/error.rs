//! Error types for the ledger core.
//!
//! The core exposes a typed taxonomy so that callers (the CLI today, any other
//! interface layer tomorrow) can match on the failure class: validation
//! failures abort an operation before anything mutates, `NotFound` covers
//! references to absent entry ids, and `FormatError` covers import documents
//! that cannot be decoded. Filesystem and configuration failures at the CLI
//! layer use `anyhow` instead.

use crate::model::EntryId;
use thiserror::Error;

/// `Result` alias for fallible ledger-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The failure classes of the ledger core.
#[derive(Debug, Error)]
pub enum Error {
    /// User input was rejected before any state changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An operation referenced an entry id that is not in the ledger.
    #[error("no entry with id {id}")]
    NotFound { id: EntryId },

    /// An import document could not be decoded. The whole import is aborted.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A persistence backend call failed. Mirroring is best-effort, so this
    /// is reported but never rolls back an in-memory mutation.
    #[error("persistence backend error: {0}")]
    Backend(String),
}

/// Rejected user input, naming the field that failed.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("Product must not be empty")]
    EmptyProduct,

    #[error("'{0}' is not a valid Product: it cannot contain line breaks or the \"', '\" delimiter")]
    InvalidProduct(String),

    #[error("'{0}' is not a valid Cost")]
    InvalidCost(String),

    #[error("Cost must not be negative, got '{0}'")]
    NegativeCost(String),
}

/// An import document that does not match the expected shape.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FormatError {
    /// The first line of the document was not the expected header marker.
    #[error("this file cannot be imported: expected header '{expected}', found '{found}'")]
    BadHeader { expected: String, found: String },

    /// A record line did not decode. `line` is 1-based within the document.
    #[error("malformed record on line {line}: {reason}")]
    BadRecord { line: usize, reason: String },

    /// A restored id collided with a live entry or another record.
    #[error("duplicate entry id {id} on line {line}")]
    DuplicateId { line: usize, id: EntryId },

    /// The document held no records at all.
    #[error("this file contains no data to import")]
    Empty,
}
