//! Error types for the indexing engine.
//!
//! Everything below session scope is caught and logged at its origin; only
//! session-level failures (open/write/commit) surface to the caller of a
//! rebuild.

use thiserror::Error;

/// Indexing engine errors.
#[derive(Error, Debug)]
pub enum IndexError {
    /// A queryable path expression could not be parsed.
    #[error("invalid queryable path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// I/O or structural failure while resolving values for one record.
    ///
    /// Scoped to the single record being processed; the corpus indexer logs
    /// it and continues the batch.
    #[error("value resolution failed for record `{record_id}`: {cause}")]
    ValueResolution { record_id: String, cause: String },

    /// Failure fetching a record from the corpus.
    ///
    /// Recoverable at document granularity, like [`IndexError::ValueResolution`].
    #[error("fetch failed for record `{record_id}`: {cause}")]
    Fetch { record_id: String, cause: String },

    /// Failure listing record identifiers from the corpus.
    #[error("corpus listing failed: {0}")]
    Listing(String),

    /// The destination index session could not be opened.
    #[error("index session open failed: {0}")]
    SessionOpen(String),

    /// The destination index session rejected a document write.
    #[error("index session write failed: {0}")]
    SessionWrite(String),

    /// The destination index session failed to commit.
    #[error("index session commit failed: {0}")]
    SessionCommit(String),

    /// The destination index session failed to close.
    #[error("index session close failed: {0}")]
    SessionClose(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IndexError {
    /// True for errors that are recoverable at document granularity.
    ///
    /// The corpus indexer skips the offending record and continues; anything
    /// else aborts the whole rebuild.
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            IndexError::ValueResolution { .. } | IndexError::Fetch { .. }
        )
    }
}

/// Result type for indexing operations.
pub type Result<T> = std::result::Result<T, IndexError>;
