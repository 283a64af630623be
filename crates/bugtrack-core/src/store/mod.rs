//! The document store seam.
//!
//! The gateway only ever talks to a [`DocumentStore`]. The shipped
//! implementation is [`sqlite::SqliteStore`]; the trait keeps the gateway
//! testable against failing or instrumented stores.

pub mod sqlite;

use crate::error::ErrorCode;
use crate::model::bug::BugRecord;
use crate::model::schema::{BugPatch, NewBug, SchemaViolation};
use thiserror::Error;

pub use sqlite::SqliteStore;

/// Store-level failures. All of them surface as server errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Bug validation failed: {0}")]
    Schema(#[from] SchemaViolation),

    #[error("document store is closed")]
    Closed,

    #[error("document store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("could not open document store: {0}")]
    Open(String),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Schema(_) => ErrorCode::SchemaViolation,
            Self::Closed => ErrorCode::StoreClosed,
            Self::Sqlite(_) | Self::Corrupt { .. } => ErrorCode::StoreFailure,
            Self::Open(_) => ErrorCode::StoreOpenFailed,
        }
    }
}

/// Sort order for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first; ties keep insertion order reversed.
    #[default]
    CreatedDesc,
    /// Oldest first.
    CreatedAsc,
}

impl SortOrder {
    pub(crate) const fn sql_clause(self) -> &'static str {
        match self {
            Self::CreatedDesc => "ORDER BY created_at_us DESC, rowid DESC",
            Self::CreatedAsc => "ORDER BY created_at_us ASC, rowid ASC",
        }
    }
}

/// Operations the gateway needs from a document store.
///
/// Implementations own their connection; callers share one instance for the
/// life of the process and call [`DocumentStore::close`] once at shutdown.
pub trait DocumentStore: Send + Sync {
    /// Persist a new bug, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the insert fails.
    fn create(&self, bug: &NewBug) -> Result<BugRecord, StoreError>;

    /// All bugs in the given order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the query fails.
    fn find_all(&self, sort: SortOrder) -> Result<Vec<BugRecord>, StoreError>;

    /// # Errors
    ///
    /// Returns a [`StoreError`] if the query fails.
    fn find_by_id(&self, id: &str) -> Result<Option<BugRecord>, StoreError>;

    /// Merge `patch` onto the stored bug atomically and return the updated
    /// record, or `None` when `id` does not resolve.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the merged record violates the schema or
    /// the write fails.
    fn find_by_id_and_update(
        &self,
        id: &str,
        patch: &BugPatch,
    ) -> Result<Option<BugRecord>, StoreError>;

    /// Remove a bug and return what was removed, or `None` when `id` does
    /// not resolve.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the delete fails.
    fn find_by_id_and_delete(&self, id: &str) -> Result<Option<BugRecord>, StoreError>;

    /// Cheap liveness probe.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot answer.
    fn ping(&self) -> Result<(), StoreError>;

    /// Release the connection. Later calls fail with [`StoreError::Closed`].
    /// Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying close fails.
    fn close(&self) -> Result<(), StoreError>;
}
