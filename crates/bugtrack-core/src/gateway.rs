//! Record store gateway.
//!
//! Turns raw drafts into store operations: validate, conform to the schema,
//! then call the [`DocumentStore`] the gateway was constructed with. Every
//! failure comes back as a [`GatewayError`] that knows its HTTP status.

use crate::error::ErrorCode;
use crate::model::bug::BugRecord;
use crate::model::schema::{BugPatch, NewBug};
use crate::store::{DocumentStore, SortOrder, StoreError};
use crate::validate::{FieldErrors, ValidateOptions, validate_bug_payload};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Bug with id {0} not found")]
    NotFound(String),

    #[error("Bug id is required")]
    MissingId,

    #[error("{0}")]
    BadRequest(String),

    #[error("Forced failure for debugging practice")]
    ForcedFailure,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A failure outside the store, such as a crashed worker task.
    #[error("Internal Server Error")]
    Internal(String),
}

impl GatewayError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound(_) => ErrorCode::BugNotFound,
            Self::MissingId => ErrorCode::MissingId,
            Self::BadRequest(_) => ErrorCode::MalformedRequest,
            Self::ForcedFailure => ErrorCode::ForcedFailure,
            Self::Store(err) => err.code(),
            Self::Internal(_) => ErrorCode::InternalUnexpected,
        }
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.code().http_status()
    }

    /// Per-field messages, present only for validation failures.
    #[must_use]
    pub const fn details(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message safe to send to a client.
    ///
    /// Schema violations keep their field detail. Raw database errors are
    /// replaced by the generic code message; the full text goes to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(StoreError::Sqlite(_) | StoreError::Corrupt { .. }) => {
                self.code().message().to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Runtime switches for the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayOptions {
    /// Fail every valid create with [`GatewayError::ForcedFailure`].
    pub force_create_failure: bool,
}

/// Owns the store handle for the life of the process.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn DocumentStore>,
    options: GatewayOptions,
}

impl Gateway {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_options(store, GatewayOptions::default())
    }

    #[must_use]
    pub fn with_options(store: Arc<dyn DocumentStore>, options: GatewayOptions) -> Self {
        Self { store, options }
    }

    #[must_use]
    pub const fn options(&self) -> GatewayOptions {
        self.options
    }

    /// Validate a full draft and persist it.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Validation`] when a rule fails,
    /// [`GatewayError::ForcedFailure`] when forced failures are enabled, and
    /// [`GatewayError::Store`] for schema or storage failures.
    pub fn create(&self, draft: &Map<String, Value>) -> Result<BugRecord, GatewayError> {
        let sanitized = validate_bug_payload(draft, ValidateOptions::full())
            .into_result()
            .map_err(GatewayError::Validation)?;

        if self.options.force_create_failure {
            warn!("create rejected: forced failure is enabled");
            return Err(GatewayError::ForcedFailure);
        }

        let bug = NewBug::from_document(&sanitized).map_err(StoreError::from)?;
        let record = self.store.create(&bug)?;
        debug!(id = %record.id, "created bug");
        Ok(record)
    }

    /// Every bug, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if the store query fails.
    pub fn list(&self) -> Result<Vec<BugRecord>, GatewayError> {
        Ok(self.store.find_all(SortOrder::CreatedDesc)?)
    }

    /// Validate a partial draft and merge it onto the bug with `id`.
    ///
    /// Checks run in order: id present, payload valid, id resolves.
    ///
    /// # Errors
    ///
    /// [`GatewayError::MissingId`], [`GatewayError::Validation`],
    /// [`GatewayError::NotFound`], or [`GatewayError::Store`].
    pub fn update(&self, id: &str, draft: &Map<String, Value>) -> Result<BugRecord, GatewayError> {
        let id = require_id(id)?;

        let sanitized = validate_bug_payload(draft, ValidateOptions::partial())
            .into_result()
            .map_err(GatewayError::Validation)?;
        let patch = BugPatch::from_document(&sanitized).map_err(StoreError::from)?;

        let record = self
            .store
            .find_by_id_and_update(id, &patch)?
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        debug!(id, "updated bug");
        Ok(record)
    }

    /// Remove the bug with `id` and return it.
    ///
    /// # Errors
    ///
    /// [`GatewayError::MissingId`], [`GatewayError::NotFound`], or
    /// [`GatewayError::Store`].
    pub fn delete(&self, id: &str) -> Result<BugRecord, GatewayError> {
        let id = require_id(id)?;
        let record = self
            .store
            .find_by_id_and_delete(id)?
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        debug!(id, "deleted bug");
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] when the store does not answer.
    pub fn ping(&self) -> Result<(), GatewayError> {
        Ok(self.store.ping()?)
    }

    /// Close the underlying store. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if closing fails.
    pub fn close(&self) -> Result<(), GatewayError> {
        Ok(self.store.close()?)
    }
}

fn require_id(id: &str) -> Result<&str, GatewayError> {
    let id = id.trim();
    if id.is_empty() {
        Err(GatewayError::MissingId)
    } else {
        Ok(id)
    }
}
