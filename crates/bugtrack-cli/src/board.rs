//! Client-side data layer: API calls behind a one-entry list cache.

use crate::cache::ListCache;
use crate::client::{BugApi, ClientError};
use crate::form::BugForm;
use bugtrack_core::{BugRecord, Status};
use serde_json::{Map, Value};
use tracing::debug;

pub struct BugBoard<A> {
    api: A,
    cache: ListCache<BugRecord>,
}

impl<A: BugApi> BugBoard<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self::with_cache(api, ListCache::default())
    }

    #[must_use]
    pub const fn with_cache(api: A, cache: ListCache<BugRecord>) -> Self {
        Self { api, cache }
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The bug list, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when a fetch is needed and fails.
    pub fn bugs(&mut self) -> Result<&[BugRecord], ClientError> {
        if self.cache.get().is_none() {
            debug!(key = self.cache.key(), "list cache miss");
            let bugs = self.api.fetch_bugs()?;
            self.cache.put(bugs);
        }
        Ok(self.cache.get().unwrap_or_default())
    }

    /// Validate the form locally, then create.
    ///
    /// # Errors
    ///
    /// [`ClientError::Invalid`] when the form fails validation, otherwise
    /// whatever the API returns.
    pub fn create(&mut self, form: &BugForm) -> Result<BugRecord, ClientError> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(ClientError::Invalid(errors));
        }

        let created = self.api.create_bug(&form.to_draft())?;
        self.cache.invalidate();
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] when the update fails.
    pub fn set_status(&mut self, id: &str, status: Status) -> Result<BugRecord, ClientError> {
        let mut patch = Map::new();
        patch.insert("status".to_string(), Value::String(status.to_string()));

        let updated = self.api.update_bug(id, &patch)?;
        self.cache.invalidate();
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] when the delete fails.
    pub fn delete(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_bug(id)?;
        self.cache.invalidate();
        Ok(())
    }
}
