//! Client-side form handling for new bugs.
//!
//! The form mirrors what a person types: free text fields and a
//! comma-separated tag list. [`BugForm::validate`] runs the same rules the
//! server does, so a bad form never leaves the machine.

use bugtrack_core::{FieldErrors, Priority, Status, ValidateOptions, validate_bug_payload};
use serde_json::{Map, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugForm {
    pub title: String,
    pub description: String,
    pub reporter: String,
    pub assignee: String,
    pub priority: String,
    pub status: String,
    /// Comma-separated, e.g. `"ui, regression"`.
    pub tags: String,
    /// Any date the server accepts, e.g. `2024-05-01`.
    pub due_date: String,
}

impl BugForm {
    /// Wire draft for `POST /api/bugs`.
    ///
    /// Empty optional fields are left out so server defaults apply. Enum
    /// values are normalized when they parse (`"In Progress"` becomes
    /// `"in-progress"`) and sent verbatim otherwise.
    #[must_use]
    pub fn to_draft(&self) -> Map<String, Value> {
        let mut draft = Map::new();
        draft.insert("title".to_string(), Value::String(self.title.clone()));
        draft.insert("reporter".to_string(), Value::String(self.reporter.clone()));

        if !self.description.trim().is_empty() {
            draft.insert(
                "description".to_string(),
                Value::String(self.description.clone()),
            );
        }
        if !self.assignee.trim().is_empty() {
            draft.insert("assignee".to_string(), Value::String(self.assignee.clone()));
        }
        if let Some(priority) = normalize::<Priority>(&self.priority) {
            draft.insert("priority".to_string(), Value::String(priority));
        }
        if let Some(status) = normalize::<Status>(&self.status) {
            draft.insert("status".to_string(), Value::String(status));
        }

        let due_date = self.due_date.trim();
        if !due_date.is_empty() {
            draft.insert("dueDate".to_string(), Value::String(due_date.to_string()));
        }

        let tags = split_tags(&self.tags);
        if !tags.is_empty() {
            draft.insert(
                "tags".to_string(),
                Value::Array(tags.into_iter().map(Value::String).collect()),
            );
        }
        draft
    }

    /// Field errors for this form. Empty means it can be submitted.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        validate_bug_payload(&self.to_draft(), ValidateOptions::full()).errors
    }
}

/// Split a comma-separated tag list, dropping blank entries.
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize<T>(raw: &str) -> Option<String>
where
    T: FromStr + std::fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(T::from_str(raw).map_or_else(|_| raw.to_string(), |value| value.to_string()))
}
