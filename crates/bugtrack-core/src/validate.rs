//! Payload validation and sanitization for bug drafts.
//!
//! [`validate_bug_payload`] runs every rule (errors accumulate, nothing
//! short-circuits) and always returns both the error map and a sanitized copy
//! of the draft. Callers must check [`Validation::is_valid`] before writing
//! `sanitized` anywhere.
//!
//! "Present" follows JSON truthiness for the enum and date rules: `null`,
//! `false`, `0` and `""` count as absent, so defaults apply downstream.

use crate::model::bug::{Priority, Status, TITLE_MIN_LEN, MAX_TAGS, wire_values};
use crate::model::date::date_from_value;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name → human-readable message. Empty means valid.
pub type FieldErrors = BTreeMap<String, String>;

pub const TITLE_MESSAGE: &str = "Title must be at least 3 characters long";
pub const REPORTER_MESSAGE: &str = "Reporter is required";
pub const DUE_DATE_MESSAGE: &str = "Due date must be a valid date string";
pub const TAGS_MESSAGE: &str = "A maximum of five tags is allowed";

/// Which fields are mandatory. Creates use [`ValidateOptions::full`],
/// partial updates use [`ValidateOptions::partial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    pub require_title: bool,
    pub require_reporter: bool,
}

impl ValidateOptions {
    #[must_use]
    pub const fn full() -> Self {
        Self {
            require_title: true,
            require_reporter: true,
        }
    }

    #[must_use]
    pub const fn partial() -> Self {
        Self {
            require_title: false,
            require_reporter: false,
        }
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Outcome of [`validate_bug_payload`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub errors: FieldErrors,
    pub sanitized: Map<String, Value>,
}

impl Validation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The sanitized draft if valid, otherwise the accumulated errors.
    ///
    /// # Errors
    ///
    /// Returns the field error map when at least one rule failed.
    pub fn into_result(self) -> Result<Map<String, Value>, FieldErrors> {
        if self.errors.is_empty() {
            Ok(self.sanitized)
        } else {
            Err(self.errors)
        }
    }
}

/// Normalize a tag list: keep string entries, trim, lower-case, drop blanks.
///
/// Repeats are preserved. Returns `None` when `tags` is not an array.
#[must_use]
pub fn sanitize_tags(tags: &Value) -> Option<Vec<String>> {
    let Value::Array(items) = tags else {
        return None;
    };

    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect(),
    )
}

/// Validate and sanitize a bug draft.
#[must_use]
pub fn validate_bug_payload(draft: &Map<String, Value>, options: ValidateOptions) -> Validation {
    let mut errors = FieldErrors::new();

    match draft.get("title") {
        Some(Value::String(title)) => {
            if title.trim().chars().count() < TITLE_MIN_LEN {
                errors.insert("title".to_string(), TITLE_MESSAGE.to_string());
            }
        }
        _ if options.require_title => {
            errors.insert("title".to_string(), TITLE_MESSAGE.to_string());
        }
        _ => {}
    }

    match draft.get("reporter") {
        Some(Value::String(reporter)) => {
            if reporter.trim().is_empty() {
                errors.insert("reporter".to_string(), REPORTER_MESSAGE.to_string());
            }
        }
        _ if options.require_reporter => {
            errors.insert("reporter".to_string(), REPORTER_MESSAGE.to_string());
        }
        _ => {}
    }

    if let Some(priority) = present(draft, "priority") {
        if priority.as_str().and_then(Priority::from_wire).is_none() {
            errors.insert(
                "priority".to_string(),
                format!("Priority must be one of: {}", wire_values(&Priority::ALL)),
            );
        }
    }

    if let Some(status) = present(draft, "status") {
        if status.as_str().and_then(Status::from_wire).is_none() {
            errors.insert(
                "status".to_string(),
                format!("Status must be one of: {}", wire_values(&Status::ALL)),
            );
        }
    }

    if let Some(due) = present(draft, "dueDate") {
        if date_from_value(due).is_none() {
            errors.insert("dueDate".to_string(), DUE_DATE_MESSAGE.to_string());
        }
    }

    let tags = draft.get("tags").and_then(sanitize_tags);
    if tags.as_ref().is_some_and(|tags| tags.len() > MAX_TAGS) {
        errors.insert("tags".to_string(), TAGS_MESSAGE.to_string());
    }

    let mut sanitized = draft.clone();
    for field in ["title", "reporter", "description", "assignee"] {
        if let Some(Value::String(text)) = draft.get(field) {
            sanitized.insert(field.to_string(), Value::String(text.trim().to_string()));
        }
    }
    if let Some(tags) = tags {
        sanitized.insert(
            "tags".to_string(),
            Value::Array(tags.into_iter().map(Value::String).collect()),
        );
    }

    Validation { errors, sanitized }
}

fn present<'a>(draft: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    draft.get(field).filter(|value| is_truthy(value))
}

/// JSON truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
#[must_use]
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
