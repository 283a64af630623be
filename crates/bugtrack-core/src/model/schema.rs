//! Conformance of sanitized drafts to the typed bug schema.
//!
//! The validator deliberately lets unknown fields through. This layer is the
//! strict edge in front of the store: it reads only the known fields, casts
//! them, and enforces the length/enum/count constraints of [`BugRecord`].
//! Anything it rejects is a store-level constraint violation, not a
//! validation error.

use super::bug::{
    ASSIGNEE_MAX_LEN, BugRecord, DESCRIPTION_MAX_LEN, MAX_TAGS, Priority, REPORTER_MAX_LEN,
    Status, TITLE_MAX_LEN, TITLE_MIN_LEN,
};
use super::date::date_from_value;
use crate::validate::{is_truthy, sanitize_tags};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// A document that does not fit the bug schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    pub path: &'static str,
    pub message: String,
}

impl SchemaViolation {
    fn new(path: &'static str, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Typed set of field changes. `None` means "leave untouched".
///
/// `assignee` and `due_date` are doubly optional: `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub reporter: Option<String>,
    pub assignee: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl BugPatch {
    /// Read the known fields of a sanitized document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] when a known field cannot be cast to its
    /// schema type.
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, SchemaViolation> {
        let mut patch = Self::default();

        if let Some(value) = doc.get("title") {
            patch.title = Some(
                cast_string("title", value)?
                    .ok_or_else(|| SchemaViolation::new("title", "Title is required"))?,
            );
        }

        if let Some(value) = doc.get("description") {
            patch.description = Some(cast_string("description", value)?.unwrap_or_default());
        }

        if let Some(value) = doc.get("priority").filter(|value| is_truthy(value)) {
            patch.priority = Some(cast_enum("priority", value, Priority::from_wire)?);
        }

        if let Some(value) = doc.get("status").filter(|value| is_truthy(value)) {
            patch.status = Some(cast_enum("status", value, Status::from_wire)?);
        }

        if let Some(value) = doc.get("reporter") {
            patch.reporter = Some(
                cast_string("reporter", value)?
                    .ok_or_else(|| SchemaViolation::new("reporter", "Reporter is required"))?,
            );
        }

        if let Some(value) = doc.get("assignee") {
            patch.assignee = Some(cast_string("assignee", value)?);
        }

        // Anything but an array leaves tags as they are.
        patch.tags = doc.get("tags").and_then(sanitize_tags);

        if let Some(value) = doc.get("dueDate") {
            patch.due_date = Some(cast_due_date(value)?);
        }

        Ok(patch)
    }

    /// Merge this patch onto `record` and re-check the merged result.
    ///
    /// `record` is left untouched when the merged result is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] if the merged record breaks a constraint.
    pub fn apply_to(&self, record: &mut BugRecord) -> Result<(), SchemaViolation> {
        let mut merged = record.clone();
        if let Some(title) = &self.title {
            merged.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            merged.description.clone_from(description);
        }
        if let Some(priority) = self.priority {
            merged.priority = priority;
        }
        if let Some(status) = self.status {
            merged.status = status;
        }
        if let Some(reporter) = &self.reporter {
            merged.reporter.clone_from(reporter);
        }
        if let Some(assignee) = &self.assignee {
            merged.assignee.clone_from(assignee);
        }
        if let Some(tags) = &self.tags {
            merged.tags.clone_from(tags);
        }
        if let Some(due_date) = self.due_date {
            merged.due_date = due_date;
        }

        check_fields(&FieldsRef {
            title: &merged.title,
            description: &merged.description,
            reporter: &merged.reporter,
            assignee: merged.assignee.as_deref(),
            tags: &merged.tags,
            due_date: merged.due_date,
        })?;

        *record = merged;
        Ok(())
    }
}

/// A fully-specified bug ready to insert. Defaults are already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBug {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub reporter: String,
    pub assignee: Option<String>,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewBug {
    /// Build an insertable bug from a sanitized document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] for cast failures, missing required
    /// fields, or constraint violations.
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, SchemaViolation> {
        Self::from_patch(BugPatch::from_document(doc)?)
    }

    /// Apply schema defaults to a patch and check constraints.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] if `title` or `reporter` is missing or
    /// a constraint fails.
    pub fn from_patch(patch: BugPatch) -> Result<Self, SchemaViolation> {
        let bug = Self {
            title: patch
                .title
                .ok_or_else(|| SchemaViolation::new("title", "Title is required"))?,
            description: patch.description.unwrap_or_default(),
            priority: patch.priority.unwrap_or_default(),
            status: patch.status.unwrap_or_default(),
            reporter: patch
                .reporter
                .ok_or_else(|| SchemaViolation::new("reporter", "Reporter is required"))?,
            assignee: patch.assignee.flatten(),
            tags: patch.tags.unwrap_or_default(),
            due_date: patch.due_date.flatten(),
        };
        bug.check()?;
        Ok(bug)
    }

    /// Check the schema constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> Result<(), SchemaViolation> {
        check_fields(&FieldsRef {
            title: &self.title,
            description: &self.description,
            reporter: &self.reporter,
            assignee: self.assignee.as_deref(),
            tags: &self.tags,
            due_date: self.due_date,
        })
    }
}

struct FieldsRef<'a> {
    title: &'a str,
    description: &'a str,
    reporter: &'a str,
    assignee: Option<&'a str>,
    tags: &'a [String],
    due_date: Option<DateTime<Utc>>,
}

fn check_fields(fields: &FieldsRef<'_>) -> Result<(), SchemaViolation> {
    let title_len = fields.title.chars().count();
    if title_len < TITLE_MIN_LEN {
        return Err(SchemaViolation::new(
            "title",
            format!("must be at least {TITLE_MIN_LEN} characters"),
        ));
    }
    if title_len > TITLE_MAX_LEN {
        return Err(SchemaViolation::new(
            "title",
            format!("must be at most {TITLE_MAX_LEN} characters"),
        ));
    }
    if fields.description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(SchemaViolation::new(
            "description",
            format!("must be at most {DESCRIPTION_MAX_LEN} characters"),
        ));
    }
    if fields.reporter.is_empty() {
        return Err(SchemaViolation::new("reporter", "Reporter is required"));
    }
    if fields.reporter.chars().count() > REPORTER_MAX_LEN {
        return Err(SchemaViolation::new(
            "reporter",
            format!("must be at most {REPORTER_MAX_LEN} characters"),
        ));
    }
    if fields
        .assignee
        .is_some_and(|assignee| assignee.chars().count() > ASSIGNEE_MAX_LEN)
    {
        return Err(SchemaViolation::new(
            "assignee",
            format!("must be at most {ASSIGNEE_MAX_LEN} characters"),
        ));
    }
    if fields.tags.len() > MAX_TAGS {
        return Err(SchemaViolation::new("tags", "Up to five tags are allowed"));
    }
    if fields.due_date.is_some_and(|due| due.timestamp_millis() <= 0) {
        return Err(SchemaViolation::new("dueDate", "Due date must be a valid date"));
    }
    Ok(())
}

/// Cast to a trimmed string. `null` casts to `None`; numbers and booleans are
/// rendered as text; arrays and objects are rejected.
fn cast_string(path: &'static str, value: &Value) -> Result<Option<String>, SchemaViolation> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.trim().to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => Err(SchemaViolation::new(
            path,
            format!("Cast to string failed for value {value}"),
        )),
    }
}

fn cast_enum<T>(
    path: &'static str,
    value: &Value,
    parse: fn(&str) -> Option<T>,
) -> Result<T, SchemaViolation> {
    value
        .as_str()
        .and_then(parse)
        .ok_or_else(|| SchemaViolation::new(path, format!("{value} is not a valid enum value")))
}

/// Falsy values (`null`, `""`, `0`, `false`) and blank text clear the date.
fn cast_due_date(value: &Value) -> Result<Option<DateTime<Utc>>, SchemaViolation> {
    match value {
        Value::String(text) if text.trim().is_empty() => Ok(None),
        other if !is_truthy(other) => Ok(None),
        other => date_from_value(other).map(Some).ok_or_else(|| {
            SchemaViolation::new("dueDate", format!("Cast to date failed for value {other}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{BugPatch, NewBug};
    use crate::model::bug::{BugRecord, Priority, Status};
    use chrono::Utc;
    use serde_json::{Map, Value, json};

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("test document must be an object, got {other}"),
        }
    }

    fn record() -> BugRecord {
        let now = Utc::now();
        BugRecord {
            id: "bug-1".to_string(),
            title: "Crash on submit".to_string(),
            description: String::new(),
            priority: Priority::High,
            status: Status::Open,
            reporter: "QA Tester".to_string(),
            assignee: Some("Engineer".to_string()),
            tags: vec!["ui".to_string()],
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn new_bug_applies_defaults() {
        let bug = NewBug::from_document(&doc(json!({"title": "Login bug", "reporter": "Sam"})))
            .expect("valid document");
        assert_eq!(bug.status, Status::Open);
        assert_eq!(bug.priority, Priority::Medium);
        assert_eq!(bug.description, "");
        assert!(bug.tags.is_empty());
        assert!(bug.assignee.is_none());
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let patch = BugPatch::from_document(&doc(json!({"severity": "S1", "_id": "forged"})))
            .expect("unknown fields are ignored");
        assert_eq!(patch, BugPatch::default());
    }

    #[test]
    fn over_long_fields_are_constraint_violations() {
        let long_title = "x".repeat(121);
        let err = NewBug::from_document(&doc(json!({"title": long_title, "reporter": "Sam"})))
            .expect_err("title too long");
        assert_eq!(err.path, "title");

        let long_reporter = "r".repeat(61);
        let err = NewBug::from_document(&doc(json!({"title": "Fine", "reporter": long_reporter})))
            .expect_err("reporter too long");
        assert_eq!(err.path, "reporter");

        let long_description = "d".repeat(2001);
        let err = NewBug::from_document(&doc(
            json!({"title": "Fine", "reporter": "Sam", "description": long_description}),
        ))
        .expect_err("description too long");
        assert_eq!(err.path, "description");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let err = NewBug::from_document(&doc(json!({"title": "Fine"}))).expect_err("no reporter");
        assert_eq!(err.path, "reporter");

        let err = BugPatch::from_document(&doc(json!({"title": null}))).expect_err("null title");
        assert_eq!(err.path, "title");
    }

    #[test]
    fn scalars_are_cast_like_a_document_schema() {
        let patch = BugPatch::from_document(&doc(json!({
            "title": 12345,
            "dueDate": "",
            "assignee": null,
        })))
        .expect("castable document");
        assert_eq!(patch.title.as_deref(), Some("12345"));
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.assignee, Some(None));
    }

    #[test]
    fn non_array_tags_are_ignored() {
        for tags in [json!("UI"), json!(""), json!("  Mixed Case "), json!(null), json!(7)] {
            let patch = BugPatch::from_document(&doc(json!({"tags": tags})))
                .expect("scalar tags are not a cast failure");
            assert_eq!(patch.tags, None, "tags {tags} should leave the list untouched");
        }

        let bug = NewBug::from_document(&doc(
            json!({"title": "Scalar tags", "reporter": "Sam", "tags": "UI"}),
        ))
        .expect("valid document");
        assert!(bug.tags.is_empty());
    }

    #[test]
    fn array_tags_are_normalized_again() {
        let patch = BugPatch::from_document(&doc(json!({"tags": [" UI ", "", null, 3, "Api"]})))
            .expect("array tags");
        assert_eq!(patch.tags, Some(vec!["ui".to_string(), "api".to_string()]));
    }

    #[test]
    fn falsy_enums_and_dates_fall_back_to_defaults() {
        let bug = NewBug::from_document(&doc(json!({
            "title": "Null enums",
            "reporter": "Sam",
            "priority": null,
            "status": "",
            "dueDate": 0,
        })))
        .expect("falsy values count as absent");
        assert_eq!(bug.priority, Priority::Medium);
        assert_eq!(bug.status, Status::Open);
        assert_eq!(bug.due_date, None);

        let patch = BugPatch::from_document(&doc(json!({"priority": null, "status": false})))
            .expect("falsy patch");
        assert_eq!(patch.priority, None);
        assert_eq!(patch.status, None);
    }

    #[test]
    fn bad_enum_and_date_casts_fail() {
        assert!(BugPatch::from_document(&doc(json!({"status": "blocked"}))).is_err());
        assert!(BugPatch::from_document(&doc(json!({"priority": 3}))).is_err());
        assert!(BugPatch::from_document(&doc(json!({"dueDate": "soon"}))).is_err());
        assert!(BugPatch::from_document(&doc(json!({"title": ["a"]}))).is_err());
    }

    #[test]
    fn due_date_must_be_after_epoch() {
        let err = NewBug::from_document(&doc(
            json!({"title": "Old", "reporter": "Sam", "dueDate": "1969-12-31"}),
        ))
        .expect_err("pre-epoch due date");
        assert_eq!(err.path, "dueDate");
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut bug = record();
        let patch = BugPatch::from_document(&doc(json!({"status": "in-progress", "assignee": null})))
            .expect("valid patch");
        patch.apply_to(&mut bug).expect("merge succeeds");

        assert_eq!(bug.status, Status::InProgress);
        assert_eq!(bug.assignee, None);
        assert_eq!(bug.title, "Crash on submit");
        assert_eq!(bug.priority, Priority::High);
    }

    #[test]
    fn rejected_merge_leaves_record_untouched() {
        let mut bug = record();
        let before = bug.clone();
        let patch = BugPatch {
            tags: Some((0..6).map(|i| format!("t{i}")).collect()),
            status: Some(Status::Resolved),
            ..BugPatch::default()
        };
        let err = patch.apply_to(&mut bug).expect_err("six tags");
        assert_eq!(err.path, "tags");
        assert_eq!(bug, before);
    }
}
