use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 120;
pub const DESCRIPTION_MAX_LEN: usize = 2000;
pub const REPORTER_MAX_LEN: usize = 60;
pub const ASSIGNEE_MAX_LEN: usize = 60;
pub const MAX_TAGS: usize = 5;

/// Where a bug sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Resolved];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }

    /// Exact match against the wire value. Unlike [`FromStr`], no trimming
    /// or case folding is applied.
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Exact match against the wire value.
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == raw)
    }
}

/// A persisted bug, as returned by the store and served over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub reporter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in-progress" | "doing" => Ok(Self::InProgress),
            "resolved" | "done" => Ok(Self::Resolved),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

/// Comma-joined list of wire values, used in validation messages.
#[must_use]
pub fn wire_values<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{BugRecord, Priority, Status, wire_values};
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    #[test]
    fn enum_json_uses_wire_values() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).expect("serialize"),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&Priority::High).expect("serialize"),
            "\"high\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"resolved\"").expect("deserialize"),
            Status::Resolved
        );
    }

    #[test]
    fn from_wire_is_exact() {
        assert_eq!(Status::from_wire("in-progress"), Some(Status::InProgress));
        assert_eq!(Status::from_wire("In-Progress"), None);
        assert_eq!(Status::from_wire(" open"), None);
        assert_eq!(Priority::from_wire("low"), Some(Priority::Low));
        assert_eq!(Priority::from_wire("urgent"), None);
    }

    #[test]
    fn from_str_is_lenient_for_cli_input() {
        assert_eq!(Status::from_str("In Progress"), Ok(Status::InProgress));
        assert_eq!(Status::from_str("in_progress"), Ok(Status::InProgress));
        assert_eq!(Status::from_str("done"), Ok(Status::Resolved));
        assert_eq!(Priority::from_str(" HIGH "), Ok(Priority::High));
        assert!(Status::from_str("blocked").is_err());
        assert!(Priority::from_str("urgent").is_err());
    }

    #[test]
    fn defaults_match_new_bug_defaults() {
        assert_eq!(Status::default(), Status::Open);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn wire_values_lists_enum_domain() {
        assert_eq!(wire_values(&Status::ALL), "open, in-progress, resolved");
        assert_eq!(wire_values(&Priority::ALL), "low, medium, high");
    }

    #[test]
    fn record_serializes_camel_case_and_omits_absent_optionals() {
        let at = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let record = BugRecord {
            id: "abc".to_string(),
            title: "Crash on submit".to_string(),
            description: String::new(),
            priority: Priority::High,
            status: Status::Open,
            reporter: "QA Tester".to_string(),
            assignee: None,
            tags: vec!["ui".to_string()],
            due_date: None,
            created_at: at,
            updated_at: at,
        };

        let json = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(json["createdAt"], "2024-03-01T12:00:00Z");
        assert_eq!(json["status"], "open");
        assert!(json.get("assignee").is_none());
        assert!(json.get("dueDate").is_none());

        let back: BugRecord = serde_json::from_value(json).expect("deserialize record");
        assert_eq!(back, record);
    }
}
