//! SQLite schema for the bug document store.
//!
//! - `bugs` holds one row per document; enum domains, length limits and the
//!   tag count are mirrored as CHECK constraints so a bypassed schema layer
//!   still cannot persist an invalid record
//! - `tags_json` keeps the tag list as a JSON array (order and repeats kept)
//! - `store_meta` tracks the schema version alongside `PRAGMA user_version`

/// Migration v1: documents table plus store metadata.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS bugs (
    bug_id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(title) BETWEEN 3 AND 120),
    description TEXT NOT NULL DEFAULT '' CHECK (length(description) <= 2000),
    priority TEXT NOT NULL DEFAULT 'medium' CHECK (priority IN ('low', 'medium', 'high')),
    status TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'in-progress', 'resolved')),
    reporter TEXT NOT NULL CHECK (length(reporter) BETWEEN 1 AND 60),
    assignee TEXT CHECK (assignee IS NULL OR length(assignee) <= 60),
    tags_json TEXT NOT NULL DEFAULT '[]'
        CHECK (json_valid(tags_json) AND json_array_length(tags_json) <= 5),
    due_at_us INTEGER,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
"#;

/// Migration v2: read-path indexes for listing and filtering.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_bugs_status_priority
    ON bugs(status, priority);

CREATE INDEX IF NOT EXISTS idx_bugs_created
    ON bugs(created_at_us DESC);

UPDATE store_meta
SET schema_version = 2
WHERE id = 1;
"#;

/// Indexes expected by the list/filter query paths.
pub const REQUIRED_INDEXES: &[&str] = &["idx_bugs_status_priority", "idx_bugs_created"];
