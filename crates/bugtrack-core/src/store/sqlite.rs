//! `SQLite`-backed [`DocumentStore`].
//!
//! One connection, guarded by a mutex, opened once at startup and closed
//! explicitly at shutdown. Each update runs read-merge-check-write inside a
//! single transaction, which is the per-document atomicity the gateway relies
//! on.

use super::{DocumentStore, SortOrder, StoreError};
use crate::db;
use crate::model::bug::{BugRecord, Priority, Status};
use crate::model::schema::{BugPatch, NewBug};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT bug_id, title, description, priority, status, reporter, \
     assignee, tags_json, due_at_us, created_at_us, updated_at_us FROM bugs";

pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Open the database behind `url` and migrate it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if the url is malformed or the database
    /// cannot be opened or migrated.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let conn = db::open_store_db(url).map_err(|err| StoreError::Open(format!("{err:#}")))?;
        info!(url, "document store opened");
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-migrated connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.lock();
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        f(conn)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for SqliteStore {
    fn create(&self, bug: &NewBug) -> Result<BugRecord, StoreError> {
        bug.check()?;

        let now = now_truncated();
        let record = BugRecord {
            id: Uuid::new_v4().simple().to_string(),
            title: bug.title.clone(),
            description: bug.description.clone(),
            priority: bug.priority,
            status: bug.status,
            reporter: bug.reporter.clone(),
            assignee: bug.assignee.clone(),
            tags: bug.tags.clone(),
            due_date: bug.due_date,
            created_at: now,
            updated_at: now,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO bugs (bug_id, title, description, priority, status, reporter, \
                 assignee, tags_json, due_at_us, created_at_us, updated_at_us) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.id,
                    record.title,
                    record.description,
                    record.priority.as_str(),
                    record.status.as_str(),
                    record.reporter,
                    record.assignee,
                    tags_to_json(&record.tags)?,
                    record.due_date.map(|due| due.timestamp_micros()),
                    record.created_at.timestamp_micros(),
                    record.updated_at.timestamp_micros(),
                ],
            )?;
            Ok(())
        })?;

        debug!(id = %record.id, "bug created");
        Ok(record)
    }

    fn find_all(&self, sort: SortOrder) -> Result<Vec<BugRecord>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("{SELECT_COLUMNS} {}", sort.sql_clause());
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], read_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(RawBug::into_record).collect()
        })
    }

    fn find_by_id(&self, id: &str) -> Result<Option<BugRecord>, StoreError> {
        self.with_conn(|conn| select_one(conn, id))
    }

    fn find_by_id_and_update(
        &self,
        id: &str,
        patch: &BugPatch,
    ) -> Result<Option<BugRecord>, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(mut record) = select_one(&tx, id)? else {
                return Ok(None);
            };

            patch.apply_to(&mut record)?;
            record.updated_at = now_truncated().max(record.updated_at);

            tx.execute(
                "UPDATE bugs SET title = ?2, description = ?3, priority = ?4, status = ?5, \
                 reporter = ?6, assignee = ?7, tags_json = ?8, due_at_us = ?9, updated_at_us = ?10 \
                 WHERE bug_id = ?1",
                params![
                    record.id,
                    record.title,
                    record.description,
                    record.priority.as_str(),
                    record.status.as_str(),
                    record.reporter,
                    record.assignee,
                    tags_to_json(&record.tags)?,
                    record.due_date.map(|due| due.timestamp_micros()),
                    record.updated_at.timestamp_micros(),
                ],
            )?;
            tx.commit()?;

            debug!(id, "bug updated");
            Ok(Some(record))
        })
    }

    fn find_by_id_and_delete(&self, id: &str) -> Result<Option<BugRecord>, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(record) = select_one(&tx, id)? else {
                return Ok(None);
            };
            tx.execute("DELETE FROM bugs WHERE bug_id = ?1", params![id])?;
            tx.commit()?;

            debug!(id, "bug deleted");
            Ok(Some(record))
        })
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    fn close(&self) -> Result<(), StoreError> {
        let taken = self.lock().take();
        if let Some(conn) = taken {
            conn.close().map_err(|(_, err)| StoreError::Sqlite(err))?;
            info!("document store closed");
        }
        Ok(())
    }
}

/// Row image before enum/timestamp decoding.
struct RawBug {
    id: String,
    title: String,
    description: String,
    priority: String,
    status: String,
    reporter: String,
    assignee: Option<String>,
    tags_json: String,
    due_at_us: Option<i64>,
    created_at_us: i64,
    updated_at_us: i64,
}

impl RawBug {
    fn into_record(self) -> Result<BugRecord, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: self.id.clone(),
            reason,
        };

        let priority = Priority::from_wire(&self.priority)
            .ok_or_else(|| corrupt(format!("unknown priority '{}'", self.priority)))?;
        let status = Status::from_wire(&self.status)
            .ok_or_else(|| corrupt(format!("unknown status '{}'", self.status)))?;
        let tags: Vec<String> = serde_json::from_str(&self.tags_json)
            .map_err(|err| corrupt(format!("tags are not a string list: {err}")))?;
        let due_date = self
            .due_at_us
            .map(|us| from_micros(us).ok_or_else(|| corrupt(format!("bad due date {us}"))))
            .transpose()?;
        let created_at = from_micros(self.created_at_us)
            .ok_or_else(|| corrupt(format!("bad created_at {}", self.created_at_us)))?;
        let updated_at = from_micros(self.updated_at_us)
            .ok_or_else(|| corrupt(format!("bad updated_at {}", self.updated_at_us)))?;

        Ok(BugRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            priority,
            status,
            reporter: self.reporter,
            assignee: self.assignee,
            tags,
            due_date,
            created_at,
            updated_at,
        })
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawBug> {
    Ok(RawBug {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: row.get(3)?,
        status: row.get(4)?,
        reporter: row.get(5)?,
        assignee: row.get(6)?,
        tags_json: row.get(7)?,
        due_at_us: row.get(8)?,
        created_at_us: row.get(9)?,
        updated_at_us: row.get(10)?,
    })
}

fn select_one(conn: &Connection, id: &str) -> Result<Option<BugRecord>, StoreError> {
    let sql = format!("{SELECT_COLUMNS} WHERE bug_id = ?1");
    conn.query_row(&sql, params![id], read_row)
        .optional()?
        .map(RawBug::into_record)
        .transpose()
}

fn tags_to_json(tags: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(tags).map_err(|err| StoreError::Corrupt {
        id: String::new(),
        reason: format!("tags could not be encoded: {err}"),
    })
}

fn from_micros(us: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_micros(us).single()
}

/// Current time at the microsecond precision the table stores, so a created
/// record compares equal to the same record read back.
fn now_truncated() -> DateTime<Utc> {
    let now = Utc::now();
    from_micros(now.timestamp_micros()).unwrap_or(now)
}
