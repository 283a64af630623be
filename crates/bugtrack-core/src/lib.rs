//! bugtrack-core library.
//!
//! The request path through this crate is:
//! draft → [`validate`] → [`model::schema`] → [`store`] → [`model::bug::BugRecord`],
//! orchestrated by [`gateway::Gateway`].
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at the store/gateway seams, `anyhow::Result`
//!   where a caller only needs context (config loading, db bootstrap).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod model;
pub mod store;
pub mod validate;

pub use gateway::{Gateway, GatewayError};
pub use model::bug::{BugRecord, Priority, Status};
pub use store::{DocumentStore, SortOrder, StoreError};
pub use validate::{FieldErrors, ValidateOptions, Validation, sanitize_tags, validate_bug_payload};
