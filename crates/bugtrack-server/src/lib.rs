//! bugtrack HTTP API.
//!
//! [`app::router`] wires `/health` and `/api/bugs` onto a
//! [`bugtrack_core::Gateway`]; [`error::ApiError`] renders every failure as
//! `{message, statusCode, requestId, details?}`.

pub mod app;
pub mod error;
pub mod handlers;

pub use app::{AppState, ServerHandle, router, serve, spawn};
pub use error::{ApiError, ErrorPayload};
