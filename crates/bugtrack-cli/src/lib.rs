//! bugtrack client library.
//!
//! [`client::ApiClient`] speaks the HTTP API, [`board::BugBoard`] layers the
//! one-entry [`cache::ListCache`] on top, and [`form::BugForm`] validates
//! input before it is sent.

pub mod board;
pub mod cache;
pub mod client;
pub mod config;
pub mod form;

pub use board::BugBoard;
pub use client::{ApiClient, BugApi, ClientError};
pub use form::BugForm;
