pub mod completions;
pub mod create;
pub mod delete;
pub mod health;
pub mod list;
pub mod status;
