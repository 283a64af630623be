pub mod bug;
pub mod date;
pub mod schema;
