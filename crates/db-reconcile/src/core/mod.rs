//! Core types shared across the reconciliation engine.
//!
//! - [`value`]: scalar value union and comparison helpers
//! - [`record`]: ordered column-to-value row representation
//! - [`schema`]: column metadata from the schema provider

pub mod record;
pub mod schema;
pub mod value;

pub use record::{column_union, Record};
pub use schema::{common_columns, ColumnDescriptor};
pub use value::{values_equal, Value};
