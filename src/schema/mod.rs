//! Schema Model
//!
//! Read-only description of the relational schema a query is built against:
//!
//! - **types**: Tables, columns and foreign-key relationships as supplied by the backend
//! - **classify**: Coarse classification of backend data-type strings
//!
//! The schema is a snapshot taken once per editing session and is never
//! mutated by this crate.

mod classify;
mod types;

pub use classify::{classify, ColumnCategory};
pub use types::{ColumnSchema, DatabaseSchema, Relationship, SchemaTable};
