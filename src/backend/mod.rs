//! Query Execution Backend
//!
//! Client for the service that turns a `QueryDefinition` (or raw SQL) into
//! rows and describes the database schema.
//!
//! - **client**: The `QueryBackend` trait and its HTTP implementation
//! - **error**: Backend error types

mod client;
mod error;

pub use client::{HttpBackend, QueryBackend};
pub use error::{BackendError, BackendResult};
