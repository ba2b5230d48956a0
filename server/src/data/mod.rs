//! Outbound data access
//!
//! - `executor` - query gateway client behind the `QueryBackend` trait

pub mod executor;

pub use executor::{ExecutorError, HttpQueryExecutor, QueryBackend};
