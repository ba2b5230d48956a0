//! Query gateway client
//!
//! The service never talks to the datastore. Every statement is POSTed to a
//! Grafana-compatible `/api/ds/query` endpoint, and the raw response bytes
//! are handed back for normalization.

mod client;
mod error;
mod types;

use async_trait::async_trait;

pub use client::HttpQueryExecutor;
pub use error::ExecutorError;
pub use types::QueryRequest;

/// Executes one SQL statement against a datasource and returns the raw body
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn execute(&self, sql: &str, datasource_uid: &str) -> Result<Vec<u8>, ExecutorError>;
}
