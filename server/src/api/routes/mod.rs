//! API route handlers
//!
//! Every data route follows the same path: validate the request, build one
//! statement, send it to the executor, normalize the answer.

pub mod discover;
pub mod health;
pub mod metadata;
pub mod traces;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use serde_json::Value;

use crate::api::types::ApiError;
use crate::core::QueryConfig;
use crate::data::executor::QueryBackend;
use crate::domain::normalize::normalize_response;
use crate::domain::sql::FilterCondition;

/// Cap on executor body bytes echoed to the log in debug mode
const DEBUG_BODY_LOG_LIMIT: usize = 4096;

#[derive(Clone)]
pub struct QueryApiState {
    pub backend: Arc<dyn QueryBackend>,
    pub query: QueryConfig,
    pub debug: bool,
}

impl QueryApiState {
    pub fn new(backend: Arc<dyn QueryBackend>, query: QueryConfig) -> Self {
        Self {
            backend,
            query,
            debug: false,
        }
    }

    /// Log executor response bodies
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Reject raw SQL fragments unless the gate is open
    pub(crate) fn check_freeform(&self, fragment: Option<&str>) -> Result<(), ApiError> {
        if fragment.is_some() && !self.query.allow_freeform_sql {
            tracing::warn!("Freeform SQL request rejected (query.allow_freeform_sql = false)");
            return Err(ApiError::forbidden(
                "FREEFORM_SQL_DISABLED",
                "Freeform SQL search is disabled on this server",
            ));
        }
        Ok(())
    }

    pub(crate) fn check_filter_count(&self, filters: &[FilterCondition]) -> Result<(), ApiError> {
        if filters.len() > self.query.max_filters {
            return Err(ApiError::bad_request(
                "TOO_MANY_FILTERS",
                format!(
                    "At most {} filters are allowed, got {}",
                    self.query.max_filters,
                    filters.len()
                ),
            ));
        }
        Ok(())
    }

    /// Raw executor body for one statement
    pub(crate) async fn execute(&self, sql: &str, ds: &str) -> Result<Vec<u8>, ApiError> {
        tracing::info!(sql = %sql, ds = %ds, "Executing statement");
        let body = self
            .backend
            .execute(sql, ds)
            .await
            .map_err(ApiError::from_executor)?;

        if self.debug {
            let shown = &body[..body.len().min(DEBUG_BODY_LOG_LIMIT)];
            tracing::info!(
                bytes = body.len(),
                body = %String::from_utf8_lossy(shown),
                "Executor response"
            );
        }
        Ok(body)
    }

    /// Execute and reshape to `{"results": frames}`
    pub(crate) async fn query(&self, sql: &str, ds: &str) -> Result<Json<Value>, ApiError> {
        let body = self.execute(sql, ds).await?;
        let normalized = normalize_response(&body).map_err(ApiError::from_normalize)?;
        Ok(Json(normalized))
    }
}

/// Data and catalog routes, mounted both at the root and under the
/// plugin resources prefix
pub fn routes() -> Router<QueryApiState> {
    Router::new()
        .route("/ping", get(health::ping))
        .route("/table_data", post(discover::table_data))
        .route("/top_data", post(discover::top_data))
        .route("/table_data_charts", post(discover::table_data_charts))
        .route("/table_data_count", post(discover::table_data_count))
        .route("/table_data_trace", post(discover::table_data_trace))
        .route("/surrounding_data", post(discover::surrounding_data))
        .route("/traces", post(traces::traces))
        .route("/traces_services", post(traces::traces_services))
        .route("/traces_operations", post(traces::traces_operations))
        .route("/database", get(metadata::databases))
        .route("/table", get(metadata::tables))
        .route("/fields", get(metadata::fields))
        .route("/indexes", get(metadata::indexes))
        .route("/column", get(metadata::column))
}
