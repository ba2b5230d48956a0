//! Log exploration endpoints

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use super::QueryApiState;
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::domain::sql::statement;
use crate::domain::sql::{SurroundingParams, TableDataParams, TraceDetailParams};

impl QueryApiState {
    fn check_table_request(&self, params: &TableDataParams) -> Result<(), ApiError> {
        self.check_freeform(params.raw_fragment())?;
        self.check_filter_count(&params.data_filters)
    }
}

/// Paginated rows
pub async fn table_data(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<TableDataParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "table_data");
    state.check_table_request(&params)?;
    state.query(&statement::table_rows(&params), &params.ds).await
}

/// Same statement as `table_data`; kept as its own path for the UI's top-N panel
pub async fn top_data(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<TableDataParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "top_data");
    state.check_table_request(&params)?;
    state.query(&statement::table_rows(&params), &params.ds).await
}

pub async fn table_data_charts(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<TableDataParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "table_data_charts");
    state.check_table_request(&params)?;
    state.query(&statement::table_chart(&params), &params.ds).await
}

pub async fn table_data_count(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<TableDataParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "table_data_count");
    state.check_table_request(&params)?;
    state.query(&statement::table_count(&params), &params.ds).await
}

/// All spans of one trace
pub async fn table_data_trace(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<TraceDetailParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "table_data_trace");
    state.query(&statement::trace_spans(&params), &params.ds).await
}

/// Log context around an anchor row
pub async fn surrounding_data(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<SurroundingParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "surrounding_data");
    state.check_filter_count(&params.data_filters)?;
    state
        .query(&statement::surrounding_rows(&params), &params.ds)
        .await
}
