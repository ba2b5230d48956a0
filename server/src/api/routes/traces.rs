//! Trace search endpoints

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use super::QueryApiState;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::domain::normalize::extract_frames;
use crate::domain::sql::statement;
use crate::domain::sql::{TraceFacetParams, TraceListParams};
use crate::domain::traces::{aggregate_traces, raw_trace_rows};

/// Response shape of `/traces`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceView {
    /// Frames as returned by the executor
    #[default]
    Frames,
    /// One JSON record per trace id
    Summary,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TraceListQuery {
    #[serde(default)]
    pub view: TraceView,
}

pub async fn traces(
    State(state): State<QueryApiState>,
    ValidatedQuery(query): ValidatedQuery<TraceListQuery>,
    ValidatedJson(params): ValidatedJson<TraceListParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, view = ?query.view, "traces");
    let sql = statement::trace_list(&params);

    match query.view {
        TraceView::Frames => state.query(&sql, &params.ds).await,
        TraceView::Summary => {
            let body = state.execute(&sql, &params.ds).await?;
            let frames = extract_frames(&body).map_err(ApiError::from_normalize)?;
            let rows = frames.first().map(raw_trace_rows).unwrap_or_default();
            let summaries = aggregate_traces(rows);
            tracing::debug!(count = summaries.len(), "Trace summaries built");
            Ok(Json(json!({ "results": summaries })))
        }
    }
}

pub async fn traces_services(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<TraceFacetParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "traces_services");
    state
        .query(&statement::trace_services(&params), &params.ds)
        .await
}

pub async fn traces_operations(
    State(state): State<QueryApiState>,
    ValidatedJson(params): ValidatedJson<TraceFacetParams>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!(params = ?params, "traces_operations");
    state
        .query(&statement::trace_operations(&params), &params.ds)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::{FRAMES_BODY, MockBackend, router, send};
    use crate::core::QueryConfig;

    fn list_body() -> serde_json::Value {
        json!({
            "ds": "doris-1",
            "database": "otel",
            "table": "otel_traces",
            "timeField": "timestamp",
            "startDate": "2024-01-01 00:00:00",
            "endDate": "2024-01-02 00:00:00",
            "page": "2",
            "page_size": 50,
            "sort_by": "most-spans",
            "service_name": "all"
        })
    }

    #[tokio::test]
    async fn test_trace_list_frames() {
        let backend = Arc::new(MockBackend::ok(FRAMES_BODY));
        let (status, body) = send(
            router(backend.clone(), QueryConfig::default()),
            "POST",
            "/traces",
            Some(list_body()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        let sql = backend.last_sql();
        assert!(sql.starts_with("USE `otel`;WITH"));
        assert!(sql.contains("ROW_NUMBER() OVER(ORDER BY spans DESC)"));
        assert!(sql.contains("WHERE rn > 50 AND rn <= 100"));
    }

    #[tokio::test]
    async fn test_trace_list_summary_dedups_root_spans() {
        let executor_body = json!({
            "results": {"A": {"status": 200, "frames": [{
                "schema": {"fields": [
                    {"name": "time"}, {"name": "trace_id"}, {"name": "operation"},
                    {"name": "root_service"}, {"name": "spans"}, {"name": "trace_duration_ms"}
                ]},
                "data": {"values": [
                    [1704067205, 1704067205, 1704067210],
                    ["t1", "t1", "t2"],
                    ["GET /a", "GET /b", "POST /c"],
                    ["web", "web", "api"],
                    [3, 3, 9],
                    [12, 12, 40]
                ]}
            }]}}
        });
        let backend = Arc::new(MockBackend::ok(&executor_body.to_string()));
        let (status, body) = send(
            router(backend, QueryConfig::default()),
            "POST",
            "/traces?view=summary",
            Some(list_body()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["trace_id"], "t2");
        assert_eq!(results[0]["duration_us"], 40_000);
        assert_eq!(results[1]["trace_id"], "t1");
        assert_eq!(results[1]["operation"], "GET /a");
        assert_eq!(results[1]["span_count"], 3);
    }

    #[tokio::test]
    async fn test_unknown_view_rejected() {
        let backend = Arc::new(MockBackend::ok(FRAMES_BODY));
        let (status, err) = send(
            router(backend, QueryConfig::default()),
            "POST",
            "/traces?view=table",
            Some(list_body()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "QUERY_PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_services_and_operations() {
        let backend = Arc::new(MockBackend::ok(FRAMES_BODY));
        let app = router(backend.clone(), QueryConfig::default());
        let facet = json!({
            "ds": "d", "database": "otel", "table": "otel_traces", "timeField": "timestamp",
            "startDate": "2024-01-01 00:00:00", "endDate": "2024-01-02 00:00:00",
            "serviceName": "cart"
        });

        let (status, _) = send(app.clone(), "POST", "/traces_services", Some(facet.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            backend
                .last_sql()
                .starts_with("USE `otel`;SELECT DISTINCT service_name FROM otel_traces")
        );

        let (status, _) = send(app, "POST", "/traces_operations", Some(facet)).await;
        assert_eq!(status, StatusCode::OK);
        let sql = backend.last_sql();
        assert!(sql.contains("AND service_name = 'cart'"));
        assert!(sql.ends_with("ORDER BY span_name ASC"));
    }
}
