//! Complete statements as sent to the executor, with the `USE` prologue

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

use super::builders::{
    chart_series_sql, operations_sql, row_count_sql, rows_sql, services_sql, span_detail_sql,
    surrounding_rows_sql, trace_list_sql, with_database,
};
use super::params::{
    SurroundingParams, TableDataParams, TraceDetailParams, TraceFacetParams, TraceListParams,
};

pub fn table_rows(params: &TableDataParams) -> String {
    with_database(&params.database, &rows_sql(params))
}

pub fn table_chart(params: &TableDataParams) -> String {
    with_database(&params.database, &chart_series_sql(params))
}

pub fn table_count(params: &TableDataParams) -> String {
    with_database(&params.database, &row_count_sql(params))
}

pub fn trace_spans(params: &TraceDetailParams) -> String {
    with_database(&params.database, &span_detail_sql(params))
}

pub fn surrounding_rows(params: &SurroundingParams) -> String {
    with_database(&params.database, &surrounding_rows_sql(params))
}

pub fn trace_list(params: &TraceListParams) -> String {
    with_database(&params.database, &trace_list_sql(params))
}

pub fn trace_services(params: &TraceFacetParams) -> String {
    with_database(&params.database, &services_sql(params))
}

pub fn trace_operations(params: &TraceFacetParams) -> String {
    with_database(&params.database, &operations_sql(params))
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown query kind '{0}' (expected one of: {list})", list = QueryKind::names())]
    UnknownKind(String),
    #[error("invalid request body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Request shapes accepted by the data routes, named after their paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    TableData,
    TopData,
    TableDataCharts,
    TableDataCount,
    TableDataTrace,
    SurroundingData,
    Traces,
    TracesServices,
    TracesOperations,
}

impl QueryKind {
    const ALL: [QueryKind; 9] = [
        Self::TableData,
        Self::TopData,
        Self::TableDataCharts,
        Self::TableDataCount,
        Self::TableDataTrace,
        Self::SurroundingData,
        Self::Traces,
        Self::TracesServices,
        Self::TracesOperations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableData => "table_data",
            Self::TopData => "top_data",
            Self::TableDataCharts => "table_data_charts",
            Self::TableDataCount => "table_data_count",
            Self::TableDataTrace => "table_data_trace",
            Self::SurroundingData => "surrounding_data",
            Self::Traces => "traces",
            Self::TracesServices => "traces_services",
            Self::TracesOperations => "traces_operations",
        }
    }

    fn names() -> String {
        Self::ALL
            .iter()
            .map(QueryKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse and validate a request body, then build its statement
    pub fn render(self, body: &[u8]) -> Result<String, RenderError> {
        Ok(match self {
            Self::TableData | Self::TopData => table_rows(&decode(body)?),
            Self::TableDataCharts => table_chart(&decode(body)?),
            Self::TableDataCount => table_count(&decode(body)?),
            Self::TableDataTrace => trace_spans(&decode(body)?),
            Self::SurroundingData => surrounding_rows(&decode(body)?),
            Self::Traces => trace_list(&decode(body)?),
            Self::TracesServices => trace_services(&decode(body)?),
            Self::TracesOperations => trace_operations(&decode(body)?),
        })
    }
}

fn decode<T: DeserializeOwned + Validate>(body: &[u8]) -> Result<T, RenderError> {
    let params: T = serde_json::from_slice(body)?;
    params.validate()?;
    Ok(params)
}

impl FromStr for QueryKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('/').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| RenderError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("traces".parse::<QueryKind>().unwrap(), QueryKind::Traces);
        assert_eq!(
            "/table_data_count".parse::<QueryKind>().unwrap(),
            QueryKind::TableDataCount
        );
        assert_eq!("TOP_DATA".parse::<QueryKind>().unwrap(), QueryKind::TopData);
        let err = "logs".parse::<QueryKind>().unwrap_err();
        assert!(err.to_string().contains("traces_operations"));
    }

    #[test]
    fn test_render_table_rows_prefixes_database() {
        let body = br#"{
            "database": "otel", "table": "otel_logs", "timeField": "timestamp",
            "startDate": "2024-01-01 00:00:00", "endDate": "2024-01-01 01:00:00",
            "page": 3, "page_size": 20
        }"#;
        let sql = QueryKind::TableData.render(body).unwrap();
        assert!(sql.starts_with("USE `otel`;SELECT * FROM otel_logs WHERE "));
        assert!(sql.ends_with("LIMIT 20 OFFSET 40"));
    }

    #[test]
    fn test_top_data_matches_table_data() {
        let body = br#"{"database": "otel", "table": "t", "timeField": "ts"}"#;
        assert_eq!(
            QueryKind::TopData.render(body).unwrap(),
            QueryKind::TableData.render(body).unwrap()
        );
    }

    #[test]
    fn test_render_trace_spans() {
        let body = br#"{"database": "otel", "table": "otel_traces", "trace_id": "abc"}"#;
        let sql = QueryKind::TableDataTrace.render(body).unwrap();
        assert!(sql.starts_with("USE `otel`;"));
        assert!(sql.contains("trace_id = 'abc'"));
    }

    #[test]
    fn test_render_rejects_invalid() {
        let body = br#"{"database": "otel", "table": "a b", "timeField": "ts"}"#;
        assert!(matches!(
            QueryKind::TableData.render(body),
            Err(RenderError::Invalid(_))
        ));
        assert!(matches!(
            QueryKind::Traces.render(b"not json"),
            Err(RenderError::Parse(_))
        ));
    }
}
