//! Trace statements: span detail, aggregated trace list, service/operation facets

use super::super::duration::parse_duration_micros;
use super::super::params::{TraceDetailParams, TraceFacetParams, TraceListParams};
use super::super::tags::tags_to_predicate;
use crate::core::constants::{FILTER_ALL, SPAN_ATTRIBUTES_COLUMN, TRACE_LIST_DEFAULT_LIMIT};
use crate::utils::sql::quote_literal;

/// `[{"key":..,"value":..}]` JSON text from a variant attribute map
fn attributes_as_json_array(column: &str) -> String {
    format!(
        "CONCAT('[', array_join(array_map((x, y) -> json_object('key', x, 'value', y), \
         map_keys(CAST(CAST({column} AS TEXT) AS MAP<STRING, STRING>)), \
         map_values(CAST(CAST({column} AS TEXT) AS MAP<STRING, STRING>))), ','), ']')"
    )
}

/// Every span of one trace, projected for the waterfall view
pub fn span_detail_sql(params: &TraceDetailParams) -> String {
    format!(
        "SELECT trace_id AS traceID, \
         span_id AS spanID, \
         parent_span_id AS parentSpanID, \
         span_name AS operationName, \
         service_name AS serviceName, \
         {service_tags} AS serviceTags, \
         UNIX_TIMESTAMP(timestamp) * 1000 AS startTime, \
         duration / 1000 AS duration, \
         {tags} AS tags, \
         span_kind AS kind, \
         CASE status_code WHEN 'STATUS_CODE_OK' THEN 1 WHEN 'STATUS_CODE_ERROR' THEN 2 ELSE 0 END AS statusCode, \
         status_message AS statusMessage, \
         scope_name AS instrumentationLibraryName, \
         scope_version AS instrumentationLibraryVersion, \
         trace_state AS traceState \
         FROM {table} WHERE trace_id = {trace_id}",
        service_tags = attributes_as_json_array("resource_attributes"),
        tags = attributes_as_json_array("span_attributes"),
        table = params.table,
        trace_id = quote_literal(&params.trace_id),
    )
}

/// `"all"` and `""` mean "no filter"
fn is_filtered(value: &str) -> bool {
    !value.is_empty() && value != FILTER_ALL
}

fn equals_or_true(column: &str, value: &str) -> String {
    if is_filtered(value) {
        format!("{} = {}", column, quote_literal(value))
    } else {
        "1=1".to_string()
    }
}

/// HAVING predicate over `trace_duration` (milliseconds) from microsecond bounds
fn duration_predicate(min: &str, max: &str) -> String {
    let min = parse_duration_micros(min);
    let max = parse_duration_micros(max);
    match (min > 0, max > 0) {
        (true, true) => format!("trace_duration * 1000 BETWEEN {} AND {}", min, max),
        (true, false) => format!("trace_duration * 1000 >= {}", min),
        (false, true) => format!("trace_duration * 1000 <= {}", max),
        (false, false) => "1=1".to_string(),
    }
}

fn tags_predicate(tags: &str) -> String {
    if tags.is_empty() {
        return "1=1".to_string();
    }
    tags_to_predicate(tags, SPAN_ATTRIBUTES_COLUMN).unwrap_or_else(|e| {
        tracing::warn!(tags, error = %e, "Ignoring unparsable tag expression");
        "1=1".to_string()
    })
}

/// Page window `(offset, limit)`; `page_size <= 0` means the default limit
pub fn trace_page_window(page: i64, page_size: i64) -> (i64, i64) {
    let limit = if page_size <= 0 {
        TRACE_LIST_DEFAULT_LIMIT
    } else {
        page_size
    };
    let offset = page.saturating_sub(1).saturating_mul(page_size).max(0);
    (offset, limit)
}

/// Aggregated, ranked and paged trace summaries
pub fn trace_list_sql(params: &TraceListParams) -> String {
    let tf = &params.time_field;
    let table = &params.table;

    let time_filter = format!(
        "{tf} >= {} AND {tf} < {}",
        quote_literal(&params.start_date),
        quote_literal(&params.end_date)
    );
    let service_filter = equals_or_true("service_name", &params.service_name);
    let operation_filter = equals_or_true("span_name", &params.operation);
    let status_filter = equals_or_true("status_code", &params.status_code);
    let duration_filter = duration_predicate(&params.min_duration, &params.max_duration);
    let tags_filter = tags_predicate(&params.tags);

    let mut root_spans_filter = service_filter.clone();
    if is_filtered(&params.operation) {
        root_spans_filter.push_str(&format!(" AND {}", operation_filter));
    }

    let (offset, limit) = trace_page_window(params.page, params.page_size);
    let order_by = params.sort_by.order_by();

    format!(
        "WITH
    trace_durations AS (
        SELECT
            trace_id,
            (UNIX_TIMESTAMP(MAX(end_time)) - UNIX_TIMESTAMP(MIN(timestamp))) * 1000 AS trace_duration
        FROM {table}
        WHERE {time_filter}
        GROUP BY trace_id
    ),
    all_trace_ids AS (
        SELECT
            t.trace_id,
            MIN(t.{tf}) AS time,
            d.trace_duration
        FROM {table} t
        JOIN trace_durations d ON t.trace_id = d.trace_id
        WHERE
            {time_filter}
            AND {service_filter}
            AND {operation_filter}
            AND {status_filter}
            AND {tags_filter}
        GROUP BY t.trace_id, d.trace_duration
        HAVING {duration_filter}
    ),
    root_spans AS (
        SELECT
            trace_id,
            span_name AS operation,
            service_name AS root_service
        FROM {table}
        WHERE (parent_span_id IS NULL OR parent_span_id = '') AND {root_spans_filter}
    ),
    aggregated AS (
        SELECT
            UNIX_TIMESTAMP(MIN(t.{tf})) AS time,
            t.trace_id,
            r.operation,
            r.root_service,
            COLLECT_SET(t.service_name) AS services,
            COUNT(*) AS spans,
            SUM(IF(status_code = 'STATUS_CODE_ERROR', 1, 0)) AS error_spans,
            MAX(duration) / 1000 AS max_span_duration_ms,
            MAX(UNIX_TIMESTAMP(t.timestamp) * 1000 + duration / 1000) - MIN(UNIX_TIMESTAMP(t.timestamp) * 1000) AS trace_duration_ms,
            MAX(IF(t.parent_span_id IS NULL OR t.parent_span_id = '', duration, 0)) / 1000 AS root_span_duration_ms
        FROM {table} t
        JOIN all_trace_ids a ON t.trace_id = a.trace_id
        JOIN root_spans r ON t.trace_id = r.trace_id
        GROUP BY t.trace_id, r.operation, r.root_service
    ),
    numbered AS (
        SELECT
            a.*,
            COUNT(*) OVER() AS total_count,
            ROW_NUMBER() OVER(ORDER BY {order_by}) AS rn
        FROM aggregated a
    )
SELECT
    *,
    total_count AS total
FROM numbered
WHERE rn > {offset} AND rn <= {end}
ORDER BY {order_by};",
        end = offset.saturating_add(limit),
    )
}

/// Distinct service names seen in the range
pub fn services_sql(params: &TraceFacetParams) -> String {
    format!(
        "SELECT DISTINCT service_name FROM {} WHERE {} BETWEEN {} AND {} ORDER BY service_name ASC",
        params.table,
        params.time_field,
        quote_literal(&params.start_date),
        quote_literal(&params.end_date)
    )
}

/// Distinct span names in the range, optionally for one service
pub fn operations_sql(params: &TraceFacetParams) -> String {
    let mut statement = format!(
        "SELECT DISTINCT span_name FROM {} WHERE {} BETWEEN {} AND {}",
        params.table,
        params.time_field,
        quote_literal(&params.start_date),
        quote_literal(&params.end_date)
    );
    if is_filtered(&params.service_name) {
        statement.push_str(&format!(
            " AND service_name = {}",
            quote_literal(&params.service_name)
        ));
    }
    statement.push_str(" ORDER BY span_name ASC");
    statement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sql::params::TraceSort;

    fn list_params() -> TraceListParams {
        TraceListParams {
            database: "otel".into(),
            table: "otel_traces".into(),
            time_field: "timestamp".into(),
            start_date: "2024-01-01 00:00:00".into(),
            end_date: "2024-01-02 00:00:00".into(),
            ..Default::default()
        }
    }

    fn facet_params() -> TraceFacetParams {
        TraceFacetParams {
            table: "otel_traces".into(),
            database: "otel".into(),
            time_field: "timestamp".into(),
            start_date: "s".into(),
            end_date: "e".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_span_detail() {
        let sql = span_detail_sql(&TraceDetailParams {
            table: "otel_traces".into(),
            trace_id: "abc123".into(),
            ..Default::default()
        });
        assert!(sql.starts_with("SELECT trace_id AS traceID, span_id AS spanID, "));
        assert!(sql.ends_with("FROM otel_traces WHERE trace_id = 'abc123'"));
        assert!(sql.contains(
            "CASE status_code WHEN 'STATUS_CODE_OK' THEN 1 WHEN 'STATUS_CODE_ERROR' THEN 2 ELSE 0 END AS statusCode"
        ));
        assert!(sql.contains("map_keys(CAST(CAST(resource_attributes AS TEXT) AS MAP<STRING, STRING>))"));
        assert!(sql.contains("map_values(CAST(CAST(span_attributes AS TEXT) AS MAP<STRING, STRING>))), ','), ']') AS tags"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn test_span_detail_escapes_trace_id() {
        let sql = span_detail_sql(&TraceDetailParams {
            table: "t".into(),
            trace_id: "x' OR '1'='1".into(),
            ..Default::default()
        });
        assert!(sql.ends_with("WHERE trace_id = 'x'' OR ''1''=''1'"));
    }

    #[test]
    fn test_trace_list_defaults() {
        let sql = trace_list_sql(&list_params());
        assert!(sql.contains(
            "WHERE timestamp >= '2024-01-01 00:00:00' AND timestamp < '2024-01-02 00:00:00'"
        ));
        assert!(sql.contains("AND 1=1\n            AND 1=1"));
        assert!(sql.contains("HAVING 1=1"));
        assert!(sql.contains("WHERE (parent_span_id IS NULL OR parent_span_id = '') AND 1=1"));
        assert!(sql.contains("ROW_NUMBER() OVER(ORDER BY time DESC) AS rn"));
        assert!(sql.contains("WHERE rn > 0 AND rn <= 1000"));
        assert!(sql.ends_with("ORDER BY time DESC;"));
    }

    #[test]
    fn test_trace_list_most_spans_page_two() {
        let p = TraceListParams {
            sort_by: TraceSort::MostSpans,
            page: 2,
            page_size: 50,
            ..list_params()
        };
        let sql = trace_list_sql(&p);
        assert!(sql.contains("ROW_NUMBER() OVER(ORDER BY spans DESC) AS rn"));
        assert!(sql.contains("WHERE rn > 50 AND rn <= 100"));
        assert!(sql.ends_with("ORDER BY spans DESC;"));
    }

    #[test]
    fn test_trace_list_filters() {
        let p = TraceListParams {
            service_name: "checkout".into(),
            operation: "POST /pay".into(),
            status_code: "STATUS_CODE_ERROR".into(),
            tags: r#"http.method=POST retry="2""#.into(),
            min_duration: "500ms".into(),
            max_duration: "2s".into(),
            ..list_params()
        };
        let sql = trace_list_sql(&p);
        assert!(sql.contains("AND service_name = 'checkout'"));
        assert!(sql.contains("AND span_name = 'POST /pay'"));
        assert!(sql.contains("AND status_code = 'STATUS_CODE_ERROR'"));
        assert!(sql.contains(
            "AND span_attributes['http.method'] = 'POST' AND span_attributes['retry'] = '2'"
        ));
        assert!(sql.contains("HAVING trace_duration * 1000 BETWEEN 500000 AND 2000000"));
        assert!(sql.contains(
            "AND service_name = 'checkout' AND span_name = 'POST /pay'\n    ),\n    aggregated AS"
        ));
    }

    #[test]
    fn test_trace_list_all_means_unfiltered() {
        let p = TraceListParams {
            service_name: "all".into(),
            operation: "all".into(),
            status_code: "all".into(),
            ..list_params()
        };
        let sql = trace_list_sql(&p);
        assert!(!sql.contains("'all'"));
        assert!(!sql.contains("service_name ="));
        assert!(!sql.contains("span_name ="));
    }

    #[test]
    fn test_trace_list_operation_only_root_filter() {
        let p = TraceListParams {
            operation: "GET /".into(),
            ..list_params()
        };
        let sql = trace_list_sql(&p);
        assert!(sql.contains("parent_span_id = '') AND 1=1 AND span_name = 'GET /'"));
    }

    #[test]
    fn test_trace_list_single_bound_duration() {
        let p = TraceListParams {
            min_duration: "100us".into(),
            ..list_params()
        };
        assert!(trace_list_sql(&p).contains("HAVING trace_duration * 1000 >= 100"));

        let p = TraceListParams {
            max_duration: "3s".into(),
            min_duration: "fast".into(),
            ..list_params()
        };
        assert!(trace_list_sql(&p).contains("HAVING trace_duration * 1000 <= 3000000"));
    }

    #[test]
    fn test_trace_list_bad_tags_fall_back() {
        let p = TraceListParams {
            tags: r#"a="unterminated"#.into(),
            ..list_params()
        };
        let sql = trace_list_sql(&p);
        assert!(!sql.contains("span_attributes["));
    }

    #[test]
    fn test_trace_page_window() {
        assert_eq!(trace_page_window(1, 0), (0, 1000));
        assert_eq!(trace_page_window(3, 20), (40, 20));
        assert_eq!(trace_page_window(0, 20), (0, 20));
        assert_eq!(trace_page_window(-5, 20), (0, 20));
        assert_eq!(trace_page_window(2, -1), (0, 1000));
    }

    #[test]
    fn test_services() {
        assert_eq!(
            services_sql(&facet_params()),
            "SELECT DISTINCT service_name FROM otel_traces WHERE timestamp BETWEEN 's' AND 'e' ORDER BY service_name ASC"
        );
    }

    #[test]
    fn test_operations_for_service() {
        let p = TraceFacetParams {
            service_name: "cart".into(),
            ..facet_params()
        };
        assert_eq!(
            operations_sql(&p),
            "SELECT DISTINCT span_name FROM otel_traces WHERE timestamp BETWEEN 's' AND 'e' \
             AND service_name = 'cart' ORDER BY span_name ASC"
        );
    }

    #[test]
    fn test_operations_all_services() {
        let p = TraceFacetParams {
            service_name: "all".into(),
            ..facet_params()
        };
        assert_eq!(
            operations_sql(&p),
            "SELECT DISTINCT span_name FROM otel_traces WHERE timestamp BETWEEN 's' AND 'e' ORDER BY span_name ASC"
        );
    }
}
