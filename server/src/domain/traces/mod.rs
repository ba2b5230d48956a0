//! Per-trace summaries from tabular trace rows
//!
//! A trace-list frame can hold several rows for one trace (one per root span
//! when a trace has more than one). [`aggregate_traces`] keeps the first row
//! seen for each trace id and orders the result newest first.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

/// One row of a trace frame, read by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTraceRow {
    pub trace_id: String,
    pub root_service_name: String,
    pub root_span_name: String,
    pub root_span_kind: String,
    pub root_status_code: String,
    pub operation: String,
    pub resource_attributes: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_us: i64,
    pub span_count: i64,
}

/// One record per trace id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedTrace {
    pub trace_id: String,
    pub root_service_name: String,
    pub root_span_name: String,
    pub root_span_kind: String,
    pub root_status_code: String,
    pub operation: String,
    pub service_tags: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_us: i64,
    pub span_count: i64,
}

impl From<RawTraceRow> for AggregatedTrace {
    fn from(row: RawTraceRow) -> Self {
        Self {
            trace_id: row.trace_id,
            root_service_name: row.root_service_name,
            root_span_name: row.root_span_name,
            root_span_kind: row.root_span_kind,
            root_status_code: row.root_status_code,
            operation: row.operation,
            service_tags: row.resource_attributes,
            start_time: row.start_time,
            end_time: row.end_time,
            duration_us: row.duration_us,
            span_count: row.span_count,
        }
    }
}

/// Dedupe by trace id (first row wins), then sort by `start_time` descending
pub fn aggregate_traces(rows: Vec<RawTraceRow>) -> Vec<AggregatedTrace> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut traces: Vec<AggregatedTrace> = Vec::new();

    for row in rows {
        if index.contains_key(&row.trace_id) {
            continue;
        }
        index.insert(row.trace_id.clone(), traces.len());
        traces.push(row.into());
    }

    // stable: equal start times keep first-seen order
    traces.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    traces
}

/// Column names accepted for each row field, first match wins.
/// The second spelling is what the trace-list statement projects.
const TRACE_ID: &[&str] = &["trace_id", "traceID"];
const ROOT_SERVICE: &[&str] = &["root_service_name", "root_service"];
const ROOT_SPAN: &[&str] = &["root_span_name", "operation"];
const ROOT_KIND: &[&str] = &["root_span_kind"];
const ROOT_STATUS: &[&str] = &["root_status_code"];
const OPERATION: &[&str] = &["operation", "root_span_name"];
const RESOURCE_ATTRS: &[&str] = &["resource_attributes", "services"];
const START_TIME: &[&str] = &["start_time", "time"];
const END_TIME: &[&str] = &["end_time"];
const DURATION_US: &[&str] = &["duration_us"];
const DURATION_MS: &[&str] = &["trace_duration_ms"];
const SPAN_COUNT: &[&str] = &["span_count", "spans"];

/// Read a data frame into rows.
///
/// Column names come from `schema.fields[].name` (or top-level `fields`),
/// values from the column-major `data.values`. Absent columns read as
/// empty/zero.
pub fn raw_trace_rows(frame: &Value) -> Vec<RawTraceRow> {
    let names: Vec<&str> = frame
        .pointer("/schema/fields")
        .or_else(|| frame.get("fields"))
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .map(|f| f.get("name").and_then(Value::as_str).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let columns: &[Value] = frame
        .pointer("/data/values")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let find = |aliases: &[&str]| -> Option<&Vec<Value>> {
        aliases
            .iter()
            .find_map(|alias| names.iter().position(|n| n == alias))
            .and_then(|i| columns.get(i))
            .and_then(Value::as_array)
    };

    let trace_ids = find(TRACE_ID);
    let row_count = trace_ids.map(Vec::len).unwrap_or(0);

    let text = |col: Option<&Vec<Value>>, i: usize| -> String {
        col.and_then(|c| c.get(i)).map(value_to_string).unwrap_or_default()
    };
    let int = |col: Option<&Vec<Value>>, i: usize| -> Option<i64> {
        col.and_then(|c| c.get(i)).and_then(value_to_i64)
    };

    let (root_service, root_span, root_kind, root_status) = (
        find(ROOT_SERVICE),
        find(ROOT_SPAN),
        find(ROOT_KIND),
        find(ROOT_STATUS),
    );
    let (operation, resource_attrs, start_time, end_time) = (
        find(OPERATION),
        find(RESOURCE_ATTRS),
        find(START_TIME),
        find(END_TIME),
    );
    let (duration_us, duration_ms, span_count) =
        (find(DURATION_US), find(DURATION_MS), find(SPAN_COUNT));

    (0..row_count)
        .map(|i| RawTraceRow {
            trace_id: text(trace_ids, i),
            root_service_name: text(root_service, i),
            root_span_name: text(root_span, i),
            root_span_kind: text(root_kind, i),
            root_status_code: text(root_status, i),
            operation: text(operation, i),
            resource_attributes: text(resource_attrs, i),
            start_time: text(start_time, i),
            end_time: text(end_time, i),
            duration_us: int(duration_us, i)
                .or_else(|| int(duration_ms, i).map(|ms| ms.saturating_mul(1000)))
                .unwrap_or(0),
            span_count: int(span_count, i).unwrap_or(0),
        })
        .collect()
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
