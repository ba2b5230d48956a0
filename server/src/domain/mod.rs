//! Domain logic for log and trace exploration
//!
//! - `sql` - statement builders for the Doris/SelectDB dialect
//! - `normalize` - executor envelope reshaping
//! - `traces` - per-trace summaries from tabular rows

pub mod normalize;
pub mod sql;
pub mod traces;

pub use normalize::{NormalizeError, normalize_response};
pub use traces::{AggregatedTrace, RawTraceRow, aggregate_traces, raw_trace_rows};
