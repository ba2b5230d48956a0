//! Statement builders
//!
//! Every builder is a pure function of its parameters. Identifiers are
//! interpolated as given (validated at the HTTP boundary); values go through
//! [`crate::utils::sql::quote_literal`].

pub mod discover;
pub mod metadata;
pub mod traces;

pub use discover::{chart_series_sql, row_count_sql, rows_sql, surrounding_rows_sql};
pub use metadata::{
    column_sql, databases_sql, fields_sql, indexes_sql, tables_sql, with_database,
};
pub use traces::{operations_sql, services_sql, span_detail_sql, trace_list_sql};
