//! Log exploration statements: histogram, count, rows, surrounding rows

use super::super::filters::apply_filters;
use super::super::interval::resolve_interval;
use super::super::params::{SearchMode, SurroundingParams, TableDataParams};
use crate::core::constants::TABLE_ROWS_DEFAULT_PAGE_SIZE;
use crate::utils::sql::quote_literal;

/// Append the shared WHERE body of the time-range statements.
///
/// Order: index expression (structured mode), time range, structured
/// filters, then the freeform or Lucene fragment. `statement` must end in
/// `WHERE`.
fn push_time_range_predicates(
    statement: &mut String,
    params: &TableDataParams,
    index_expr: &str,
    between: &str,
) {
    if params.search_type == SearchMode::Structured && !index_expr.is_empty() {
        statement.push_str(&format!(" ({}) AND", index_expr));
    }

    statement.push_str(&format!(
        " ({} {} {} AND {})",
        params.time_field,
        between,
        quote_literal(&params.start_date),
        quote_literal(&params.end_date)
    ));

    apply_filters(statement, &params.data_filters);

    if let Some(fragment) = params.freeform_fragment() {
        statement.push_str(" AND ");
        statement.push_str(fragment);
    }

    if let Some(fragment) = params.lucene_fragment() {
        statement.push_str(&format!(" AND ({})", fragment));
    }
}

/// Bucketed row counts for the histogram
pub fn chart_series_sql(params: &TableDataParams) -> String {
    let (unit, width) = resolve_interval(
        params.interval,
        params.interval_value,
        &params.start_date,
        &params.end_date,
    );
    let unit = unit.as_sql();

    let mut statement = format!(
        "SELECT {unit}_FLOOR(table_per_time.T,{width}) as TT, sum(table_per_time.cnt) \
         FROM (SELECT {unit}_FLOOR({tf}) as T, count(*) as cnt FROM {table} WHERE",
        tf = params.time_field,
        table = params.table,
    );
    push_time_range_predicates(&mut statement, params, &params.indexes, "between");
    statement.push_str(" GROUP BY T ORDER BY T) as table_per_time GROUP BY TT ORDER BY TT");
    statement
}

/// Total matching rows in the range
pub fn row_count_sql(params: &TableDataParams) -> String {
    let (unit, _) = resolve_interval(
        params.interval,
        params.interval_value,
        &params.start_date,
        &params.end_date,
    );

    let mut statement = format!(
        "SELECT SUM(table_per_time.cnt) AS total_count FROM (SELECT {}_FLOOR({}) AS T, COUNT(*) AS cnt FROM {} WHERE",
        unit.as_sql(),
        params.time_field,
        params.table,
    );
    push_time_range_predicates(&mut statement, params, &params.indexes, "BETWEEN");
    statement.push_str(" GROUP BY T) AS table_per_time;");
    statement
}

/// Newest-first page of rows
///
/// A missing or zero `page_size` falls back to
/// [`TABLE_ROWS_DEFAULT_PAGE_SIZE`]; pages below 1 count as 1.
pub fn rows_sql(params: &TableDataParams) -> String {
    let mut statement = format!("SELECT * FROM {} WHERE", params.table);
    push_time_range_predicates(&mut statement, params, &params.indexes_statement, "BETWEEN");

    let page_size = if params.page_size > 0 {
        params.page_size
    } else {
        TABLE_ROWS_DEFAULT_PAGE_SIZE
    };
    let offset = (params.page.max(1) - 1).saturating_mul(page_size);
    statement.push_str(&format!(
        " ORDER BY {} DESC LIMIT {} OFFSET {}",
        params.time_field, page_size, offset
    ));
    statement
}

/// Rows adjacent to an anchor timestamp, nearest first
pub fn surrounding_rows_sql(params: &SurroundingParams) -> String {
    let mut statement = format!(
        "SELECT * FROM {} WHERE ({} {} {})",
        params.table,
        params.time_field,
        params.operator.as_sql(),
        quote_literal(&params.time)
    );

    apply_filters(&mut statement, &params.data_filters);

    statement.push_str(&format!(
        " ORDER BY {} {} LIMIT {}",
        params.time_field,
        params.operator.order(),
        params.page_size
    ));
    statement
}
