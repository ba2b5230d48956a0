//! Catalog statements (databases, tables, columns, indexes)
//!
//! These carry their own `USE`/`SWITCH` prologue and are sent as-is.

use crate::utils::sql::{quote_ident, quote_literal};

pub fn databases_sql() -> String {
    "SWITCH internal; SHOW DATABASES;".to_string()
}

pub fn tables_sql(database: &str) -> String {
    format!("USE {}; SHOW TABLES;", quote_ident(database))
}

/// Column list with variant sub-columns expanded
pub fn fields_sql(database: &str, table: &str) -> String {
    format!(
        "USE {}; set describe_extend_variant_column = true; DESC {};",
        quote_ident(database),
        quote_ident(table)
    )
}

pub fn indexes_sql(database: &str, table: &str) -> String {
    format!(
        "{}SHOW INDEX FROM {};",
        with_database(database, ""),
        quote_ident(table)
    )
}

/// Column metadata from `information_schema`; all columns when `column` is empty
pub fn column_sql(database: &str, table: &str, column: &str) -> String {
    let mut statement = format!(
        "SELECT COLUMN_NAME, COLUMN_TYPE, DATA_TYPE, IS_NULLABLE, COLUMN_COMMENT \
         FROM information_schema.COLUMNS WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {}",
        quote_literal(database),
        quote_literal(table)
    );
    if !column.is_empty() {
        statement.push_str(&format!(" AND COLUMN_NAME = {}", quote_literal(column)));
    }
    statement.push_str(" ORDER BY ORDINAL_POSITION");
    statement
}

/// Prefix a data statement with ``USE `db`;``
pub fn with_database(database: &str, sql: &str) -> String {
    format!("USE {};{}", quote_ident(database), sql)
}
