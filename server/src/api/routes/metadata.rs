//! Catalog browsing: databases, tables, columns, indexes

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use super::QueryApiState;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::ApiError;
use crate::domain::sql::builders::{
    column_sql, databases_sql, fields_sql, indexes_sql, tables_sql,
};
use crate::domain::sql::validate::{validate_identifier, validate_optional_identifier};

#[derive(Debug, Deserialize, Validate)]
pub struct DatasourceQuery {
    #[serde(default)]
    pub ds: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DatabaseQuery {
    #[serde(default)]
    pub ds: String,
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TableQuery {
    #[serde(default)]
    pub ds: String,
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
    #[validate(custom(function = "validate_identifier"))]
    pub table: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ColumnQuery {
    #[serde(default)]
    pub ds: String,
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
    #[validate(custom(function = "validate_identifier"))]
    pub table: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_identifier"))]
    pub column: String,
}

pub async fn databases(
    State(state): State<QueryApiState>,
    ValidatedQuery(query): ValidatedQuery<DatasourceQuery>,
) -> Result<Json<Value>, ApiError> {
    state.query(&databases_sql(), &query.ds).await
}

pub async fn tables(
    State(state): State<QueryApiState>,
    ValidatedQuery(query): ValidatedQuery<DatabaseQuery>,
) -> Result<Json<Value>, ApiError> {
    state.query(&tables_sql(&query.database), &query.ds).await
}

pub async fn fields(
    State(state): State<QueryApiState>,
    ValidatedQuery(query): ValidatedQuery<TableQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .query(&fields_sql(&query.database, &query.table), &query.ds)
        .await
}

pub async fn indexes(
    State(state): State<QueryApiState>,
    ValidatedQuery(query): ValidatedQuery<TableQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .query(&indexes_sql(&query.database, &query.table), &query.ds)
        .await
}

/// Column metadata; every column of the table when `column` is omitted
pub async fn column(
    State(state): State<QueryApiState>,
    ValidatedQuery(query): ValidatedQuery<ColumnQuery>,
) -> Result<Json<Value>, ApiError> {
    let sql = column_sql(&query.database, &query.table, &query.column);
    state.query(&sql, &query.ds).await
}
