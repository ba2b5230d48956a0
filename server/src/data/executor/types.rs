//! Outbound request body for the query gateway

use serde::Serialize;

use crate::core::constants::{EXECUTOR_FORMAT, EXECUTOR_REF_ID};

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub queries: Vec<QueryItem<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem<'a> {
    pub ref_id: &'static str,
    pub datasource: DatasourceRef<'a>,
    pub raw_sql: &'a str,
    pub format: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DatasourceRef<'a> {
    pub uid: &'a str,
}

impl<'a> QueryRequest<'a> {
    /// A single table-format sub-query
    pub fn single(sql: &'a str, datasource_uid: &'a str) -> Self {
        Self {
            queries: vec![QueryItem {
                ref_id: EXECUTOR_REF_ID,
                datasource: DatasourceRef {
                    uid: datasource_uid,
                },
                raw_sql: sql,
                format: EXECUTOR_FORMAT,
            }],
        }
    }
}
