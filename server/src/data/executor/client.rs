use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use super::QueryBackend;
use super::error::ExecutorError;
use super::types::QueryRequest;
use crate::core::ExecutorConfig;
use crate::core::constants::HEADER_DATASOURCE_UID;

/// reqwest-backed [`QueryBackend`]; cheap to share behind an `Arc`
#[derive(Debug, Clone)]
pub struct HttpQueryExecutor {
    client: reqwest::Client,
    url: String,
}

impl HttpQueryExecutor {
    pub fn new(config: &ExecutorConfig) -> Result<Self, ExecutorError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ExecutorError::Config(format!("invalid api token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ExecutorError::Config(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            url = %config.url,
            timeout = ?config.timeout,
            auth = config.api_token.is_some(),
            "Query executor initialized"
        );
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl QueryBackend for HttpQueryExecutor {
    async fn execute(&self, sql: &str, datasource_uid: &str) -> Result<Vec<u8>, ExecutorError> {
        if sql.is_empty() || datasource_uid.is_empty() {
            return Err(ExecutorError::MissingInput);
        }

        let uid = HeaderValue::from_str(datasource_uid)
            .map_err(|_| ExecutorError::Config("datasource uid is not a valid header".into()))?;

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(HEADER_DATASOURCE_UID, uid)
            .json(&QueryRequest::single(sql, datasource_uid))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExecutorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
