//! Query backend REST client
//!
//! HTTP client for the query execution service.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{BackendError, BackendResult};
use crate::config::BackendConfig;
use crate::query::QueryDefinition;
use crate::result::{QueryResult, RawQueryResult};
use crate::schema::DatabaseSchema;

/// Something that can run queries and describe the database
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Run a structured query, optionally capping the number of rows
    async fn execute_query(
        &self,
        query: &QueryDefinition,
        limit: Option<u32>,
    ) -> BackendResult<QueryResult>;

    /// Run raw SQL
    async fn execute_sql(&self, sql: &str) -> BackendResult<QueryResult>;

    /// Fetch the current schema snapshot
    async fn fetch_schema(&self) -> BackendResult<DatabaseSchema>;
}

/// REST implementation of `QueryBackend`
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a new client with the given configuration
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Send a request, retrying connection failures and rate limiting
    async fn send<F>(&self, endpoint: &str, build: F) -> BackendResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = BackendError::Unavailable;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Backoff: 250ms, 1s, 2.25s...
                let delay = Duration::from_millis(250 * (attempt as u64).pow(2));
                tokio::time::sleep(delay).await;
            }

            let started = Instant::now();
            match build().send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(
                        endpoint,
                        status = response.status().as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Backend request completed"
                    );
                    return Ok(response);
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    // Rate limited - honour Retry-After when present
                    if let Some(secs) = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                    {
                        tokio::time::sleep(Duration::from_secs(secs)).await;
                    }
                    tracing::warn!(endpoint, attempt, "Backend rate limited request");
                    last_error = BackendError::Api {
                        status: 429,
                        message: "rate limited".to_string(),
                    };
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let message = response.text().await.unwrap_or_default();
                    tracing::warn!(endpoint, status, "Backend rejected request");
                    return Err(BackendError::Api { status, message });
                }
                Err(e) => {
                    let error = classify_error(e);
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    tracing::warn!(endpoint, attempt, "Backend unreachable");
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> BackendResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self
            .send(path, || self.client.post(&url).json(body))
            .await?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.endpoint(path);
        let response = self.send(path, || self.client.get(&url)).await?;
        decode(response).await
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn execute_query(
        &self,
        query: &QueryDefinition,
        limit: Option<u32>,
    ) -> BackendResult<QueryResult> {
        let body = ExecuteQueryRequest {
            query,
            limit: limit.or(query.limit).unwrap_or(self.config.default_limit),
        };
        let raw: RawQueryResult = self.post("query", &body).await?;
        Ok(QueryResult::from_raw(raw)?)
    }

    async fn execute_sql(&self, sql: &str) -> BackendResult<QueryResult> {
        let raw: RawQueryResult = self.post("sql", &ExecuteSqlRequest { sql }).await?;
        Ok(QueryResult::from_raw(raw)?)
    }

    async fn fetch_schema(&self) -> BackendResult<DatabaseSchema> {
        self.get("schema").await
    }
}

fn classify_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else if e.is_connect() {
        BackendError::Unavailable
    } else {
        BackendError::Request(e)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    let body = response.text().await.map_err(classify_error)?;
    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> BackendResult<T> {
    serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))
}

// ============================================
// Request DTOs
// ============================================

#[derive(Debug, Serialize)]
struct ExecuteQueryRequest<'a> {
    query: &'a QueryDefinition,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct ExecuteSqlRequest<'a> {
    sql: &'a str,
}
