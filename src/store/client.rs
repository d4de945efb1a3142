//! openGemini HTTP Client
//!
//! Talks to the InfluxDB-1.x compatible HTTP API exposed by openGemini:
//!
//! - `GET /ping` for connectivity
//! - `POST /query` with `db` and `q` form parameters for statements

use super::{RawResultSet, RawSeries, StoreClient, StoreError, StoreResult, StoreSettings};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

const SHOW_DATABASES: &str = "SHOW DATABASES";
const SHOW_MEASUREMENTS: &str = "SHOW MEASUREMENTS";

/// HTTP client for an openGemini store
pub struct OpenGeminiClient {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl OpenGeminiClient {
    /// Build a client from caller-supplied settings.
    ///
    /// No request is made here; use [`StoreClient::ping`] to check the
    /// store is reachable.
    pub fn connect(settings: &StoreSettings) -> StoreResult<Self> {
        let base_url = settings.base_url()?;
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            username: settings.username.clone().filter(|u| !u.is_empty()),
            password: settings.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        self.authorize(request).send().await.map_err(classify)
    }
}

/// Map transport failures onto store errors
fn classify(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_connect() {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Request(err)
    }
}

#[async_trait]
impl StoreClient for OpenGeminiClient {
    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        let result = self.run_query("", SHOW_DATABASES).await?;
        Ok(result.first_column())
    }

    async fn list_tables(&self, database: &str) -> StoreResult<Vec<String>> {
        let result = self.run_query(database, SHOW_MEASUREMENTS).await?;
        Ok(result.first_column())
    }

    async fn run_query(&self, database: &str, sql: &str) -> StoreResult<RawResultSet> {
        tracing::debug!(database = %database, sql = %sql, "running native query");

        let url = format!("{}/query", self.base_url);
        let request = self.client.post(&url).form(&[("db", database), ("q", sql)]);
        let response = self.send(request).await?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if status.is_success() {
            parse_query_response(&body)
        } else {
            Err(error_from_body(status.as_u16(), &body))
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        let url = format!("{}/ping", self.base_url);
        let response = self.send(self.client.get(&url)).await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.map_err(classify)?;
            Err(error_from_body(status.as_u16(), &text))
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<RawSeries>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode a `/query` response body.
///
/// Error payloads, whether top-level or per statement, fail the whole call.
fn parse_query_response(body: &str) -> StoreResult<RawResultSet> {
    let response: QueryResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error.filter(|e| !e.is_empty()) {
        return Err(StoreError::Query(error));
    }

    let mut series = Vec::new();
    for statement in response.results {
        if let Some(error) = statement.error.filter(|e| !e.is_empty()) {
            return Err(StoreError::Query(error));
        }
        series.extend(statement.series);
    }

    Ok(RawResultSet::from_series(series))
}

/// Turn a non-success response into an error, preferring the store's own
/// error message when the body carries one.
fn error_from_body(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<QueryResponse>(body) {
        Ok(QueryResponse {
            error: Some(error), ..
        }) if !error.is_empty() => StoreError::Query(error),
        _ => StoreError::Api {
            status,
            message: body.trim().to_string(),
        },
    }
}
