//! In-memory store
//!
//! A scripted [`StoreClient`] for tests and offline demos. Responses,
//! failures and per-operation latency are configured up front; every call
//! is recorded.

use super::{RawResultSet, RawSeries, StoreClient, StoreError, StoreResult};
use crate::query::Pair;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Store operations, for scripting failures and latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListDatabases,
    ListTables,
    RunQuery,
    Ping,
}

/// Scripted in-memory store
#[derive(Default)]
pub struct MemoryStore {
    databases: Vec<String>,
    tables: HashMap<String, Vec<String>>,
    results: HashMap<String, RawResultSet>,
    labels: Vec<Pair>,
    failures: HashMap<Operation, String>,
    latency: HashMap<Operation, Duration>,
    unreachable: bool,
    queries: Mutex<Vec<(String, String)>>,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn databases(mut self, databases: &[&str]) -> Self {
        self.databases = databases.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn tables(mut self, database: &str, tables: &[&str]) -> Self {
        self.tables.insert(
            database.to_string(),
            tables.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Answer `sql` with `result`, whatever the database
    pub fn result(mut self, sql: impl Into<String>, result: RawResultSet) -> Self {
        self.results.insert(sql.into(), result);
        self
    }

    /// Answer `sql` with a single-column, single-value result
    pub fn scalar(self, sql: impl Into<String>, column: &str, value: &str) -> Self {
        let series = RawSeries::new(&[column], vec![vec![serde_json::Value::from(value)]]);
        self.result(sql, RawResultSet::from_series(vec![series]))
    }

    pub fn labels(mut self, labels: Vec<Pair>) -> Self {
        self.labels = labels;
        self
    }

    /// Make an operation fail with a store error payload
    pub fn fail(mut self, operation: Operation, message: &str) -> Self {
        self.failures.insert(operation, message.to_string());
        self
    }

    /// Delay an operation
    pub fn latency(mut self, operation: Operation, delay: Duration) -> Self {
        self.latency.insert(operation, delay);
        self
    }

    /// Fail every operation as if the store could not be reached
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// `(database, sql)` of every `run_query` call, in call order
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Number of calls that started
    pub fn calls_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of calls that ran to completion
    pub fn calls_finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    async fn enter(&self, operation: Operation) -> StoreResult<()> {
        self.started.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.latency.get(&operation) {
            tokio::time::sleep(*delay).await;
        }

        self.finished.fetch_add(1, Ordering::SeqCst);

        if self.unreachable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        match self.failures.get(&operation) {
            Some(message) => Err(StoreError::Query(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        self.enter(Operation::ListDatabases).await?;
        Ok(self.databases.clone())
    }

    async fn list_tables(&self, database: &str) -> StoreResult<Vec<String>> {
        self.enter(Operation::ListTables).await?;
        Ok(self.tables.get(database).cloned().unwrap_or_default())
    }

    async fn run_query(&self, database: &str, sql: &str) -> StoreResult<RawResultSet> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((database.to_string(), sql.to_string()));
        }
        self.enter(Operation::RunQuery).await?;

        self.results
            .get(sql)
            .cloned()
            .ok_or_else(|| StoreError::Query(format!("error parsing query: {}", sql)))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.enter(Operation::Ping).await
    }

    async fn labels(&self, _sql: &str) -> Vec<Pair> {
        self.labels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses() {
        let store = MemoryStore::new()
            .databases(&["b", "a"])
            .tables("a", &["cpu"])
            .scalar("SELECT 1", "v", "1");

        assert_eq!(store.list_databases().await.unwrap(), vec!["b", "a"]);
        assert_eq!(store.list_tables("a").await.unwrap(), vec!["cpu"]);
        assert!(store.list_tables("zzz").await.unwrap().is_empty());
        assert_eq!(store.run_query("a", "SELECT 1").await.unwrap().first_column(), vec!["1"]);
        assert!(store.run_query("a", "SELECT 2").await.is_err());

        assert_eq!(store.queries().len(), 2);
        assert_eq!(store.calls_started(), store.calls_finished());
    }

    #[tokio::test]
    async fn test_failures() {
        let store = MemoryStore::new().fail(Operation::Ping, "auth failed");
        assert!(matches!(store.ping().await, Err(StoreError::Query(_))));

        let store = MemoryStore::new().unreachable();
        let err = store.list_databases().await.unwrap_err();
        assert!(err.is_connectivity());
    }
}
