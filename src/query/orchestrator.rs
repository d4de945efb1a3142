//! Query Orchestrator
//!
//! Runs a logical query against a store while gathering metadata
//! concurrently, then assembles a single result.
//!
//! # Execution
//!
//! ```text
//!            ┌─ list databases ───────────────────────┐
//!            ├─ [resolve current database] → tables ──┤
//! execute ───┼─ labels (body only) ────────────────────┼─ join → fold → QueryResult
//!            └─ translate → run main query (body only) ┘
//! ```
//!
//! Every worker is a future owned by this call and returns its own result
//! slot; all of them are joined before the call returns on every path, and
//! the slots are folded into disjoint fields of the result afterwards.
//! Metadata failures are logged and leave their field empty. Only the main
//! query (or cancellation) fails the call, and even then the gathered
//! metadata travels with the error.

use crate::dialect::{Dialect, CURRENT_DATABASE};
use crate::query::builder::rows_from_result_set;
use crate::query::error::{ExecuteError, ExecuteResult};
use crate::query::types::{LogicalQuery, Pair, QueryResult, Row, NATIVE_SQL_LABEL};
use crate::store::{StoreClient, StoreError, StoreResult};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Current database and its tables, fetched by one worker
struct ScopeSlot {
    current: StoreResult<String>,
    tables: StoreResult<Vec<String>>,
}

/// Rows and elapsed time of the main query
struct MainSlot {
    rows: Vec<Row>,
    elapsed: Duration,
}

/// Orchestrates translation, execution and metadata gathering
pub struct QueryOrchestrator {
    store: Arc<dyn StoreClient>,
    dialect: Dialect,
}

impl QueryOrchestrator {
    pub fn new(store: Arc<dyn StoreClient>, dialect: Dialect) -> Self {
        Self { store, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn store(&self) -> &Arc<dyn StoreClient> {
        &self.store
    }

    /// Execute a logical query
    pub async fn execute(&self, query: &LogicalQuery) -> ExecuteResult<QueryResult> {
        self.execute_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Execute a logical query, aborting in-flight store calls once `cancel`
    /// fires.
    ///
    /// A cancelled call still waits for every worker to wind down and
    /// returns the partial result inside the error.
    pub async fn execute_with_cancel(
        &self,
        query: &LogicalQuery,
        cancel: &CancellationToken,
    ) -> ExecuteResult<QueryResult> {
        let mut result = QueryResult::default();

        let databases = self.fetch_databases(cancel);
        let scope = self.fetch_scope(&query.target_database, cancel);

        if query.is_metadata_only() {
            let (databases, scope) = tokio::join!(databases, scope);
            fold_metadata(&mut result, databases, scope);

            if cancel.is_cancelled() {
                return Err(ExecuteError::new(result, StoreError::Cancelled));
            }
            return Ok(result);
        }

        let native_sql = self
            .dialect
            .translate_in(&query.body, &query.target_database);
        tracing::debug!(
            dialect = %self.dialect,
            logical = %query.body,
            native = %native_sql,
            "translated query"
        );

        let labels = self.fetch_labels(&native_sql, cancel);
        let main = self.run_main(&query.target_database, &native_sql, cancel);

        let (databases, scope, labels, main) = tokio::join!(databases, scope, labels, main);
        fold_metadata(&mut result, databases, scope);
        result.meta.labels = labels;

        match main {
            Ok(MainSlot { rows, elapsed }) => {
                result.rows = rows;
                result.meta.duration_text = format!("{:?}", elapsed);
                Ok(result)
            }
            Err(err) => Err(ExecuteError::new(result, err)),
        }
    }

    async fn fetch_databases(&self, cancel: &CancellationToken) -> StoreResult<Vec<String>> {
        let mut databases = guarded(cancel, self.store.list_databases()).await?;
        databases.sort();
        Ok(databases)
    }

    /// Resolve the current database when the caller did not name one, then
    /// list its tables. Tables are listed even if resolution failed.
    async fn fetch_scope(&self, target_database: &str, cancel: &CancellationToken) -> ScopeSlot {
        let current = if target_database.is_empty() {
            self.resolve_current_database(cancel).await
        } else {
            Ok(target_database.to_string())
        };

        let database = current.as_deref().unwrap_or_default();
        let tables = guarded(cancel, self.store.list_tables(database)).await;

        ScopeSlot { current, tables }
    }

    async fn resolve_current_database(&self, cancel: &CancellationToken) -> StoreResult<String> {
        let sql = self.dialect.translate(CURRENT_DATABASE);
        let raw = guarded(cancel, self.store.run_query("", &sql)).await?;
        let rows = rows_from_result_set(&raw);

        Ok(rows
            .first()
            .and_then(|row| row.data.first())
            .map(|pair| pair.value.clone())
            .unwrap_or_default())
    }

    /// Store labels followed by the native SQL trace pair
    async fn fetch_labels(&self, native_sql: &str, cancel: &CancellationToken) -> Vec<Pair> {
        let mut labels = tokio::select! {
            biased;
            _ = cancel.cancelled() => Vec::new(),
            labels = self.store.labels(native_sql) => labels,
        };
        labels.push(Pair::new(NATIVE_SQL_LABEL, native_sql));
        labels
    }

    async fn run_main(
        &self,
        database: &str,
        native_sql: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<MainSlot> {
        let started = Instant::now();
        let raw = guarded(cancel, self.store.run_query(database, native_sql)).await?;
        let elapsed = started.elapsed();

        Ok(MainSlot {
            rows: rows_from_result_set(&raw),
            elapsed,
        })
    }
}

/// Race a store call against cancellation
async fn guarded<T, F>(cancel: &CancellationToken, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        result = call => result,
    }
}

/// Fold metadata worker slots into the result. Failures are logged and
/// leave the field at its default.
fn fold_metadata(
    result: &mut QueryResult,
    databases: StoreResult<Vec<String>>,
    scope: ScopeSlot,
) {
    match databases {
        Ok(databases) => result.meta.databases = databases,
        Err(err) => tracing::warn!(error = %err, "failed to query databases"),
    }

    match scope.current {
        Ok(current) => result.meta.current_database = current,
        Err(err) => tracing::warn!(error = %err, "failed to query current database"),
    }

    match scope.tables {
        Ok(tables) => result.meta.tables = tables,
        Err(err) => tracing::warn!(
            error = %err,
            database = %result.meta.current_database,
            "failed to query tables"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{SELECT_TABLE_LIMITED, SHOW_TABLES};
    use crate::store::{MemoryStore, Operation, RawResultSet, RawSeries};
    use serde_json::json;

    fn cpu_series() -> RawResultSet {
        RawResultSet::from_series(vec![RawSeries::new(
            &["time", "usage"],
            vec![vec![json!("t0"), json!(0.5)], vec![json!("t1"), json!(0.7)]],
        )])
    }

    fn base_store() -> MemoryStore {
        MemoryStore::new()
            .databases(&["telegraf", "_internal", "metrics"])
            .tables("telegraf", &["cpu", "mem"])
            .tables("metrics", &["disk"])
            .result("SELECT * FROM cpu", cpu_series())
    }

    fn orchestrator(store: MemoryStore) -> (QueryOrchestrator, Arc<MemoryStore>) {
        let store = Arc::new(store);
        let orchestrator = QueryOrchestrator::new(store.clone(), Dialect::OpenGemini);
        (orchestrator, store)
    }

    #[tokio::test]
    async fn test_metadata_only() {
        let (orchestrator, store) = orchestrator(base_store());

        let result = orchestrator
            .execute(&LogicalQuery::metadata("telegraf"))
            .await
            .unwrap();

        assert_eq!(result.meta.databases, vec!["_internal", "metrics", "telegraf"]);
        assert_eq!(result.meta.current_database, "telegraf");
        assert_eq!(result.meta.tables, vec!["cpu", "mem"]);
        assert!(result.rows.is_empty());
        assert!(result.meta.labels.is_empty());
        assert!(result.meta.duration_text.is_empty());
        // No query was executed
        assert!(store.queries().is_empty());
    }

    #[tokio::test]
    async fn test_query_rows_and_meta() {
        let (orchestrator, store) = orchestrator(base_store());

        let result = orchestrator
            .execute(&LogicalQuery::new("telegraf", "@selectTable_cpu"))
            .await
            .unwrap();

        assert_eq!(result.rows.len(), 4);
        assert_eq!(result.rows[0].data, vec![Pair::new("time", "t0")]);
        assert_eq!(result.rows[3].data, vec![Pair::new("usage", "0.7")]);
        assert!(!result.meta.duration_text.is_empty());
        assert_eq!(result.meta.tables, vec!["cpu", "mem"]);
        assert_eq!(
            store.queries(),
            vec![("telegraf".to_string(), "SELECT * FROM cpu".to_string())]
        );
    }

    #[tokio::test]
    async fn test_native_sql_label() {
        let store = base_store().result("SELECT * FROM cpu LIMIT 100", cpu_series());
        let (orchestrator, store) = orchestrator(store);

        let body = format!("{}cpu", SELECT_TABLE_LIMITED);
        let result = orchestrator
            .execute(&LogicalQuery::new("telegraf", body))
            .await
            .unwrap();

        let executed = &store.queries()[0].1;
        assert_eq!(result.meta.labels.len(), 1);
        assert_eq!(result.meta.labels[0].key, NATIVE_SQL_LABEL);
        assert_eq!(&result.meta.labels[0].value, executed);
        assert_eq!(result.meta.native_sql(), Some("SELECT * FROM cpu LIMIT 100"));
    }

    #[tokio::test]
    async fn test_store_labels_precede_native_sql() {
        let store = base_store().labels(vec![Pair::new("measurement", "cpu")]);
        let (orchestrator, _store) = orchestrator(store);

        let result = orchestrator
            .execute(&LogicalQuery::new("telegraf", "SELECT * FROM cpu"))
            .await
            .unwrap();

        assert_eq!(
            result.meta.labels,
            vec![
                Pair::new("measurement", "cpu"),
                Pair::new(NATIVE_SQL_LABEL, "SELECT * FROM cpu"),
            ]
        );
    }

    #[tokio::test]
    async fn test_database_failure_does_not_block_query() {
        let store = base_store().fail(Operation::ListDatabases, "permission denied");
        let (orchestrator, _store) = orchestrator(store);

        let result = orchestrator
            .execute(&LogicalQuery::new("telegraf", "SELECT * FROM cpu"))
            .await
            .unwrap();

        assert!(result.meta.databases.is_empty());
        assert_eq!(result.rows.len(), 4);
        assert_eq!(result.meta.tables, vec!["cpu", "mem"]);
    }

    #[tokio::test]
    async fn test_table_failure_is_absorbed() {
        let store = base_store().fail(Operation::ListTables, "measurement scan failed");
        let (orchestrator, _store) = orchestrator(store);

        let result = orchestrator
            .execute(&LogicalQuery::metadata("telegraf"))
            .await
            .unwrap();

        assert!(result.meta.tables.is_empty());
        assert_eq!(result.meta.current_database, "telegraf");
        assert_eq!(result.meta.databases.len(), 3);
    }

    #[tokio::test]
    async fn test_main_query_failure_keeps_metadata() {
        let store = base_store()
            .fail(Operation::RunQuery, "measurement not found")
            // Metadata is slower than the failing query and must still land
            .latency(Operation::ListDatabases, Duration::from_millis(50))
            .latency(Operation::ListTables, Duration::from_millis(50));
        let (orchestrator, _store) = orchestrator(store);

        let err = orchestrator
            .execute(&LogicalQuery::new("telegraf", "SELECT * FROM nope"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "measurement not found");
        assert_eq!(err.partial.meta.databases, vec!["_internal", "metrics", "telegraf"]);
        assert_eq!(err.partial.meta.tables, vec!["cpu", "mem"]);
        assert!(err.partial.rows.is_empty());
        assert_eq!(err.partial.meta.native_sql(), Some("SELECT * FROM nope"));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_fatal() {
        let (orchestrator, _store) = orchestrator(MemoryStore::new().unreachable());

        let err = orchestrator
            .execute(&LogicalQuery::new("telegraf", "SELECT 1"))
            .await
            .unwrap_err();

        assert!(err.source.is_connectivity());
        assert!(err.partial.meta.databases.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_metadata_only_is_not_fatal() {
        let (orchestrator, _store) = orchestrator(MemoryStore::new().unreachable());

        let result = orchestrator
            .execute(&LogicalQuery::metadata(""))
            .await
            .unwrap();

        assert!(result.meta.databases.is_empty());
        assert!(result.meta.tables.is_empty());
        assert!(result.meta.current_database.is_empty());
    }

    #[tokio::test]
    async fn test_current_database_resolved_when_target_empty() {
        let store = base_store().scalar("SELECT CURRENT_STORAGE_GROUP", "name", "metrics");
        let (orchestrator, store) = orchestrator(store);

        let result = orchestrator
            .execute(&LogicalQuery::metadata(""))
            .await
            .unwrap();

        assert_eq!(result.meta.current_database, "metrics");
        assert_eq!(result.meta.tables, vec!["disk"]);
        assert_eq!(
            store.queries(),
            vec![(String::new(), "SELECT CURRENT_STORAGE_GROUP".to_string())]
        );
    }

    #[tokio::test]
    async fn test_current_database_uses_dialect() {
        let store = Arc::new(
            base_store().scalar("SELECT current_database() as name", "name", "telegraf"),
        );
        let orchestrator = QueryOrchestrator::new(store.clone(), Dialect::Postgres);

        let result = orchestrator
            .execute(&LogicalQuery::metadata(""))
            .await
            .unwrap();

        assert_eq!(result.meta.current_database, "telegraf");
        assert_eq!(result.meta.tables, vec!["cpu", "mem"]);
    }

    #[tokio::test]
    async fn test_current_database_failure_still_lists_tables() {
        let store = base_store().tables("", &["orphan"]);
        let (orchestrator, _store) = orchestrator(store);

        // No scripted answer for the current-database statement
        let result = orchestrator
            .execute(&LogicalQuery::metadata(""))
            .await
            .unwrap();

        assert!(result.meta.current_database.is_empty());
        assert_eq!(result.meta.tables, vec!["orphan"]);
    }

    #[tokio::test]
    async fn test_passthrough_of_native_sql() {
        let sql = "SELECT mean(usage) FROM cpu GROUP BY time(1m)";
        let store = base_store().result(sql, cpu_series());
        let (orchestrator, store) = orchestrator(store);

        orchestrator
            .execute(&LogicalQuery::new("telegraf", sql))
            .await
            .unwrap();

        assert_eq!(store.queries()[0].1, sql);
    }

    #[tokio::test]
    async fn test_show_tables_bound_to_target_database() {
        let bound = "SELECT * FROM system_schema.tables WHERE keyspace_name = 'telegraf'";
        let store = base_store().result(bound, cpu_series());
        let (orchestrator, store) = orchestrator(store);

        let result = orchestrator
            .execute(&LogicalQuery::new("telegraf", SHOW_TABLES))
            .await
            .unwrap();

        assert_eq!(store.queries()[0], ("telegraf".to_string(), bound.to_string()));
        assert_eq!(result.meta.native_sql(), Some(bound));
    }

    #[tokio::test]
    async fn test_show_tables_without_target_keeps_slot() {
        let template = Dialect::OpenGemini.translate(SHOW_TABLES);
        let store = base_store()
            .scalar("SELECT CURRENT_STORAGE_GROUP", "name", "telegraf")
            .result(template.clone(), cpu_series());
        let (orchestrator, store) = orchestrator(store);

        orchestrator
            .execute(&LogicalQuery::new("", SHOW_TABLES))
            .await
            .unwrap();

        assert!(store
            .queries()
            .iter()
            .any(|(database, sql)| database.is_empty() && *sql == template));
    }

    #[tokio::test]
    async fn test_all_workers_joined_before_return() {
        let store = base_store()
            .latency(Operation::ListDatabases, Duration::from_millis(80))
            .latency(Operation::ListTables, Duration::from_millis(40));
        let (orchestrator, store) = orchestrator(store);

        orchestrator
            .execute(&LogicalQuery::new("telegraf", "SELECT * FROM cpu"))
            .await
            .unwrap();
        assert_eq!(store.calls_started(), 3);
        assert_eq!(store.calls_finished(), 3);

        orchestrator
            .execute(&LogicalQuery::metadata("telegraf"))
            .await
            .unwrap();
        assert_eq!(store.calls_started(), 5);
        assert_eq!(store.calls_finished(), 5);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_calls() {
        let store = base_store().latency(Operation::RunQuery, Duration::from_secs(30));
        let (orchestrator, _store) = orchestrator(store);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            orchestrator.execute_with_cancel(&LogicalQuery::new("telegraf", "SELECT * FROM cpu"), &cancel),
        )
        .await
        .expect("cancellation should abort the query promptly");

        let err = outcome.unwrap_err();
        assert!(err.is_cancelled());
        // Fast metadata finished before the cancel and is kept
        assert_eq!(err.partial.meta.databases.len(), 3);
        assert_eq!(err.partial.meta.tables, vec!["cpu", "mem"]);
    }

    #[tokio::test]
    async fn test_cancelled_metadata_only() {
        let store = base_store().latency(Operation::ListDatabases, Duration::from_secs(30));
        let (orchestrator, _store) = orchestrator(store);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = orchestrator
            .execute_with_cancel(&LogicalQuery::metadata("telegraf"), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(err.partial.meta.databases.is_empty());
        assert_eq!(err.partial.meta.current_database, "telegraf");
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_mix_results() {
        let store = MemoryStore::new()
            .databases(&["a", "b"])
            .tables("a", &["a_table"])
            .tables("b", &["b_table"])
            .scalar("SELECT * FROM a_table", "name", "from_a")
            .scalar("SELECT * FROM b_table", "name", "from_b")
            .latency(Operation::ListTables, Duration::from_millis(10));
        let orchestrator = Arc::new(QueryOrchestrator::new(Arc::new(store), Dialect::OpenGemini));

        let mut handles = Vec::new();
        for i in 0..16 {
            let orchestrator = Arc::clone(&orchestrator);
            let key = if i % 2 == 0 { "a" } else { "b" };
            handles.push(tokio::spawn(async move {
                let query = LogicalQuery::new(key, format!("@selectTable_{}_table", key));
                (key, orchestrator.execute(&query).await)
            }));
        }

        for handle in handles {
            let (key, result) = handle.await.unwrap();
            let result = result.unwrap();
            assert_eq!(result.meta.current_database, key);
            assert_eq!(result.meta.tables, vec![format!("{}_table", key)]);
            assert_eq!(result.first_value(), Some(format!("from_{}", key).as_str()));
            assert_eq!(
                result.meta.native_sql(),
                Some(format!("SELECT * FROM {}_table", key).as_str())
            );
        }
    }
}
