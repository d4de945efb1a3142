//! Query data model
//!
//! Types are built fresh for every orchestration call and serialize to the
//! JSON shape the frontend expects.

use serde::{Deserialize, Serialize};

/// Key of the label recording the native SQL that was executed
pub const NATIVE_SQL_LABEL: &str = "_native_sql";

/// Dialect-neutral request: a target database and an optional body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalQuery {
    /// Database to run against. Empty means "whatever the store is using".
    #[serde(default, rename = "key")]
    pub target_database: String,
    /// Placeholder token or native SQL. Empty means metadata only.
    #[serde(default, rename = "sql")]
    pub body: String,
}

impl LogicalQuery {
    pub fn new(target_database: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            target_database: target_database.into(),
            body: body.into(),
        }
    }

    /// Query with no body: only metadata is gathered
    pub fn metadata(target_database: impl Into<String>) -> Self {
        Self::new(target_database, "")
    }

    pub fn is_metadata_only(&self) -> bool {
        self.body.is_empty()
    }
}

/// A single labeled scalar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One result record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub data: Vec<Pair>,
}

impl Row {
    pub fn single(pair: Pair) -> Self {
        Self { data: vec![pair] }
    }

    /// Value of the first pair with this key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

/// Metadata envelope returned alongside the rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMeta {
    /// Always sorted
    pub databases: Vec<String>,
    pub tables: Vec<String>,
    pub current_database: String,
    pub labels: Vec<Pair>,
    /// Elapsed time of the main query, empty when none ran
    #[serde(rename = "duration")]
    pub duration_text: String,
}

impl ResultMeta {
    /// Native SQL recorded for this result, if a query body was present
    pub fn native_sql(&self) -> Option<&str> {
        self.labels
            .iter()
            .find(|p| p.key == NATIVE_SQL_LABEL)
            .map(|p| p.value.as_str())
    }
}

/// Result of one orchestration call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub meta: ResultMeta,
    #[serde(rename = "items")]
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First value of the first row, used when a statement returns a scalar
    pub fn first_value(&self) -> Option<&str> {
        self.rows
            .first()
            .and_then(|row| row.data.first())
            .map(|pair| pair.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_logical_query_wire_names() {
        let query: LogicalQuery =
            serde_json::from_value(json!({ "key": "telegraf", "sql": "@showTables" })).unwrap();
        assert_eq!(query, LogicalQuery::new("telegraf", "@showTables"));

        let query: LogicalQuery = serde_json::from_value(json!({})).unwrap();
        assert!(query.is_metadata_only());
        assert!(query.target_database.is_empty());
    }

    #[test]
    fn test_result_serialization() {
        let mut result = QueryResult::default();
        result.meta.current_database = "telegraf".to_string();
        result.meta.duration_text = "1.5ms".to_string();
        result.rows.push(Row::single(Pair::new("name", "cpu")));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["meta"]["currentDatabase"], "telegraf");
        assert_eq!(value["meta"]["duration"], "1.5ms");
        assert_eq!(value["meta"]["databases"], json!([]));
        assert_eq!(value["items"][0]["data"][0]["key"], "name");
        assert_eq!(value["items"][0]["data"][0]["value"], "cpu");
    }

    #[test]
    fn test_first_value() {
        let mut result = QueryResult::default();
        assert_eq!(result.first_value(), None);

        result.rows.push(Row::single(Pair::new("name", "db0")));
        result.rows.push(Row::single(Pair::new("name", "db1")));
        assert_eq!(result.first_value(), Some("db0"));
    }

    #[test]
    fn test_native_sql_label() {
        let mut meta = ResultMeta::default();
        assert_eq!(meta.native_sql(), None);

        meta.labels.push(Pair::new(NATIVE_SQL_LABEL, "SELECT 1"));
        assert_eq!(meta.native_sql(), Some("SELECT 1"));
    }
}
