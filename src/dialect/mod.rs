//! Dialect Translator
//!
//! Rewrites dialect-neutral placeholder queries into native SQL for one of
//! the supported backend dialects:
//!
//! - **MySql**: relational SQL
//! - **Postgres**: postgres-flavored SQL, quoted identifiers
//! - **OpenGemini**: time-series native (the default)
//!
//! Translation is total: anything that is not a recognised placeholder,
//! including malformed placeholders, comes back unchanged so callers can
//! hand already-native SQL straight through.
//!
//! # Example
//!
//! ```rust
//! use quarry::dialect::Dialect;
//!
//! let dialect = Dialect::from_identifier("postgres");
//! assert_eq!(dialect.translate("@selectTable_orders"), r#"SELECT * FROM "orders""#);
//! assert_eq!(dialect.translate("SELECT 1"), "SELECT 1");
//! ```

mod token;

pub use token::{
    split_keyspace_table, Placeholder, CURRENT_DATABASE, DESCRIBE_TABLE, KEYSPACE_SEPARATOR,
    SELECT_LIMIT, SELECT_TABLE, SELECT_TABLE_LIMITED, SHOW_DATABASES, SHOW_TABLES,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot in show-tables statements that takes the database/keyspace name
pub const DATABASE_SLOT: &str = "%s";

/// Backend SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Dialect {
    MySql,
    Postgres,
    #[default]
    OpenGemini,
}

impl Dialect {
    /// All dialects, in identifier order
    pub const ALL: [Dialect; 3] = [Dialect::MySql, Dialect::Postgres, Dialect::OpenGemini];

    /// Resolve a dialect identifier. Unknown identifiers fall back to
    /// [`Dialect::OpenGemini`].
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "mysql" => Dialect::MySql,
            "postgres" | "postgresql" => Dialect::Postgres,
            _ => Dialect::OpenGemini,
        }
    }

    /// Canonical identifier
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::OpenGemini => "opengemini",
        }
    }

    /// Translate a logical query into native SQL for this dialect.
    pub fn translate(&self, query: &str) -> String {
        Placeholder::parse(query)
            .and_then(|placeholder| self.render(placeholder))
            .unwrap_or_else(|| query.to_string())
    }

    /// Translate a logical query scoped to `database`.
    ///
    /// Only a show-tables placeholder has its database slot filled; every
    /// other query, native SQL included, translates exactly as
    /// [`Dialect::translate`] would. An empty `database` leaves the slot in
    /// place.
    pub fn translate_in(&self, query: &str, database: &str) -> String {
        let native_sql = self.translate(query);
        match Placeholder::parse(query) {
            Some(Placeholder::ShowTables) if !database.is_empty() => {
                bind_database(&native_sql, database)
            }
            _ => native_sql,
        }
    }

    /// Render a placeholder, or `None` when this dialect has no rendering
    /// for it (the caller then passes the input through).
    fn render(&self, placeholder: Placeholder<'_>) -> Option<String> {
        let sql = match placeholder {
            Placeholder::SelectTable(table) => self.select_all(table),
            Placeholder::SelectTableLimited(table) => {
                format!("{} LIMIT {}", self.select_all(table), SELECT_LIMIT)
            }
            Placeholder::ShowDatabases => self.show_databases().to_string(),
            Placeholder::ShowTables => self.show_tables().to_string(),
            Placeholder::CurrentDatabase => self.current_database().to_string(),
            Placeholder::DescribeTable(param) => return self.describe_table(param),
        };
        Some(sql)
    }

    fn select_all(&self, table: &str) -> String {
        match self {
            Dialect::Postgres => format!("SELECT * FROM \"{}\"", table),
            Dialect::MySql | Dialect::OpenGemini => format!("SELECT * FROM {}", table),
        }
    }

    fn show_databases(&self) -> &'static str {
        match self {
            Dialect::MySql => "SHOW DATABASES",
            Dialect::Postgres => "SELECT table_catalog as name FROM information_schema.tables",
            Dialect::OpenGemini => "DESCRIBE KEYSPACES",
        }
    }

    fn show_tables(&self) -> &'static str {
        match self {
            Dialect::MySql => "SHOW TABLES",
            Dialect::Postgres => {
                "SELECT table_name FROM information_schema.tables WHERE table_catalog = '%s' \
                 and table_schema != 'pg_catalog' and table_schema != 'information_schema'"
            }
            Dialect::OpenGemini => "SELECT * FROM system_schema.tables WHERE keyspace_name = '%s'",
        }
    }

    fn current_database(&self) -> &'static str {
        match self {
            Dialect::MySql => "SELECT DATABASE() as name",
            Dialect::Postgres => "SELECT current_database() as name",
            Dialect::OpenGemini => "SELECT CURRENT_STORAGE_GROUP",
        }
    }

    fn describe_table(&self, param: &str) -> Option<String> {
        match self {
            Dialect::OpenGemini => {
                let (keyspace, table) = split_keyspace_table(param)?;
                Some(format!(
                    "SELECT * FROM system_schema.columns WHERE keyspace_name = '{}' AND table_name = '{}'",
                    keyspace, table
                ))
            }
            Dialect::MySql | Dialect::Postgres => None,
        }
    }
}

/// Fill the database slot of a rendered show-tables statement
fn bind_database(native_sql: &str, database: &str) -> String {
    native_sql.replace(DATABASE_SLOT, database)
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Dialect {
    fn from(identifier: &str) -> Self {
        Dialect::from_identifier(identifier)
    }
}

impl From<String> for Dialect {
    fn from(identifier: String) -> Self {
        Dialect::from_identifier(&identifier)
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.name().to_string()
    }
}
