//! Placeholder tokens
//!
//! The dialect-neutral mini-language emitted by the frontend. Tokens are
//! matched case-sensitively and must stay byte-for-byte stable: existing
//! callers already emit them.

/// `@selectTable_<table>` - select every column of a table
pub const SELECT_TABLE: &str = "@selectTable_";

/// `@selectTableLImit100_<table>` - same as [`SELECT_TABLE`] capped at 100 rows
pub const SELECT_TABLE_LIMITED: &str = "@selectTableLImit100_";

/// `@describeTable_<keyspace>:<table>` - column introspection
pub const DESCRIBE_TABLE: &str = "@describeTable_";

/// List the databases visible to the connection
pub const SHOW_DATABASES: &str = "@showDatabases";

/// List the tables (measurements) of a database
pub const SHOW_TABLES: &str = "@showTables";

/// Name of the database the connection is using
pub const CURRENT_DATABASE: &str = "@currentDB";

/// Separator between keyspace and table in a describe-table token
pub const KEYSPACE_SEPARATOR: char = ':';

/// Row cap applied by [`SELECT_TABLE_LIMITED`]
pub const SELECT_LIMIT: usize = 100;

/// A recognised placeholder, borrowing its parameter from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'a> {
    SelectTable(&'a str),
    SelectTableLimited(&'a str),
    ShowDatabases,
    ShowTables,
    CurrentDatabase,
    /// Raw `keyspace:table` parameter, not yet split
    DescribeTable(&'a str),
}

impl<'a> Placeholder<'a> {
    /// Recognise a placeholder in `query`.
    ///
    /// Prefixes and exact tokens are tried in a fixed priority order;
    /// `None` means the query is not a placeholder and should be passed
    /// through untouched.
    pub fn parse(query: &'a str) -> Option<Self> {
        if let Some(table) = query.strip_prefix(SELECT_TABLE) {
            Some(Placeholder::SelectTable(table))
        } else if let Some(table) = query.strip_prefix(SELECT_TABLE_LIMITED) {
            Some(Placeholder::SelectTableLimited(table))
        } else if query == SHOW_DATABASES {
            Some(Placeholder::ShowDatabases)
        } else if query == SHOW_TABLES {
            Some(Placeholder::ShowTables)
        } else if query == CURRENT_DATABASE {
            Some(Placeholder::CurrentDatabase)
        } else {
            query
                .strip_prefix(DESCRIBE_TABLE)
                .map(Placeholder::DescribeTable)
        }
    }
}

/// Split a describe-table parameter into `(keyspace, table)`.
///
/// Anything other than exactly two parts is rejected.
pub fn split_keyspace_table(param: &str) -> Option<(&str, &str)> {
    let mut parts = param.split(KEYSPACE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(keyspace), Some(table), None) => Some((keyspace, table)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixes() {
        assert_eq!(
            Placeholder::parse("@selectTable_orders"),
            Some(Placeholder::SelectTable("orders"))
        );
        assert_eq!(
            Placeholder::parse("@selectTableLImit100_orders"),
            Some(Placeholder::SelectTableLimited("orders"))
        );
        assert_eq!(
            Placeholder::parse("@describeTable_ks:tbl"),
            Some(Placeholder::DescribeTable("ks:tbl"))
        );
    }

    #[test]
    fn test_parse_exact_tokens() {
        assert_eq!(Placeholder::parse("@showDatabases"), Some(Placeholder::ShowDatabases));
        assert_eq!(Placeholder::parse("@showTables"), Some(Placeholder::ShowTables));
        assert_eq!(Placeholder::parse("@currentDB"), Some(Placeholder::CurrentDatabase));

        // Exact tokens do not match as prefixes
        assert_eq!(Placeholder::parse("@showTables_x"), None);
        assert_eq!(Placeholder::parse(" @showDatabases"), None);
    }

    #[test]
    fn test_parse_native_sql() {
        assert_eq!(Placeholder::parse("SELECT * FROM cpu"), None);
        assert_eq!(Placeholder::parse(""), None);
        // Tokens are case-sensitive
        assert_eq!(Placeholder::parse("@selecttable_orders"), None);
    }

    #[test]
    fn test_split_keyspace_table() {
        assert_eq!(split_keyspace_table("ks:tbl"), Some(("ks", "tbl")));
        assert_eq!(split_keyspace_table("ks:"), Some(("ks", "")));
        assert_eq!(split_keyspace_table("malformed"), None);
        assert_eq!(split_keyspace_table("a:b:c"), None);
    }
}
