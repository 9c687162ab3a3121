//! SQL schema generation with customizable table prefixes.
//!
//! The backend needs a single table, `{prefix}kv`, holding one row per
//! stored key. All names are prefixed with a configurable string so several
//! isolated stores can share one SQLite database.
//!
//! Prefixes must contain only alphanumeric characters and underscores.

use crate::error::{Result, SqliteError};

/// Validates that a table prefix contains only alphanumeric characters and underscores.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Name of the key-value table for `prefix`.
pub(crate) fn kv_table(prefix: &str) -> String {
    format!("{prefix}kv")
}

/// Generates the `CREATE TABLE` statement for the given prefix.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix is empty or contains
/// characters other than alphanumerics and underscores.
pub fn generate_schema_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    let sql = format!(
        r#"
CREATE TABLE IF NOT EXISTS {prefix}kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#
    );

    Ok(sql)
}

/// Generates the `DROP TABLE` statement for the given prefix.
pub fn generate_drop_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;
    Ok(format!("DROP TABLE IF EXISTS {prefix}kv;\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_prefix() {
        assert!(validate_prefix("sb_").is_ok());
        assert!(validate_prefix("Book2_").is_ok());
    }

    #[test]
    fn test_invalid_prefix_empty() {
        assert!(validate_prefix("").is_err());
    }

    #[test]
    fn test_invalid_prefix_special_chars() {
        assert!(validate_prefix("sb-").is_err());
        assert!(validate_prefix("drop;--").is_err());
        assert!(validate_prefix("a b").is_err());
    }

    #[test]
    fn test_generate_schema_sql_uses_prefix() {
        let sql = generate_schema_sql("sb_").unwrap();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS sb_kv"));
        assert!(sql.contains("key TEXT PRIMARY KEY"));
    }

    #[test]
    fn test_generate_drop_sql() {
        assert_eq!(generate_drop_sql("sb_").unwrap(), "DROP TABLE IF EXISTS sb_kv;\n");
        assert!(generate_drop_sql("bad prefix").is_err());
    }

    #[test]
    fn test_schema_sql_executes() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(&generate_schema_sql("sb_").unwrap()).unwrap();
        conn.execute_batch(&generate_schema_sql("sb_").unwrap()).unwrap();
        conn.execute_batch(&generate_drop_sql("sb_").unwrap()).unwrap();
    }
}
