use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Malformed query '{input}': expected TABLE.COLUMN:VALUE")]
    MalformedQuery { input: String },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    /// Composite keys cannot be followed by single-column matching. Resolvers
    /// build this to report the skip; it never aborts a run.
    #[error("Unsupported relation key on {table}: composite key ({})", columns.join(", "))]
    UnsupportedRelationKey { table: String, columns: Vec<String> },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CopyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_query_mentions_expected_shape() {
        let err = CopyError::MalformedQuery { input: "users.id".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("users.id"));
        assert!(msg.contains("TABLE.COLUMN:VALUE"));
    }

    #[test]
    fn unsupported_key_lists_columns() {
        let err = CopyError::UnsupportedRelationKey {
            table: "line_items".to_string(),
            columns: vec!["order_id".to_string(), "line_no".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unsupported relation key on line_items: composite key (order_id, line_no)"
        );
    }

    #[test]
    fn rusqlite_errors_convert() {
        let err: CopyError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, CopyError::Database(_)));
    }
}
