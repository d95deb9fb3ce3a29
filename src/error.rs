use thiserror::Error;

/// Database failures surfaced by the import. Row- and file-level problems
/// never become an `ImportError`; they are logged and tallied instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("connecting to PostgreSQL at {host}:{port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: sqlx::Error,
    },
    #[error("creating tables")]
    Schema(#[source] sqlx::Error),
    #[error("inserting into table {table}")]
    Insert {
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing field at index {index}")]
    MissingField { index: usize },
}
