//! Destinations the import pipeline writes into.

use log::{info, warn};
use sqlx::{Connection, PgConnection};

use crate::{config::DbConfig, dataset::Row, error::ImportError, loader, schema};

/// What the import pipeline needs from a database: the schema step and a
/// bulk insert with optional conflict-skip, each atomic on its own.
#[allow(async_fn_in_trait)]
pub trait ImportTarget {
    async fn ensure_schema(&mut self) -> Result<(), ImportError>;

    async fn bulk_insert(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: &[Row],
        conflict_column: Option<&str>,
    ) -> Result<u64, ImportError>;
}

/// A single PostgreSQL connection held for the duration of one import.
pub struct PgTarget {
    conn: PgConnection,
}

impl PgTarget {
    pub async fn connect(config: &DbConfig) -> Result<Self, ImportError> {
        info!(
            "Connecting to PostgreSQL database '{}' at {}:{} as {}",
            config.database(),
            config.host,
            config.port,
            config.user
        );
        let conn = PgConnection::connect_with(&config.connect_options())
            .await
            .map_err(|source| ImportError::Connect {
                host: config.host.clone(),
                port: config.port,
                source,
            })?;
        Ok(Self::new(conn))
    }

    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    pub async fn close(self) {
        match self.conn.close().await {
            Ok(()) => info!("Closed PostgreSQL connection."),
            Err(err) => warn!("Closing PostgreSQL connection failed: {err}"),
        }
    }
}

impl ImportTarget for PgTarget {
    async fn ensure_schema(&mut self) -> Result<(), ImportError> {
        schema::ensure_schema(&mut self.conn).await
    }

    async fn bulk_insert(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: &[Row],
        conflict_column: Option<&str>,
    ) -> Result<u64, ImportError> {
        loader::bulk_insert(&mut self.conn, table, columns, rows, conflict_column).await
    }
}

/// Accepts everything and writes nothing; reports every submitted row as
/// affected. Used to validate the CSV files without a database.
#[derive(Debug, Default)]
pub struct DryRunTarget;

impl ImportTarget for DryRunTarget {
    async fn ensure_schema(&mut self) -> Result<(), ImportError> {
        info!("Dry run: skipping schema creation");
        Ok(())
    }

    async fn bulk_insert(
        &mut self,
        table: &str,
        _columns: &[&str],
        rows: &[Row],
        _conflict_column: Option<&str>,
    ) -> Result<u64, ImportError> {
        info!("Dry run: {} row(s) ready for table {table}", rows.len());
        Ok(rows.len() as u64)
    }
}
