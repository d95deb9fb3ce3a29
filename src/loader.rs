//! Multi-row inserts with optional conflict-skip.
//!
//! Identifiers are always double-quoted through [`quote_ident`]; values are
//! always bound parameters. Large batches are split into several statements
//! so no statement exceeds PostgreSQL's bind parameter limit, all inside the
//! same transaction.

use itertools::Itertools;
use log::{debug, error, info, warn};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crate::{
    dataset::{Cell, Row},
    error::ImportError,
};

pub const MAX_BIND_PARAMS: usize = 65_535;

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMS / column_count.max(1)).max(1)
}

pub fn insert_statement<'a>(
    table: &str,
    columns: &[&str],
    rows: &'a [Row],
    conflict_column: Option<&str>,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        quote_ident(table),
        columns.iter().map(|c| quote_ident(c)).join(", ")
    ));
    builder.push_values(rows, |mut values, row| {
        for cell in row {
            match cell {
                Cell::Text(text) => values.push_bind(text.as_str()),
                Cell::Integer(value) => values.push_bind(*value),
                Cell::Float(value) => values.push_bind(*value),
            };
        }
    });
    if let Some(column) = conflict_column {
        builder.push(format!(" ON CONFLICT ({}) DO NOTHING", quote_ident(column)));
    }
    builder
}

/// Inserts `rows` into `table` in one transaction and returns the number of
/// rows actually written (conflict-skipped rows are not counted).
pub async fn bulk_insert(
    conn: &mut PgConnection,
    table: &str,
    columns: &[&str],
    rows: &[Row],
    conflict_column: Option<&str>,
) -> Result<u64, ImportError> {
    if rows.is_empty() {
        info!("No data provided for insertion into {table}.");
        return Ok(0);
    }
    let insert_error = |source: sqlx::Error| ImportError::Insert {
        table: table.to_string(),
        source,
    };

    let mut tx = conn.begin().await.map_err(insert_error)?;
    match insert_chunks(&mut tx, table, columns, rows, conflict_column).await {
        Ok(affected) => {
            tx.commit().await.map_err(insert_error)?;
            info!("Inserted data into table {table}. {affected} rows affected.");
            Ok(affected)
        }
        Err(err) => {
            error!("Error inserting data into table {table}: {err}");
            if let Err(rollback) = tx.rollback().await {
                warn!("Rolling back inserts into {table} failed: {rollback}");
            }
            Err(insert_error(err))
        }
    }
}

async fn insert_chunks(
    conn: &mut PgConnection,
    table: &str,
    columns: &[&str],
    rows: &[Row],
    conflict_column: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let mut affected = 0u64;
    for chunk in rows.chunks(rows_per_statement(columns.len())) {
        let mut builder = insert_statement(table, columns, chunk, conflict_column);
        debug!("{} ({} rows)", builder.sql(), chunk.len());
        affected += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str) -> Row {
        vec![Cell::Text(id.to_string()), Cell::Integer(Some(13))]
    }

    #[test]
    fn quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("courses"), "\"courses\"");
        assert_eq!(quote_ident("_minus3"), "\"_minus3\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn insert_statement_quotes_identifiers_and_binds_values() {
        let rows = vec![course("01005"), course("02101")];
        let builder = insert_statement("courses", &["id", "duration"], &rows, None);
        let sql = builder.sql();
        assert!(sql.starts_with("INSERT INTO \"courses\" (\"id\", \"duration\") VALUES"));
        assert!(sql.contains("$1"));
        assert!(sql.contains("$4"));
        assert!(!sql.contains("01005"));
        assert!(!sql.contains("ON CONFLICT"));
    }

    #[test]
    fn insert_statement_appends_conflict_skip() {
        let rows = vec![course("01005")];
        let builder = insert_statement("courses", &["id", "duration"], &rows, Some("id"));
        assert!(builder.sql().ends_with(" ON CONFLICT (\"id\") DO NOTHING"));
    }

    #[test]
    fn rows_per_statement_respects_bind_limit() {
        assert_eq!(rows_per_statement(15), 4369);
        assert!(rows_per_statement(15) * 15 <= MAX_BIND_PARAMS);
        assert_eq!(rows_per_statement(0), MAX_BIND_PARAMS);
    }
}
