//! Table definitions for the three imported datasets.
//!
//! `courses` and `statistics` are created only when missing, so their rows
//! survive restarts. `admissions` is dropped and rebuilt on every run and
//! always reflects the latest CSV alone.

use log::{error, info, warn};
use sqlx::{Connection, PgConnection};

use crate::error::ImportError;

pub const CREATE_COURSES: &str = r#"
CREATE TABLE IF NOT EXISTS courses (
    id VARCHAR(10) PRIMARY KEY,
    language VARCHAR(100),
    degree VARCHAR(10),
    examtype VARCHAR(100),
    title VARCHAR(1000),
    etcs VARCHAR(4),
    duration INTEGER,
    department VARCHAR(100)
)"#;

pub const CREATE_STATISTICS: &str = r#"
CREATE TABLE IF NOT EXISTS statistics (
    id VARCHAR(10) PRIMARY KEY,
    mean REAL,
    totalstudents INTEGER,
    pass INTEGER,
    fail INTEGER,
    passrate REAL,
    median REAL,
    absent INTEGER,
    "_minus3" INTEGER,
    "_00" INTEGER,
    "_02" INTEGER,
    "_4" INTEGER,
    "_7" INTEGER,
    "_10" INTEGER,
    "_12" INTEGER,
    CONSTRAINT fk_course_statistics
        FOREIGN KEY (id)
        REFERENCES courses (id)
        ON DELETE CASCADE
)"#;

pub const DROP_ADMISSIONS: &str = "DROP TABLE IF EXISTS admissions";

// standbyquota holds either a number or a phrase such as
// "Alle optaget, ledige pladser".
pub const CREATE_ADMISSIONS: &str = r#"
CREATE TABLE admissions (
    program_id VARCHAR(100) PRIMARY KEY,
    quota FLOAT,
    standbyquota VARCHAR(50),
    admitted INT,
    perdistribution1 INT,
    perdistribution2 INT,
    applications1 INT,
    applications2 INT,
    averageage FLOAT,
    percentageofmen INT,
    percentageofwomen INT
)"#;

/// Executed in order inside one transaction.
pub const SCHEMA_STATEMENTS: [&str; 4] = [
    CREATE_COURSES,
    CREATE_STATISTICS,
    DROP_ADMISSIONS,
    CREATE_ADMISSIONS,
];

pub async fn ensure_schema(conn: &mut PgConnection) -> Result<(), ImportError> {
    let mut tx = conn.begin().await.map_err(ImportError::Schema)?;
    match apply_statements(&mut tx).await {
        Ok(()) => {
            tx.commit().await.map_err(ImportError::Schema)?;
            info!("Tables created or already existed according to the specified schema.");
            Ok(())
        }
        Err(err) => {
            error!("Error when creating tables: {err}");
            if let Err(rollback) = tx.rollback().await {
                warn!("Rolling back schema changes failed: {rollback}");
            }
            Err(ImportError::Schema(err))
        }
    }
}

async fn apply_statements(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}
