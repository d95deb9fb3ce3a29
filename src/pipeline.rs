//! The startup import: schema, then courses, statistics and admissions.
//!
//! Failures are contained at the narrowest level that still makes sense.
//! A bad row is skipped, a missing or unreadable file contributes no rows,
//! a failed insert rolls back that dataset only. A schema failure ends the
//! run, and [`init_database`] logs even that and carries on.

use std::{
    io,
    path::{Path, PathBuf},
};

use log::{error, info};
use serde::Serialize;

use crate::{
    config::DbConfig,
    dataset::{self, Dataset},
    error::ImportError,
    io_utils,
    reader::{self, RowTally, SkippedRow},
    store::{DryRunTarget, ImportTarget, PgTarget},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum DatasetOutcome {
    Loaded,
    NothingToInsert,
    FileMissing,
    FileError(String),
    InsertError(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub dataset: &'static str,
    pub table: &'static str,
    pub path: PathBuf,
    #[serde(flatten)]
    pub tally: RowTally,
    pub skipped: Vec<SkippedRow>,
    pub affected: u64,
    pub outcome: DatasetOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub datasets: Vec<DatasetReport>,
}

impl ImportReport {
    pub fn dataset(&self, table: &str) -> Option<&DatasetReport> {
        self.datasets.iter().find(|d| d.table == table)
    }

    pub fn total_affected(&self) -> u64 {
        self.datasets.iter().map(|d| d.affected).sum()
    }
}

pub async fn import_dataset<T: ImportTarget>(
    target: &mut T,
    dataset: &Dataset,
    data_dir: &Path,
) -> DatasetReport {
    let path = io_utils::dataset_path(data_dir, dataset.file_name);
    let mut report = DatasetReport {
        dataset: dataset.name,
        table: dataset.table,
        path: path.clone(),
        tally: RowTally::default(),
        skipped: Vec::new(),
        affected: 0,
        outcome: DatasetOutcome::NothingToInsert,
    };

    let read = match reader::read_dataset(dataset, &path) {
        Ok(read) => read,
        Err(err) if is_not_found(&err) => {
            error!("The file {path:?} was not found.");
            report.outcome = DatasetOutcome::FileMissing;
            return report;
        }
        Err(err) => {
            error!("Error reading or processing file {path:?}: {err:#}");
            report.outcome = DatasetOutcome::FileError(format!("{err:#}"));
            return report;
        }
    };
    report.tally = read.tally;
    report.skipped = read.skipped;

    if read.rows.is_empty() {
        info!(
            "No valid data found or processed from {path:?} to insert into '{}' table.",
            dataset.table
        );
        return report;
    }

    info!(
        "Attempting to insert {} records into '{}' table.",
        read.rows.len(),
        dataset.table
    );
    let columns = dataset.column_names();
    match target
        .bulk_insert(dataset.table, &columns, &read.rows, dataset.conflict_column)
        .await
    {
        Ok(affected) => {
            report.affected = affected;
            report.outcome = DatasetOutcome::Loaded;
        }
        Err(err) => {
            let err = anyhow::Error::new(err);
            error!("{dataset} import failed: {err:#}");
            report.outcome = DatasetOutcome::InsertError(format!("{err:#}"));
        }
    }
    report
}

/// Runs the schema step and then every dataset in import order. Only a
/// schema failure is returned as an error.
pub async fn import_all<T: ImportTarget>(
    target: &mut T,
    data_dir: &Path,
) -> Result<ImportReport, ImportError> {
    target.ensure_schema().await?;
    let mut report = ImportReport::default();
    for dataset in &dataset::ALL {
        report
            .datasets
            .push(import_dataset(target, dataset, data_dir).await);
    }
    Ok(report)
}

/// Connects, imports, and closes the connection whether or not the import
/// succeeded.
pub async fn run_import(config: &DbConfig, data_dir: &Path) -> Result<ImportReport, ImportError> {
    config.warn_if_database_ignored();
    let mut target = PgTarget::connect(config).await?;
    let result = import_all(&mut target, data_dir).await;
    target.close().await;
    result
}

pub async fn dry_run(data_dir: &Path) -> Result<ImportReport, ImportError> {
    import_all(&mut DryRunTarget, data_dir).await
}

/// Startup hook for the web server. Never fails: any error is logged and the
/// server goes on with whatever the database holds.
pub async fn init_database(config: &DbConfig, data_dir: &Path) -> Option<ImportReport> {
    info!("Initializing database...");
    let report = match run_import(config, data_dir).await {
        Ok(report) => Some(report),
        Err(err) => {
            let err = anyhow::Error::new(err);
            error!("PostgreSQL database error during import process: {err:#}");
            None
        }
    };
    info!("Database initialization finished.");
    report
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}
