#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use course_catalog::dataset::{Cell, Row};
use course_catalog::error::ImportError;
use course_catalog::store::ImportTarget;
use tempfile::{TempDir, tempdir};

pub const COURSES_CSV: &str = "\
01005,English,BSc,Written examination,Advanced Engineering Mathematics 1,20,13,Compute
02101,Danish,BSc,Oral examination,Introduction to Programming,5,13,Compute
";

pub const STATISTICS_CSV: &str = "\
01005,\"7,2\",250,200,50,\"80,0\",7,10,5,45,20,60,70,30,20
02101,6.1,120,100,20,83.3,7,4,2,18,10,30,35,15,10
";

pub const ADMISSIONS_CSV: &str = "\
program_id,quota,standbyquota,admitted,perdistribution1,perdistribution2,applications1,applications2,averageage,percentageofmen,percentageofwomen
BSc-SE,\"10,5\",\"Alle optaget, ledige pladser\",120,60,40,300,150,\"21,4\",70,30
BSc-DS,80,12,80,55,45,250,90,22,55,45
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Creates a workspace already holding all three dataset files.
    pub fn with_datasets() -> Self {
        let workspace = Self::new();
        workspace.write("courses.csv", COURSES_CSV);
        workspace.write("statistics.csv", STATISTICS_CSV);
        workspace.write("admission.csv", ADMISSIONS_CSV);
        workspace
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.temp_dir.path().join(name)).expect("remove temp file");
    }
}

/// In-memory stand-in for PostgreSQL with the same table policies:
/// courses and statistics persist across `ensure_schema`, admissions is
/// rebuilt, conflict keys are skipped, and statistics rows must reference an
/// existing course or the whole insert is rejected.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    pub tables: BTreeMap<String, Vec<Row>>,
    pub schema_runs: usize,
    pub fail_schema: bool,
}

impl MemoryTarget {
    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self, table: &str) -> Vec<String> {
        self.rows(table).iter().map(|row| key_of(row, 0)).collect()
    }
}

fn key_of(row: &Row, index: usize) -> String {
    match &row[index] {
        Cell::Text(text) => text.clone(),
        other => format!("{other:?}"),
    }
}

impl ImportTarget for MemoryTarget {
    async fn ensure_schema(&mut self) -> Result<(), ImportError> {
        if self.fail_schema {
            return Err(ImportError::Schema(sqlx::Error::Protocol(
                "permission denied for schema public".into(),
            )));
        }
        self.schema_runs += 1;
        self.tables.entry("courses".into()).or_default();
        self.tables.entry("statistics".into()).or_default();
        self.tables.insert("admissions".into(), Vec::new());
        Ok(())
    }

    async fn bulk_insert(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: &[Row],
        conflict_column: Option<&str>,
    ) -> Result<u64, ImportError> {
        if rows.is_empty() {
            return Ok(0);
        }
        if table == "statistics" {
            let courses = self
                .rows("courses")
                .iter()
                .map(|row| key_of(row, 0))
                .collect::<HashSet<_>>();
            if let Some(orphan) = rows.iter().find(|row| !courses.contains(&key_of(row, 0))) {
                return Err(ImportError::Insert {
                    table: table.to_string(),
                    source: sqlx::Error::Protocol(format!(
                        "violates foreign key constraint fk_course_statistics: {}",
                        key_of(orphan, 0)
                    )),
                });
            }
        }

        let key_index = conflict_column.and_then(|c| columns.iter().position(|col| *col == c));
        let stored = self.tables.entry(table.to_string()).or_default();
        let mut seen = stored
            .iter()
            .filter_map(|row| key_index.map(|idx| key_of(row, idx)))
            .collect::<HashSet<_>>();
        let mut affected = 0;
        for row in rows {
            if let Some(idx) = key_index {
                if !seen.insert(key_of(row, idx)) {
                    continue;
                }
            }
            stored.push(row.clone());
            affected += 1;
        }
        Ok(affected)
    }
}
