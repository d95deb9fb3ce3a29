//! Reads one dataset file into coerced rows.
//!
//! Rows are checked in order: all-blank rows and rows whose width differs
//! from the dataset's column count are skipped with a warning, everything
//! else is coerced column by column. Skips are counted in a [`RowTally`] and
//! listed as [`SkippedRow`]s so callers can report them. A problem with one row never stops the file; a
//! problem reading the file itself (missing, unreadable, undecodable) is an
//! error for the whole file.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use crate::{
    dataset::{Cell, Dataset, Row},
    error::RowError,
    io_utils,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowTally {
    pub read: usize,
    pub accepted: usize,
    pub blank: usize,
    pub malformed: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    Blank,
    Malformed { found: usize, expected: usize },
    Invalid { message: String },
}

/// A row left out of the import. `row` counts records from 1 after any
/// header, empty lines included, so it matches the numbers in the warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: u64,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub rows: Vec<Row>,
    pub tally: RowTally,
    pub skipped: Vec<SkippedRow>,
}

impl ReadOutcome {
    fn skip(&mut self, row: u64, reason: SkipReason) {
        match reason {
            SkipReason::Blank => self.tally.blank += 1,
            SkipReason::Malformed { .. } => self.tally.malformed += 1,
            SkipReason::Invalid { .. } => self.tally.invalid += 1,
        }
        self.skipped.push(SkippedRow { row, reason });
    }
}

pub fn read_dataset(dataset: &Dataset, path: &Path) -> Result<ReadOutcome> {
    let input = io_utils::read_input_file(path)?;
    info!("Reading data from {path:?}...");
    read_records(dataset, &input).with_context(|| format!("Reading {path:?}"))
}

pub fn read_records(dataset: &Dataset, input: &[u8]) -> Result<ReadOutcome> {
    let mut reader = io_utils::open_csv_reader(input, io_utils::DEFAULT_CSV_DELIMITER);
    let mut outcome = ReadOutcome::default();
    let mut record = csv::StringRecord::new();

    if dataset.has_header {
        if !reader.read_record(&mut record).context("Reading header row")? {
            warn!("{dataset} CSV is empty, expected a header row");
            return Ok(outcome);
        }
        check_header(dataset, &record);
    }

    let mut row_number = 0u64;
    loop {
        let start = reader.position().byte();
        let more = reader
            .read_record(&mut record)
            .with_context(|| format!("Reading row {}", row_number + 1))?;
        let end = reader.position().byte();

        // The csv reader drops empty lines; each one is still a row.
        for _ in 0..empty_lines_before(input, start as usize, end as usize) {
            row_number += 1;
            outcome.tally.read += 1;
            warn!("{dataset} CSV row {row_number} is empty. Skipping.");
            outcome.skip(row_number, SkipReason::Blank);
        }
        if !more {
            break;
        }
        row_number += 1;
        outcome.tally.read += 1;

        if record.iter().all(|field| field.trim().is_empty()) {
            warn!("{dataset} CSV row {row_number} is empty. Skipping.");
            outcome.skip(row_number, SkipReason::Blank);
            continue;
        }
        if record.len() != dataset.width() {
            warn!(
                "{dataset} CSV row {row_number} has {} values, expected {}. Skipping row: {:?}",
                record.len(),
                dataset.width(),
                record.iter().collect::<Vec<_>>()
            );
            outcome.skip(
                row_number,
                SkipReason::Malformed {
                    found: record.len(),
                    expected: dataset.width(),
                },
            );
            continue;
        }
        match build_row(dataset, &record) {
            Ok(row) => {
                outcome.rows.push(row);
                outcome.tally.accepted += 1;
            }
            Err(err) => {
                warn!(
                    "Error processing {dataset} CSV row {row_number}: {:?}. Error: {err}. Skipping row.",
                    record.iter().collect::<Vec<_>>()
                );
                outcome.skip(
                    row_number,
                    SkipReason::Invalid {
                        message: err.to_string(),
                    },
                );
            }
        }
    }
    Ok(outcome)
}

/// Counts the line terminators a single read consumed before reaching record
/// content. `\r\n`, `\r` and `\n` each end one line. A record ended by
/// `\r\n` stops after the `\r`, so a leading `\n` following it belongs to
/// the previous record.
fn empty_lines_before(input: &[u8], start: usize, end: usize) -> usize {
    let gap = &input[start.min(input.len())..end.min(input.len())];
    let mut pos = 0;
    if start > 0 && input[start - 1] == b'\r' && gap.first() == Some(&b'\n') {
        pos = 1;
    }
    let mut lines = 0;
    while let Some(&byte) = gap.get(pos) {
        match byte {
            b'\r' if gap.get(pos + 1) == Some(&b'\n') => pos += 2,
            b'\r' | b'\n' => pos += 1,
            _ => break,
        }
        lines += 1;
    }
    lines
}

pub fn build_row(dataset: &Dataset, record: &csv::StringRecord) -> Result<Row, RowError> {
    dataset
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            record
                .get(index)
                .map(|raw| Cell::coerce(raw, column.kind))
                .ok_or(RowError::MissingField { index })
        })
        .collect()
}

fn check_header(dataset: &Dataset, header: &csv::StringRecord) {
    let found = header.iter().map(str::trim).collect::<Vec<_>>();
    let expected = dataset.column_names();
    if found != expected {
        warn!("{dataset} CSV header {found:?} does not match expected columns {expected:?}");
    }
}
