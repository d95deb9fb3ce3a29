//! CSV reader construction for the dataset files.
//!
//! Dataset files are UTF-8, comma-delimited and read without header
//! handling by the `csv` crate: callers consume any header row themselves
//! so row numbering stays under their control. Readers are `flexible` so
//! rows of the wrong width reach the caller instead of failing the file.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_DATA_DIR: &str = "Database_files";

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Reads a whole dataset file. The row loop inspects the raw bytes between
/// records, so the file is held in memory rather than streamed.
pub fn read_input_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Opening input file {path:?}"))
}

pub fn dataset_path(data_dir: &Path, file_name: &str) -> PathBuf {
    data_dir.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_accepts_rows_of_varying_width() {
        let input = "a,b,c\nd,e\n";
        let mut reader = open_csv_reader(input.as_bytes(), DEFAULT_CSV_DELIMITER);
        let widths = reader
            .records()
            .map(|r| r.expect("record").len())
            .collect::<Vec<_>>();
        assert_eq!(widths, vec![3, 2]);
    }

    #[test]
    fn quoted_commas_stay_in_one_field() {
        let input = "\"Intro, part 1\",5\n";
        let mut reader = open_csv_reader(input.as_bytes(), DEFAULT_CSV_DELIMITER);
        let record = reader.records().next().expect("row").expect("record");
        assert_eq!(&record[0], "Intro, part 1");
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn missing_input_file_keeps_the_io_error() {
        let err = read_input_file(Path::new("does/not/exist.csv")).expect_err("missing");
        let io_err = err.downcast_ref::<std::io::Error>().expect("io error");
        assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn dataset_path_joins_under_data_dir() {
        let path = dataset_path(Path::new(DEFAULT_DATA_DIR), "courses.csv");
        assert_eq!(path, PathBuf::from("Database_files/courses.csv"));
    }
}
