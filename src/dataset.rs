//! The three CSV datasets imported at startup, described as data.
//!
//! A [`Dataset`] names its source file, target table, ordered columns with
//! the coercion applied to each, whether the file starts with a header row,
//! and the key used for conflict-skip inserts. The reader and the loader are
//! driven entirely by these descriptions.

use std::fmt;

use crate::coerce::{to_float_or_none, to_int_or_none};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Text,
    }
}

const fn integer(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Integer,
    }
}

const fn float(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Float,
    }
}

/// One coerced field of an accepted row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(Option<i64>),
    Float(Option<f64>),
}

impl Cell {
    pub fn coerce(raw: &str, kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => Cell::Text(raw.trim().to_string()),
            ColumnKind::Integer => Cell::Integer(to_int_or_none(Some(raw))),
            ColumnKind::Float => Cell::Float(to_float_or_none(Some(raw))),
        }
    }
}

pub type Row = Vec<Cell>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    pub name: &'static str,
    pub file_name: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
    pub has_header: bool,
    pub conflict_column: Option<&'static str>,
}

impl Dataset {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub const COURSES: Dataset = Dataset {
    name: "Courses",
    file_name: "courses.csv",
    table: "courses",
    columns: &[
        text("id"),
        text("language"),
        text("degree"),
        text("examtype"),
        text("title"),
        text("etcs"),
        integer("duration"),
        text("department"),
    ],
    has_header: false,
    conflict_column: Some("id"),
};

pub const STATISTICS: Dataset = Dataset {
    name: "Statistics",
    file_name: "statistics.csv",
    table: "statistics",
    columns: &[
        text("id"),
        float("mean"),
        integer("totalstudents"),
        integer("pass"),
        integer("fail"),
        float("passrate"),
        float("median"),
        integer("absent"),
        integer("_minus3"),
        integer("_00"),
        integer("_02"),
        integer("_4"),
        integer("_7"),
        integer("_10"),
        integer("_12"),
    ],
    has_header: false,
    conflict_column: Some("id"),
};

pub const ADMISSIONS: Dataset = Dataset {
    name: "Admissions",
    file_name: "admission.csv",
    table: "admissions",
    columns: &[
        text("program_id"),
        float("quota"),
        text("standbyquota"),
        integer("admitted"),
        integer("perdistribution1"),
        integer("perdistribution2"),
        integer("applications1"),
        integer("applications2"),
        float("averageage"),
        integer("percentageofmen"),
        integer("percentageofwomen"),
    ],
    has_header: true,
    conflict_column: Some("program_id"),
};

/// Import order; statistics references courses through its foreign key.
pub const ALL: [Dataset; 3] = [COURSES, STATISTICS, ADMISSIONS];
