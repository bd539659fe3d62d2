//! # Extractors
//!
//! Each extractor reads one feature out of a workbook and returns an
//! [`Extraction`]: the best value it could build plus the [`Note`]s describing
//! what it had to skip. Nothing in here fails on bad input; deciding whether a
//! degraded value is worth keeping is left to the caller.
use std::fmt;

pub mod channel;
pub mod fuel;
pub mod locate;
pub mod normalize;
pub mod operation;
pub mod vas;
pub mod zipcode;

/// A non-fatal problem met while extracting.
#[derive(Clone, Debug, PartialEq)]
pub enum Note {
    /// No sheet of the workbook matches the configured name
    MissingSheet(String),
    /// No row of the search window carries the required markers
    HeaderNotFound(String),
    /// A split sheet has fewer weight columns than the configured side needs
    MissingSplit { sheet: String, weight_columns: usize },
    /// Rows below the header that did not yield a usable record
    SkippedRows { sheet: String, count: usize },
    /// No sheet carried a usable fuel rate; the fallback was used
    DefaultFuelRate(f64),
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::MissingSheet(sheet) => write!(f, "sheet '{sheet}' not found"),
            Note::HeaderNotFound(sheet) => write!(f, "no header row in sheet '{sheet}'"),
            Note::MissingSplit { sheet, weight_columns } => {
                write!(f, "sheet '{sheet}' has {weight_columns} weight column(s), split needs two")
            }
            Note::SkippedRows { sheet, count } => write!(f, "{count} row(s) skipped in sheet '{sheet}'"),
            Note::DefaultFuelRate(rate) => write!(f, "no fuel rate found, using {rate}"),
        }
    }
}

/// An extracted value and the notes collected while building it.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction<T> {
    pub value: T,
    pub notes: Vec<Note>,
}

impl<T> Extraction<T> {
    pub fn clean(value: T) -> Self {
        Extraction { value, notes: Vec::new() }
    }

    pub fn with_note(value: T, note: Note) -> Self {
        Extraction { value, notes: vec![note] }
    }

    pub fn note(&mut self, note: Note) {
        self.notes.push(note);
    }
}
