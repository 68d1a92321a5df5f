//! Error types shared by the pipeline stages.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a field could not be read from an extracted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Null,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    OutOfRange,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing => write!(f, "is missing"),
            FieldProblem::Null => write!(f, "is null"),
            FieldProblem::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            FieldProblem::OutOfRange => write!(f, "is out of range"),
        }
    }
}

/// Errors that can occur while extracting, transforming or loading a file.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Failed to parse {path:?} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Field '{field}' in row {row} {problem}")]
    Field {
        row: usize,
        field: String,
        problem: FieldProblem,
    },

    #[error("Row {index} requested from a table with {len} rows")]
    NoSuchRow { index: usize, len: usize },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Bulk load into {table} from {path:?} failed at record {record}: {reason}")]
    BulkLoad {
        table: &'static str,
        path: PathBuf,
        record: usize,
        reason: String,
    },

    #[error("Staging file error: {0}")]
    Staging(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Coarse classification of [`EtlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Field,
    Database,
    Io,
}

impl EtlError {
    pub fn field(row: usize, field: &str, problem: FieldProblem) -> Self {
        EtlError::Field {
            row,
            field: field.to_string(),
            problem,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::Parse { .. } => ErrorKind::Parse,
            EtlError::Field { .. } | EtlError::NoSuchRow { .. } => ErrorKind::Field,
            EtlError::Database(_) | EtlError::BulkLoad { .. } => ErrorKind::Database,
            EtlError::Staging(_) | EtlError::Io(_) | EtlError::Walk(_) => ErrorKind::Io,
        }
    }
}

pub type EtlResult<T> = std::result::Result<T, EtlError>;
