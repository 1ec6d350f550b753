use std::path::PathBuf;

use thiserror::Error;

use crate::chart::ChartKind;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Every failure the dashboard core can report.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Input file unreadable or malformed. Fatal at startup.
    #[error("failed to load dataset {path}: {message}")]
    DataLoad { path: PathBuf, message: String },

    /// A value outside the vocabulary seen while fitting the encoders.
    #[error("unknown value '{value}' for column '{column}'")]
    UnknownValue { column: String, value: String },

    /// A code outside `[0, size)` for the column.
    #[error("code {code} is out of range for column '{column}' ({size} known values)")]
    UnknownCode {
        column: String,
        code: u32,
        size: usize,
    },

    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("column '{column}' is not categorical")]
    NotCategorical { column: String },

    #[error("column '{column}' is not numeric")]
    NotNumeric { column: String },

    #[error("row {row} has {got} cells, expected {expected}")]
    RowWidth {
        row: usize,
        got: usize,
        expected: usize,
    },

    /// Feature vector does not match the trained schema. Indicates a caller bug.
    #[error("invalid feature vector: {reason}")]
    InvalidFeatureVector { reason: String },

    #[error("nothing selected: {what}")]
    EmptySelection { what: String },

    #[error("{kind} chart needs {expected}, got {got} column(s)")]
    ChartSelection {
        kind: ChartKind,
        expected: &'static str,
        got: usize,
    },

    #[error("cannot train model: {0}")]
    Training(String),

    #[error("failed to export {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl DashboardError {
    /// Whether the error should be surfaced to the user as a validation
    /// message while the dashboard keeps running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DashboardError::UnknownValue { .. }
                | DashboardError::UnknownCode { .. }
                | DashboardError::EmptySelection { .. }
                | DashboardError::ChartSelection { .. }
                | DashboardError::NotNumeric { .. }
                | DashboardError::Export { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
