//! Error types for the gridcalc command line

use gridcalc_core::SheetError;
use thiserror::Error;

/// Errors that can occur in the gridcalc binary
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
