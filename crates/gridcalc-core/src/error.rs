//! Error types for Gridcalc core.

use thiserror::Error;

use gridcalc_engine::EngineError;

/// Errors that can occur while updating or reading the sheet
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("Invalid cell id: {0}")]
    InvalidCellId(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, SheetError>;
