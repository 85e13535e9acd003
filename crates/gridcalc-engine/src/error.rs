//! Error types for the formula engine.
//!
//! Only failures that stop an evaluation live here. Unknown functions and
//! malformed literals are not errors: they are left in the output as text.

use thiserror::Error;

use crate::engine::CellRef;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown cell: {0}")]
    UnknownCell(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Circular reference: {}", format_path(.0))]
    CircularReference(Vec<CellRef>),

    #[error("Formula did not settle after {passes} passes")]
    NoFixpoint { passes: usize },
}

fn format_path(path: &[CellRef]) -> String {
    path.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, EngineError>;
