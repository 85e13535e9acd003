//! Read-only access to cell values.

use std::collections::HashMap;

use super::CellRef;
use crate::error::{EngineError, Result};

/// Source of raw cell text for the evaluator.
///
/// Implementations return the literal text stored in a cell. Asking for a
/// cell that does not exist is an error.
pub trait CellLookup {
    fn lookup(&self, cell: &CellRef) -> Result<String>;
}

impl<T: CellLookup + ?Sized> CellLookup for &T {
    fn lookup(&self, cell: &CellRef) -> Result<String> {
        (**self).lookup(cell)
    }
}

impl CellLookup for HashMap<CellRef, String> {
    fn lookup(&self, cell: &CellRef) -> Result<String> {
        self.get(cell)
            .cloned()
            .ok_or_else(|| EngineError::UnknownCell(cell.to_string()))
    }
}
