//! gridcalc-core - Cell store and on-write formula evaluation.

pub mod document;
pub mod error;

pub use document::{Cell, Grid, Sheet, parse_cell_id};
pub use error::{Result, SheetError};

pub use gridcalc_engine::engine::{CellRef, EvalMode, EvalOptions};
