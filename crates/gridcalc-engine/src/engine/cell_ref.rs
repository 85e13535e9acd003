//! Cell reference parsing and formatting.
//!
//! Cells live on a fixed grid: columns `A`..=`J` and rows `1`..=`99`.
//! References convert between that notation and zero-indexed
//! column/row coordinates.
//!
//! # Examples
//!
//! ```
//! use gridcalc_engine::engine::CellRef;
//!
//! let cell = CellRef::from_str("b3").unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};

/// Number of columns on the grid (`A`..=`J`).
pub const MAX_COLS: usize = 10;
/// Number of rows on the grid (`1`..=`99`).
pub const MAX_ROWS: usize = 99;

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letter>[A-Ja-j])(?<number>[1-9][0-9]?)$")
            .expect("cell reference regex must compile")
    })
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference such as "A1" or "j99" (case-insensitive).
    /// Returns None if the input is not on the grid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let letter = caps["letter"].to_ascii_uppercase().bytes().next()?;
        let row = caps["number"].parse::<usize>().ok()?.checked_sub(1)?;
        Some(CellRef::new((letter - b'A') as usize, row))
    }

    /// Convert a column index to its letter (0 -> A, 9 -> J).
    pub fn col_to_letter(col: usize) -> char {
        (b'A' + (col % 26) as u8) as char
    }

    /// Expand `start:end` into references, row by row and left to right
    /// within a row. Reversed bounds are rejected.
    pub fn expand_range(start: CellRef, end: CellRef) -> Result<Vec<CellRef>> {
        if end.col < start.col || end.row < start.row {
            return Err(EngineError::InvalidRange(format!("{}:{}", start, end)));
        }

        let mut refs = Vec::with_capacity((end.row - start.row + 1) * (end.col - start.col + 1));
        for row in start.row..=end.row {
            for col in start.col..=end.col {
                refs.push(CellRef::new(col, row));
            }
        }
        Ok(refs)
    }

    /// Iterate over every cell on the grid in row-major order.
    pub fn all() -> impl Iterator<Item = CellRef> {
        (0..MAX_ROWS).flat_map(|row| (0..MAX_COLS).map(move |col| CellRef::new(col, row)))
    }
}

impl std::str::FromStr for CellRef {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        CellRef::from_str(s).ok_or_else(|| EngineError::UnknownCell(s.to_string()))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letter(self.col), self.row + 1)
    }
}
