use dashmap::DashMap;
use gridcalc_engine::engine::{CellLookup, CellRef, EvalOptions};
use gridcalc_engine::Result as EngineResult;
use std::sync::Arc;

/// A cell as entered and as displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Text exactly as it was entered.
    pub input: String,
    /// Text other formulas see: the evaluated result for formulas,
    /// the input otherwise.
    pub value: String,
}

impl Cell {
    pub fn literal(text: &str) -> Cell {
        Cell {
            input: text.to_string(),
            value: text.to_string(),
        }
    }
}

/// Sparse cell storage (DashMap is internally sharded, clones of the Arc are cheap)
pub type Grid = Arc<DashMap<CellRef, Cell>>;

/// The A1:J99 sheet.
///
/// Every cell on the grid exists; cells that were never written read as
/// empty text. Formulas are evaluated when they are written and only the
/// result is visible to other cells.
pub struct Sheet {
    pub grid: Grid,
    pub options: EvalOptions,
}

impl Sheet {
    pub fn new(options: EvalOptions) -> Self {
        Sheet {
            grid: Arc::new(DashMap::new()),
            options,
        }
    }

    pub fn get(&self, cell_ref: &CellRef) -> Option<Cell> {
        self.grid.get(cell_ref).map(|entry| entry.clone())
    }

    /// Non-empty cells in row-major order.
    pub fn cells(&self) -> Vec<(CellRef, Cell)> {
        let mut cells: Vec<(CellRef, Cell)> = self
            .grid
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        cells.sort_by_key(|(cell_ref, _)| (cell_ref.row, cell_ref.col));
        cells
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new(EvalOptions::default())
    }
}

impl CellLookup for Sheet {
    fn lookup(&self, cell: &CellRef) -> EngineResult<String> {
        Ok(self
            .grid
            .get(cell)
            .map(|entry| entry.value().value.clone())
            .unwrap_or_default())
    }
}
