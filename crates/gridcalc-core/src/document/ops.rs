use super::{Cell, Sheet};
use crate::error::{Result, SheetError};
use gridcalc_engine::engine::{CellRef, evaluate, extract_references};

/// Parse a cell id such as "a1" or "J99".
pub fn parse_cell_id(id: &str) -> Result<CellRef> {
    CellRef::from_str(id.trim()).ok_or_else(|| SheetError::InvalidCellId(id.to_string()))
}

impl Sheet {
    /// Text currently visible in a cell (empty if never written).
    pub fn value(&self, id: &str) -> Result<String> {
        let cell_ref = parse_cell_id(id)?;
        Ok(self.get(&cell_ref).map(|cell| cell.value).unwrap_or_default())
    }

    /// Store text in a cell without evaluating it.
    pub fn set_literal(&self, id: &str, text: &str) -> Result<()> {
        let cell_ref = parse_cell_id(id)?;
        self.grid.insert(cell_ref, Cell::literal(text));
        Ok(())
    }

    pub fn clear(&self, id: &str) -> Result<Option<Cell>> {
        let cell_ref = parse_cell_id(id)?;
        Ok(self.grid.remove(&cell_ref).map(|(_, cell)| cell))
    }

    /// Evaluate a formula against the sheet without storing anything.
    /// A leading `=` is optional.
    pub fn evaluate(&self, formula: &str) -> Result<String> {
        let formula = formula.trim();
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        Ok(evaluate(formula, self, &self.options)?)
    }

    /// Write user input into a cell and return the text it now shows.
    ///
    /// Whitespace is removed from the input. If what is left starts with
    /// `=` and does not mention the cell itself, the formula is evaluated
    /// and its result stored. Anything else, including a formula that
    /// refers to its own cell, is stored exactly as entered.
    pub fn update(&self, id: &str, input: &str) -> Result<String> {
        let cell_ref = parse_cell_id(id)?;
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        let value = match compact.strip_prefix('=') {
            Some(formula) if !extract_references(formula).contains(&cell_ref) => {
                let result = evaluate(formula, self, &self.options)?;
                log::debug!("{} = {} -> {}", cell_ref, formula, result);
                result
            }
            Some(_) => {
                log::debug!("{} refers to itself, storing input unevaluated", cell_ref);
                input.to_string()
            }
            None => input.to_string(),
        };

        self.grid.insert(
            cell_ref,
            Cell {
                input: input.to_string(),
                value: value.clone(),
            },
        );
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_engine::EngineError;
    use gridcalc_engine::engine::{EvalMode, EvalOptions};

    fn sheet(mode: EvalMode) -> Sheet {
        Sheet::new(EvalOptions {
            mode,
            ..EvalOptions::default()
        })
    }

    #[test]
    fn test_update_literal_is_stored_verbatim() {
        let sheet = Sheet::default();
        assert_eq!(sheet.update("A1", " 5 ").unwrap(), " 5 ");
        assert_eq!(sheet.value("a1").unwrap(), " 5 ");
    }

    #[test]
    fn test_update_evaluates_formula_on_write() {
        for mode in [EvalMode::Tree, EvalMode::Rewrite] {
            let sheet = sheet(mode);
            sheet.update("A1", "5").unwrap();
            sheet.update("B1", "10").unwrap();
            assert_eq!(sheet.update("C1", "= average(A1, B1)").unwrap(), "7.5");
            assert_eq!(sheet.update("D1", "=sum(A1:C1)").unwrap(), "22.5");
            let cell = sheet.get(&CellRef::new(2, 0)).unwrap();
            assert_eq!(cell.input, "= average(A1, B1)");
            assert_eq!(cell.value, "7.5");
        }
    }

    #[test]
    fn test_results_do_not_follow_later_edits() {
        let sheet = Sheet::default();
        sheet.update("A1", "1").unwrap();
        sheet.update("B1", "=A1*2").unwrap();
        sheet.update("A1", "5").unwrap();
        assert_eq!(sheet.value("B1").unwrap(), "2");
    }

    #[test]
    fn test_self_reference_is_not_evaluated() {
        let sheet = Sheet::default();
        sheet.update("A2", "3").unwrap();
        assert_eq!(sheet.update("A1", "=A1+1").unwrap(), "=A1+1");
        assert_eq!(sheet.update("B1", "=sum(A1:C1)").unwrap(), "=sum(A1:C1)");
        // A10 is a different cell from A1.
        sheet.update("A10", "4").unwrap();
        assert_eq!(sheet.update("A1", "=A10*2").unwrap(), "8");
    }

    #[test]
    fn test_glued_self_reference_is_not_evaluated() {
        for mode in [EvalMode::Tree, EvalMode::Rewrite] {
            let sheet = sheet(mode);
            sheet.update("A1", "5").unwrap();
            assert_eq!(sheet.update("A1", "=3A1").unwrap(), "=3A1");
            assert_eq!(sheet.update("A1", "=A1x+1").unwrap(), "=A1x+1");
        }
    }

    #[test]
    fn test_unwritten_cells_read_as_empty() {
        let sheet = Sheet::default();
        assert_eq!(sheet.value("J99").unwrap(), "");
        assert_eq!(sheet.evaluate("=B2").unwrap(), "");
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_invalid_ids_are_rejected() {
        let sheet = Sheet::default();
        assert_eq!(
            sheet.update("K1", "5").unwrap_err(),
            SheetError::InvalidCellId("K1".into())
        );
        assert!(sheet.value("A100").is_err());
    }

    #[test]
    fn test_engine_errors_propagate() {
        let sheet = Sheet::default();
        let err = sheet.update("D1", "=sum(C1:A1)").unwrap_err();
        assert_eq!(err, SheetError::Engine(EngineError::InvalidRange("C1:A1".into())));
        assert!(sheet.get(&CellRef::new(3, 0)).is_none());
    }

    #[test]
    fn test_cells_are_row_major() {
        let sheet = Sheet::default();
        sheet.set_literal("B2", "x").unwrap();
        sheet.set_literal("C1", "y").unwrap();
        sheet.set_literal("A2", "z").unwrap();
        let ids: Vec<String> = sheet.cells().iter().map(|(r, _)| r.to_string()).collect();
        assert_eq!(ids, vec!["C1", "A2", "B2"]);
        assert_eq!(sheet.clear("C1").unwrap(), Some(Cell::literal("y")));
        assert_eq!(sheet.len(), 2);
    }
}
