//! Expression tree evaluation.
//!
//! Formulas are parsed once and evaluated bottom-up against a
//! [`CellLookup`]. Parts that cannot be reduced (unknown functions,
//! non-numeric operands, text cells) come back as [`Value::Text`] holding
//! their rendered source, so the result shows exactly what was left over.
//!
//! Referenced cells that hold a formula (`=...`) or other non-literal text
//! are evaluated in turn. The evaluator keeps the chain of cells it is
//! inside of and reports a cycle instead of recursing forever.

use super::ast::{BinaryOp, Expr};
use super::parser::parse_formula;
use super::{CellLookup, CellRef, Value};
use crate::builtins::Builtin;
use crate::error::{EngineError, Result};

/// Evaluate `formula` (without its leading `=`) and render the result.
///
/// Text that does not parse is returned unchanged.
pub fn evaluate_tree<L: CellLookup>(formula: &str, cells: &L) -> Result<String> {
    let mut evaluator = Evaluator::new(cells);
    Ok(evaluator.eval_formula(formula)?.to_string())
}

pub struct Evaluator<'a, L: CellLookup> {
    cells: &'a L,
    visiting: Vec<CellRef>,
}

impl<'a, L: CellLookup> Evaluator<'a, L> {
    pub fn new(cells: &'a L) -> Self {
        Evaluator {
            cells,
            visiting: Vec::new(),
        }
    }

    /// Parse and evaluate formula text.
    pub fn eval_formula(&mut self, formula: &str) -> Result<Value> {
        let exprs = match parse_formula(formula) {
            Ok(exprs) => exprs,
            Err(err) => {
                log::debug!("leaving '{}' unevaluated: {}", formula, err);
                return Ok(Value::Text(formula.to_string()));
            }
        };

        let values = exprs
            .iter()
            .map(|expr| self.eval(expr))
            .collect::<Result<Vec<_>>>()?;
        Ok(join_values(values))
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Name(name) => Ok(Value::Text(name.clone())),
            Expr::Cell(cell) => self.eval_cell(cell),
            Expr::Range(start, end) => {
                let values = CellRef::expand_range(*start, *end)?
                    .iter()
                    .map(|cell| self.eval_cell(cell))
                    .collect::<Result<Vec<_>>>()?;
                Ok(join_values(values))
            }
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                // Only the first member is negated, as in `-1,2`.
                Value::List(mut items) if !items.is_empty() => {
                    items[0] = -items[0];
                    Ok(Value::List(items))
                }
                other => Ok(Value::Text(format!("-{}", grouped(&other)))),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                Ok(apply_binary(*op, &lhs, &rhs))
            }
            Expr::Call { name, args } => self.eval_call(name, args),
        }
    }

    fn eval_call(&mut self, name: &str, args: &[Expr]) -> Result<Value> {
        let values = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<Result<Vec<_>>>()?;

        let Some(builtin) = Builtin::from_name(name) else {
            return Ok(residual_call(name, &values));
        };

        if let (Builtin::Identity, [single]) = (builtin, values.as_slice()) {
            if !single.is_residual() {
                return Ok(single.clone());
            }
        }

        let mut nums = Vec::new();
        for value in &values {
            match value.numbers() {
                Some(items) => nums.extend(items),
                None => return Ok(residual_call(name, &values)),
            }
        }

        let result = builtin.apply(&nums);
        log::trace!("{}({:?}) -> {}", builtin.name(), nums, result);
        Ok(result)
    }

    fn eval_cell(&mut self, cell: &CellRef) -> Result<Value> {
        let text = self.cells.lookup(cell)?;
        let source = match text.trim().strip_prefix('=') {
            Some(formula) => formula.to_string(),
            None => match Value::from_literal(&text) {
                Value::Text(_) => text.clone(),
                literal => return Ok(literal),
            },
        };

        if self.visiting.contains(cell) {
            let mut path = self.visiting.clone();
            path.push(*cell);
            return Err(EngineError::CircularReference(path));
        }

        self.visiting.push(*cell);
        let value = self.eval_formula(&source);
        self.visiting.pop();

        match value? {
            Value::Text(_) if !text.trim_start().starts_with('=') => Ok(Value::Text(text)),
            value => Ok(value),
        }
    }
}

/// Apply an operator to two values.
///
/// A list operand joins the operator at its edge, the way the list reads
/// as text: `1,2*3` is `1,6`. Operands that are not numeric leave the
/// expression as text, grouped so that it parses back to the same shape.
fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
        return Value::Number(op.apply(a, b));
    }
    if let (Some(mut left), Some(right)) = (lhs.numbers(), rhs.numbers()) {
        if let (Some(a), Some((b, rest))) = (left.pop(), right.split_first()) {
            left.push(op.apply(a, *b));
            left.extend_from_slice(rest);
            return Value::List(left);
        }
    }
    Value::Text(format!("{}{}{}", grouped(lhs), op, grouped(rhs)))
}

/// Render an operand, in parentheses when its text would otherwise bind
/// differently next to an operator.
fn grouped(value: &Value) -> String {
    match value {
        Value::List(items) if !items.is_empty() => format!("({})", value),
        Value::Text(text) if has_top_level_operator(text) => format!("({})", text),
        _ => value.to_string(),
    }
}

/// True if `text` has an operator or comma outside parentheses. A leading
/// minus is unary and does not count.
fn has_top_level_operator(text: &str) -> bool {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '+' | '-' | '*' | '/' | ',' if depth == 0 && i > 0 => return true,
            _ => {}
        }
    }
    false
}

fn residual_call(name: &str, values: &[Value]) -> Value {
    let args = values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    Value::Text(format!("{}({})", name, args.join(",")))
}

/// Combine comma-separated values: one value stays as it is, numbers
/// flatten into a list, anything else is joined as text.
fn join_values(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        return values.remove(0);
    }

    let mut nums = Vec::new();
    for value in &values {
        match value.numbers() {
            Some(items) => nums.extend(items),
            None => {
                let parts = values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
                return Value::Text(parts.join(","));
            }
        }
    }
    Value::List(nums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cells(pairs: &[(&str, &str)]) -> HashMap<CellRef, String> {
        pairs
            .iter()
            .map(|(id, value)| (CellRef::from_str(id).unwrap(), value.to_string()))
            .collect()
    }

    fn eval(formula: &str, store: &HashMap<CellRef, String>) -> String {
        evaluate_tree(formula, store).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        let empty = HashMap::new();
        assert_eq!(eval("2+3*4", &empty), "14");
        assert_eq!(eval("(2+3)*4", &empty), "20");
        assert_eq!(eval("8-2-1", &empty), "5");
        assert_eq!(eval("-5+2", &empty), "-3");
        assert_eq!(eval("1/0", &empty), "Infinity");
    }

    #[test]
    fn test_function_dispatch() {
        let empty = HashMap::new();
        assert_eq!(eval("SUM(1,2,3)", &empty), "6");
        assert_eq!(eval("sum(1,2,3)", &empty), "6");
        assert_eq!(eval("sum(1, firsttwo(2,3,4))", &empty), "6");
        assert_eq!(eval("sum(1,2)+sum(3,4)", &empty), "10");
        assert_eq!(eval("increment(1,2)", &empty), "2,3");
        assert_eq!(eval("someeven(1,3)", &empty), "false");
        assert_eq!(eval("median(range(1,4))", &empty), "2.5");
        assert_eq!(eval("sum()", &empty), "0");
    }

    #[test]
    fn test_unknown_function_is_residual() {
        let store = cells(&[("A1", "5")]);
        assert_eq!(eval("foo(1,2)", &store), "foo(1,2)");
        assert_eq!(eval("foo(A1)", &store), "foo(5)");
        assert_eq!(eval("1+foo(2)", &store), "1+foo(2)");
        assert_eq!(eval("sum(has2(2))", &store), "sum(true)");
    }

    #[test]
    fn test_unparsable_text_is_returned_unchanged() {
        let empty = HashMap::new();
        assert_eq!(eval("1 + $", &empty), "1 + $");
        assert_eq!(eval("sum(1,", &empty), "sum(1,");
        assert_eq!(eval("", &empty), "");
    }

    #[test]
    fn test_deep_nesting_is_returned_unchanged() {
        let empty = HashMap::new();
        let deep = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
        assert_eq!(eval(&deep, &empty), deep);
        let shallow = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(eval(&shallow, &empty), "1");
    }

    #[test]
    fn test_reference_scenarios() {
        let store = cells(&[("A1", "5"), ("B1", "10")]);
        assert_eq!(eval("average(A1,B1)", &store), "7.5");
        assert_eq!(eval("sum(A1:B1)", &store), "15");
        assert_eq!(eval("a1*B1", &store), "50");
    }

    #[test]
    fn test_range_expansion() {
        let store = cells(&[("A1", "1"), ("B1", "2"), ("C1", "3")]);
        assert_eq!(eval("A1:C1", &store), "1,2,3");
    }

    #[test]
    fn test_list_cells_flatten_into_calls() {
        let store = cells(&[("A1", "1,2"), ("B1", "3")]);
        assert_eq!(eval("sum(A1,B1)", &store), "6");
    }

    #[test]
    fn test_formula_cells_are_evaluated() {
        let store = cells(&[("A1", "=B1*2"), ("B1", "4"), ("C1", "B1+1")]);
        assert_eq!(eval("A1+1", &store), "9");
        assert_eq!(eval("C1", &store), "5");
    }

    #[test]
    fn test_text_cells_stay_visible() {
        let store = cells(&[("A1", "hello"), ("B1", "")]);
        assert_eq!(eval("A1", &store), "hello");
        assert_eq!(eval("sum(A1)", &store), "sum(hello)");
        assert_eq!(eval("sum(A1:B1)", &store), "sum(hello,)");
    }

    #[test]
    fn test_missing_cell_is_fatal() {
        let store = cells(&[("A1", "5")]);
        let err = evaluate_tree("A1+B1", &store).unwrap_err();
        assert_eq!(err, EngineError::UnknownCell("B1".into()));
    }

    #[test]
    fn test_cycle_is_detected() {
        let store = cells(&[("A1", "=B1"), ("B1", "=A1+1")]);
        let err = evaluate_tree("A1", &store).unwrap_err();
        assert_eq!(
            err,
            EngineError::CircularReference(vec![
                CellRef::new(0, 0),
                CellRef::new(1, 0),
                CellRef::new(0, 0),
            ])
        );
    }

    #[test]
    fn test_fixpoint_is_idempotent() {
        let store = cells(&[("A1", "5"), ("B1", "10"), ("C1", "foo(1)+2")]);
        for formula in [
            "average(A1,B1)",
            "2-7",
            "foo(1,2)",
            "increment(A1:B1)",
            "1/0",
            "0/0",
            "(1,2)*2",
            "increment(1,2)*2",
            "(1,2)*foo(3)",
            "-(1,2)",
            "C1*2",
            "-C1",
            "even(1)*2",
        ] {
            let once = eval(formula, &store);
            assert_eq!(eval(&once, &store), once, "{} -> {}", formula, once);
        }
    }

    #[test]
    fn test_list_operands_fold_at_their_edge() {
        let store = cells(&[("A1", "1,2"), ("B1", "3")]);
        assert_eq!(eval("(1,2)*2", &store), "1,4");
        assert_eq!(eval("increment(1,2)*2", &store), "2,6");
        assert_eq!(eval("2*(1,2)", &store), "2,2");
        assert_eq!(eval("A1+B1", &store), "1,5");
        assert_eq!(eval("(1,2)+(3,4)", &store), "1,5,4");
        assert_eq!(eval("3+(1,2)*2", &store), "4,4");
        assert_eq!(eval("-(1,2)", &store), "-1,2");
    }

    #[test]
    fn test_residual_operands_are_grouped() {
        let store = cells(&[("A1", "hello"), ("C1", "foo(1)+2")]);
        assert_eq!(eval("(1,2)*foo(3)", &store), "(1,2)*foo(3)");
        assert_eq!(eval("C1*2", &store), "(foo(1)+2)*2");
        assert_eq!(eval("-C1", &store), "-(foo(1)+2)");
        assert_eq!(eval("A1*2", &store), "hello*2");
    }
}
