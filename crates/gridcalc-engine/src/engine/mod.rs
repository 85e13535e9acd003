//! Formula engine API.
//!
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`CellLookup`] - Read-only access to cell text
//! - [`extract_references`] - Cells a formula mentions
//! - [`evaluate`] - Evaluate a formula in either [`EvalMode`]
//! - [`rewrite_formula`] - Text rewriting until a fixpoint
//! - [`parse_formula`] / [`Evaluator`] - Expression tree parsing and evaluation
//! - [`format_number`] - Format values for display

mod ast;
mod cell_ref;
mod deps;
mod eval;
mod format;
mod lexer;
mod lookup;
mod mode;
mod parser;
mod rewrite;
mod value;

pub use ast::{BinaryOp, Expr};
pub use cell_ref::{CellRef, MAX_COLS, MAX_ROWS};
pub use deps::extract_references;
pub use eval::{Evaluator, evaluate_tree};
pub use format::{format_list, format_number};
pub use lookup::CellLookup;
pub use mode::{EvalMode, EvalOptions, evaluate};
pub use parser::{ParseError, parse_formula};
pub use rewrite::{
    DEFAULT_MAX_PASSES, apply_arithmetic, apply_function_call, expand_cells, expand_ranges,
    rewrite_formula, rewrite_pass,
};
pub use value::Value;
