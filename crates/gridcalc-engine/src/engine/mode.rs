//! Evaluation entry point shared by both strategies.

use std::fmt;
use std::str::FromStr;

use super::eval::evaluate_tree;
use super::rewrite::{DEFAULT_MAX_PASSES, rewrite_formula};
use super::CellLookup;
use crate::error::Result;

/// How a formula is evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvalMode {
    /// Parse into an expression tree and evaluate it.
    #[default]
    Tree,
    /// Rewrite the formula text pass by pass until it stops changing.
    Rewrite,
}

impl FromStr for EvalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(EvalMode::Tree),
            "rewrite" => Ok(EvalMode::Rewrite),
            other => Err(format!("Unknown evaluation mode: {}", other)),
        }
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalMode::Tree => f.write_str("tree"),
            EvalMode::Rewrite => f.write_str("rewrite"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalOptions {
    pub mode: EvalMode,
    /// Pass limit for [`EvalMode::Rewrite`].
    pub max_passes: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            mode: EvalMode::default(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Evaluate `formula` (without its leading `=`) against `cells`.
///
/// Returns the final text: normally a number or a comma-joined list, or
/// whatever could not be reduced.
pub fn evaluate<L: CellLookup>(formula: &str, cells: &L, options: &EvalOptions) -> Result<String> {
    log::debug!("evaluating '{}' ({} mode)", formula, options.mode);
    match options.mode {
        EvalMode::Tree => evaluate_tree(formula, cells),
        EvalMode::Rewrite => rewrite_formula(formula, cells, options.max_passes),
    }
}
