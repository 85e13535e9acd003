//! Evaluation results.

use std::fmt;

use super::format::{format_list, format_number};

/// The result of evaluating a formula or one of its sub-expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    List(Vec<f64>),
    /// Text that could not be reduced further. Kept verbatim so that the
    /// unevaluated part stays visible in the output.
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric members of the value, in order. `None` for booleans and text.
    pub fn numbers(&self) -> Option<Vec<f64>> {
        match self {
            Value::Number(n) => Some(vec![*n]),
            Value::List(items) => Some(items.clone()),
            Value::Bool(_) | Value::Text(_) => None,
        }
    }

    pub fn is_residual(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Interpret the literal text stored in a cell.
    ///
    /// Comma-separated numbers become a number or a list, `true`/`false`
    /// become booleans, everything else is kept as text.
    pub fn from_literal(text: &str) -> Value {
        let trimmed = text.trim();
        match trimmed {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        let parsed: Option<Vec<f64>> = trimmed
            .split(',')
            .map(|part| part.trim().parse::<f64>().ok())
            .collect();
        match parsed {
            Some(mut items) if items.len() == 1 => Value::Number(items.remove(0)),
            Some(items) => Value::List(items),
            None => Value::Text(text.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => f.write_str(&format_list(items)),
            Value::Text(s) => f.write_str(s),
        }
    }
}
