//! Formula evaluation by repeated text rewriting.
//!
//! Each pass rewrites the formula text in a fixed order:
//!
//! 1. **Ranges**: `A1:C1` → the referenced cells' values, comma-joined
//! 2. **References**: `B2` → the cell's value
//! 3. **Function call**: the right-most `name(1,2,3)` → its result
//! 4. **Arithmetic**: every `*`/`/` pair left to right, then one `+`/`-` pair
//!
//! Passes repeat until the text stops changing. Nothing here parses the
//! formula as a whole: anything the patterns don't recognise is left in the
//! text untouched.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::format::format_number;
use super::{CellLookup, CellRef};
use crate::builtins::Builtin;
use crate::error::{EngineError, Result};

/// Default bound on the number of passes before giving up.
pub const DEFAULT_MAX_PASSES: usize = 10_000;

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([A-J][1-9][0-9]?):([A-J][1-9][0-9]?)")
            .expect("range regex must compile")
    })
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[A-J][1-9][0-9]?").expect("cell regex must compile"))
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z0-9]*)\(([0-9., ]*)\)").expect("function call regex must compile")
    })
}

fn high_precedence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9.]+)([*/])([0-9.]+)").expect("high precedence regex must compile")
    })
}

fn low_precedence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9.]+)([+-])([0-9.]+)").expect("low precedence regex must compile")
    })
}

/// Replace every match of `re`, stopping at the first error.
fn try_replace_all<F>(re: &Regex, text: &str, mut replace: F) -> Result<String>
where
    F: FnMut(&Captures) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..m.start()]);
        out.push_str(&replace(&caps)?);
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn parse_ref(name: &str) -> Result<CellRef> {
    CellRef::from_str(name).ok_or_else(|| EngineError::UnknownCell(name.to_string()))
}

fn parse_number(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Replace each range such as `A1:C2` with its cells' values, comma-joined.
pub fn expand_ranges<L: CellLookup>(text: &str, cells: &L) -> Result<String> {
    try_replace_all(range_re(), text, |caps| {
        let start = parse_ref(&caps[1])?;
        let end = parse_ref(&caps[2])?;
        let values = CellRef::expand_range(start, end)?
            .iter()
            .map(|cell| cells.lookup(cell))
            .collect::<Result<Vec<_>>>()?;
        Ok(values.join(","))
    })
}

/// Replace each single reference such as `b2` with its cell's value.
pub fn expand_cells<L: CellLookup>(text: &str, cells: &L) -> Result<String> {
    try_replace_all(cell_re(), text, |caps| {
        let cell = parse_ref(&caps[0].to_ascii_uppercase())?;
        cells.lookup(&cell)
    })
}

/// Evaluate the function call that has no `(` after it, if it names a
/// built-in. Unknown names and non-numeric arguments are left as they are.
pub fn apply_function_call(text: &str) -> String {
    let call = call_re()
        .captures_iter(text)
        .find(|caps| caps.get(0).is_some_and(|m| !text[m.end()..].contains('(')));
    let Some(caps) = call else {
        return text.to_string();
    };
    let Some(builtin) = Builtin::from_name(&caps[1]) else {
        return text.to_string();
    };

    let args: Vec<f64> = caps[2].split(',').map(parse_number).collect();
    let result = builtin.apply(&args);
    log::trace!("{}({}) -> {}", builtin.name(), &caps[2], result);

    let Some(m) = caps.get(0) else {
        return text.to_string();
    };
    format!("{}{}{}", &text[..m.start()], result, &text[m.end()..])
}

fn eval_infix(caps: &Captures) -> String {
    let lhs = parse_number(&caps[1]);
    let rhs = parse_number(&caps[3]);
    let result = match &caps[2] {
        "*" => lhs * rhs,
        "/" => lhs / rhs,
        "+" => lhs + rhs,
        _ => lhs - rhs,
    };
    format_number(result)
}

/// Fold `*` and `/` until none are left, then fold the first `+` or `-`.
pub fn apply_arithmetic(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = high_precedence_re().replace(&current, eval_infix).to_string();
        if next == current {
            break;
        }
        current = next;
    }
    low_precedence_re().replace(&current, eval_infix).to_string()
}

/// One full pass: ranges, references, one function call, arithmetic.
pub fn rewrite_pass<L: CellLookup>(text: &str, cells: &L) -> Result<String> {
    let ranges = expand_ranges(text, cells)?;
    let refs = expand_cells(&ranges, cells)?;
    let called = apply_function_call(&refs);
    Ok(apply_arithmetic(&called))
}

/// Rewrite `formula` (without its leading `=`) until it stops changing.
///
/// Fails with [`EngineError::NoFixpoint`] when the text is still changing
/// after `max_passes` passes, which happens when cells refer to each other
/// in a loop.
pub fn rewrite_formula<L: CellLookup>(formula: &str, cells: &L, max_passes: usize) -> Result<String> {
    let mut current = formula.to_string();
    for pass in 1..=max_passes {
        let next = rewrite_pass(&current, cells)?;
        if next == current {
            log::debug!("rewrite settled after {} passes: {}", pass, next);
            return Ok(next);
        }
        log::trace!("pass {}: {} -> {}", pass, current, next);
        current = next;
    }
    Err(EngineError::NoFixpoint { passes: max_passes })
}
