//! Reference extraction from formula strings.
//!
//! Finds every cell a formula mentions, with ranges such as `A1:C2`
//! expanded to their cells. Used to refuse formulas that refer to the cell
//! they are being written into.
//!
//! Matching is unanchored, like the reference expansion in rewrite mode, so
//! a reference glued to other characters (`3A1`, `A1x`) is still found.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([A-J][1-9][0-9]?)(?::([A-J][1-9][0-9]?))?")
            .expect("reference regex must compile")
    })
}

/// Extract all cell references from a formula, in order of appearance.
/// Reversed ranges contribute only their two end points.
pub fn extract_references(formula: &str) -> Vec<CellRef> {
    let mut refs = Vec::new();

    for caps in reference_re().captures_iter(formula) {
        let Some(start) = CellRef::from_str(&caps[1]) else {
            continue;
        };
        let end = caps.get(2).and_then(|m| CellRef::from_str(m.as_str()));
        match end {
            None => refs.push(start),
            Some(end) => match CellRef::expand_range(start, end) {
                Ok(cells) => refs.extend(cells),
                Err(_) => refs.extend([start, end]),
            },
        }
    }

    refs
}
