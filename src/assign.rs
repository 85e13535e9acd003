//! Line-oriented cell assignment (`A1 = 5`, `B1 = =A1*2`).

use std::io::{BufRead, Write};

use gridcalc_core::Sheet;

use crate::error::{GridcalcError, Result};

/// Parse one input line. Blank lines and `#` comments yield `None`.
///
/// The id ends at the first `=`; everything after it is the cell input, so
/// `B1==A1*2` writes the formula `=A1*2` into B1.
pub fn parse_assignment(line: &str, line_no: usize) -> Result<Option<(String, String)>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let Some((id, input)) = trimmed.split_once('=') else {
        return Err(GridcalcError::Parse {
            line: line_no,
            message: format!("expected ID=VALUE, found '{}'", trimmed),
        });
    };
    let id = id.trim();
    if id.is_empty() {
        return Err(GridcalcError::Parse {
            line: line_no,
            message: "missing cell id".to_string(),
        });
    }
    Ok(Some((id.to_string(), input.trim().to_string())))
}

/// Apply every assignment read from `input`, writing `ID: value` for each.
///
/// Failed lines are reported on `out` as `#ERR` and processing continues.
/// Returns the number of failed lines.
pub fn run_assignments<R: BufRead, W: Write>(sheet: &Sheet, input: R, out: &mut W) -> Result<usize> {
    let mut failures = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let (id, value) = match parse_assignment(&line, line_no) {
            Ok(Some(assignment)) => assignment,
            Ok(None) => continue,
            Err(err) => {
                failures += 1;
                writeln!(out, "#ERR: {}", err)?;
                continue;
            }
        };
        match sheet.update(&id, &value) {
            Ok(shown) => writeln!(out, "{}: {}", id.to_ascii_uppercase(), shown)?,
            Err(err) => {
                failures += 1;
                writeln!(out, "{}: #ERR: {}", id.to_ascii_uppercase(), err)?;
            }
        }
    }
    Ok(failures)
}
