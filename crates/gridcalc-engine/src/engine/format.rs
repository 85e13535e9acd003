/// Format a number for substitution into formula text.
///
/// Integral values print without a fraction and non-finite values use the
/// `NaN` / `Infinity` spelling so results read the same in both modes.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Format a list as its comma-joined elements.
pub fn format_list(items: &[f64]) -> String {
    items
        .iter()
        .map(|n| format_number(*n))
        .collect::<Vec<_>>()
        .join(",")
}
