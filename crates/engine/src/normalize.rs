/// Placeholder written for a missing text value. Missing names are kept as
/// this literal rather than null so every fact row carries a value.
pub const MISSING_TEXT: &str = "NONE";

/// Canonical text form: trimmed, upper-cased. `None` becomes [`MISSING_TEXT`].
pub fn normalize_text(value: Option<&str>) -> String {
    match value {
        Some(s) => s.trim().to_uppercase(),
        None => MISSING_TEXT.to_string(),
    }
}
