/// Fallback identifier for names that normalize to nothing.
const FALLBACK: &str = "col";

/// Map an arbitrary string to a safe table/column identifier.
///
/// Every character outside `[0-9A-Za-z_]` becomes `_`, the result is
/// lowercased, runs of `_` collapse to one, and leading/trailing `_` are
/// trimmed. An input that normalizes to nothing yields `"col"`. Total and
/// idempotent for any input.
pub fn clean_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' {
            c.to_ascii_lowercase()
        } else {
            '_'
        };
        if c == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(c);
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}
