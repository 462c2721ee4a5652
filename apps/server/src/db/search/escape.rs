//! LIKE pattern escaping for substring predicates.
//!
//! Patterns are emitted with `ESCAPE '\'`, so the wildcard characters `%` and
//! `_` and the escape character itself are prefixed with `\`.

pub(crate) const LIKE_ESCAPE_CHAR: char = '\\';

pub(crate) fn escape_like_pattern(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE_CHAR) {
            out.push(LIKE_ESCAPE_CHAR);
        }
        out.push(c);
    }
    out
}

/// `%term%` with the term escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like_pattern(term))
}
