// SPDX-License-Identifier: GPL-3.0-only

/// Escape character used with `LIKE ... ESCAPE '\'`
pub const LIKE_ESCAPE: char = '\\';

/// Build a case-insensitive `LIKE` pattern matching `needle` anywhere.
///
/// `%`, `_` and the escape character itself are matched literally. Only ASCII
/// is case-folded, matching SQLite's `LOWER()`; compare against `LOWER(column)`.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars().map(|c| c.to_ascii_lowercase()) {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
