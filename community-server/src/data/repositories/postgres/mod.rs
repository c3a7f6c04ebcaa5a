pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;

/// Turns a free-text term into an `ILIKE` pattern matching it as a
/// substring. `\`, `%` and `_` in the term are matched literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
