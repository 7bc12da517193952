//! Extraction of `###value###` markers from program output.
//!
//! Each finder requires exactly one marker of its shape in the whole text.
//! No match and several matches both give `None`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Delimiter wrapped around every marker
pub const DELIMITER: &str = "###";

static STRING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)###.*?###").expect("string marker pattern"));
static INTEGER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"###[+-]?[0-9]+###").expect("integer marker pattern"));
static DOUBLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"###[+-]?[0-9]+\.[0-9]+###").expect("double marker pattern"));

/// The interior of the single match, or `None`
fn unique_interior<'a>(pattern: &Regex, haystack: &'a str) -> Option<&'a str> {
    let mut matches = pattern.find_iter(haystack);
    let only = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    let text = only.as_str();
    Some(&text[DELIMITER.len()..text.len() - DELIMITER.len()])
}

/// Shortest `###...###` run, possibly spanning lines, returned verbatim
pub fn find_string(haystack: &str) -> Option<String> {
    unique_interior(&STRING_MARKER, haystack).map(str::to_string)
}

/// Signed base-10 integer marker; out-of-range values give `None`
pub fn find_integer(haystack: &str) -> Option<i64> {
    unique_interior(&INTEGER_MARKER, haystack)?.parse().ok()
}

/// Signed decimal marker with a mandatory fractional part
pub fn find_double(haystack: &str) -> Option<f64> {
    unique_interior(&DOUBLE_MARKER, haystack)?.parse().ok()
}
