//! Caseless string comparison
//!
//! Character equality folds case with [`char::to_lowercase`], so non-ASCII
//! letters compare caselessly too. Indices returned here are byte offsets
//! into the first argument and always fall on a char boundary.

use std::cmp::Ordering;

fn fold_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte offset in `a` where `a` and `b` first differ, ignoring case.
///
/// Returns `None` when the strings are equal. When one string is a prefix of
/// the other the offset is the length of the shorter one (measured in `a`).
pub fn str_compare(a: &str, b: &str) -> Option<usize> {
    let mut b_chars = b.chars();
    for (i, ca) in a.char_indices() {
        match b_chars.next() {
            Some(cb) if fold_eq(ca, cb) => {}
            _ => return Some(i),
        }
    }
    if b_chars.next().is_some() {
        Some(a.len())
    } else {
        None
    }
}

/// True when `needle` is a caseless prefix of `text`.
pub fn is_caseless_prefix(needle: &str, text: &str) -> bool {
    match str_compare(needle, text) {
        None => true,
        Some(j) => j == needle.len(),
    }
}

/// Length in bytes (of `lcd`) of the caseless common prefix of both strings.
pub fn common_prefix_len(lcd: &str, other: &str) -> usize {
    str_compare(lcd, other).unwrap_or(lcd.len())
}

/// Longest caseless common prefix of all `texts`, spelled as in the first.
pub fn longest_common_prefix<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut iter = texts.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut len = first.len();
    for text in iter {
        len = common_prefix_len(&first[..len], text);
        if len == 0 {
            break;
        }
    }
    first[..len].to_string()
}

/// Caseless lexicographic ordering.
pub fn cmp_caseless(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
