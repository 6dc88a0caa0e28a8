//! Match ordering

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::matches::{compare, MatchKind, MatchType, Matches};

/// Where directories go relative to other matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirs {
    Before,
    #[default]
    With,
    After,
}

impl SortDirs {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "before" => Some(SortDirs::Before),
            "with" => Some(SortDirs::With),
            "after" => Some(SortDirs::After),
            _ => None,
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_dir_match(text: &str, ty: MatchType) -> bool {
    match ty.kind {
        MatchKind::Dir => true,
        MatchKind::None => text.ends_with(is_separator),
        _ => false,
    }
}

fn kind_rank(kind: MatchKind) -> u8 {
    match kind {
        MatchKind::Dir => 0,
        MatchKind::Alias => 1,
        MatchKind::Cmd => 2,
        MatchKind::Word => 3,
        MatchKind::Arg => 4,
        MatchKind::File => 5,
        MatchKind::None => 6,
    }
}

fn leading_minus(text: &str) -> usize {
    text.chars().take_while(|&c| c == '-').count()
}

/// Compare two matches for display order.
///
/// Keys in order: directory placement, number of leading `-` (so short
/// flags precede long ones), caseless text, exact text, then kind.
pub fn compare_matches(
    l: &str,
    l_type: MatchType,
    r: &str,
    r_type: MatchType,
    dirs: SortDirs,
) -> Ordering {
    let l_dir = is_dir_match(l, l_type);
    let r_dir = is_dir_match(r, r_type);

    if l_dir != r_dir {
        match dirs {
            SortDirs::Before => return r_dir.cmp(&l_dir),
            SortDirs::After => return l_dir.cmp(&r_dir),
            SortDirs::With => {}
        }
    }

    let l = if l_dir { l.trim_end_matches(is_separator) } else { l };
    let r = if r_dir { r.trim_end_matches(is_separator) } else { r };

    leading_minus(l)
        .cmp(&leading_minus(r))
        .then_with(|| compare::cmp_caseless(l, r))
        .then_with(|| l.cmp(r))
        .then_with(|| kind_rank(l_type.kind).cmp(&kind_rank(r_type.kind)))
}

/// Sort the visible matches in place.
///
/// Sets flagged no-sort are restored to generation order instead.
pub fn sort_matches(matches: &mut Matches, dirs: SortDirs) {
    let count = matches.match_count();
    if count == 0 {
        return;
    }

    let no_sort = matches.is_no_sort();
    let (store, infos) = matches.parts_mut();
    let visible = &mut infos[..count];
    if no_sort {
        visible.sort_unstable_by_key(|info| info.ordinal);
    } else {
        visible.sort_unstable_by(|a, b| {
            let a_text = store.get(a.store_id).unwrap_or_default();
            let b_text = store.get(b.store_id).unwrap_or_default();
            compare_matches(a_text, a.kind, b_text, b.kind, dirs)
        });
    }
}
