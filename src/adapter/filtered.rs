//! Pre-resolved match records

use std::collections::HashSet;

use crate::lookaside::{unpack, MatchArray, MatchRecord};
use crate::matches::{MatchFlags, MatchType};

/// One match with its metadata already resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredMatch {
    pub text: String,
    pub kind: MatchType,
    pub append_char: Option<char>,
    pub flags: MatchFlags,
    pub display: String,
    pub description: String,
}

impl FilteredMatch {
    pub fn new(text: impl Into<String>, record: MatchRecord) -> Self {
        Self {
            text: text.into(),
            kind: record.kind,
            append_char: record.append_char,
            flags: record.flags,
            display: record.display,
            description: record.description,
        }
    }
}

/// Matches that no longer need a store or a registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredMatches {
    items: Vec<FilteredMatch>,
}

impl FilteredMatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unpack every real match of `array`; malformed slots are skipped.
    pub fn from_array(array: &MatchArray) -> Self {
        (1..=array.len())
            .filter_map(|slot| array.slot(slot).and_then(unpack))
            .map(|(text, record)| FilteredMatch::new(text, record))
            .collect()
    }

    pub fn push(&mut self, item: FilteredMatch) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FilteredMatch> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilteredMatch> {
        self.items.iter()
    }

    /// Drop every match whose text is not in `keep`, preserving order.
    pub fn retain_texts(&mut self, keep: &HashSet<&str>) {
        self.items.retain(|item| keep.contains(item.text.as_str()));
    }

    pub fn has_descriptions(&self) -> bool {
        self.items.iter().any(|item| !item.description.is_empty())
    }
}

impl FromIterator<FilteredMatch> for FilteredMatches {
    fn from_iter<T: IntoIterator<Item = FilteredMatch>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
