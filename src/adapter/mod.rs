//! Read-only view over whichever match source is active
//!
//! Display code does not care where matches came from. A [`MatchAdapter`]
//! holds exactly one [`MatchSource`]:
//!
//! - **Owned**: a [`Matches`] set produced by the pipeline
//! - **Borrowed**: a plain [`MatchArray`] whose metadata is recovered through
//!   the [`Lookaside`] registries
//! - **Filtered**: [`FilteredMatches`] with every field already resolved
//!
//! The longest common prefix, the count and whether any match has a
//! description are computed on first use and cached until the source is
//! replaced.
//!
//! # Examples
//!
//! ```
//! use matchkit::adapter::MatchAdapter;
//! use matchkit::lookaside::Lookaside;
//! use matchkit::matches::{MatchDesc, MatchKind, Matches};
//!
//! let mut matches = Matches::new(1024);
//! matches.add_match(&MatchDesc::new("readme", MatchKind::File).with_description("docs"));
//! matches.add_match(&MatchDesc::new("real", MatchKind::Word));
//!
//! let mut adapter = MatchAdapter::new(Lookaside::new());
//! adapter.set_owned(matches);
//! assert_eq!(adapter.count(), 2);
//! assert_eq!(adapter.longest_common_prefix(), "rea");
//! assert!(adapter.has_descriptions());
//! assert_eq!(adapter.display(1).as_deref(), Some("real"));
//! ```

mod filtered;

pub use filtered::{FilteredMatch, FilteredMatches};

use std::borrow::Cow;
use std::cell::{Cell, OnceCell};
use std::collections::HashSet;
use std::mem;
use std::sync::Arc;

use tracing::debug;

use crate::lookaside::{Lookaside, MatchArray, MatchDetails, MatchRecord};
use crate::matches::{compare, MatchFlags, MatchType, Matches};
use crate::pipeline::MatchPipeline;

/// The matches an adapter reads from
#[derive(Debug, Default)]
pub enum MatchSource {
    #[default]
    Empty,
    Owned(Matches),
    /// `own` means the adapter destroys the array's registry when it lets go.
    Borrowed { array: Arc<MatchArray>, own: bool },
    Filtered(FilteredMatches),
}

#[derive(Debug, Default)]
struct SourceCache {
    count: OnceCell<usize>,
    lcd: OnceCell<String>,
    has_descriptions: Cell<Option<bool>>,
}

/// Host hook that narrows the current matches
///
/// The filter receives the matches packed into an array whose registry is
/// active for the duration of the call, so it may look up metadata by key.
/// It returns the matches to keep (only their texts matter), or `None` to
/// leave the matches untouched.
pub trait MatchFilter {
    /// False when there is nothing to run; the array is then never built.
    fn is_active(&self) -> bool {
        true
    }

    fn filter(&mut self, array: &MatchArray, lookaside: &Lookaside) -> Option<MatchArray>;
}

impl<F> MatchFilter for F
where
    F: FnMut(&MatchArray, &Lookaside) -> Option<MatchArray>,
{
    fn filter(&mut self, array: &MatchArray, lookaside: &Lookaside) -> Option<MatchArray> {
        self(array, lookaside)
    }
}

/// Uniform accessors over an owned set, a borrowed array or filtered records
#[derive(Debug)]
pub struct MatchAdapter {
    lookaside: Lookaside,
    source: MatchSource,
    cache: SourceCache,
}

impl MatchAdapter {
    pub fn new(lookaside: Lookaside) -> Self {
        Self {
            lookaside,
            source: MatchSource::Empty,
            cache: SourceCache::default(),
        }
    }

    pub fn lookaside(&self) -> &Lookaside {
        &self.lookaside
    }

    pub fn source(&self) -> &MatchSource {
        &self.source
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self.source, MatchSource::Empty)
    }

    /// Read from a pipeline-produced set.
    pub fn set_owned(&mut self, matches: Matches) {
        self.replace(MatchSource::Owned(matches));
    }

    /// Read from a plain array, resolving metadata through the lookaside.
    ///
    /// With `take_ownership`, the adapter destroys the array's registry when
    /// the source is replaced or the adapter is dropped. An array whose
    /// registry was never created has nothing to own; its matches read with
    /// default metadata. Passing the array that is already active only
    /// upgrades ownership.
    pub fn set_borrowed(&mut self, array: Arc<MatchArray>, take_ownership: bool) {
        let take_ownership = take_ownership && self.lookaside.is_registered(&array);
        if let MatchSource::Borrowed { array: current, own } = &mut self.source
            && Arc::ptr_eq(current, &array)
        {
            *own |= take_ownership;
            self.cache = SourceCache::default();
            return;
        }
        self.replace(MatchSource::Borrowed {
            array,
            own: take_ownership,
        });
    }

    pub fn set_filtered(&mut self, filtered: FilteredMatches) {
        self.replace(MatchSource::Filtered(filtered));
    }

    /// Tear down the current source and go back to empty.
    pub fn reset(&mut self) {
        self.teardown();
    }

    /// Mutable access to an owned set. Cached values are dropped first.
    pub fn owned_mut(&mut self) -> Option<&mut Matches> {
        self.cache = SourceCache::default();
        match &mut self.source {
            MatchSource::Owned(matches) => Some(matches),
            _ => None,
        }
    }

    fn replace(&mut self, source: MatchSource) {
        self.teardown();
        self.source = source;
    }

    fn teardown(&mut self) {
        self.cache = SourceCache::default();
        let previous = mem::take(&mut self.source);
        if let MatchSource::Borrowed { array, own: true } = previous {
            self.lookaside.destroy(&array);
        }
    }

    /// Metadata of a borrowed match; defaults when its array has no registry.
    fn details(&self, index: usize) -> Option<MatchDetails> {
        match &self.source {
            MatchSource::Borrowed { array, .. } => array
                .match_key(index)
                .map(|key| self.lookaside.try_find(key).unwrap_or_default()),
            _ => None,
        }
    }

    pub fn count(&self) -> usize {
        *self.cache.count.get_or_init(|| match &self.source {
            MatchSource::Empty => 0,
            MatchSource::Owned(matches) => matches.match_count(),
            MatchSource::Borrowed { array, .. } => array.len(),
            MatchSource::Filtered(filtered) => filtered.len(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        match &self.source {
            MatchSource::Empty => None,
            MatchSource::Owned(matches) => matches.get_match(index),
            MatchSource::Borrowed { array, .. } => array.text(index),
            MatchSource::Filtered(filtered) => filtered.get(index).map(|m| m.text.as_str()),
        }
    }

    pub fn kind(&self, index: usize) -> MatchType {
        match &self.source {
            MatchSource::Empty => MatchType::default(),
            MatchSource::Owned(matches) => matches.get_match_type(index),
            MatchSource::Borrowed { .. } => self.details(index).map(|d| d.kind()).unwrap_or_default(),
            MatchSource::Filtered(filtered) => filtered.get(index).map(|m| m.kind).unwrap_or_default(),
        }
    }

    pub fn append_char(&self, index: usize) -> Option<char> {
        match &self.source {
            MatchSource::Empty => None,
            MatchSource::Owned(matches) => matches.get_match_append_char(index),
            MatchSource::Borrowed { .. } => self.details(index).and_then(|d| d.append_char()),
            MatchSource::Filtered(filtered) => filtered.get(index).and_then(|m| m.append_char),
        }
    }

    pub fn flags(&self, index: usize) -> MatchFlags {
        match &self.source {
            MatchSource::Empty => MatchFlags::empty(),
            MatchSource::Owned(matches) => matches.get_match_flags(index),
            MatchSource::Borrowed { .. } => self.details(index).map(|d| d.flags()).unwrap_or_default(),
            MatchSource::Filtered(filtered) => filtered.get(index).map(|m| m.flags).unwrap_or_default(),
        }
    }

    /// Custom display text only; `None` when the match has none.
    pub fn display_raw(&self, index: usize) -> Option<Cow<'_, str>> {
        let display = match &self.source {
            MatchSource::Empty => None,
            MatchSource::Owned(matches) => matches.get_match_display(index).map(Cow::Borrowed),
            MatchSource::Borrowed { .. } => self
                .details(index)
                .map(|d| Cow::Owned(d.display().to_string())),
            MatchSource::Filtered(filtered) => {
                filtered.get(index).map(|m| Cow::Borrowed(m.display.as_str()))
            }
        };
        display.filter(|d| !d.is_empty())
    }

    /// Text to show for a match: its custom display, else the match text.
    pub fn display(&self, index: usize) -> Option<Cow<'_, str>> {
        self.display_raw(index)
            .or_else(|| self.text(index).map(Cow::Borrowed))
    }

    /// Description; `None` when empty.
    pub fn description(&self, index: usize) -> Option<Cow<'_, str>> {
        let description = match &self.source {
            MatchSource::Empty => None,
            MatchSource::Owned(matches) => matches.get_match_description(index).map(Cow::Borrowed),
            MatchSource::Borrowed { .. } => self
                .details(index)
                .map(|d| Cow::Owned(d.description().to_string())),
            MatchSource::Filtered(filtered) => filtered
                .get(index)
                .map(|m| Cow::Borrowed(m.description.as_str())),
        };
        description.filter(|d| !d.is_empty())
    }

    /// Caseless longest common prefix of all matches.
    pub fn longest_common_prefix(&self) -> &str {
        self.cache.lcd.get_or_init(|| match &self.source {
            MatchSource::Empty => String::new(),
            MatchSource::Owned(matches) => matches.lcd(),
            MatchSource::Borrowed { array, .. } => {
                compare::longest_common_prefix(array.iter().map(|(_, text)| text))
            }
            MatchSource::Filtered(filtered) => {
                compare::longest_common_prefix(filtered.iter().map(|m| m.text.as_str()))
            }
        })
    }

    pub fn has_descriptions(&self) -> bool {
        if let Some(known) = self.cache.has_descriptions.get() {
            return known;
        }
        let found = match &self.source {
            MatchSource::Empty => false,
            MatchSource::Owned(matches) => matches.has_descriptions(),
            MatchSource::Borrowed { array, .. } => array.iter().any(|(key, _)| {
                self.lookaside
                    .try_find(key)
                    .is_some_and(|d| !d.description().is_empty())
            }),
            MatchSource::Filtered(filtered) => filtered.has_descriptions(),
        };
        self.cache.has_descriptions.set(Some(found));
        found
    }

    /// Pack the current matches into an array with an empty placeholder.
    pub fn to_array(&self) -> MatchArray {
        let mut array = MatchArray::new("");
        for index in 0..self.count() {
            let Some(text) = self.text(index) else {
                continue;
            };
            let record = MatchRecord {
                kind: self.kind(index),
                append_char: self.append_char(index),
                flags: self.flags(index),
                display: self.display_raw(index).unwrap_or_default().into_owned(),
                description: self.description(index).unwrap_or_default().into_owned(),
            };
            array.push(text, &record);
        }
        array
    }

    /// Let a host filter narrow the current matches.
    ///
    /// The matches are packed into an array and registered while the filter
    /// runs. An owned set is restricted in place; any other source becomes
    /// filtered records. Returns the resulting count.
    pub fn filter_matches(&mut self, filter: &mut dyn MatchFilter) -> usize {
        let count = self.count();
        if count == 0 || !filter.is_active() {
            return count;
        }

        let array = self.to_array();
        let created = self.lookaside.create(&array);
        let kept = filter.filter(&array, &self.lookaside);
        if created {
            self.lookaside.destroy(&array);
        }

        let Some(kept) = kept else {
            debug!(count, "filter kept everything");
            return count;
        };

        match self.owned_mut() {
            Some(matches) => {
                MatchPipeline::new(matches).restrict(&kept);
            }
            None => {
                let keep: HashSet<&str> = kept.iter().map(|(_, text)| text).collect();
                let mut filtered = FilteredMatches::from_array(&array);
                filtered.retain_texts(&keep);
                self.set_filtered(filtered);
            }
        }

        let remaining = self.count();
        debug!(before = count, after = remaining, "matches filtered");
        remaining
    }
}

impl Drop for MatchAdapter {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::{MatchDesc, MatchKind};

    fn owned(items: &[(&str, &str)]) -> Matches {
        let mut matches = Matches::new(1024);
        for (text, description) in items {
            let mut desc = MatchDesc::new(*text, MatchKind::Word);
            if !description.is_empty() {
                desc = desc.with_description(*description);
            }
            matches.add_match(&desc);
        }
        matches
    }

    fn borrowed_array() -> MatchArray {
        let mut array = MatchArray::new("");
        array.push(
            "foo.txt",
            &MatchRecord {
                kind: MatchKind::File.into(),
                append_char: Some(' '),
                description: "a file".to_string(),
                ..MatchRecord::default()
            },
        );
        array.push(
            "food/",
            &MatchRecord {
                kind: MatchKind::Dir.into(),
                display: "food (dir)".to_string(),
                ..MatchRecord::default()
            },
        );
        array
    }

    #[test]
    fn test_empty_adapter() {
        let adapter = MatchAdapter::new(Lookaside::new());
        assert!(!adapter.is_initialized());
        assert_eq!(adapter.count(), 0);
        assert_eq!(adapter.text(0), None);
        assert_eq!(adapter.longest_common_prefix(), "");
        assert!(!adapter.has_descriptions());
    }

    #[test]
    fn test_owned_accessors() {
        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(owned(&[("read", ""), ("readme", "docs"), ("real", "")]));

        assert_eq!(adapter.count(), 3);
        assert_eq!(adapter.text(1), Some("readme"));
        assert_eq!(adapter.kind(1).kind, MatchKind::Word);
        assert_eq!(adapter.display(0).as_deref(), Some("read"));
        assert_eq!(adapter.display_raw(0), None);
        assert_eq!(adapter.description(0), None);
        assert_eq!(adapter.description(1).as_deref(), Some("docs"));
        assert_eq!(adapter.longest_common_prefix(), "rea");
        assert!(adapter.has_descriptions());
    }

    #[test]
    fn test_borrowed_resolves_through_lookaside() {
        let lookaside = Lookaside::new();
        let array = Arc::new(borrowed_array());
        assert!(lookaside.create(&array));

        let mut adapter = MatchAdapter::new(lookaside.clone());
        adapter.set_borrowed(Arc::clone(&array), true);

        assert_eq!(adapter.count(), 2);
        assert_eq!(adapter.text(0), Some("foo.txt"));
        assert_eq!(adapter.kind(0).kind, MatchKind::File);
        assert_eq!(adapter.append_char(0), Some(' '));
        assert_eq!(adapter.description(0).as_deref(), Some("a file"));
        assert_eq!(adapter.display(0).as_deref(), Some("foo.txt"));
        assert_eq!(adapter.display(1).as_deref(), Some("food (dir)"));
        assert_eq!(adapter.longest_common_prefix(), "foo");
        assert!(adapter.has_descriptions());

        drop(adapter);
        assert_eq!(lookaside.active(), 0);
    }

    #[test]
    fn test_borrowed_without_ownership_keeps_registry() {
        let lookaside = Lookaside::new();
        let array = Arc::new(borrowed_array());
        lookaside.create(&array);

        let mut adapter = MatchAdapter::new(lookaside.clone());
        adapter.set_borrowed(Arc::clone(&array), false);
        adapter.reset();
        assert!(lookaside.is_registered(&array));

        adapter.set_borrowed(Arc::clone(&array), false);
        adapter.set_borrowed(Arc::clone(&array), true);
        adapter.reset();
        assert!(!lookaside.is_registered(&array));
    }

    #[test]
    fn test_replacing_source_invalidates_caches() {
        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(owned(&[("read", ""), ("readme", "docs")]));
        assert_eq!(adapter.longest_common_prefix(), "read");
        assert!(adapter.has_descriptions());
        assert_eq!(adapter.count(), 2);

        adapter.set_owned(owned(&[("xa", ""), ("xb", ""), ("xc", "")]));
        assert_eq!(adapter.longest_common_prefix(), "x");
        assert!(!adapter.has_descriptions());
        assert_eq!(adapter.count(), 3);

        let filtered: FilteredMatches = ["zeta", "zero"]
            .iter()
            .map(|t| FilteredMatch::new(*t, MatchRecord::default()))
            .collect();
        adapter.set_filtered(filtered);
        assert_eq!(adapter.longest_common_prefix(), "ze");
        assert_eq!(adapter.count(), 2);
    }

    #[test]
    fn test_owned_mut_invalidates_caches() {
        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(owned(&[("abc", ""), ("abd", ""), ("xy", "")]));
        assert_eq!(adapter.count(), 3);

        if let Some(matches) = adapter.owned_mut() {
            let mut pipeline = MatchPipeline::new(matches);
            let selected = pipeline.select("ab");
            pipeline.coalesce(selected);
        }
        assert_eq!(adapter.count(), 2);
        assert_eq!(adapter.longest_common_prefix(), "ab");
    }

    #[test]
    fn test_filter_restricts_owned_set() {
        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(owned(&[("alpha", "first"), ("beta", ""), ("gamma", "")]));

        let mut saw_description = false;
        let mut filter = |array: &MatchArray, lookaside: &Lookaside| {
            saw_description = array
                .iter()
                .any(|(key, _)| lookaside.find(key).description() == "first");
            let mut keep = MatchArray::new("");
            for (_, text) in array.iter().filter(|(_, text)| text.contains('m')) {
                keep.push(text, &MatchRecord::default());
            }
            Some(keep)
        };

        assert_eq!(adapter.filter_matches(&mut filter), 1);
        assert!(saw_description);
        assert_eq!(adapter.text(0), Some("gamma"));
        assert!(matches!(adapter.source(), MatchSource::Owned(_)));
        assert_eq!(adapter.lookaside().active(), 0);
    }

    #[test]
    fn test_filter_declining_keeps_everything() {
        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(owned(&[("alpha", ""), ("beta", "")]));
        let mut filter = |_: &MatchArray, _: &Lookaside| -> Option<MatchArray> { None };
        assert_eq!(adapter.filter_matches(&mut filter), 2);
    }

    #[test]
    fn test_filter_borrowed_becomes_filtered() {
        let lookaside = Lookaside::new();
        let array = Arc::new(borrowed_array());
        lookaside.create(&array);

        let mut adapter = MatchAdapter::new(lookaside.clone());
        adapter.set_borrowed(Arc::clone(&array), true);

        let mut filter = |array: &MatchArray, _: &Lookaside| -> Option<MatchArray> {
            let mut keep = MatchArray::new("");
            keep.push(array.text(1)?, &MatchRecord::default());
            Some(keep)
        };
        assert_eq!(adapter.filter_matches(&mut filter), 1);
        assert!(matches!(adapter.source(), MatchSource::Filtered(_)));
        assert_eq!(adapter.text(0), Some("food/"));
        assert_eq!(adapter.kind(0).kind, MatchKind::Dir);
        assert_eq!(adapter.display(0).as_deref(), Some("food (dir)"));
        assert_eq!(lookaside.active(), 0);
    }

    #[test]
    fn test_unregistered_array_reads_defaults() {
        let lookaside = Lookaside::new();
        let array = Arc::new(MatchArray::from_raw(vec![b"\0".to_vec(), b"bad\0".to_vec()]));
        assert!(!lookaside.create(&array));

        let mut adapter = MatchAdapter::new(lookaside.clone());
        adapter.set_borrowed(Arc::clone(&array), true);
        assert_eq!(adapter.count(), 1);
        assert_eq!(adapter.text(0), Some("bad"));
        assert_eq!(adapter.kind(0), MatchType::default());
        assert_eq!(adapter.append_char(0), None);
        assert_eq!(adapter.description(0), None);
        assert_eq!(adapter.display(0).as_deref(), Some("bad"));
        assert!(!adapter.has_descriptions());

        adapter.reset();
        assert_eq!(lookaside.active(), 0);
    }

    #[test]
    fn test_malformed_slot_in_registered_array_reads_defaults() {
        let good = borrowed_array().slot(1).map(<[u8]>::to_vec).unwrap();
        let array = Arc::new(MatchArray::from_raw(vec![
            b"\0".to_vec(),
            good.clone(),
            b"broken\0\x01".to_vec(),
            good,
        ]));
        let lookaside = Lookaside::new();
        assert!(lookaside.create(&array));

        let mut adapter = MatchAdapter::new(lookaside.clone());
        adapter.set_borrowed(Arc::clone(&array), true);
        assert_eq!(adapter.count(), 3);
        assert_eq!(adapter.description(1), None);
        assert_eq!(adapter.text(1), Some("broken"));
        assert_eq!(adapter.description(2).as_deref(), Some("a file"));

        drop(adapter);
        assert_eq!(lookaside.active(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "has no lookaside")]
    fn test_owned_registry_destroyed_elsewhere_panics_in_debug() {
        let lookaside = Lookaside::new();
        let array = Arc::new(borrowed_array());
        lookaside.create(&array);

        let mut adapter = MatchAdapter::new(lookaside.clone());
        adapter.set_borrowed(Arc::clone(&array), true);
        lookaside.destroy(&array);
        adapter.reset();
    }

    #[test]
    fn test_filter_keeping_everything_keeps_line_breaks() {
        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(owned(&[("a\nb", ""), ("c", "")]));

        let mut filter = |array: &MatchArray, _: &Lookaside| Some(array.clone());
        assert_eq!(adapter.filter_matches(&mut filter), 2);
        assert_eq!(adapter.text(0), Some("a\nb"));
    }

    #[test]
    fn test_adapter_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<MatchAdapter>();
        assert_send::<Lookaside>();
    }
}
