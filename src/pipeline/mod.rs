//! Match pipeline: generate, select, coalesce, sort
//!
//! The pipeline holds no state of its own; it runs the stages over a borrowed
//! [`Matches`] set:
//!
//! 1. **generate**: run the [`GeneratorChain`] until one generator claims the word
//! 2. **select**: mark candidates the typed needle is a caseless prefix of
//! 3. **coalesce**: move the selected candidates to the front, in order
//! 4. **sort**: order the visible candidates for display
//!
//! # Examples
//!
//! ```
//! use matchkit::matches::{MatchDesc, MatchKind, Matches};
//! use matchkit::pipeline::{GeneratorChain, LineState, ListGenerator, MatchPipeline, SortDirs};
//!
//! let mut chain = GeneratorChain::new();
//! chain.add(
//!     Box::new(ListGenerator::new(
//!         "fruit",
//!         ["banana", "Apple", "apricot"]
//!             .iter()
//!             .map(|w| MatchDesc::new(*w, MatchKind::Word))
//!             .collect(),
//!     )),
//!     10,
//! );
//!
//! let mut matches = Matches::new(4096);
//! let count = MatchPipeline::new(&mut matches).complete(
//!     &LineState::from_word("ap"),
//!     &chain,
//!     SortDirs::With,
//! );
//! assert_eq!(count, 2);
//! assert_eq!(matches.get_match(0), Some("Apple"));
//! ```

mod generator;
mod sort;

pub use generator::{GeneratorChain, LineState, ListGenerator, MatchGenerator};
pub use sort::{compare_matches, sort_matches, SortDirs};

use std::collections::HashSet;

use tracing::debug;

use crate::lookaside::{sanitize, MatchArray};
use crate::matches::{compare, Matches};

/// Stages of one completion attempt over a borrowed set
pub struct MatchPipeline<'a> {
    matches: &'a mut Matches,
}

impl<'a> MatchPipeline<'a> {
    pub fn new(matches: &'a mut Matches) -> Self {
        Self { matches }
    }

    /// Start a new attempt, invalidating all previous store ids.
    pub fn reset(&mut self) {
        self.matches.reset();
    }

    /// Fill the set from the first generator that claims the word.
    pub fn generate(&mut self, state: &LineState, chain: &GeneratorChain) -> bool {
        let claimed = chain.generate(state, self.matches);
        debug!(
            word = state.word(),
            claimed,
            matches = self.matches.info_count(),
            "generated"
        );
        claimed
    }

    /// Mark every candidate that `needle` is a caseless prefix of.
    ///
    /// Returns the number selected. The set is not reordered; follow with
    /// [`MatchPipeline::coalesce`].
    pub fn select(&mut self, needle: &str) -> usize {
        let (store, infos) = self.matches.parts_mut();
        let mut selected = 0;
        for info in infos.iter_mut() {
            let text = store.get(info.store_id).unwrap_or_default();
            info.selected = compare::is_caseless_prefix(needle, text);
            if info.selected {
                selected += 1;
            }
        }
        selected
    }

    /// Move up to `count_hint` selected candidates to the front.
    pub fn coalesce(&mut self, count_hint: usize) {
        self.matches.coalesce(count_hint);
    }

    /// Keep only visible candidates whose text appears in `keep`.
    ///
    /// `keep` is an array returned by a host filter; its placeholder slot is
    /// ignored. Texts are compared in their packed form, so a candidate with
    /// a line break still matches its packed copy. Returns the number kept.
    pub fn restrict(&mut self, keep: &MatchArray) -> usize {
        let kept: HashSet<&str> = keep.iter().map(|(_, text)| text).collect();

        let visible = self.matches.match_count();
        let (store, infos) = self.matches.parts_mut();
        let mut selected = 0;
        for (index, info) in infos.iter_mut().enumerate() {
            let text = store.get(info.store_id).unwrap_or_default();
            info.selected = index < visible && kept.contains(&*sanitize(text));
            if info.selected {
                selected += 1;
            }
        }

        self.matches.coalesce(selected);
        debug!(kept = selected, "restricted");
        selected
    }

    pub fn sort(&mut self, dirs: SortDirs) {
        sort_matches(self.matches, dirs);
    }

    /// Run a whole attempt: reset, generate, select the word under the
    /// cursor, coalesce and sort. Returns the visible count.
    pub fn complete(&mut self, state: &LineState, chain: &GeneratorChain, dirs: SortDirs) -> usize {
        self.reset();
        self.generate(state, chain);
        let selected = self.select(state.word());
        self.coalesce(selected);
        self.sort(dirs);
        self.matches.match_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookaside::MatchRecord;
    use crate::matches::{MatchDesc, MatchKind};

    fn set_of(words: &[&str]) -> Matches {
        let mut matches = Matches::new(1024);
        for word in words {
            matches.add(word);
        }
        matches
    }

    fn visible(matches: &Matches) -> Vec<&str> {
        (0..matches.match_count())
            .filter_map(|i| matches.get_match(i))
            .collect()
    }

    #[test]
    fn test_select_prefix() {
        let mut matches = set_of(&["abc", "abd", "xy"]);
        let mut pipeline = MatchPipeline::new(&mut matches);
        let count = pipeline.select("ab");
        pipeline.coalesce(count);
        assert_eq!(count, 2);
        assert_eq!(visible(&matches), vec!["abc", "abd"]);
    }

    #[test]
    fn test_select_caseless() {
        let mut matches = set_of(&["abc", "abd", "xy"]);
        let mut pipeline = MatchPipeline::new(&mut matches);
        let count = pipeline.select("AB");
        pipeline.coalesce(count);
        assert_eq!(visible(&matches), vec!["abc", "abd"]);
    }

    #[test]
    fn test_select_empty_needle_selects_all() {
        let mut matches = set_of(&["abc", "xy"]);
        assert_eq!(MatchPipeline::new(&mut matches).select(""), 2);
    }

    #[test]
    fn test_select_needle_longer_than_match() {
        let mut matches = set_of(&["ab"]);
        assert_eq!(MatchPipeline::new(&mut matches).select("abc"), 0);
    }

    #[test]
    fn test_coalesce_two_of_five_keeps_order() {
        let mut matches = set_of(&["pear", "apple", "plum", "apricot", "fig"]);
        let mut pipeline = MatchPipeline::new(&mut matches);
        let count = pipeline.select("ap");
        pipeline.coalesce(count);
        assert_eq!(visible(&matches), vec!["apple", "apricot"]);
    }

    #[test]
    fn test_restrict_by_kept_array() {
        let mut matches = set_of(&["one", "two", "three"]);
        let mut keep = MatchArray::new("");
        keep.push("three", &MatchRecord::default());
        keep.push("one", &MatchRecord::default());
        keep.push("absent", &MatchRecord::default());

        let kept = MatchPipeline::new(&mut matches).restrict(&keep);
        assert_eq!(kept, 2);
        assert_eq!(visible(&matches), vec!["one", "three"]);
    }

    #[test]
    fn test_complete_runs_all_stages() {
        let mut chain = GeneratorChain::new();
        chain.add(
            Box::new(ListGenerator::new(
                "files",
                vec![
                    MatchDesc::new("readme.md", MatchKind::File),
                    MatchDesc::new("Read/", MatchKind::Dir),
                    MatchDesc::new("src/", MatchKind::Dir),
                ],
            )),
            0,
        );

        let mut matches = Matches::new(1024);
        let mut pipeline = MatchPipeline::new(&mut matches);
        let count = pipeline.complete(&LineState::from_word("rea"), &chain, SortDirs::Before);
        assert_eq!(count, 2);
        assert_eq!(visible(&matches), vec!["Read/", "readme.md"]);

        // A second attempt reuses the set.
        let mut pipeline = MatchPipeline::new(&mut matches);
        let count = pipeline.complete(&LineState::from_word("s"), &chain, SortDirs::Before);
        assert_eq!(count, 1);
        assert_eq!(visible(&matches), vec!["src/"]);
    }
}
