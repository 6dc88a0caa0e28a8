//! Match generators and the priority chain that runs them

use std::fmt;

use tracing::debug;

use crate::matches::{compare, MatchDesc, Matches};

/// The line being completed
///
/// Splitting the line into words is the caller's job; this only records
/// where the word under the cursor starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineState {
    line: String,
    word_start: usize,
    cursor: usize,
}

impl LineState {
    /// `word_start` and `cursor` are byte offsets; both are clamped to the
    /// line and moved back to a char boundary.
    pub fn new(line: impl Into<String>, word_start: usize, cursor: usize) -> Self {
        let line = line.into();
        let cursor = floor_boundary(&line, cursor.min(line.len()));
        let word_start = floor_boundary(&line, word_start.min(cursor));
        Self {
            line,
            word_start,
            cursor,
        }
    }

    /// State for completing a lone word with the cursor at its end.
    pub fn from_word(word: impl Into<String>) -> Self {
        let word = word.into();
        let len = word.len();
        Self::new(word, 0, len)
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn word_start(&self) -> usize {
        self.word_start
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text between the word start and the cursor.
    pub fn word(&self) -> &str {
        &self.line[self.word_start..self.cursor]
    }

    /// True when the word under the cursor is the first word of the line.
    pub fn is_first_word(&self) -> bool {
        self.line[..self.word_start].trim().is_empty()
    }
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Source of completion candidates
///
/// Returning `true` claims the word: generators with lower priority are not
/// run for this attempt. Generators must be `Send` so a chain can live
/// inside a line editor's completer.
pub trait MatchGenerator: Send {
    fn generate(&self, state: &LineState, out: &mut Matches) -> bool;

    fn name(&self) -> &str {
        "generator"
    }
}

impl<F> MatchGenerator for F
where
    F: Fn(&LineState, &mut Matches) -> bool + Send,
{
    fn generate(&self, state: &LineState, out: &mut Matches) -> bool {
        self(state, out)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Generator over a fixed list of candidates
///
/// Claims the word when at least one candidate starts with it (ignoring
/// case), and then adds the whole list; selection narrows it afterwards.
#[derive(Debug, Clone, Default)]
pub struct ListGenerator {
    name: String,
    items: Vec<MatchDesc>,
    first_word_only: bool,
    no_sort: bool,
}

impl ListGenerator {
    pub fn new(name: impl Into<String>, items: Vec<MatchDesc>) -> Self {
        Self {
            name: name.into(),
            items,
            ..Self::default()
        }
    }

    /// Only offer candidates for the first word of the line (commands).
    pub fn first_word_only(mut self) -> Self {
        self.first_word_only = true;
        self
    }

    /// Keep list order instead of sorting.
    pub fn no_sort(mut self) -> Self {
        self.no_sort = true;
        self
    }

    pub fn items(&self) -> &[MatchDesc] {
        &self.items
    }
}

impl MatchGenerator for ListGenerator {
    fn generate(&self, state: &LineState, out: &mut Matches) -> bool {
        if self.first_word_only && !state.is_first_word() {
            return false;
        }
        let word = state.word();
        if !self
            .items
            .iter()
            .any(|item| compare::is_caseless_prefix(word, &item.text))
        {
            return false;
        }

        for item in &self.items {
            out.add_match(item);
        }
        if self.no_sort {
            out.set_no_sort();
        }
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct Registered {
    priority: i32,
    generator: Box<dyn MatchGenerator>,
}

/// Generators ordered by descending priority
///
/// Generators with equal priority run in registration order.
#[derive(Default)]
pub struct GeneratorChain {
    generators: Vec<Registered>,
}

impl GeneratorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, generator: Box<dyn MatchGenerator>, priority: i32) {
        let at = self
            .generators
            .iter()
            .position(|g| g.priority < priority)
            .unwrap_or(self.generators.len());
        self.generators.insert(
            at,
            Registered {
                priority,
                generator,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Run generators until one claims the word. Returns whether any did.
    pub fn generate(&self, state: &LineState, out: &mut Matches) -> bool {
        for registered in &self.generators {
            if registered.generator.generate(state, out) {
                debug!(
                    generator = registered.generator.name(),
                    priority = registered.priority,
                    matches = out.info_count(),
                    "word claimed"
                );
                return true;
            }
        }
        false
    }
}

impl fmt::Debug for GeneratorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.generators
                    .iter()
                    .map(|g| (g.generator.name(), g.priority)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::MatchKind;

    fn list(name: &str, words: &[&str]) -> ListGenerator {
        ListGenerator::new(
            name,
            words
                .iter()
                .map(|w| MatchDesc::new(*w, MatchKind::Word))
                .collect(),
        )
    }

    #[test]
    fn test_line_state_word() {
        let state = LineState::new("git che", 4, 7);
        assert_eq!(state.word(), "che");
        assert!(!state.is_first_word());

        let state = LineState::new("  gi", 2, 99);
        assert_eq!(state.word(), "gi");
        assert!(state.is_first_word());
    }

    #[test]
    fn test_line_state_char_boundary() {
        let state = LineState::new("é", 0, 1);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.word(), "");
    }

    #[test]
    fn test_higher_priority_claims_first() {
        let mut chain = GeneratorChain::new();
        chain.add(Box::new(list("low", &["alpha", "beta"])), 10);
        chain.add(Box::new(list("high", &["alpine", "apple"])), 50);

        let mut out = Matches::new(256);
        assert!(chain.generate(&LineState::from_word("al"), &mut out));
        assert_eq!(out.get_match(0), Some("alpine"));
        assert_eq!(out.match_count(), 2);
    }

    #[test]
    fn test_falls_through_when_unclaimed() {
        let mut chain = GeneratorChain::new();
        chain.add(Box::new(list("low", &["beta", "bravo"])), 10);
        chain.add(Box::new(list("high", &["alpine"])), 50);

        let mut out = Matches::new(256);
        assert!(chain.generate(&LineState::from_word("b"), &mut out));
        assert_eq!(out.get_match(0), Some("beta"));
    }

    #[test]
    fn test_lower_priority_never_runs_after_claim() {
        let mut chain = GeneratorChain::new();
        chain.add(
            Box::new(|_: &LineState, out: &mut Matches| {
                out.add("fallback");
                true
            }),
            0,
        );
        chain.add(
            Box::new(|_: &LineState, out: &mut Matches| {
                out.add("claimed");
                true
            }),
            1,
        );

        let mut out = Matches::new(256);
        chain.generate(&LineState::from_word(""), &mut out);
        assert_eq!(out.match_count(), 1);
        assert_eq!(out.get_match(0), Some("claimed"));
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut chain = GeneratorChain::new();
        chain.add(Box::new(list("first", &["one"])), 5);
        chain.add(Box::new(list("second", &["one-two"])), 5);

        let mut out = Matches::new(256);
        chain.generate(&LineState::from_word("o"), &mut out);
        assert_eq!(out.get_match(0), Some("one"));
        assert_eq!(format!("{chain:?}"), r#"[("first", 5), ("second", 5)]"#);
    }

    #[test]
    fn test_first_word_only() {
        let commands = list("commands", &["git"]).first_word_only();
        let mut out = Matches::new(64);
        assert!(!commands.generate(&LineState::new("ls g", 3, 4), &mut out));
        assert!(commands.generate(&LineState::new("g", 0, 1), &mut out));
    }

    #[test]
    fn test_no_sort_marks_set() {
        let generator = list("ordered", &["b", "a"]).no_sort();
        let mut out = Matches::new(64);
        generator.generate(&LineState::from_word(""), &mut out);
        assert!(out.is_no_sort());
    }
}
