//! Completer for reedline - runs the match pipeline on Tab

use reedline::{Completer, Span, Suggestion};

use crate::adapter::MatchAdapter;
use crate::config::MatchingConfig;
use crate::lookaside::Lookaside;
use crate::matches::{MatchKind, Matches};
use crate::pipeline::{GeneratorChain, LineState, MatchPipeline, SortDirs};

/// Byte offset where the word ending at `pos` starts.
pub fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(char::is_whitespace)
        .map(|i| i + line[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0)
}

/// Completer backed by a generator chain
///
/// One set of matches is reused for every attempt; the adapter owns it so
/// suggestions are read the same way display code reads any source.
pub struct MatchCompleter {
    chain: GeneratorChain,
    adapter: MatchAdapter,
    sort_dirs: SortDirs,
}

impl MatchCompleter {
    /// Create a new completer
    ///
    /// # Arguments
    /// * `chain` - Generators to run, highest priority first
    /// * `config` - Store size and sort settings
    pub fn new(chain: GeneratorChain, config: &MatchingConfig) -> Self {
        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(Matches::new(config.store_capacity));
        Self {
            chain,
            adapter,
            sort_dirs: config.sort_dirs,
        }
    }

    /// Matches from the most recent attempt.
    pub fn adapter(&self) -> &MatchAdapter {
        &self.adapter
    }

    fn suggestion(&self, index: usize, span: Span) -> Option<Suggestion> {
        let text = self.adapter.text(index)?;
        let kind = self.adapter.kind(index);
        let suppress = self.adapter.flags(index).suppress_append();
        let append_whitespace = match suppress {
            Some(suppress) => !suppress,
            None => kind.kind != MatchKind::Dir,
        };

        Some(Suggestion {
            value: text.to_string(),
            description: self.adapter.description(index).map(|d| d.into_owned()),
            style: None,
            extra: None,
            span,
            append_whitespace,
            match_indices: None,
        })
    }
}

impl Completer for MatchCompleter {
    /// Complete the word ending at the cursor
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - Visible matches in display order
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let state = LineState::new(line, word_start(line, pos.min(line.len())), pos);
        let Some(matches) = self.adapter.owned_mut() else {
            return Vec::new();
        };
        MatchPipeline::new(matches).complete(&state, &self.chain, self.sort_dirs);

        let span = Span::new(state.word_start(), state.cursor());
        (0..self.adapter.count())
            .filter_map(|i| self.suggestion(i, span))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::{MatchDesc, MatchFlags};
    use crate::pipeline::ListGenerator;

    fn create_test_completer() -> MatchCompleter {
        let mut chain = GeneratorChain::new();
        chain.add(
            Box::new(
                ListGenerator::new(
                    "commands",
                    vec![
                        MatchDesc::new("git", MatchKind::Cmd).with_description("version control"),
                        MatchDesc::new("grep", MatchKind::Cmd),
                    ],
                )
                .first_word_only(),
            ),
            10,
        );
        chain.add(
            Box::new(ListGenerator::new(
                "args",
                vec![
                    MatchDesc::new("checkout", MatchKind::Arg),
                    MatchDesc::new("cherry-pick", MatchKind::Arg),
                    MatchDesc::new("src/", MatchKind::Dir),
                    MatchDesc::new("--force", MatchKind::Arg)
                        .with_flags(MatchFlags::with_suppress_append(true)),
                ],
            )),
            0,
        );
        MatchCompleter::new(chain, &MatchingConfig::default())
    }

    #[test]
    fn test_completer_can_be_boxed_for_reedline() {
        let completer: Box<dyn Completer> = Box::new(create_test_completer());
        drop(completer);
    }

    #[test]
    fn test_word_start() {
        assert_eq!(word_start("git che", 7), 4);
        assert_eq!(word_start("git", 3), 0);
        assert_eq!(word_start("git ", 4), 4);
        assert_eq!(word_start("a\u{3000}b", 4), 4);
    }

    #[test]
    fn test_complete_first_word() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("g", 1);
        let values: Vec<_> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["git", "grep"]);
        assert_eq!(
            suggestions[0].description.as_deref(),
            Some("version control")
        );
        assert!(suggestions[0].append_whitespace);
    }

    #[test]
    fn test_complete_later_word() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("git CH", 6);
        let values: Vec<_> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["checkout", "cherry-pick"]);
        for suggestion in &suggestions {
            assert_eq!(suggestion.span.start, 4);
            assert_eq!(suggestion.span.end, 6);
        }
        assert_eq!(completer.adapter().longest_common_prefix(), "che");
    }

    #[test]
    fn test_append_whitespace_rules() {
        let mut completer = create_test_completer();
        let dirs = completer.complete("git s", 5);
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].append_whitespace);

        let flags = completer.complete("git --f", 7);
        assert_eq!(flags.len(), 1);
        assert!(!flags[0].append_whitespace);
    }

    #[test]
    fn test_no_matches() {
        let mut completer = create_test_completer();
        assert!(completer.complete("git zzz", 7).is_empty());
    }
}
