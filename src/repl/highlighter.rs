//! Highlighter for reedline - colors words by match kind
//!
//! Words that exactly name a known candidate take the color of its kind;
//! everything else is left plain.

use std::collections::HashMap;

use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use crate::matches::{MatchDesc, MatchKind};

/// Style used for each match kind
pub fn kind_style(kind: MatchKind) -> Style {
    match kind {
        MatchKind::Dir => Style::new().fg(Color::Blue).bold(),
        MatchKind::Cmd => Style::new().fg(Color::Green).bold(),
        MatchKind::Alias => Style::new().fg(Color::Cyan),
        MatchKind::Arg => Style::new().fg(Color::Yellow),
        MatchKind::File => Style::new().fg(Color::White),
        MatchKind::Word | MatchKind::None => Style::default(),
    }
}

/// Highlights words that are known candidates
pub struct KindHighlighter {
    known: HashMap<String, MatchKind>,
    enabled: bool,
}

impl KindHighlighter {
    pub fn new(items: &[MatchDesc], enabled: bool) -> Self {
        let known = items
            .iter()
            .map(|item| (item.text.to_lowercase(), item.kind.kind))
            .collect();
        Self { known, enabled }
    }

    fn style_for(&self, word: &str) -> Style {
        self.known
            .get(&word.to_lowercase())
            .map(|kind| kind_style(*kind))
            .unwrap_or_default()
    }
}

impl Highlighter for KindHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        if !self.enabled {
            styled.push((Style::default(), line.to_string()));
            return styled;
        }

        let mut rest = line;
        while !rest.is_empty() {
            let split = rest
                .find(|c: char| c.is_whitespace() != rest.starts_with(char::is_whitespace))
                .unwrap_or(rest.len());
            let (chunk, tail) = rest.split_at(split);
            let style = if chunk.starts_with(char::is_whitespace) {
                Style::default()
            } else {
                self.style_for(chunk)
            };
            styled.push((style, chunk.to_string()));
            rest = tail;
        }
        styled
    }
}
