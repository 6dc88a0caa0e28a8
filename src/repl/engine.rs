use reedline::{
    ColumnarMenu, DescriptionMode, Emacs, FileBackedHistory, IdeMenu, KeyCode, KeyModifiers,
    Keybindings, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal,
    default_emacs_keybindings,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::matches::{MatchDesc, MatchKind};
use crate::pipeline::{GeneratorChain, ListGenerator};

use super::completer::MatchCompleter;
use super::highlighter::{KindHighlighter, kind_style};
use super::path::PathGenerator;
use super::prompt::MatchPrompt;

const COMPLETION_MENU_NAME: &str = "completion_menu";

/// Priority of the candidate list; file names are offered below it.
const LIST_PRIORITY: i32 = 50;
const PATH_PRIORITY: i32 = 0;

/// Interactive line editor with Tab completion
pub struct ReplEngine {
    /// Line editor
    editor: Reedline,

    /// Prompt shown for each line
    prompt: MatchPrompt,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `config` - Matching and history configuration
    /// * `items` - Candidates offered for every word, ahead of file names
    ///
    /// # Returns
    /// * `Result<Self>` - New engine or error
    pub fn new(config: &Config, items: Vec<MatchDesc>) -> Result<Self> {
        let prompt = MatchPrompt::new(items.len());
        let has_descriptions = items.iter().any(|item| !item.description.is_empty());
        let highlighter = KindHighlighter::new(&items, true);
        let chain = build_chain(items, config.matching.no_sort);
        let completer = Box::new(MatchCompleter::new(chain, &config.matching));

        let mut keybindings = default_emacs_keybindings();
        configure_completion_keybindings(&mut keybindings);

        let mut editor = Reedline::create()
            .with_quick_completions(false)
            .with_partial_completions(true)
            .with_completer(completer)
            .with_highlighter(Box::new(highlighter))
            .with_menu(ReedlineMenu::EngineCompleter(create_completion_menu(
                has_descriptions,
            )))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        match FileBackedHistory::with_file(config.history.max_size, config.history.file_path.clone())
        {
            Ok(history) => editor = editor.with_history(Box::new(history)),
            Err(err) => warn!(%err, "history disabled"),
        }

        Ok(Self {
            editor,
            prompt,
            running: true,
        })
    }

    /// Check if the engine is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Read lines until Ctrl-D or `exit`
    pub fn run(&mut self) -> Result<()> {
        while self.running {
            match self.editor.read_line(&self.prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line == "exit" || line == "quit" {
                        self.running = false;
                    } else if !line.is_empty() {
                        debug!(line, "accepted");
                        println!("{line}");
                    }
                }
                Signal::CtrlC => continue,
                Signal::CtrlD => self.running = false,
                #[allow(unreachable_patterns)]
                _ => continue,
            }
        }
        Ok(())
    }
}

/// Candidate list first, then file names.
fn build_chain(items: Vec<MatchDesc>, no_sort: bool) -> GeneratorChain {
    let mut chain = GeneratorChain::new();
    if !items.is_empty() {
        let mut list = ListGenerator::new("candidates", items);
        if no_sort {
            list = list.no_sort();
        }
        chain.add(Box::new(list), LIST_PRIORITY);
    }
    chain.add(Box::new(PathGenerator), PATH_PRIORITY);
    chain
}

/// Descriptions get a side panel; plain names are laid out in columns.
fn create_completion_menu(with_descriptions: bool) -> Box<dyn reedline::Menu> {
    if with_descriptions {
        Box::new(
            IdeMenu::default()
                .with_name(COMPLETION_MENU_NAME)
                .with_description_mode(DescriptionMode::PreferRight)
                .with_padding(1)
                .with_max_completion_width(48)
                .with_max_description_width(60)
                .with_description_offset(2)
                .with_match_text_style(kind_style(MatchKind::Cmd)),
        )
    } else {
        Box::new(
            ColumnarMenu::default()
                .with_name(COMPLETION_MENU_NAME)
                .with_match_text_style(kind_style(MatchKind::Cmd)),
        )
    }
}

fn configure_completion_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU_NAME.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::SHIFT,
        KeyCode::BackTab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU_NAME.to_string()),
            ReedlineEvent::MenuPrevious,
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::Matches;
    use crate::pipeline::LineState;

    #[test]
    fn test_chain_prefers_candidate_list() {
        let chain = build_chain(vec![MatchDesc::new("status", MatchKind::Arg)], false);
        assert_eq!(chain.len(), 2);

        let mut out = Matches::new(1024);
        assert!(chain.generate(&LineState::from_word("st"), &mut out));
        assert_eq!(out.get_match(0), Some("status"));
    }

    #[test]
    fn test_chain_without_list_has_only_paths() {
        let chain = build_chain(Vec::new(), false);
        assert_eq!(chain.len(), 1);
        assert_eq!(format!("{chain:?}"), r#"[("files", 0)]"#);
    }
}
