//! Prompt for the interactive line editor

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Prompt showing the tool name and how many candidates are loaded
pub struct MatchPrompt {
    candidates: usize,
}

impl MatchPrompt {
    /// Create a new prompt
    ///
    /// # Arguments
    /// * `candidates` - Number of candidates loaded from the candidate file
    pub fn new(candidates: usize) -> Self {
        Self { candidates }
    }
}

impl Prompt for MatchPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        if self.candidates == 0 {
            "matchkit> ".into()
        } else {
            format!("matchkit [{}]> ", self.candidates).into()
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
