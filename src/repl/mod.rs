//! Interactive line editor for matchkit
//!
//! This module bridges the match pipeline to reedline:
//! - Tab completion through [`MatchCompleter`]
//! - Candidate list and file name generators
//! - Words colored by the kind of candidate they name
//! - Persistent history

mod completer;
mod engine;
mod highlighter;
mod path;
mod prompt;

pub use completer::{MatchCompleter, word_start};
pub use engine::ReplEngine;
pub use highlighter::{KindHighlighter, kind_style};
pub use path::PathGenerator;
pub use prompt::MatchPrompt;
