//! Candidate list input and match output for the `complete` subcommand

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::Serialize;

use crate::adapter::MatchAdapter;
use crate::error::{ConfigError, Result};
use crate::matches::{MatchDesc, MatchKind, MatchType};

/// Parse candidate lines of the form `text[\tdescription]`.
///
/// A trailing `/` or `\` marks a directory. Blank lines are skipped.
pub fn parse_candidates(content: &str) -> Vec<MatchDesc> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            let (text, description) = match line.split_once('\t') {
                Some((text, description)) => (text, description.trim()),
                None => (line, ""),
            };
            if text.trim().is_empty() {
                return None;
            }

            let kind = if text.ends_with(['/', '\\']) {
                MatchKind::Dir
            } else {
                MatchKind::Word
            };
            let mut desc = MatchDesc::new(text, kind);
            if !description.is_empty() {
                desc = desc.with_description(description);
            }
            Some(desc)
        })
        .collect()
}

/// Read candidates from `path`, or from stdin when no path is given.
pub fn load_candidates(path: Option<&Path>) -> Result<Vec<MatchDesc>> {
    let content = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            fs::read_to_string(path)?
        }
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            content
        }
    };
    Ok(parse_candidates(&content))
}

#[derive(Debug, Serialize)]
struct CompletionEntry<'a> {
    text: &'a str,
    display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    kind: MatchType,
}

#[derive(Debug, Serialize)]
struct CompletionOutput<'a> {
    lcd: &'a str,
    count: usize,
    matches: Vec<CompletionEntry<'a>>,
}

/// Render the adapter's matches.
///
/// Plain output is the LCD on the first line, then one `text[\tdescription]`
/// line per match. JSON output is a pretty-printed object.
pub fn render_matches(adapter: &MatchAdapter, json: bool) -> Result<String> {
    if json {
        let matches = (0..adapter.count())
            .filter_map(|i| {
                let text = adapter.text(i)?;
                Some(CompletionEntry {
                    text,
                    display: adapter.display(i).unwrap_or_default().into_owned(),
                    description: adapter.description(i).map(|d| d.into_owned()),
                    kind: adapter.kind(i),
                })
            })
            .collect();
        let output = CompletionOutput {
            lcd: adapter.longest_common_prefix(),
            count: adapter.count(),
            matches,
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let mut out = String::new();
    out.push_str(adapter.longest_common_prefix());
    out.push('\n');
    for i in 0..adapter.count() {
        let Some(text) = adapter.text(i) else {
            continue;
        };
        out.push_str(text);
        if let Some(description) = adapter.description(i) {
            out.push('\t');
            out.push_str(&description);
        }
        out.push('\n');
    }
    Ok(out)
}
