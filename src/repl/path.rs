//! File system match generator

use std::fs;
use std::path::Path;

use crate::matches::{MatchDesc, MatchKind, MatchModifiers, MatchType, Matches};
use crate::pipeline::{LineState, MatchGenerator};

fn split_dir(word: &str) -> (&str, &str) {
    match word.rfind(['/', '\\']) {
        Some(i) => word.split_at(i + 1),
        None => ("", word),
    }
}

/// Offers the entries of the directory named by the word typed so far
///
/// Entries keep the typed directory part as their prefix. Directories get a
/// trailing `/`; hidden entries and symlinks carry the matching modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathGenerator;

impl PathGenerator {
    fn entry_match(dir_part: &str, name: &str, path: &Path, is_link: bool) -> MatchDesc {
        let is_dir = fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false);

        let mut modifiers = MatchModifiers::empty();
        if name.starts_with('.') {
            modifiers |= MatchModifiers::HIDDEN;
        }
        if is_link {
            modifiers |= MatchModifiers::LINK;
        }

        let (text, kind) = if is_dir {
            (format!("{dir_part}{name}/"), MatchKind::Dir)
        } else {
            (format!("{dir_part}{name}"), MatchKind::File)
        };
        MatchDesc::new(text, MatchType::new(kind).with_modifiers(modifiers))
    }
}

impl MatchGenerator for PathGenerator {
    fn generate(&self, state: &LineState, out: &mut Matches) -> bool {
        let (dir_part, _) = split_dir(state.word());
        let dir = if dir_part.is_empty() { "." } else { dir_part };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::trace!(dir, %err, "cannot list directory");
                return false;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_link = entry.file_type().map(|t| t.is_symlink()).unwrap_or(false);
            out.add_match(&Self::entry_match(dir_part, &name, &entry.path(), is_link));
        }
        true
    }

    fn name(&self) -> &str {
        "files"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_dir() {
        assert_eq!(split_dir("src/ma"), ("src/", "ma"));
        assert_eq!(split_dir("ma"), ("", "ma"));
        assert_eq!(split_dir("a\\b"), ("a\\", "b"));
    }

    #[test]
    fn test_lists_directory_entries() {
        let root = std::env::temp_dir().join(format!("matchkit-path-{}", std::process::id()));
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();
        fs::write(root.join(".hidden"), "x").unwrap();

        let prefix = format!("{}/", root.display());
        let mut out = Matches::new(4096);
        assert!(PathGenerator.generate(&LineState::from_word(prefix.clone()), &mut out));
        assert_eq!(out.match_count(), 3);

        let find = |text: String| {
            (0..out.match_count())
                .find(|&i| out.get_match(i) == Some(text.as_str()))
                .map(|i| out.get_match_type(i))
        };
        let sub = find(format!("{prefix}sub/")).unwrap();
        assert_eq!(sub.kind, MatchKind::Dir);
        let notes = find(format!("{prefix}notes.txt")).unwrap();
        assert_eq!(notes.kind, MatchKind::File);
        assert!(find(format!("{prefix}.hidden")).unwrap().is_hidden());

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_directory_is_unclaimed() {
        let mut out = Matches::new(256);
        let word = "/definitely/not/a/real/dir/x";
        assert!(!PathGenerator.generate(&LineState::from_word(word), &mut out));
        assert!(out.is_empty());
    }
}
