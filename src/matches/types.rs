//! Match kinds, modifier bits and per-match flags
//!
//! A match type is packed into a single byte: the low three bits hold the
//! [`MatchKind`] and the high bits hold [`MatchModifiers`]. The same byte is
//! written verbatim into packed match records, so the values here are part of
//! the wire format.

use bitflags::bitflags;
use serde::Serialize;

/// Bits of a type byte that hold the kind.
pub const MATCH_KIND_MASK: u8 = 0x07;

/// Base kind of a completion match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MatchKind {
    /// Behaves like a directory if the match ends with a path separator,
    /// otherwise like a file.
    #[default]
    None = 1,
    /// Matches and displays the whole word even if it contains slashes.
    Word = 2,
    /// Suppresses the appended space after a trailing `:` or `=`.
    Arg = 3,
    /// A command name.
    Cmd = 4,
    /// An alias name.
    Alias = 5,
    /// A file; only the last path component is displayed.
    File = 6,
    /// A directory; a trailing path separator is appended.
    Dir = 7,
}

impl MatchKind {
    /// Decode the kind bits of a type byte.
    ///
    /// Zero is reserved so a packed type byte is never a nul; it decodes to
    /// `None` along with any other out-of-range value.
    pub fn from_bits(bits: u8) -> Self {
        match bits & MATCH_KIND_MASK {
            2 => MatchKind::Word,
            3 => MatchKind::Arg,
            4 => MatchKind::Cmd,
            5 => MatchKind::Alias,
            6 => MatchKind::File,
            7 => MatchKind::Dir,
            _ => MatchKind::None,
        }
    }

    /// Parse a kind name as used in candidate list files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(MatchKind::None),
            "word" => Some(MatchKind::Word),
            "arg" => Some(MatchKind::Arg),
            "cmd" | "command" => Some(MatchKind::Cmd),
            "alias" => Some(MatchKind::Alias),
            "file" => Some(MatchKind::File),
            "dir" | "directory" => Some(MatchKind::Dir),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchKind::None => "none",
            MatchKind::Word => "word",
            MatchKind::Arg => "arg",
            MatchKind::Cmd => "cmd",
            MatchKind::Alias => "alias",
            MatchKind::File => "file",
            MatchKind::Dir => "dir",
        }
    }
}

bitflags! {
    /// Display modifiers carried in the high bits of a type byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchModifiers: u8 {
        const LINK = 0x10;
        const ORPHANED = 0x20;
        const HIDDEN = 0x40;
        const READONLY = 0x80;
    }
}

bitflags! {
    /// Per-match behavior flags (the flag byte of a packed record)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFlags: u8 {
        /// Display text is appended to the match text rather than replacing it.
        const APPEND_DISPLAY = 0x01;
        /// `SUPPRESS_APPEND` was set explicitly.
        const HAS_SUPPRESS_APPEND = 0x02;
        /// Do not append the append character after inserting the match.
        const SUPPRESS_APPEND = 0x04;
    }
}

impl MatchFlags {
    /// Explicit suppress-append setting, if one was made.
    pub fn suppress_append(&self) -> Option<bool> {
        if self.contains(MatchFlags::HAS_SUPPRESS_APPEND) {
            Some(self.contains(MatchFlags::SUPPRESS_APPEND))
        } else {
            None
        }
    }

    /// Flags recording an explicit suppress-append choice.
    pub fn with_suppress_append(suppress: bool) -> Self {
        let mut flags = MatchFlags::HAS_SUPPRESS_APPEND;
        if suppress {
            flags |= MatchFlags::SUPPRESS_APPEND;
        }
        flags
    }
}

/// Kind plus modifiers, as packed into one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchType {
    pub kind: MatchKind,
    pub modifiers: MatchModifiers,
}

impl MatchType {
    pub fn new(kind: MatchKind) -> Self {
        Self {
            kind,
            modifiers: MatchModifiers::empty(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: MatchModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Decode a packed type byte.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            kind: MatchKind::from_bits(byte),
            modifiers: MatchModifiers::from_bits_truncate(byte),
        }
    }

    /// Encode as a packed type byte. Never zero.
    pub fn to_byte(&self) -> u8 {
        self.kind as u8 | self.modifiers.bits()
    }

    /// True for file and directory matches.
    pub fn is_pathish(&self) -> bool {
        matches!(self.kind, MatchKind::File | MatchKind::Dir)
    }

    pub fn is_link(&self) -> bool {
        self.modifiers.contains(MatchModifiers::LINK)
    }

    pub fn is_hidden(&self) -> bool {
        self.modifiers.contains(MatchModifiers::HIDDEN)
    }
}

impl From<MatchKind> for MatchType {
    fn from(kind: MatchKind) -> Self {
        MatchType::new(kind)
    }
}

impl Serialize for MatchType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.kind.serialize(serializer)
    }
}

/// Everything a generator supplies for one match
///
/// Only `text` is required; empty `display` means "show the text", empty
/// `description` means "no description".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDesc {
    pub text: String,
    pub kind: MatchType,
    pub append_char: Option<char>,
    pub flags: MatchFlags,
    pub display: String,
    pub description: String,
}

impl MatchDesc {
    pub fn new(text: impl Into<String>, kind: impl Into<MatchType>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_append_char(mut self, append_char: char) -> Self {
        self.append_char = Some(append_char);
        self
    }

    pub fn with_flags(mut self, flags: MatchFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Append character as a single packed byte; zero means "none".
///
/// The byte holds a code point up to U+00FF, the same range
/// [`append_char_from_byte`] decodes; anything wider is dropped.
pub(crate) fn append_char_to_byte(append_char: Option<char>) -> u8 {
    append_char
        .and_then(|c| u8::try_from(u32::from(c)).ok())
        .unwrap_or(0)
}

pub(crate) fn append_char_from_byte(byte: u8) -> Option<char> {
    (byte != 0).then_some(byte as char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_byte_round_trip_keeps_modifiers() {
        let ty = MatchType::new(MatchKind::File)
            .with_modifiers(MatchModifiers::HIDDEN | MatchModifiers::READONLY);
        let byte = ty.to_byte();
        assert_eq!(byte, 6 | 0x40 | 0x80);
        assert_eq!(MatchType::from_byte(byte), ty);
    }

    #[test]
    fn test_type_byte_never_zero() {
        for kind in [
            MatchKind::None,
            MatchKind::Word,
            MatchKind::Arg,
            MatchKind::Cmd,
            MatchKind::Alias,
            MatchKind::File,
            MatchKind::Dir,
        ] {
            assert_ne!(MatchType::new(kind).to_byte(), 0);
        }
        assert_eq!(MatchKind::from_bits(0), MatchKind::None);
    }

    #[test]
    fn test_pathish() {
        assert!(MatchType::new(MatchKind::File).is_pathish());
        assert!(MatchType::new(MatchKind::Dir).is_pathish());
        assert!(!MatchType::new(MatchKind::Cmd).is_pathish());
    }

    #[test]
    fn test_suppress_append_tristate() {
        assert_eq!(MatchFlags::empty().suppress_append(), None);
        assert_eq!(MatchFlags::with_suppress_append(true).suppress_append(), Some(true));
        assert_eq!(MatchFlags::with_suppress_append(false).suppress_append(), Some(false));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(MatchKind::from_name("Directory"), Some(MatchKind::Dir));
        assert_eq!(MatchKind::from_name("bogus"), None);
        assert_eq!(MatchKind::Alias.name(), "alias");
    }

    #[test]
    fn test_append_char_byte() {
        assert_eq!(append_char_to_byte(Some(' ')), b' ');
        assert_eq!(append_char_to_byte(Some('é')), 0xE9);
        assert_eq!(append_char_to_byte(Some('€')), 0);
        assert_eq!(append_char_from_byte(0), None);
        assert_eq!(append_char_from_byte(b'='), Some('='));
        for byte in 1..=u8::MAX {
            assert_eq!(append_char_to_byte(append_char_from_byte(byte)), byte);
        }
    }
}
