//! Packed match records and the plain match array
//!
//! A packed record is the match text followed by its metadata, laid out as:
//!
//! ```text
//! [match text] \0 [type] [append char] [flags] [display] \0 [description] \0
//! ```
//!
//! A [`MatchArray`] is the plain list handed to the line editor: slot 0 holds
//! a placeholder (the longest common prefix), real matches occupy slots 1..=N.
//! Every array gets a fresh [`ArrayId`] so handles into it never collide with
//! handles into another array, even after the first one is dropped.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::matches::{
    append_char_from_byte, append_char_to_byte, MatchFlags, MatchType, Matches,
};

static NEXT_ARRAY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one match array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArrayId(u64);

impl ArrayId {
    /// Issue an id that has never been issued before in this process.
    pub fn next() -> Self {
        Self(NEXT_ARRAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Stable handle to one entry of a match array
///
/// This stands in for the raw string pointer a C line editor would hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MatchKey {
    pub array: ArrayId,
    pub slot: u32,
}

impl MatchKey {
    /// A key outside every array, for one-off lookaside overrides.
    pub fn detached() -> Self {
        Self {
            array: ArrayId::next(),
            slot: 0,
        }
    }
}

/// Metadata recovered from a packed record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRecord {
    pub kind: MatchType,
    pub append_char: Option<char>,
    pub flags: MatchFlags,
    /// Empty means "display the match text".
    pub display: String,
    /// Empty means "no description".
    pub description: String,
}

/// Size in bytes of the packed form.
pub fn calc_packed_size(text: &str, display: &str, description: &str) -> usize {
    // Three terminators plus the type, append char and flag bytes.
    text.len() + display.len() + description.len() + 6
}

fn is_unpackable(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\t' | '\0')
}

/// Text as it reads once packed: line breaks, tabs and nuls become spaces.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.contains(is_unpackable) {
        Cow::Owned(text.replace(is_unpackable, " "))
    } else {
        Cow::Borrowed(text)
    }
}

fn append_sanitized(buffer: &mut Vec<u8>, text: &str) {
    buffer.extend(text.bytes().map(|b| match b {
        b'\r' | b'\n' | b'\t' | 0 => b' ',
        b => b,
    }));
    buffer.push(0);
}

/// Pack one match.
///
/// Returns `None` for an empty match text. Line breaks and tabs become
/// spaces so each string stays on one display line.
pub fn pack_match(text: &str, record: &MatchRecord) -> Option<Vec<u8>> {
    if text.is_empty() {
        return None;
    }
    Some(pack_unchecked(text, record))
}

fn pack_unchecked(text: &str, record: &MatchRecord) -> Vec<u8> {
    let size = calc_packed_size(text, &record.display, &record.description);
    let mut buffer = Vec::with_capacity(size);
    append_sanitized(&mut buffer, text);
    buffer.push(record.kind.to_byte());
    buffer.push(append_char_to_byte(record.append_char));
    buffer.push(record.flags.bits());
    append_sanitized(&mut buffer, &record.display);
    append_sanitized(&mut buffer, &record.description);
    debug_assert_eq!(buffer.len(), size);
    buffer
}

fn split_cstr(bytes: &[u8]) -> Option<(&str, &[u8])> {
    let end = bytes.iter().position(|&b| b == 0)?;
    let text = std::str::from_utf8(&bytes[..end]).ok()?;
    Some((text, &bytes[end + 1..]))
}

/// Text part of a packed record: everything before the first nul.
pub fn packed_text(packed: &[u8]) -> Option<&str> {
    split_cstr(packed).map(|(text, _)| text)
}

/// Parse a packed record back into its text and metadata.
pub fn unpack(packed: &[u8]) -> Option<(&str, MatchRecord)> {
    let (text, tail) = split_cstr(packed)?;
    let [kind, append_char, flags, rest @ ..] = tail else {
        return None;
    };
    let (display, rest) = split_cstr(rest)?;
    let (description, _) = split_cstr(rest)?;

    Some((
        text,
        MatchRecord {
            kind: MatchType::from_byte(*kind),
            append_char: append_char_from_byte(*append_char),
            flags: MatchFlags::from_bits_truncate(*flags),
            display: display.to_string(),
            description: description.to_string(),
        },
    ))
}

/// Plain array of packed matches with a placeholder in slot 0
#[derive(Debug, Clone)]
pub struct MatchArray {
    id: ArrayId,
    slots: Vec<Vec<u8>>,
}

impl MatchArray {
    /// Start an array whose placeholder holds `lcd`.
    pub fn new(lcd: &str) -> Self {
        let mut placeholder = lcd.as_bytes().to_vec();
        placeholder.push(0);
        Self {
            id: ArrayId::next(),
            slots: vec![placeholder],
        }
    }

    /// Wrap slots received from outside, placeholder included.
    ///
    /// No layout checks happen here; registry creation reports bad slots.
    pub fn from_raw(slots: Vec<Vec<u8>>) -> Self {
        Self {
            id: ArrayId::next(),
            slots,
        }
    }

    /// Serialize the visible matches of a set, with its LCD as placeholder.
    pub fn from_matches(matches: &Matches) -> Self {
        let mut array = Self::new(&matches.lcd());
        for i in 0..matches.match_count() {
            let Some(text) = matches.get_match(i) else {
                continue;
            };
            let record = MatchRecord {
                kind: matches.get_match_type(i),
                append_char: matches.get_match_append_char(i),
                flags: matches.get_match_flags(i),
                display: matches.get_match_display(i).unwrap_or_default().to_string(),
                description: matches
                    .get_match_description(i)
                    .unwrap_or_default()
                    .to_string(),
            };
            array.push(text, &record);
        }
        array
    }

    pub fn id(&self) -> ArrayId {
        self.id
    }

    /// Append a match. Empty texts are skipped.
    pub fn push(&mut self, text: &str, record: &MatchRecord) -> Option<MatchKey> {
        let packed = pack_match(text, record)?;
        self.slots.push(packed);
        Some(self.key(self.slots.len() - 1))
    }

    /// Number of real matches, excluding the placeholder.
    pub fn len(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when there is not even a placeholder.
    pub fn is_bare(&self) -> bool {
        self.slots.is_empty()
    }

    /// Key for a slot; slot 0 is the placeholder.
    pub fn key(&self, slot: usize) -> MatchKey {
        MatchKey {
            array: self.id,
            slot: slot as u32,
        }
    }

    /// Key of the `index`th real match (0-based).
    pub fn match_key(&self, index: usize) -> Option<MatchKey> {
        (index < self.len()).then(|| self.key(index + 1))
    }

    pub fn slot(&self, slot: usize) -> Option<&[u8]> {
        self.slots.get(slot).map(Vec::as_slice)
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.slot(0).and_then(packed_text)
    }

    /// Text of the `index`th real match (0-based).
    pub fn text(&self, index: usize) -> Option<&str> {
        self.slot(index + 1).and_then(packed_text)
    }

    /// Keys and texts of all real matches.
    pub fn iter(&self) -> impl Iterator<Item = (MatchKey, &str)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(slot, packed)| packed_text(packed).map(|text| (self.key(slot), text)))
    }
}
