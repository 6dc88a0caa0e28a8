//! Match metadata lookaside
//!
//! Line editors take completions as a plain list of strings. To hand matches
//! across that boundary without losing their kind, append character, flags,
//! display text and description, each match is packed (text followed by its
//! metadata) into a [`MatchArray`], and a registry is created over the array.
//! Code that later holds only a [`MatchKey`] from that array recovers the full
//! metadata through [`LookasideStack::find`].
//!
//! Registries nest: a filter callback may build and register its own array
//! while the outer one is still registered. Lookups search the newest
//! registry first, after a single one-off override slot.
//!
//! # Examples
//!
//! ```
//! use matchkit::lookaside::{LookasideStack, MatchArray, MatchRecord};
//! use matchkit::matches::MatchKind;
//!
//! let mut array = MatchArray::new("foo");
//! let record = MatchRecord {
//!     kind: MatchKind::File.into(),
//!     description: "a file".to_string(),
//!     ..MatchRecord::default()
//! };
//! let key = array.push("foo.txt", &record).unwrap();
//!
//! let mut stack = LookasideStack::new();
//! stack.scoped(&array, |stack| {
//!     assert_eq!(stack.find(key).description(), "a file");
//! });
//! ```

mod packed;
mod registry;

pub use packed::{
    calc_packed_size, pack_match, packed_text, sanitize, unpack, ArrayId, MatchArray, MatchKey, MatchRecord,
};
pub use registry::{Lookaside, LookasideStack, MatchDetails, MAX_ACTIVE_REGISTRIES};
