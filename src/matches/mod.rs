//! Candidate storage
//!
//! This module owns the text of completion candidates for one completion
//! attempt:
//!
//! - **MatchStore**: a fixed-capacity byte arena allocated from both ends
//! - **Matches**: the ordered candidate handles backed by one store
//! - **MatchType / MatchFlags**: the per-candidate metadata bytes
//! - **compare**: caseless comparison shared by selection, sorting and LCD
//!
//! # Examples
//!
//! ```
//! use matchkit::matches::{MatchDesc, MatchKind, Matches};
//!
//! let mut matches = Matches::new(1024);
//! matches.add_match(&MatchDesc::new("readme.md", MatchKind::File));
//! matches.add_match(&MatchDesc::new("readline/", MatchKind::Dir));
//!
//! assert_eq!(matches.match_count(), 2);
//! assert_eq!(matches.lcd(), "read");
//! ```

pub mod compare;
mod set;
mod store;
mod types;

pub use set::{MatchInfo, Matches};
pub use store::{MatchStore, StoreId, StoreMark, MAX_STORE_SIZE};
pub use types::{MatchDesc, MatchFlags, MatchKind, MatchModifiers, MatchType, MATCH_KIND_MASK};
pub(crate) use types::{append_char_from_byte, append_char_to_byte};
