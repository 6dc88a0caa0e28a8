//! Ordered candidate set backed by one [`MatchStore`]

use tracing::trace;

use super::compare;
use super::store::{MatchStore, StoreId};
use super::types::{
    append_char_from_byte, append_char_to_byte, MatchDesc, MatchFlags, MatchType,
};

/// Lightweight handle to one candidate
///
/// Strings live in the owning store; this only carries ids and the small
/// fixed-size metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchInfo {
    pub store_id: StoreId,
    pub selected: bool,
    pub kind: MatchType,
    pub append_char: u8,
    pub flags: MatchFlags,
    pub display: Option<StoreId>,
    pub description: Option<StoreId>,
    /// Position in generation order, used when sorting is disabled.
    pub ordinal: u32,
}

/// Candidates produced by one completion attempt
///
/// The logical count starts as the number of added candidates and shrinks to
/// the selected count once [`Matches::coalesce`] runs. After coalescing the set
/// is frozen until [`Matches::reset`].
#[derive(Debug)]
pub struct Matches {
    store: MatchStore,
    infos: Vec<MatchInfo>,
    count: usize,
    coalesced: bool,
    no_sort: bool,
}

impl Matches {
    /// Create an empty set whose store holds `store_size` bytes.
    pub fn new(store_size: usize) -> Self {
        Self {
            store: MatchStore::new(store_size),
            infos: Vec::with_capacity(1024),
            count: 0,
            coalesced: false,
            no_sort: false,
        }
    }

    /// Drop all candidates and start a new store generation.
    pub fn reset(&mut self) {
        self.store.reset();
        self.infos.clear();
        self.count = 0;
        self.coalesced = false;
        self.no_sort = false;
    }

    /// Add a plain candidate with default metadata.
    pub fn add(&mut self, text: &str) -> bool {
        self.add_match(&MatchDesc::new(text, MatchType::default()))
    }

    /// Add one candidate.
    ///
    /// Returns `false` when the candidate was dropped: the set is already
    /// coalesced, the text is empty, or the store is full. Adds are
    /// all-or-nothing; a candidate whose description does not fit is dropped
    /// whole rather than stored without it.
    pub fn add_match(&mut self, desc: &MatchDesc) -> bool {
        if self.coalesced || desc.text.is_empty() {
            return false;
        }

        let mark = self.store.mark();
        match self.store_parts(desc) {
            Ok(info) => {
                self.infos.push(info);
                self.count += 1;
                true
            }
            Err(err) => {
                trace!(text = %desc.text, %err, "dropping match");
                self.store.rewind(mark);
                false
            }
        }
    }

    fn store_parts(&mut self, desc: &MatchDesc) -> Result<MatchInfo, crate::error::StoreError> {
        // Display and description are secondary text; keep them at the back
        // so candidate texts stay contiguous at the front.
        let display = if desc.display.is_empty() {
            None
        } else {
            Some(self.store.store_back(&desc.display)?)
        };
        let description = if desc.description.is_empty() {
            None
        } else {
            Some(self.store.store_back(&desc.description)?)
        };
        let store_id = self.store.store_front(&desc.text)?;

        Ok(MatchInfo {
            store_id,
            selected: false,
            kind: desc.kind,
            append_char: append_char_to_byte(desc.append_char),
            flags: desc.flags,
            display,
            description,
            ordinal: self.infos.len() as u32,
        })
    }

    pub fn store(&self) -> &MatchStore {
        &self.store
    }

    /// Number of stored candidates, selected or not.
    pub fn info_count(&self) -> usize {
        self.infos.len()
    }

    pub fn infos(&self) -> &[MatchInfo] {
        &self.infos
    }

    pub fn infos_mut(&mut self) -> &mut [MatchInfo] {
        &mut self.infos
    }

    /// Store and candidate handles together, for selectors that read text
    /// while updating selection flags.
    pub fn parts_mut(&mut self) -> (&MatchStore, &mut [MatchInfo]) {
        (&self.store, &mut self.infos)
    }

    /// Number of visible candidates.
    pub fn match_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_coalesced(&self) -> bool {
        self.coalesced
    }

    /// Keep generation order instead of sorting.
    pub fn set_no_sort(&mut self) {
        self.no_sort = true;
    }

    pub fn is_no_sort(&self) -> bool {
        self.no_sort
    }

    fn visible(&self, index: usize) -> Option<&MatchInfo> {
        if index < self.count {
            self.infos.get(index)
        } else {
            None
        }
    }

    /// Text of an arbitrary stored candidate.
    pub fn text_of(&self, info: &MatchInfo) -> &str {
        self.store.get(info.store_id).unwrap_or_default()
    }

    pub fn get_match(&self, index: usize) -> Option<&str> {
        self.visible(index).and_then(|info| self.store.get(info.store_id))
    }

    pub fn get_match_type(&self, index: usize) -> MatchType {
        self.visible(index).map(|info| info.kind).unwrap_or_default()
    }

    /// Custom display text, if the candidate has one.
    pub fn get_match_display(&self, index: usize) -> Option<&str> {
        self.visible(index)
            .and_then(|info| info.display)
            .and_then(|id| self.store.get(id))
    }

    pub fn get_match_description(&self, index: usize) -> Option<&str> {
        self.visible(index)
            .and_then(|info| info.description)
            .and_then(|id| self.store.get(id))
    }

    pub fn get_match_append_char(&self, index: usize) -> Option<char> {
        self.visible(index)
            .and_then(|info| append_char_from_byte(info.append_char))
    }

    pub fn get_match_flags(&self, index: usize) -> MatchFlags {
        self.visible(index).map(|info| info.flags).unwrap_or_default()
    }

    pub fn has_descriptions(&self) -> bool {
        self.infos[..self.count]
            .iter()
            .any(|info| info.description.is_some())
    }

    /// Caseless longest common prefix of the visible candidates.
    pub fn lcd(&self) -> String {
        compare::longest_common_prefix((0..self.count).filter_map(|i| self.get_match(i)))
    }

    /// Move up to `count_hint` selected candidates to the front.
    ///
    /// Selected candidates keep their relative order; the order of the
    /// unselected remainder is unspecified. The visible count becomes the
    /// number of candidates moved.
    pub fn coalesce(&mut self, count_hint: usize) {
        let mut j = 0;
        for i in 0..self.infos.len() {
            if j >= count_hint {
                break;
            }
            if !self.infos[i].selected {
                continue;
            }
            if i != j {
                self.infos.swap(i, j);
            }
            j += 1;
        }

        self.count = j;
        self.coalesced = true;
    }
}

impl Default for Matches {
    fn default() -> Self {
        Self::new(super::store::MAX_STORE_SIZE)
    }
}
