//! Fixed-capacity string arena
//!
//! Strings are copied into one buffer with a nul terminator and padded to an
//! even length, so a byte offset halves into a compact [`StoreId`]. Ordinary
//! candidates are allocated from the front; reserved entries come from the
//! back. The buffer never grows, so every id stays valid until [`MatchStore::reset`].

use std::fmt;

use crate::error::StoreError;

/// Largest arena the 16-bit id space can address.
pub const MAX_STORE_SIZE: usize = 0x10000;

/// Handle to a string in a [`MatchStore`]: its byte offset halved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u16);

impl StoreId {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u16 {
        self.0
    }

    fn offset(&self) -> usize {
        (self.0 as usize) << 1
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cursor positions captured by [`MatchStore::mark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMark {
    front: usize,
    back: usize,
}

/// Byte arena allocated from both ends toward the middle
pub struct MatchStore {
    buffer: Box<[u8]>,
    front: usize,
    back: usize,
}

impl MatchStore {
    /// Create an arena of `capacity` bytes, capped at [`MAX_STORE_SIZE`] and
    /// rounded down to an even size.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_STORE_SIZE) & !1;
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            front: 0,
            back: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes still free between the two cursors.
    pub fn available(&self) -> usize {
        self.back - self.front
    }

    pub fn front(&self) -> usize {
        self.front
    }

    pub fn back(&self) -> usize {
        self.back
    }

    /// Padded size a string occupies, including its terminator.
    pub fn padded_size(text: &str) -> usize {
        (text.len() + 1 + 1) & !1
    }

    /// Copy `text` in at the front cursor.
    pub fn store_front(&mut self, text: &str) -> Result<StoreId, StoreError> {
        let size = self.checked_size(text)?;
        let offset = self.front;
        self.write(offset, text, size);
        self.front += size;
        Ok(StoreId((offset >> 1) as u16))
    }

    /// Copy `text` in below the back cursor.
    pub fn store_back(&mut self, text: &str) -> Result<StoreId, StoreError> {
        let size = self.checked_size(text)?;
        let offset = self.back - size;
        self.write(offset, text, size);
        self.back = offset;
        Ok(StoreId((offset >> 1) as u16))
    }

    /// Look up a stored string. Ids past the end of the arena yield `None`.
    pub fn get(&self, id: StoreId) -> Option<&str> {
        let offset = id.offset();
        if offset >= self.buffer.len() {
            return None;
        }
        let tail = &self.buffer[offset..];
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        std::str::from_utf8(&tail[..len]).ok()
    }

    /// Invalidate every issued id.
    pub fn reset(&mut self) {
        self.front = 0;
        self.back = self.buffer.len();
    }

    pub fn mark(&self) -> StoreMark {
        StoreMark {
            front: self.front,
            back: self.back,
        }
    }

    /// Release everything stored since `mark` was taken.
    pub fn rewind(&mut self, mark: StoreMark) {
        debug_assert!(mark.front <= self.front && mark.back >= self.back);
        self.front = mark.front;
        self.back = mark.back;
    }

    fn checked_size(&self, text: &str) -> Result<usize, StoreError> {
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        if text.as_bytes().contains(&0) {
            return Err(StoreError::InteriorNul);
        }
        let needed = Self::padded_size(text);
        let available = self.available();
        if needed > available {
            return Err(StoreError::Overflow { needed, available });
        }
        Ok(needed)
    }

    fn write(&mut self, offset: usize, text: &str, size: usize) {
        let slot = &mut self.buffer[offset..offset + size];
        slot[..text.len()].copy_from_slice(text.as_bytes());
        slot[text.len()..].fill(0);
    }
}

impl fmt::Debug for MatchStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchStore")
            .field("capacity", &self.capacity())
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}
