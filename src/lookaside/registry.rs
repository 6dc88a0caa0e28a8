//! Registry stack recovering metadata for matches in a [`MatchArray`]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::packed::{unpack, ArrayId, MatchArray, MatchKey, MatchRecord};
use crate::error::LookasideError;
use crate::matches::{MatchFlags, MatchType};

/// Active registries beyond this count almost certainly mean a leak.
pub const MAX_ACTIVE_REGISTRIES: usize = 6;

/// Metadata table for one array
#[derive(Debug)]
struct MatchRegistry {
    array: ArrayId,
    records: HashMap<MatchKey, Arc<MatchRecord>>,
}

impl MatchRegistry {
    /// Parse every real slot of `array`.
    ///
    /// A malformed first slot rejects the whole array. Later malformed slots
    /// get default metadata so every match of a registered array resolves.
    fn build(array: &MatchArray) -> Result<Self, LookasideError> {
        let mut records = HashMap::with_capacity(array.len());
        for slot in 1..=array.len() {
            let record = match array.slot(slot).and_then(unpack) {
                Some((_, record)) => record,
                None if slot == 1 => return Err(LookasideError::Malformed { slot }),
                None => {
                    warn!(array = %array.id(), slot, "malformed packed match, using defaults");
                    MatchRecord::default()
                }
            };
            records.insert(array.key(slot), Arc::new(record));
        }
        Ok(Self {
            array: array.id(),
            records,
        })
    }
}

/// Result of a lookup
#[derive(Debug, Clone)]
pub struct MatchDetails {
    record: Arc<MatchRecord>,
    found: bool,
}

impl Default for MatchDetails {
    /// All-default metadata, marked as not found.
    fn default() -> Self {
        Self {
            record: Arc::new(MatchRecord::default()),
            found: false,
        }
    }
}

impl MatchDetails {
    /// False when the lookup fell back to default metadata.
    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn kind(&self) -> MatchType {
        self.record.kind
    }

    pub fn append_char(&self) -> Option<char> {
        self.record.append_char
    }

    pub fn flags(&self) -> MatchFlags {
        self.record.flags
    }

    /// Custom display text; empty when the match text should be shown.
    pub fn display(&self) -> &str {
        &self.record.display
    }

    /// Description; empty when there is none.
    pub fn description(&self) -> &str {
        &self.record.description
    }

    pub fn record(&self) -> &MatchRecord {
        &self.record
    }
}

/// Ordered collection of active registries plus the one-off override
///
/// The newest registry is searched first. Every [`LookasideStack::create`]
/// must be paired with exactly one [`LookasideStack::destroy`], and the pairs
/// must nest; [`LookasideStack::scoped`] does both around a closure.
#[derive(Debug, Default)]
pub struct LookasideStack {
    registries: VecDeque<MatchRegistry>,
    oneoff: Option<(MatchKey, Arc<MatchRecord>)>,
}

impl LookasideStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active registries.
    pub fn active(&self) -> usize {
        self.registries.len()
    }

    pub fn is_registered(&self, array: &MatchArray) -> bool {
        self.registries.iter().any(|r| r.array == array.id())
    }

    /// Register the metadata of `array`.
    ///
    /// Returns `false` without registering anything when the array has no
    /// real matches or its first slot is malformed; lookups then fall back to
    /// defaults.
    pub fn create(&mut self, array: &MatchArray) -> bool {
        match self.try_create(array) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "lookaside not created");
                false
            }
        }
    }

    /// Like [`LookasideStack::create`], reporting why nothing was registered.
    pub fn try_create(&mut self, array: &MatchArray) -> Result<(), LookasideError> {
        debug_assert!(
            self.registries.len() < MAX_ACTIVE_REGISTRIES,
            "too many active lookasides ({}); create/destroy is unbalanced",
            self.registries.len()
        );

        if array.is_empty() {
            return Err(LookasideError::EmptyArray);
        }
        if self.is_registered(array) {
            debug_assert!(false, "match array {} registered twice", array.id());
            return Err(LookasideError::AlreadyRegistered(array.id()));
        }

        let registry = MatchRegistry::build(array)?;
        debug!(array = %array.id(), records = registry.records.len(), "lookaside created");
        self.registries.push_front(registry);
        Ok(())
    }

    /// Drop the registry of `array`.
    ///
    /// Destroying an array that was never registered is a lifetime bug in
    /// the caller: debug builds panic, release builds log and return `false`.
    pub fn destroy(&mut self, array: &MatchArray) -> bool {
        self.destroy_id(array.id())
    }

    pub(crate) fn destroy_id(&mut self, id: ArrayId) -> bool {
        match self.registries.iter().position(|r| r.array == id) {
            Some(index) => {
                self.registries.remove(index);
                debug!(array = %id, "lookaside destroyed");
                true
            }
            None => {
                debug_assert!(false, "{}", LookasideError::NotRegistered(id));
                warn!(array = %id, "destroying a lookaside that does not exist");
                false
            }
        }
    }

    /// Run `f` with `array` registered, destroying the registry afterwards.
    pub fn scoped<R>(&mut self, array: &MatchArray, f: impl FnOnce(&mut Self) -> R) -> R {
        let created = self.create(array);
        let result = f(self);
        if created {
            self.destroy(array);
        }
        result
    }

    /// Look up metadata without the consistency assertion.
    pub fn try_find(&self, key: MatchKey) -> Option<MatchDetails> {
        if let Some((oneoff, record)) = &self.oneoff
            && *oneoff == key
        {
            return Some(MatchDetails {
                record: Arc::clone(record),
                found: true,
            });
        }
        self.registries
            .iter()
            .find_map(|r| r.records.get(&key))
            .map(|record| MatchDetails {
                record: Arc::clone(record),
                found: true,
            })
    }

    /// Look up metadata for a match.
    ///
    /// A key with no active registry means the key outlived its array's
    /// registration: debug builds panic, release builds return defaults.
    pub fn find(&self, key: MatchKey) -> MatchDetails {
        match self.try_find(key) {
            Some(details) => details,
            None => {
                debug_assert!(false, "no lookaside for match {key:?}");
                warn!(array = %key.array, slot = key.slot, "match has no lookaside");
                MatchDetails::default()
            }
        }
    }

    /// Substitute metadata for a single match outside any array.
    pub fn set_oneoff(&mut self, key: MatchKey, record: MatchRecord) {
        self.oneoff = Some((key, Arc::new(record)));
    }

    pub fn clear_oneoff(&mut self) {
        self.oneoff = None;
    }
}

/// Shared handle to a [`LookasideStack`]
///
/// Adapters and filters that outlive a single call hold one of these; all
/// clones see the same registries.
#[derive(Debug, Clone, Default)]
pub struct Lookaside {
    inner: Arc<RwLock<LookasideStack>>,
}

impl Lookaside {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while the lock was held leaves the stack itself consistent,
    // so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, LookasideStack> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LookasideStack> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, array: &MatchArray) -> bool {
        self.write().create(array)
    }

    pub fn destroy(&self, array: &MatchArray) -> bool {
        self.write().destroy(array)
    }

    pub(crate) fn destroy_id(&self, id: ArrayId) -> bool {
        self.write().destroy_id(id)
    }

    pub fn find(&self, key: MatchKey) -> MatchDetails {
        self.read().find(key)
    }

    pub fn try_find(&self, key: MatchKey) -> Option<MatchDetails> {
        self.read().try_find(key)
    }

    pub fn set_oneoff(&self, key: MatchKey, record: MatchRecord) {
        self.write().set_oneoff(key, record);
    }

    pub fn clear_oneoff(&self) {
        self.write().clear_oneoff();
    }

    pub fn active(&self) -> usize {
        self.read().active()
    }

    pub fn is_registered(&self, array: &MatchArray) -> bool {
        self.read().is_registered(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::MatchKind;

    fn record(kind: MatchKind, description: &str) -> MatchRecord {
        MatchRecord {
            kind: kind.into(),
            append_char: Some(' '),
            flags: MatchFlags::empty(),
            display: String::new(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_registry_round_trip() {
        let mut array = MatchArray::new("foo");
        let key = array.push("foo.txt", &record(MatchKind::File, "a file")).unwrap();

        let mut stack = LookasideStack::new();
        assert!(stack.create(&array));

        let details = stack.find(key);
        assert!(details.is_found());
        assert_eq!(details.kind().kind, MatchKind::File);
        assert_eq!(details.append_char(), Some(' '));
        assert_eq!(details.display(), "");
        assert_eq!(details.description(), "a file");

        assert!(stack.destroy(&array));
        assert_eq!(stack.active(), 0);
    }

    #[test]
    fn test_create_rejects_placeholder_only() {
        let mut stack = LookasideStack::new();
        assert!(!stack.create(&MatchArray::new("")));
        assert!(!stack.create(&MatchArray::from_raw(Vec::new())));
        assert_eq!(stack.active(), 0);
    }

    #[test]
    fn test_create_rejects_malformed_first_slot() {
        let array = MatchArray::from_raw(vec![b"\0".to_vec(), b"bad".to_vec()]);
        let mut stack = LookasideStack::new();
        assert_eq!(
            stack.try_create(&array),
            Err(LookasideError::Malformed { slot: 1 })
        );
    }

    #[test]
    fn test_malformed_later_slot_gets_defaults() {
        let mut array = MatchArray::new("");
        array.push("one", &record(MatchKind::Cmd, "first")).unwrap();
        let good = array.slot(1).unwrap().to_vec();
        let array =
            MatchArray::from_raw(vec![b"\0".to_vec(), good.clone(), b"broken".to_vec(), good]);

        let mut stack = LookasideStack::new();
        assert!(stack.create(&array));
        let broken = stack.find(array.key(2));
        assert!(broken.is_found());
        assert_eq!(broken.description(), "");
        assert_eq!(stack.find(array.key(3)).description(), "first");
    }

    #[test]
    fn test_nested_registries() {
        let mut x = MatchArray::new("");
        let kx = x.push("alpha", &record(MatchKind::Cmd, "from x")).unwrap();
        let mut y = MatchArray::new("");
        let ky = y.push("beta", &record(MatchKind::Alias, "from y")).unwrap();

        let mut stack = LookasideStack::new();
        assert!(stack.create(&x));
        assert!(stack.create(&y));

        assert_eq!(stack.find(kx).description(), "from x");
        assert_eq!(stack.find(ky).description(), "from y");

        assert!(stack.destroy(&y));
        assert_eq!(stack.find(kx).kind().kind, MatchKind::Cmd);
        assert!(stack.try_find(ky).is_none());

        assert!(stack.destroy(&x));
    }

    #[test]
    fn test_oneoff_takes_priority() {
        let mut array = MatchArray::new("");
        let key = array.push("alpha", &record(MatchKind::Cmd, "registered")).unwrap();

        let mut stack = LookasideStack::new();
        stack.create(&array);
        stack.set_oneoff(key, record(MatchKind::Word, "override"));
        assert_eq!(stack.find(key).description(), "override");

        stack.clear_oneoff();
        assert_eq!(stack.find(key).description(), "registered");
        stack.destroy(&array);
    }

    #[test]
    fn test_oneoff_outside_any_array() {
        let key = MatchKey::detached();
        let mut stack = LookasideStack::new();
        stack.set_oneoff(key, record(MatchKind::Dir, "highlighted"));
        assert_eq!(stack.find(key).kind().kind, MatchKind::Dir);
    }

    #[test]
    fn test_scoped_destroys() {
        let mut array = MatchArray::new("");
        let key = array.push("alpha", &record(MatchKind::Cmd, "x")).unwrap();

        let mut stack = LookasideStack::new();
        let found = stack.scoped(&array, |stack| stack.try_find(key).is_some());
        assert!(found);
        assert_eq!(stack.active(), 0);
    }

    #[test]
    fn test_shared_handle() {
        let mut array = MatchArray::new("");
        let key = array.push("alpha", &record(MatchKind::Cmd, "x")).unwrap();

        let lookaside = Lookaside::new();
        let other = lookaside.clone();
        assert!(lookaside.create(&array));
        assert!(other.is_registered(&array));
        assert_eq!(other.find(key).description(), "x");
        assert!(other.destroy(&array));
        assert_eq!(lookaside.active(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "no lookaside")]
    fn test_find_unregistered_panics_in_debug() {
        let stack = LookasideStack::new();
        stack.find(MatchKey::detached());
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_find_unregistered_defaults_in_release() {
        let stack = LookasideStack::new();
        let details = stack.find(MatchKey::detached());
        assert!(!details.is_found());
        assert_eq!(details.description(), "");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "has no lookaside")]
    fn test_unbalanced_destroy_panics_in_debug() {
        let mut stack = LookasideStack::new();
        stack.destroy(&MatchArray::new(""));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_double_create_panics_in_debug() {
        let mut array = MatchArray::new("");
        array.push("alpha", &MatchRecord::default());
        let mut stack = LookasideStack::new();
        stack.create(&array);
        stack.create(&array);
    }
}
