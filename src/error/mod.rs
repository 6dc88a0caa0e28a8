//! Error handling for the completion engine.
//!
//! Errors are split by the component that raises them:
//! - Arena storage errors (capacity exhaustion, unstorable text)
//! - Lookaside registry errors (lifecycle contract violations, malformed arrays)
//! - Configuration errors
//!
//! Most of these are not fatal to a completion attempt. A store overflow only
//! drops one candidate and a failed registry creation degrades to default
//! metadata; callers decide whether to surface them.
//!
//! # Example
//!
//! ```rust
//! use matchkit::error::{Result, StoreError};
//! use matchkit::matches::MatchStore;
//!
//! fn store_one(store: &mut MatchStore) -> Result<u16> {
//!     let id = store.store_front("readme.txt")?;
//!     Ok(id.get())
//! }
//!
//! let mut store = MatchStore::new(4);
//! assert!(matches!(
//!     store_one(&mut store),
//!     Err(matchkit::MatchkitError::Store(StoreError::Overflow { .. }))
//! ));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, LookasideError, MatchkitError, Result, StoreError};
