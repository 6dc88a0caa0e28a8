//! Completion match engine
//!
//! This library generates, stores, selects, sorts and describes completion
//! candidates for a line editor. It can be used on its own to give any
//! editor kind-aware completion with descriptions.
//!
//! # Modules
//!
//! - `matches`: Candidate store and ordered match sets
//! - `lookaside`: Packed match arrays and the metadata registry stack
//! - `pipeline`: Generators, selection, coalescing and sorting
//! - `adapter`: Uniform read access over owned, borrowed and filtered matches
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `cli`: Command-line interface and argument parsing
//! - `repl`: Interactive line editor bridge
//!
//! # Example
//!
//! ```
//! use matchkit::adapter::MatchAdapter;
//! use matchkit::lookaside::Lookaside;
//! use matchkit::matches::{MatchDesc, MatchKind, Matches};
//! use matchkit::pipeline::{GeneratorChain, LineState, ListGenerator, MatchPipeline, SortDirs};
//!
//! let mut chain = GeneratorChain::new();
//! chain.add(
//!     Box::new(ListGenerator::new(
//!         "git",
//!         vec![
//!             MatchDesc::new("checkout", MatchKind::Arg).with_description("Switch branches"),
//!             MatchDesc::new("cherry-pick", MatchKind::Arg),
//!             MatchDesc::new("commit", MatchKind::Arg),
//!         ],
//!     )),
//!     0,
//! );
//!
//! let mut matches = Matches::default();
//! MatchPipeline::new(&mut matches).complete(&LineState::new("git ch", 4, 6), &chain, SortDirs::With);
//!
//! let mut adapter = MatchAdapter::new(Lookaside::new());
//! adapter.set_owned(matches);
//! assert_eq!(adapter.count(), 2);
//! assert_eq!(adapter.longest_common_prefix(), "che");
//! assert_eq!(adapter.description(0).as_deref(), Some("Switch branches"));
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod error;
pub mod lookaside;
pub mod matches;
pub mod pipeline;
pub mod repl;

// Re-export commonly used types
pub use adapter::{MatchAdapter, MatchFilter, MatchSource};
pub use config::Config;
pub use error::{MatchkitError, Result};
pub use lookaside::{Lookaside, LookasideStack, MatchArray, MatchKey};
pub use matches::{MatchDesc, MatchKind, MatchType, Matches};
pub use pipeline::{GeneratorChain, LineState, MatchPipeline, SortDirs};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
