use std::{fmt, io};

use crate::lookaside::ArrayId;

/// Crate-wide `Result` type using [`MatchkitError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, MatchkitError>;

/// Top-level error type for matchkit operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum MatchkitError {
    /// Arena storage errors.
    Store(StoreError),

    /// Lookaside registry errors.
    Lookaside(LookasideError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Line editor errors.
    Readline(String),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Arena storage errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Not enough space between the front and back cursors.
    Overflow { needed: usize, available: usize },

    /// Empty strings are never stored.
    EmptyText,

    /// The text contains a nul byte and would not survive the round trip.
    InteriorNul,
}

/// Lookaside registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookasideError {
    /// The array has no entries past the placeholder.
    EmptyArray,

    /// The array already has an active registry.
    AlreadyRegistered(ArrayId),

    /// The array has no active registry.
    NotRegistered(ArrayId),

    /// An entry does not follow the packed record layout.
    Malformed { slot: usize },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for MatchkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchkitError::Store(e) => write!(f, "Store error: {e}"),
            MatchkitError::Lookaside(e) => write!(f, "Lookaside error: {e}"),
            MatchkitError::Config(e) => write!(f, "Configuration error: {e}"),
            MatchkitError::Io(e) => write!(f, "I/O error: {e}"),
            MatchkitError::Readline(msg) => write!(f, "Readline error: {msg}"),
            MatchkitError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Overflow { needed, available } => {
                write!(f, "Store full: need {needed} bytes, {available} available")
            }
            StoreError::EmptyText => write!(f, "Cannot store empty text"),
            StoreError::InteriorNul => write!(f, "Text contains a nul byte"),
        }
    }
}

impl fmt::Display for LookasideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookasideError::EmptyArray => write!(f, "Match array has no entries"),
            LookasideError::AlreadyRegistered(id) => {
                write!(f, "Match array {id} already has a lookaside")
            }
            LookasideError::NotRegistered(id) => {
                write!(f, "Match array {id} has no lookaside")
            }
            LookasideError::Malformed { slot } => {
                write!(f, "Malformed packed match in slot {slot}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for MatchkitError {}
impl std::error::Error for StoreError {}
impl std::error::Error for LookasideError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to MatchkitError ========================= */

impl From<io::Error> for MatchkitError {
    fn from(err: io::Error) -> Self {
        MatchkitError::Io(err)
    }
}

impl From<StoreError> for MatchkitError {
    fn from(err: StoreError) -> Self {
        MatchkitError::Store(err)
    }
}

impl From<LookasideError> for MatchkitError {
    fn from(err: LookasideError) -> Self {
        MatchkitError::Lookaside(err)
    }
}

impl From<ConfigError> for MatchkitError {
    fn from(err: ConfigError) -> Self {
        MatchkitError::Config(err)
    }
}

impl From<String> for MatchkitError {
    fn from(msg: String) -> Self {
        MatchkitError::Generic(msg)
    }
}

impl From<&str> for MatchkitError {
    fn from(msg: &str) -> Self {
        MatchkitError::Generic(msg.to_owned())
    }
}

impl From<reedline::ReedlineError> for MatchkitError {
    fn from(err: reedline::ReedlineError) -> Self {
        MatchkitError::Readline(err.to_string())
    }
}

impl From<toml::de::Error> for MatchkitError {
    fn from(err: toml::de::Error) -> Self {
        MatchkitError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for MatchkitError {
    fn from(err: toml::ser::Error) -> Self {
        MatchkitError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<serde_json::Error> for MatchkitError {
    fn from(err: serde_json::Error) -> Self {
        MatchkitError::Generic(format!("JSON error: {err}"))
    }
}
