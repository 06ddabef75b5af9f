//! vidbox-core: shared types, errors, configuration, tokens, and media tables.
//!
//! This crate is the foundational dependency for the server crate, providing
//! the unified error type, application configuration, the stream token
//! authority, the catalog repository trait, media format/MIME tables, the
//! path-traversal guard, and subtitle conversion.

pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod paths;
pub mod subtitle;
pub mod token;

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// Re-export the most commonly used items at the crate root.
pub use catalog::{MediaCatalog, MediaRecord, MemoryCatalog};
pub use error::{Error, Result};
pub use media::MediaFormat;

/// Catalog identifier for a media file.
///
/// Newtype over the integer key of the external relational store, preventing
/// accidental mixing with other numeric values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MediaId(i64);

impl MediaId {
    /// Return the raw catalog key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for MediaId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MediaId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_id_round_trip() {
        let id: MediaId = "42".parse().unwrap();
        assert_eq!(id, MediaId::from(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn media_id_rejects_garbage() {
        assert!("abc".parse::<MediaId>().is_err());
        assert!("".parse::<MediaId>().is_err());
    }

    #[test]
    fn media_id_serde_is_transparent() {
        let id = MediaId::from(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: MediaId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }
}
