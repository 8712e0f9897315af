//! Type-safe identifier wrapper for posts.
//!
//! Post ids are positive integers assigned by the store. The wrapper keeps
//! them from being mixed up with page numbers, limits, and counts, which
//! are plain integers too.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for a post.
///
/// Serialized as a bare JSON integer. Ids are assigned as
/// `max(existing) + 1`, so the first post in an empty collection is `1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct PostId(#[ts(type = "number")] pub u64);

impl PostId {
    /// The id given to the first post of an empty collection.
    pub const FIRST: Self = Self(1);

    /// Return the inner integer value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` if it would overflow.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl core::fmt::Display for PostId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl core::str::FromStr for PostId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}
