//! Identifier types shared by the roster crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for an attendee, as assigned by the real-time engine.
///
/// Opaque to the roster: the only structure inspected is a reserved suffix
/// marking content-share pseudo-attendees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendeeId(String);

impl AttendeeId {
    /// Wrap an engine-provided identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier carries the given suffix.
    #[must_use]
    pub fn has_suffix(&self, suffix: &str) -> bool {
        !suffix.is_empty() && self.0.ends_with(suffix)
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttendeeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AttendeeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Render-surface correlation key for a video tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TileId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
