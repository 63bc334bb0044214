//! Per-attendee roster record.

use super::display_name::DisplayName;
use common::types::{AttendeeId, TileId};
use serde::{Deserialize, Serialize};

/// Audio level reported for an attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    Muted,
    NotSpeaking,
    Low,
    Medium,
    High,
}

impl VolumeLevel {
    /// Returns the level as a string for metric labels and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            VolumeLevel::Muted => "muted",
            VolumeLevel::NotSpeaking => "not_speaking",
            VolumeLevel::Low => "low",
            VolumeLevel::Medium => "medium",
            VolumeLevel::High => "high",
        }
    }
}

/// Network signal strength reported for an attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    #[default]
    High,
    Low,
    None,
}

/// Video tile lifecycle for one attendee.
///
/// ```text
/// NotAdded -> Added <-> Paused
///               |         |
///               +-> Removed <-+
/// Removed -> Added (a later add for the same attendee)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileLifecycle {
    #[default]
    NotAdded,
    Added,
    Paused,
    Removed,
}

/// Presentation state of one remote attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub attendee_id: AttendeeId,
    pub display_name: DisplayName,
    pub volume_level: VolumeLevel,
    pub signal_strength: SignalStrength,
    pub is_active_speaker: bool,
    /// Key into the tile registry for the attendee's primary tile.
    pub video_tile: Option<TileId>,
    pub is_muted: bool,
    pub tile: TileLifecycle,
    /// Position in join order.
    pub(crate) join_seq: u64,
}

impl RosterEntry {
    /// A freshly joined attendee: not speaking, full signal, unmuted, no tile.
    #[must_use]
    pub fn joined(attendee_id: AttendeeId, display_name: DisplayName) -> Self {
        Self {
            attendee_id,
            display_name,
            volume_level: VolumeLevel::NotSpeaking,
            signal_strength: SignalStrength::High,
            is_active_speaker: false,
            video_tile: None,
            is_muted: false,
            tile: TileLifecycle::NotAdded,
            join_seq: 0,
        }
    }

    /// Set once a tile has been added; stays set through pause and removal.
    #[must_use]
    pub fn tile_added(&self) -> bool {
        self.tile != TileLifecycle::NotAdded
    }

    #[must_use]
    pub fn tile_paused(&self) -> bool {
        self.tile == TileLifecycle::Paused
    }

    #[must_use]
    pub fn tile_removed(&self) -> bool {
        self.tile == TileLifecycle::Removed
    }

    /// Enter `Added` (or `Paused` if the tile is already paused) for `tile_id`.
    pub(crate) fn attach_tile(&mut self, tile_id: TileId, paused: bool) {
        self.video_tile = Some(tile_id);
        self.tile = if paused {
            TileLifecycle::Paused
        } else {
            TileLifecycle::Added
        };
    }

    /// `Added -> Paused`. Returns whether the state changed.
    pub(crate) fn pause_tile(&mut self) -> bool {
        if self.tile == TileLifecycle::Added {
            self.tile = TileLifecycle::Paused;
            true
        } else {
            false
        }
    }

    /// `Paused -> Added`. Returns whether the state changed.
    pub(crate) fn resume_tile(&mut self) -> bool {
        if self.tile == TileLifecycle::Paused {
            self.tile = TileLifecycle::Added;
            true
        } else {
            false
        }
    }

    /// Any state -> `Removed`; the surface has already been unbound.
    pub(crate) fn detach_tile(&mut self) {
        self.video_tile = None;
        self.tile = TileLifecycle::Removed;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn entry() -> RosterEntry {
        RosterEntry::joined(
            AttendeeId::new("a1"),
            DisplayName {
                text: "Alice".to_string(),
                is_placeholder: false,
            },
        )
    }

    #[test]
    fn test_joined_defaults() {
        let e = entry();
        assert_eq!(e.volume_level, VolumeLevel::NotSpeaking);
        assert_eq!(e.signal_strength, SignalStrength::High);
        assert!(!e.is_muted);
        assert!(!e.is_active_speaker);
        assert!(!e.tile_added());
        assert!(!e.tile_paused());
        assert!(!e.tile_removed());
        assert!(e.video_tile.is_none());
    }

    #[test]
    fn test_tile_lifecycle_transitions() {
        let mut e = entry();

        // Pause/resume are no-ops before a tile exists
        assert!(!e.pause_tile());
        assert!(!e.resume_tile());

        e.attach_tile(TileId(7), false);
        assert!(e.tile_added());
        assert_eq!(e.video_tile, Some(TileId(7)));

        assert!(e.pause_tile());
        assert!(e.tile_paused());
        assert!(e.tile_added());
        assert!(!e.pause_tile());

        assert!(e.resume_tile());
        assert!(!e.tile_paused());

        e.detach_tile();
        assert!(e.tile_removed());
        assert!(e.tile_added());
        assert!(!e.tile_paused());
        assert!(e.video_tile.is_none());

        // A later add re-enters Added
        e.attach_tile(TileId(9), false);
        assert!(e.tile_added());
        assert!(!e.tile_removed());
    }

    #[test]
    fn test_attach_already_paused() {
        let mut e = entry();
        e.attach_tile(TileId(3), true);
        assert!(e.tile_paused());
    }

    #[test]
    fn test_volume_level_as_str() {
        assert_eq!(VolumeLevel::Muted.as_str(), "muted");
        assert_eq!(VolumeLevel::NotSpeaking.as_str(), "not_speaking");
        assert_eq!(VolumeLevel::High.as_str(), "high");
    }
}
