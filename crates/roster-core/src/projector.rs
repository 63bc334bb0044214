//! Presentation projector.
//!
//! Stateless mapping from a [`RosterSnapshot`] to the records a renderer
//! draws. Rendering itself (icons, surfaces, labels) lives outside this crate;
//! the records name *what* to show, not how.

use crate::reconciler::RosterSnapshot;
use crate::roster::{LocalTile, LocalVisual, RosterEntry, SignalStrength, TileLifecycle, VolumeLevel};
use common::types::{AttendeeId, TileId};
use serde::Serialize;

/// What a remote attendee's tile area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TileVisual {
    /// No tile yet; "Connecting..." placeholder.
    Connecting,
    /// Tile was removed; video disabled placeholder.
    VideoDisabled,
    /// Tile paused by the engine for poor connection.
    PausedPoorConnection,
    /// Bind `tile_id` to the surface and show it.
    Live { tile_id: TileId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalIcon {
    Full,
    Medium,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeIcon {
    Muted,
    Idle,
    Speaking1,
    Speaking2,
    Speaking3,
    PoorConnectivity,
    PoorConnectivityMuted,
}

/// One row of the render list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRecord {
    pub attendee_id: AttendeeId,
    /// `None` hides the name label.
    pub display_name: Option<String>,
    pub volume_icon: VolumeIcon,
    pub signal_icon: SignalIcon,
    pub tile_visual: TileVisual,
    pub is_active_speaker: bool,
}

/// What the local preview shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocalPreview {
    Placeholder,
    Live { tile_id: TileId },
    Reconnecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalRenderRecord {
    pub preview: LocalPreview,
    pub audio_muted: bool,
    pub camera_on: bool,
    /// The local attendee's own join has not been seen yet.
    pub waiting_for_join: bool,
}

/// Render records for every remote attendee, in join order.
#[must_use]
pub fn project(snapshot: &RosterSnapshot) -> Vec<RenderRecord> {
    snapshot.entries.iter().map(render_entry).collect()
}

#[must_use]
pub fn project_local(local: &LocalTile) -> LocalRenderRecord {
    let preview = match (local.visual, &local.descriptor) {
        (LocalVisual::Live, Some(descriptor)) => LocalPreview::Live {
            tile_id: descriptor.tile_id,
        },
        (LocalVisual::Reconnecting, Some(_)) => LocalPreview::Reconnecting,
        _ => LocalPreview::Placeholder,
    };
    LocalRenderRecord {
        preview,
        audio_muted: local.audio_muted,
        camera_on: local.camera_on,
        waiting_for_join: !local.joined,
    }
}

fn render_entry(entry: &RosterEntry) -> RenderRecord {
    RenderRecord {
        attendee_id: entry.attendee_id.clone(),
        display_name: entry.display_name.shown().map(str::to_owned),
        volume_icon: volume_icon(entry),
        signal_icon: signal_icon(entry.signal_strength),
        tile_visual: tile_visual(entry),
        is_active_speaker: entry.is_active_speaker,
    }
}

fn tile_visual(entry: &RosterEntry) -> TileVisual {
    match (entry.tile, entry.video_tile) {
        (TileLifecycle::NotAdded, _) => TileVisual::Connecting,
        (TileLifecycle::Removed, _) => TileVisual::VideoDisabled,
        (TileLifecycle::Paused, _) => TileVisual::PausedPoorConnection,
        (TileLifecycle::Added, Some(tile_id)) => TileVisual::Live { tile_id },
        // Added without a tile id cannot be produced by the reconciler.
        (TileLifecycle::Added, None) => TileVisual::Connecting,
    }
}

fn signal_icon(signal: SignalStrength) -> SignalIcon {
    match signal {
        SignalStrength::High => SignalIcon::Full,
        SignalStrength::Low => SignalIcon::Medium,
        SignalStrength::None => SignalIcon::Weak,
    }
}

fn volume_icon(entry: &RosterEntry) -> VolumeIcon {
    if entry.is_muted {
        return VolumeIcon::Muted;
    }
    match (entry.signal_strength, entry.volume_level) {
        (SignalStrength::Low | SignalStrength::None, VolumeLevel::Muted) => {
            VolumeIcon::PoorConnectivityMuted
        }
        (SignalStrength::Low | SignalStrength::None, _) => VolumeIcon::PoorConnectivity,
        (SignalStrength::High, VolumeLevel::Muted) => VolumeIcon::Muted,
        (SignalStrength::High, VolumeLevel::NotSpeaking) => VolumeIcon::Idle,
        (SignalStrength::High, VolumeLevel::Low) => VolumeIcon::Speaking1,
        (SignalStrength::High, VolumeLevel::Medium) => VolumeIcon::Speaking2,
        (SignalStrength::High, VolumeLevel::High) => VolumeIcon::Speaking3,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::roster::{DisplayName, PauseState, TileDescriptor};

    fn entry(id: &str) -> RosterEntry {
        RosterEntry::joined(
            AttendeeId::new(id),
            DisplayName {
                text: format!("{id} name"),
                is_placeholder: false,
            },
        )
    }

    #[test]
    fn test_tile_visual_first_match_wins() {
        let mut e = entry("a1");
        assert_eq!(tile_visual(&e), TileVisual::Connecting);

        e.attach_tile(TileId(7), false);
        assert_eq!(
            tile_visual(&e),
            TileVisual::Live {
                tile_id: TileId(7)
            }
        );

        e.pause_tile();
        assert_eq!(tile_visual(&e), TileVisual::PausedPoorConnection);

        e.detach_tile();
        assert_eq!(tile_visual(&e), TileVisual::VideoDisabled);
    }

    #[test]
    fn test_signal_icons() {
        assert_eq!(signal_icon(SignalStrength::High), SignalIcon::Full);
        assert_eq!(signal_icon(SignalStrength::Low), SignalIcon::Medium);
        assert_eq!(signal_icon(SignalStrength::None), SignalIcon::Weak);
    }

    #[test]
    fn test_volume_icons_on_good_signal() {
        let mut e = entry("a1");
        let cases = [
            (VolumeLevel::Muted, VolumeIcon::Muted),
            (VolumeLevel::NotSpeaking, VolumeIcon::Idle),
            (VolumeLevel::Low, VolumeIcon::Speaking1),
            (VolumeLevel::Medium, VolumeIcon::Speaking2),
            (VolumeLevel::High, VolumeIcon::Speaking3),
        ];
        for (level, icon) in cases {
            e.volume_level = level;
            assert_eq!(volume_icon(&e), icon, "level {level:?}");
        }
    }

    #[test]
    fn test_poor_signal_replaces_volume_icon() {
        let mut e = entry("a1");
        e.signal_strength = SignalStrength::Low;
        e.volume_level = VolumeLevel::High;
        assert_eq!(volume_icon(&e), VolumeIcon::PoorConnectivity);

        e.signal_strength = SignalStrength::None;
        e.volume_level = VolumeLevel::Muted;
        assert_eq!(volume_icon(&e), VolumeIcon::PoorConnectivityMuted);
    }

    #[test]
    fn test_mute_flag_overrides_everything() {
        let mut e = entry("a1");
        e.is_muted = true;
        e.volume_level = VolumeLevel::High;
        e.signal_strength = SignalStrength::None;
        assert_eq!(volume_icon(&e), VolumeIcon::Muted);
    }

    #[test]
    fn test_placeholder_name_hidden() {
        let mut e = entry("a1");
        e.display_name = DisplayName {
            text: "Unknown".to_string(),
            is_placeholder: true,
        };
        let record = render_entry(&e);
        assert_eq!(record.display_name, None);
    }

    #[test]
    fn test_project_keeps_snapshot_order() {
        let snapshot = RosterSnapshot {
            entries: vec![entry("c"), entry("a"), entry("b")],
            ..RosterSnapshot::default()
        };
        let ids: Vec<_> = project(&snapshot)
            .into_iter()
            .map(|r| r.attendee_id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_project_local() {
        let mut local = LocalTile::default();
        let record = project_local(&local);
        assert_eq!(record.preview, LocalPreview::Placeholder);
        assert!(record.waiting_for_join);

        local.joined = true;
        local.camera_on = true;
        local.visual = LocalVisual::Live;
        local.descriptor = Some(TileDescriptor {
            tile_id: TileId(1),
            attendee_id: AttendeeId::new("me"),
            is_local: true,
            is_content: false,
            pause_state: PauseState::Unpaused,
            width: 0,
            height: 0,
        });
        let record = project_local(&local);
        assert_eq!(
            record.preview,
            LocalPreview::Live {
                tile_id: TileId(1)
            }
        );
        assert!(!record.waiting_for_join);
        assert!(record.camera_on);

        local.visual = LocalVisual::Reconnecting;
        assert_eq!(project_local(&local).preview, LocalPreview::Reconnecting);
    }
}
