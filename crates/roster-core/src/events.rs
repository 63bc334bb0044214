//! Inbound event contract.
//!
//! The real-time engine delivers each notification as an ordered batch. Events
//! are a closed set so every kind is handled exhaustively by the reconciler and
//! the lifecycle tracker.

use crate::roster::{PauseState, SignalStrength, VolumeLevel};
use common::types::{AttendeeId, TileId};
use serde::{Deserialize, Serialize};

/// Attendee identity as delivered by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeInfo {
    pub attendee_id: AttendeeId,
    #[serde(default)]
    pub external_user_id: String,
}

impl AttendeeInfo {
    #[must_use]
    pub fn new(attendee_id: impl Into<AttendeeId>, external_user_id: impl Into<String>) -> Self {
        Self {
            attendee_id: attendee_id.into(),
            external_user_id: external_user_id.into(),
        }
    }
}

/// One row of a volume batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeUpdate {
    pub attendee_id: AttendeeId,
    pub volume_level: VolumeLevel,
}

/// One row of a signal-strength batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalUpdate {
    pub attendee_id: AttendeeId,
    pub signal_strength: SignalStrength,
}

/// Video tile state as delivered by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTileState {
    pub tile_id: TileId,
    pub attendee_id: AttendeeId,
    #[serde(default)]
    pub is_local_tile: bool,
    #[serde(default)]
    pub is_content: bool,
    #[serde(default)]
    pub pause_state: PauseState,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Events that mutate the roster, the tile registry, or the local tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RosterEvent {
    AttendeesJoined { attendees: Vec<AttendeeInfo> },
    AttendeesLeft { attendees: Vec<AttendeeInfo> },
    AttendeesDropped { attendees: Vec<AttendeeInfo> },
    AttendeesMuted { attendees: Vec<AttendeeInfo> },
    AttendeesUnmuted { attendees: Vec<AttendeeInfo> },
    SignalStrengthChanged { updates: Vec<SignalUpdate> },
    VolumeChanged { updates: Vec<VolumeUpdate> },
    ActiveSpeakerDetected { attendees: Vec<AttendeeInfo> },
    VideoTileAdded { tile: VideoTileState },
    VideoTilePaused { tile: VideoTileState },
    VideoTileResumed { tile: VideoTileState },
    VideoTileRemoved { tile: VideoTileState },
    /// Local microphone mute command from the device arbiter.
    LocalAudioMuted { muted: bool },
    /// Local camera on/off command from the device arbiter.
    LocalCameraToggled { enabled: bool },
}

impl RosterEvent {
    /// Returns the event kind as a string for metric labels and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            RosterEvent::AttendeesJoined { .. } => "attendees_joined",
            RosterEvent::AttendeesLeft { .. } => "attendees_left",
            RosterEvent::AttendeesDropped { .. } => "attendees_dropped",
            RosterEvent::AttendeesMuted { .. } => "attendees_muted",
            RosterEvent::AttendeesUnmuted { .. } => "attendees_unmuted",
            RosterEvent::SignalStrengthChanged { .. } => "signal_strength_changed",
            RosterEvent::VolumeChanged { .. } => "volume_changed",
            RosterEvent::ActiveSpeakerDetected { .. } => "active_speaker_detected",
            RosterEvent::VideoTileAdded { .. } => "video_tile_added",
            RosterEvent::VideoTilePaused { .. } => "video_tile_paused",
            RosterEvent::VideoTileResumed { .. } => "video_tile_resumed",
            RosterEvent::VideoTileRemoved { .. } => "video_tile_removed",
            RosterEvent::LocalAudioMuted { .. } => "local_audio_muted",
            RosterEvent::LocalCameraToggled { .. } => "local_camera_toggled",
        }
    }
}

/// Status codes attached to session start/stop notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatusCode {
    Ok,
    Left,
    AudioCallEnded,
    AudioDisconnected,
    AudioJoinedFromAnotherDevice,
    AudioAuthenticationRejected,
    AudioServiceUnavailable,
    VideoAtCapacityViewOnly,
    VideoServiceUnavailable,
}

/// Audio/video session lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    AudioSessionStartedConnecting { reconnecting: bool },
    AudioSessionStarted { reconnecting: bool },
    AudioSessionDropped,
    AudioSessionCancelledReconnect,
    AudioSessionStopped { status: SessionStatusCode },
    ConnectionBecamePoor,
    ConnectionRecovered,
    VideoSessionStartedConnecting,
    VideoSessionStarted { status: SessionStatusCode },
    VideoSessionStopped { status: SessionStatusCode },
}
