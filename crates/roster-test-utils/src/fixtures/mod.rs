//! Pre-configured test data fixtures for roster testing.
//!
//! Provides builders and test data for:
//! - Attendees with well-formed or malformed external user ids
//! - Remote, local and content-share video tiles
//! - `RosterEvent` / `SessionEvent` constructors
//! - JSON-lines replay scripts

use common::types::{AttendeeId, TileId};
use roster_core::events::{AttendeeInfo, SignalUpdate, VideoTileState, VolumeUpdate};
use roster_core::replay::ReplayLine;
use roster_core::roster::{PauseState, SignalStrength, VolumeLevel};
use uuid::Uuid;

/// Organisation prefix used for well-formed external user ids.
pub const TEST_ORG: &str = "org-test";

/// Test attendee fixture.
#[derive(Debug, Clone)]
pub struct TestAttendee {
    pub attendee_id: AttendeeId,
    /// The name the roster should derive.
    pub name: String,
    /// External user id as the engine delivers it.
    pub external_user_id: String,
}

impl TestAttendee {
    /// Attendee with a random id and a well-formed `org#name` external id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            attendee_id: AttendeeId::new(format!("att-{}", Uuid::new_v4())),
            external_user_id: format!("{TEST_ORG}#{name}"),
            name,
        }
    }

    /// Attendee with an explicit id (for reproducible tests).
    #[must_use]
    pub fn with_id(id: &str, name: impl Into<String>) -> Self {
        let mut attendee = Self::new(name);
        attendee.attendee_id = AttendeeId::new(id);
        attendee
    }

    /// Attendee whose external id has no name segment.
    #[must_use]
    pub fn malformed(id: &str) -> Self {
        Self {
            attendee_id: AttendeeId::new(id),
            name: String::new(),
            external_user_id: "no-delimiter-here".to_string(),
        }
    }

    /// The content-share pseudo-attendee for `self`.
    #[must_use]
    pub fn content_share(&self) -> Self {
        Self {
            attendee_id: AttendeeId::new(format!("{}#content", self.attendee_id)),
            name: self.name.clone(),
            external_user_id: self.external_user_id.clone(),
        }
    }

    #[must_use]
    pub fn info(&self) -> AttendeeInfo {
        AttendeeInfo {
            attendee_id: self.attendee_id.clone(),
            external_user_id: self.external_user_id.clone(),
        }
    }
}

/// Test video tile fixture.
#[derive(Debug, Clone)]
pub struct TestTile;

impl TestTile {
    /// Unpaused remote tile.
    #[must_use]
    pub fn remote(tile_id: u32, owner: &TestAttendee) -> VideoTileState {
        Self::build(tile_id, owner.attendee_id.clone(), false, false)
    }

    /// Unpaused local camera tile.
    #[must_use]
    pub fn local(tile_id: u32, local_id: &AttendeeId) -> VideoTileState {
        Self::build(tile_id, local_id.clone(), true, false)
    }

    /// Unpaused content-share tile.
    #[must_use]
    pub fn content(tile_id: u32, sharer: &TestAttendee) -> VideoTileState {
        Self::build(tile_id, sharer.content_share().attendee_id, false, true)
    }

    /// `tile` paused for poor connection.
    #[must_use]
    pub fn poor_connection(mut tile: VideoTileState) -> VideoTileState {
        tile.pause_state = PauseState::PausedForPoorConnection;
        tile
    }

    fn build(tile_id: u32, attendee_id: AttendeeId, local: bool, content: bool) -> VideoTileState {
        VideoTileState {
            tile_id: TileId(tile_id),
            attendee_id,
            is_local_tile: local,
            is_content: content,
            pause_state: PauseState::Unpaused,
            width: 1280,
            height: 720,
        }
    }
}

/// `RosterEvent` / `SessionEvent` constructors.
pub mod events {
    use super::{SignalStrength, SignalUpdate, TestAttendee, VideoTileState, VolumeLevel, VolumeUpdate};
    use roster_core::events::{RosterEvent, SessionEvent, SessionStatusCode};

    fn infos(attendees: &[&TestAttendee]) -> Vec<roster_core::events::AttendeeInfo> {
        attendees.iter().map(|a| a.info()).collect()
    }

    #[must_use]
    pub fn joined(attendees: &[&TestAttendee]) -> RosterEvent {
        RosterEvent::AttendeesJoined {
            attendees: infos(attendees),
        }
    }

    #[must_use]
    pub fn left(attendees: &[&TestAttendee]) -> RosterEvent {
        RosterEvent::AttendeesLeft {
            attendees: infos(attendees),
        }
    }

    #[must_use]
    pub fn dropped(attendees: &[&TestAttendee]) -> RosterEvent {
        RosterEvent::AttendeesDropped {
            attendees: infos(attendees),
        }
    }

    #[must_use]
    pub fn muted(attendees: &[&TestAttendee]) -> RosterEvent {
        RosterEvent::AttendeesMuted {
            attendees: infos(attendees),
        }
    }

    #[must_use]
    pub fn unmuted(attendees: &[&TestAttendee]) -> RosterEvent {
        RosterEvent::AttendeesUnmuted {
            attendees: infos(attendees),
        }
    }

    #[must_use]
    pub fn signal(attendee: &TestAttendee, signal_strength: SignalStrength) -> RosterEvent {
        RosterEvent::SignalStrengthChanged {
            updates: vec![SignalUpdate {
                attendee_id: attendee.attendee_id.clone(),
                signal_strength,
            }],
        }
    }

    #[must_use]
    pub fn volume(attendee: &TestAttendee, volume_level: VolumeLevel) -> RosterEvent {
        RosterEvent::VolumeChanged {
            updates: vec![VolumeUpdate {
                attendee_id: attendee.attendee_id.clone(),
                volume_level,
            }],
        }
    }

    #[must_use]
    pub fn active_speakers(attendees: &[&TestAttendee]) -> RosterEvent {
        RosterEvent::ActiveSpeakerDetected {
            attendees: infos(attendees),
        }
    }

    #[must_use]
    pub fn tile_added(tile: VideoTileState) -> RosterEvent {
        RosterEvent::VideoTileAdded { tile }
    }

    #[must_use]
    pub fn tile_paused(tile: VideoTileState) -> RosterEvent {
        RosterEvent::VideoTilePaused {
            tile: super::TestTile::poor_connection(tile),
        }
    }

    #[must_use]
    pub fn tile_resumed(tile: VideoTileState) -> RosterEvent {
        RosterEvent::VideoTileResumed { tile }
    }

    #[must_use]
    pub fn tile_removed(tile: VideoTileState) -> RosterEvent {
        RosterEvent::VideoTileRemoved { tile }
    }

    #[must_use]
    pub fn audio_started() -> SessionEvent {
        SessionEvent::AudioSessionStarted {
            reconnecting: false,
        }
    }

    #[must_use]
    pub fn audio_stopped(status: SessionStatusCode) -> SessionEvent {
        SessionEvent::AudioSessionStopped { status }
    }
}

/// JSON-lines replay script builder.
#[derive(Debug, Default, Clone)]
pub struct ReplayScript {
    lines: Vec<String>,
}

impl ReplayScript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn roster(self, event: roster_core::events::RosterEvent) -> Self {
        self.line(&ReplayLine::Roster(event))
    }

    #[must_use]
    pub fn session(self, event: roster_core::events::SessionEvent) -> Self {
        self.line(&ReplayLine::Session(event))
    }

    #[must_use]
    pub fn comment(mut self, text: &str) -> Self {
        self.lines.push(format!("# {text}"));
        self
    }

    /// Append a raw line verbatim (for malformed-input tests).
    #[must_use]
    pub fn raw(mut self, text: &str) -> Self {
        self.lines.push(text.to_string());
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        let mut script = self.lines.join("\n");
        script.push('\n');
        script
    }

    fn line(mut self, line: &ReplayLine) -> Self {
        self.lines
            .push(serde_json::to_string(line).expect("replay lines always serialize"));
        self
    }
}
