//! Event reconciler.
//!
//! Applies one [`RosterEvent`] at a time to the roster, the tile registry and
//! the local tile. This type is not synchronized; the reconciler actor owns
//! the only instance and feeds it events in arrival order.
//!
//! Every mutation is find-or-skip: an event naming an attendee or tile that is
//! not (yet) known is a benign race, traced and counted, never an error.

use crate::config::{Config, MuteBatchPolicy};
use crate::events::{AttendeeInfo, RosterEvent, SignalUpdate, VideoTileState, VolumeUpdate};
use crate::observability::metrics;
use crate::roster::{
    DisplayName, LocalTile, LocalVisual, NameRules, PauseState, Roster, RosterEntry,
    TileDescriptor, TileRegistry, VolumeLevel,
};
use crate::surface::{BindOptions, SurfaceBinder};
use common::types::{AttendeeId, TileId};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Why an attendee left the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureReason {
    Left,
    Dropped,
}

/// Outbound notification for transient UI (toasts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RosterNotice {
    Joined {
        attendee_id: AttendeeId,
        display_name: String,
    },
    Departed {
        attendee_id: AttendeeId,
        display_name: String,
        reason: DepartureReason,
    },
}

/// Immutable copy of reconciler state handed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RosterSnapshot {
    /// Bumped once per event that changed anything.
    pub version: u64,
    /// Remote attendees in join order.
    pub entries: Vec<RosterEntry>,
    /// Registered remote tiles ordered by tile id.
    pub tiles: Vec<TileDescriptor>,
    pub local: LocalTile,
}

impl RosterSnapshot {
    #[must_use]
    pub fn entry(&self, attendee_id: &AttendeeId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| &e.attendee_id == attendee_id)
    }

    #[must_use]
    pub fn tile(&self, tile_id: TileId) -> Option<&TileDescriptor> {
        self.tiles.iter().find(|t| t.tile_id == tile_id)
    }
}

/// Result of applying one event.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Applied {
    pub changed: bool,
    pub notices: Vec<RosterNotice>,
}

/// Per-event scratch state.
struct Step {
    kind: &'static str,
    changed: bool,
    notices: Vec<RosterNotice>,
}

impl Step {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            changed: false,
            notices: Vec::new(),
        }
    }

    fn skip(&self, subject: &dyn std::fmt::Display, reason: &'static str) {
        trace!(
            target: "roster.actor.reconciler",
            event_type = self.kind,
            subject = %subject,
            reason,
            "event element skipped"
        );
        metrics::record_event_dropped(self.kind);
    }
}

pub struct Reconciler {
    local_attendee_id: Option<AttendeeId>,
    names: NameRules,
    mute_batch_policy: MuteBatchPolicy,
    binder: Arc<dyn SurfaceBinder>,
    roster: Roster,
    tiles: TileRegistry,
    local: LocalTile,
    version: u64,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("local_attendee_id", &self.local_attendee_id)
            .field("entries", &self.roster.len())
            .field("tiles", &self.tiles.len())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(config: &Config, binder: Arc<dyn SurfaceBinder>) -> Self {
        Self {
            local_attendee_id: config.local_attendee_id.clone(),
            names: config.names.clone(),
            mute_batch_policy: config.mute_batch_policy,
            binder,
            roster: Roster::new(),
            tiles: TileRegistry::new(),
            local: LocalTile::default(),
            version: 0,
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            version: self.version,
            entries: self.roster.ordered(),
            tiles: self.tiles.sorted(),
            local: self.local.clone(),
        }
    }

    /// Apply one event. Never fails; unknown references are skipped.
    pub fn apply(&mut self, event: RosterEvent) -> Applied {
        let mut step = Step::new(event.kind());

        match event {
            RosterEvent::AttendeesJoined { attendees } => {
                for info in attendees {
                    self.join(info, &mut step);
                }
            }
            RosterEvent::AttendeesLeft { attendees } => {
                self.depart(attendees, DepartureReason::Left, &mut step);
            }
            RosterEvent::AttendeesDropped { attendees } => {
                self.depart(attendees, DepartureReason::Dropped, &mut step);
            }
            RosterEvent::AttendeesMuted { attendees } => self.set_muted(&attendees, true, &mut step),
            RosterEvent::AttendeesUnmuted { attendees } => {
                self.set_muted(&attendees, false, &mut step);
            }
            RosterEvent::SignalStrengthChanged { updates } => self.set_signal(&updates, &mut step),
            RosterEvent::VolumeChanged { updates } => self.set_volume(&updates, &mut step),
            RosterEvent::ActiveSpeakerDetected { attendees } => {
                self.set_active_speakers(&attendees, &mut step);
            }
            RosterEvent::VideoTileAdded { tile } => self.tile_added(tile, &mut step),
            RosterEvent::VideoTilePaused { tile } => self.tile_paused(&tile, &mut step),
            RosterEvent::VideoTileResumed { tile } => self.tile_resumed(&tile, &mut step),
            RosterEvent::VideoTileRemoved { tile } => self.tile_removed(&tile, &mut step),
            RosterEvent::LocalAudioMuted { muted } => {
                if self.local.audio_muted != muted {
                    self.local.audio_muted = muted;
                    step.changed = true;
                }
            }
            RosterEvent::LocalCameraToggled { enabled } => {
                if self.local.camera_on != enabled {
                    self.local.camera_on = enabled;
                    step.changed = true;
                }
            }
        }

        if step.changed {
            self.version += 1;
        }
        metrics::record_event_applied(step.kind);
        metrics::set_roster_entries(self.roster.len());
        metrics::set_tiles_registered(self.tiles.len());

        Applied {
            changed: step.changed,
            notices: step.notices,
        }
    }

    /// Unbind every surface still bound. Called once on teardown.
    pub fn release_surfaces(&mut self) {
        for descriptor in self.tiles.sorted() {
            if let Some((_, Err(e))) = self.tiles.remove(descriptor.tile_id, self.binder.as_ref()) {
                report_surface_failure("unbind", descriptor.tile_id, &e);
            }
            if let Some(entry) = self.roster.get_mut(&descriptor.attendee_id) {
                entry.detach_tile();
            }
        }
        if let Some(descriptor) = self.local.descriptor.take() {
            if let Err(e) = self.binder.unbind(descriptor.tile_id) {
                report_surface_failure("unbind", descriptor.tile_id, &e);
            }
            self.local.visual = LocalVisual::Placeholder;
        }
    }

    fn is_local(&self, attendee_id: &AttendeeId) -> bool {
        self.local_attendee_id.as_ref() == Some(attendee_id)
    }

    fn join(&mut self, info: AttendeeInfo, step: &mut Step) {
        if self.is_local(&info.attendee_id) {
            if !self.local.joined {
                self.local.joined = true;
                step.changed = true;
            }
            return;
        }
        if self.roster.contains(&info.attendee_id) {
            trace!(
                target: "roster.actor.reconciler",
                attendee_id = %info.attendee_id,
                "duplicate join ignored"
            );
            return;
        }

        let display_name = self.names.derive(&info.attendee_id, &info.external_user_id);
        let mut entry = RosterEntry::joined(info.attendee_id.clone(), display_name.clone());

        // Tile-added may have been delivered before this join.
        if let Some(tile) = self.tiles.find_by_attendee(&info.attendee_id) {
            entry.attach_tile(
                tile.tile_id,
                tile.pause_state == PauseState::PausedForPoorConnection,
            );
        }

        debug!(
            target: "roster.actor.reconciler",
            attendee_id = %info.attendee_id,
            placeholder = display_name.is_placeholder,
            "attendee joined"
        );
        self.roster.insert_if_absent(entry);
        step.changed = true;
        step.notices.push(RosterNotice::Joined {
            attendee_id: info.attendee_id,
            display_name: display_name.text,
        });
    }

    fn depart(&mut self, attendees: Vec<AttendeeInfo>, reason: DepartureReason, step: &mut Step) {
        for info in attendees {
            let Some(entry) = self.roster.remove(&info.attendee_id) else {
                step.skip(&info.attendee_id, "unknown attendee");
                continue;
            };
            debug!(
                target: "roster.actor.reconciler",
                attendee_id = %info.attendee_id,
                ?reason,
                "attendee departed"
            );
            step.changed = true;
            let DisplayName {
                text,
                is_placeholder,
            } = entry.display_name;
            if !is_placeholder {
                step.notices.push(RosterNotice::Departed {
                    attendee_id: info.attendee_id,
                    display_name: text,
                    reason,
                });
            }
        }
    }

    fn set_muted(&mut self, attendees: &[AttendeeInfo], muted: bool, step: &mut Step) {
        let level = if muted {
            VolumeLevel::Muted
        } else {
            VolumeLevel::NotSpeaking
        };

        for info in attendees {
            if self.is_local(&info.attendee_id) {
                continue;
            }
            match self.roster.get_mut(&info.attendee_id) {
                Some(entry) => {
                    if entry.is_muted != muted || entry.volume_level != level {
                        entry.is_muted = muted;
                        entry.volume_level = level;
                        step.changed = true;
                    }
                }
                None => step.skip(&info.attendee_id, "unknown attendee"),
            }
            if self.mute_batch_policy == MuteBatchPolicy::FirstMatch {
                break;
            }
        }
    }

    fn set_signal(&mut self, updates: &[SignalUpdate], step: &mut Step) {
        for update in updates {
            match self.roster.get_mut(&update.attendee_id) {
                Some(entry) => {
                    if entry.signal_strength != update.signal_strength {
                        entry.signal_strength = update.signal_strength;
                        step.changed = true;
                    }
                }
                None => step.skip(&update.attendee_id, "unknown attendee"),
            }
        }
    }

    fn set_volume(&mut self, updates: &[VolumeUpdate], step: &mut Step) {
        let Some(local_id) = &self.local_attendee_id else {
            trace!(
                target: "roster.actor.reconciler",
                "volume batch skipped: local attendee not yet known"
            );
            return;
        };
        if self.roster.is_empty() {
            return;
        }

        for update in updates {
            if &update.attendee_id == local_id {
                continue;
            }
            match self.roster.get_mut(&update.attendee_id) {
                Some(entry) => {
                    if entry.volume_level != update.volume_level {
                        entry.volume_level = update.volume_level;
                        step.changed = true;
                    }
                }
                None => step.skip(&update.attendee_id, "unknown attendee"),
            }
        }
    }

    fn set_active_speakers(&mut self, attendees: &[AttendeeInfo], step: &mut Step) {
        let speaking: HashSet<&AttendeeId> = attendees.iter().map(|a| &a.attendee_id).collect();
        for entry in self.roster.values_mut() {
            let is_speaking = speaking.contains(&entry.attendee_id);
            if entry.is_active_speaker != is_speaking {
                entry.is_active_speaker = is_speaking;
                step.changed = true;
            }
        }
    }

    fn tile_added(&mut self, tile: VideoTileState, step: &mut Step) {
        if tile.is_local_tile {
            self.local_tile_added(tile, step);
            return;
        }
        if self.tiles.contains(tile.tile_id) {
            step.skip(&tile.tile_id, "tile already registered");
            return;
        }

        let paused = tile.pause_state == PauseState::PausedForPoorConnection;
        let tile_id = tile.tile_id;
        let attendee_id = tile.attendee_id.clone();
        self.tiles.register(descriptor_from(tile));
        step.changed = true;

        match self.roster.get_mut(&attendee_id) {
            Some(entry) => entry.attach_tile(tile_id, paused),
            None => trace!(
                target: "roster.actor.reconciler",
                tile_id = %tile_id,
                attendee_id = %attendee_id,
                "tile registered ahead of attendee join"
            ),
        }
    }

    fn local_tile_added(&mut self, tile: VideoTileState, step: &mut Step) {
        if let Some(current) = &self.local.descriptor {
            if current.tile_id == tile.tile_id {
                step.skip(&tile.tile_id, "local tile already bound");
                return;
            }
            if let Err(e) = self.binder.unbind(current.tile_id) {
                report_surface_failure("unbind", current.tile_id, &e);
            }
        }

        let tile_id = tile.tile_id;
        if let Err(e) = self.binder.bind(tile_id, BindOptions { mirror: true }) {
            report_surface_failure("bind", tile_id, &e);
        }
        debug!(target: "roster.actor.reconciler", tile_id = %tile_id, "local tile bound");
        self.local.descriptor = Some(descriptor_from(tile));
        self.local.visual = LocalVisual::Live;
        step.changed = true;
    }

    fn tile_paused(&mut self, tile: &VideoTileState, step: &mut Step) {
        if tile.pause_state != PauseState::PausedForPoorConnection {
            trace!(
                target: "roster.actor.reconciler",
                tile_id = %tile.tile_id,
                pause_state = ?tile.pause_state,
                "pause ignored"
            );
            return;
        }

        if tile.is_local_tile {
            match self.local_descriptor_mut(tile.tile_id) {
                Some(descriptor) => {
                    descriptor.pause_state = tile.pause_state;
                    self.local.visual = LocalVisual::Reconnecting;
                    step.changed = true;
                }
                None => step.skip(&tile.tile_id, "unknown local tile"),
            }
            return;
        }

        let Some(descriptor) = self.tiles.get_mut(tile.tile_id) else {
            step.skip(&tile.tile_id, "unknown tile");
            return;
        };
        if descriptor.pause_state != tile.pause_state {
            descriptor.pause_state = tile.pause_state;
            step.changed = true;
        }
        let attendee_id = descriptor.attendee_id.clone();
        if let Some(entry) = self.roster.get_mut(&attendee_id) {
            if entry.video_tile == Some(tile.tile_id) {
                step.changed |= entry.pause_tile();
            }
        }
    }

    fn tile_resumed(&mut self, tile: &VideoTileState, step: &mut Step) {
        if tile.is_local_tile {
            match self.local_descriptor_mut(tile.tile_id) {
                Some(descriptor) => {
                    descriptor.pause_state = PauseState::Unpaused;
                    if self.local.visual != LocalVisual::Live {
                        self.local.visual = LocalVisual::Live;
                        step.changed = true;
                    }
                }
                None => step.skip(&tile.tile_id, "unknown local tile"),
            }
            return;
        }

        let Some(descriptor) = self.tiles.get_mut(tile.tile_id) else {
            step.skip(&tile.tile_id, "unknown tile");
            return;
        };
        if descriptor.pause_state != PauseState::Unpaused {
            descriptor.pause_state = PauseState::Unpaused;
            step.changed = true;
        }
        let attendee_id = descriptor.attendee_id.clone();
        if let Some(entry) = self.roster.get_mut(&attendee_id) {
            if entry.video_tile == Some(tile.tile_id) {
                step.changed |= entry.resume_tile();
            }
        }
    }

    fn tile_removed(&mut self, tile: &VideoTileState, step: &mut Step) {
        if tile.is_local_tile {
            if self.local_descriptor_mut(tile.tile_id).is_none() {
                step.skip(&tile.tile_id, "unknown local tile");
                return;
            }
            if let Err(e) = self.binder.unbind(tile.tile_id) {
                report_surface_failure("unbind", tile.tile_id, &e);
            }
            self.local.descriptor = None;
            self.local.visual = LocalVisual::Placeholder;
            step.changed = true;
            return;
        }

        let Some((descriptor, unbound)) = self.tiles.remove(tile.tile_id, self.binder.as_ref())
        else {
            step.skip(&tile.tile_id, "unknown tile");
            return;
        };
        if let Err(e) = unbound {
            report_surface_failure("unbind", tile.tile_id, &e);
        }
        step.changed = true;

        if let Some(entry) = self.roster.get_mut(&descriptor.attendee_id) {
            if entry.video_tile == Some(tile.tile_id) {
                entry.detach_tile();
            }
        }
    }

    fn local_descriptor_mut(&mut self, tile_id: TileId) -> Option<&mut TileDescriptor> {
        self.local
            .descriptor
            .as_mut()
            .filter(|d| d.tile_id == tile_id)
    }
}

fn descriptor_from(tile: VideoTileState) -> TileDescriptor {
    TileDescriptor {
        tile_id: tile.tile_id,
        attendee_id: tile.attendee_id,
        is_local: tile.is_local_tile,
        is_content: tile.is_content,
        pause_state: tile.pause_state,
        width: tile.width,
        height: tile.height,
    }
}

fn report_surface_failure(
    operation: &'static str,
    tile_id: TileId,
    error: &crate::errors::SurfaceError,
) {
    warn!(
        target: "roster.actor.reconciler",
        tile_id = %tile_id,
        operation,
        error = %error,
        "surface request failed"
    );
    metrics::record_surface_failure(operation);
}
