//! Roster data model.
//!
//! - [`entry`] - per-attendee record and tile lifecycle
//! - [`display_name`] - name derivation from external user ids
//! - [`tiles`] - tile registry keyed by render-surface id
//! - [`local`] - the local attendee's own tile and media state

pub mod display_name;
pub mod entry;
pub mod local;
pub mod tiles;

pub use display_name::{DisplayName, NameRules};
pub use entry::{RosterEntry, SignalStrength, TileLifecycle, VolumeLevel};
pub use local::{LocalTile, LocalVisual};
pub use tiles::{PauseState, TileDescriptor, TileRegistry};

use common::types::AttendeeId;
use std::collections::HashMap;

/// Remote attendees keyed by id, remembering join order.
#[derive(Debug, Default)]
pub struct Roster {
    entries: HashMap<AttendeeId, RosterEntry>,
    next_seq: u64,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` unless its attendee is already present.
    ///
    /// Returns `true` if inserted. The entry's join position is assigned here.
    pub fn insert_if_absent(&mut self, mut entry: RosterEntry) -> bool {
        if self.entries.contains_key(&entry.attendee_id) {
            return false;
        }
        entry.join_seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(entry.attendee_id.clone(), entry);
        true
    }

    pub fn remove(&mut self, attendee_id: &AttendeeId) -> Option<RosterEntry> {
        self.entries.remove(attendee_id)
    }

    #[must_use]
    pub fn get(&self, attendee_id: &AttendeeId) -> Option<&RosterEntry> {
        self.entries.get(attendee_id)
    }

    pub fn get_mut(&mut self, attendee_id: &AttendeeId) -> Option<&mut RosterEntry> {
        self.entries.get_mut(attendee_id)
    }

    #[must_use]
    pub fn contains(&self, attendee_id: &AttendeeId) -> bool {
        self.entries.contains_key(attendee_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut RosterEntry> {
        self.entries.values_mut()
    }

    /// Copies of all entries in join order.
    #[must_use]
    pub fn ordered(&self) -> Vec<RosterEntry> {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        entries.sort_by_key(|e| e.join_seq);
        entries
    }
}
