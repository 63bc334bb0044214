//! Tile registry: render-surface ids to video tile metadata.
//!
//! Kept apart from the roster because tile-added notifications race with
//! attendee-joined notifications in both directions. Lookups by attendee are a
//! linear scan; meetings hold tens of participants, not thousands.

use crate::errors::SurfaceError;
use crate::surface::SurfaceBinder;
use common::types::{AttendeeId, TileId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a tile's video is paused, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseState {
    #[default]
    Unpaused,
    PausedByUserRequest,
    PausedForPoorConnection,
}

/// Metadata for one video tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileDescriptor {
    pub tile_id: TileId,
    pub attendee_id: AttendeeId,
    pub is_local: bool,
    pub is_content: bool,
    pub pause_state: PauseState,
    pub width: u32,
    pub height: u32,
}

/// `tile_id -> TileDescriptor` for remote tiles.
#[derive(Debug, Default)]
pub struct TileRegistry {
    tiles: HashMap<TileId, TileDescriptor>,
}

impl TileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, tile_id: TileId) -> bool {
        self.tiles.contains_key(&tile_id)
    }

    #[must_use]
    pub fn get(&self, tile_id: TileId) -> Option<&TileDescriptor> {
        self.tiles.get(&tile_id)
    }

    pub fn get_mut(&mut self, tile_id: TileId) -> Option<&mut TileDescriptor> {
        self.tiles.get_mut(&tile_id)
    }

    /// Register a descriptor. Returns `false` (and leaves the registry untouched)
    /// if the tile id is already registered.
    pub fn register(&mut self, descriptor: TileDescriptor) -> bool {
        if self.tiles.contains_key(&descriptor.tile_id) {
            return false;
        }
        self.tiles.insert(descriptor.tile_id, descriptor);
        true
    }

    /// First registered tile belonging to `attendee_id`, lowest tile id first.
    #[must_use]
    pub fn find_by_attendee(&self, attendee_id: &AttendeeId) -> Option<&TileDescriptor> {
        self.tiles
            .values()
            .filter(|t| &t.attendee_id == attendee_id)
            .min_by_key(|t| t.tile_id)
    }

    /// Unbind the tile's surface, then discard the descriptor.
    ///
    /// The descriptor is discarded even if the unbind fails; the bind result is
    /// returned alongside so the caller can report it.
    pub fn remove(
        &mut self,
        tile_id: TileId,
        binder: &dyn SurfaceBinder,
    ) -> Option<(TileDescriptor, Result<(), SurfaceError>)> {
        if !self.tiles.contains_key(&tile_id) {
            return None;
        }
        let unbound = binder.unbind(tile_id);
        self.tiles
            .remove(&tile_id)
            .map(|descriptor| (descriptor, unbound))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All descriptors ordered by tile id.
    #[must_use]
    pub fn sorted(&self) -> Vec<TileDescriptor> {
        let mut tiles: Vec<_> = self.tiles.values().cloned().collect();
        tiles.sort_by_key(|t| t.tile_id);
        tiles
    }
}
