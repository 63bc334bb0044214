//! Single-slot holder for the local attendee's own tile and media state.
//!
//! The local attendee never appears in the roster; everything the renderer
//! needs about "me" lives here.

use super::tiles::TileDescriptor;
use serde::Serialize;

/// What the local preview should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalVisual {
    /// No local video; placeholder shown.
    #[default]
    Placeholder,
    /// Local tile bound and rendering.
    Live,
    /// Local tile paused for poor connection; surface hidden.
    Reconnecting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LocalTile {
    /// Set once the local attendee's own join is seen.
    pub joined: bool,
    pub descriptor: Option<TileDescriptor>,
    pub visual: LocalVisual,
    pub audio_muted: bool,
    pub camera_on: bool,
}
