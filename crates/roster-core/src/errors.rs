//! Roster core error types.
//!
//! Reconciliation itself never fails: events that reference unknown attendees or
//! tiles are benign races and are dropped inside the reconciler. The errors here
//! cover the serialization point going away, configuration, and the replay tool.

use common::types::TileId;
use thiserror::Error;

/// Roster core error type.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The reconciler actor is no longer servicing its mailbox. Ends the session.
    #[error("Reconciler unavailable: {0}")]
    ReconcilerUnavailable(String),

    /// The session lifecycle actor is no longer servicing its mailbox.
    #[error("Lifecycle tracker unavailable: {0}")]
    LifecycleUnavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Replay input could not be read or parsed.
    #[error("Replay error: {0}")]
    Replay(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RosterError {
    /// Whether this error means the session can no longer make progress.
    ///
    /// Only the loss of the reconciler is fatal; the lifecycle tracker is advisory.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, RosterError::ReconcilerUnavailable(_))
    }

    /// Returns a user-safe message. Reconciliation details are never shown.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_fatal() {
            "Session ended".to_string()
        } else {
            "Something went wrong".to_string()
        }
    }
}

/// Render-layer rejection of a bind or unbind request.
///
/// Non-fatal: the tile's logical state stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// No surface is available to bind the tile to.
    #[error("No surface available for tile {0}")]
    NoSurface(TileId),

    /// The render layer rejected the request.
    #[error("Surface rejected request for tile {tile_id}: {reason}")]
    Rejected { tile_id: TileId, reason: String },
}

impl From<crate::config::ConfigError> for RosterError {
    fn from(err: crate::config::ConfigError) -> Self {
        RosterError::Config(err.to_string())
    }
}
