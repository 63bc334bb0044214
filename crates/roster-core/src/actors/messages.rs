//! Message types for actor communication.
//!
//! Requests use `tokio::sync::mpsc`; replies come back on a
//! `tokio::sync::oneshot` carried in the message.

use crate::events::{RosterEvent, SessionEvent};
use crate::lifecycle::SessionStatus;
use crate::reconciler::RosterSnapshot;
use tokio::sync::oneshot;

/// Messages sent to the `ReconcilerActor`.
#[derive(Debug)]
pub enum ReconcilerMessage {
    /// Apply one roster event. Fire-and-forget; ordering is the mailbox order.
    Apply { event: RosterEvent },

    /// Copy of the state after every previously queued event.
    GetSnapshot {
        respond_to: oneshot::Sender<RosterSnapshot>,
    },
}

/// Messages sent to the `SessionActor`.
#[derive(Debug)]
pub enum SessionMessage {
    Apply { event: SessionEvent },

    /// The reconciler stopped servicing events. Sent by the supervisor.
    ReconcilerLost,

    GetStatus {
        respond_to: oneshot::Sender<SessionStatus>,
    },
}
