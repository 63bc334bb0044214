//! Session lifecycle tracker.
//!
//! A small state machine over the audio session's connection phases. It holds
//! no roster data and is the only component that produces user-visible status
//! text. Video notifications are advisory and never move the phase.

use crate::events::{SessionEvent, SessionStatusCode};
use crate::observability::metrics;
use serde::Serialize;

const MSG_CONNECTING: &str = "Connecting...";
const MSG_RECONNECTING: &str = "Reconnecting...";
const MSG_POOR_CONNECTION: &str = "Poor connection. Video may be paused.";
const MSG_DROPPED: &str = "Connection lost. Trying to reconnect...";
const MSG_ENDED: &str = "Session ended";
const MSG_VIEW_ONLY: &str = "Video is at capacity. You can watch but not share video.";

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "status", rename_all = "snake_case")]
pub enum EndReason {
    /// The engine stopped the audio session.
    Stopped(SessionStatusCode),
    /// The reconciler stopped servicing events.
    ReconcilerLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", content = "end", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Connecting,
    Started,
    Reconnecting,
    PoorConnection,
    Dropped,
    Ended(EndReason),
}

impl SessionPhase {
    /// Returns the phase as a string for metric labels and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Connecting => "connecting",
            SessionPhase::Started => "started",
            SessionPhase::Reconnecting => "reconnecting",
            SessionPhase::PoorConnection => "poor_connection",
            SessionPhase::Dropped => "dropped",
            SessionPhase::Ended(_) => "ended",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Ended(_))
    }

    const fn message(&self) -> Option<&'static str> {
        match self {
            SessionPhase::Connecting => Some(MSG_CONNECTING),
            SessionPhase::Started => None,
            SessionPhase::Reconnecting => Some(MSG_RECONNECTING),
            SessionPhase::PoorConnection => Some(MSG_POOR_CONNECTION),
            SessionPhase::Dropped => Some(MSG_DROPPED),
            SessionPhase::Ended(_) => Some(MSG_ENDED),
        }
    }
}

/// Last video session notification seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "video", content = "status", rename_all = "snake_case")]
pub enum VideoStatus {
    #[default]
    Idle,
    Connecting,
    Started(SessionStatusCode),
    Stopped(SessionStatusCode),
}

/// What the status line should show.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub video: VideoStatus,
    /// `None` hides the status line.
    pub message: Option<&'static str>,
}

#[derive(Debug, Default)]
pub struct LifecycleTracker {
    phase: SessionPhase,
    video: VideoStatus,
}

impl LifecycleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let view_only = matches!(
            self.video,
            VideoStatus::Started(SessionStatusCode::VideoAtCapacityViewOnly)
        );
        let message = match self.phase {
            SessionPhase::Started if view_only => Some(MSG_VIEW_ONLY),
            phase => phase.message(),
        };
        SessionStatus {
            phase: self.phase,
            video: self.video,
            message,
        }
    }

    /// Apply one session event. Returns whether the visible status changed.
    ///
    /// Once `Ended`, every event is ignored.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        if self.phase.is_terminal() {
            return false;
        }

        let next = match event {
            SessionEvent::AudioSessionStartedConnecting { reconnecting: true } => {
                SessionPhase::Reconnecting
            }
            SessionEvent::AudioSessionStartedConnecting { reconnecting: false } => {
                SessionPhase::Connecting
            }
            SessionEvent::AudioSessionStarted { .. } => SessionPhase::Started,
            SessionEvent::AudioSessionDropped | SessionEvent::AudioSessionCancelledReconnect => {
                SessionPhase::Dropped
            }
            SessionEvent::AudioSessionStopped { status } => {
                SessionPhase::Ended(EndReason::Stopped(status))
            }
            SessionEvent::ConnectionBecamePoor if self.phase == SessionPhase::Started => {
                SessionPhase::PoorConnection
            }
            SessionEvent::ConnectionRecovered if self.phase == SessionPhase::PoorConnection => {
                SessionPhase::Started
            }
            SessionEvent::ConnectionBecamePoor | SessionEvent::ConnectionRecovered => self.phase,
            SessionEvent::VideoSessionStartedConnecting => {
                return self.set_video(VideoStatus::Connecting);
            }
            SessionEvent::VideoSessionStarted { status } => {
                return self.set_video(VideoStatus::Started(status));
            }
            SessionEvent::VideoSessionStopped { status } => {
                return self.set_video(VideoStatus::Stopped(status));
            }
        };

        self.transition(next)
    }

    /// Terminal transition when the reconciler is gone.
    pub fn reconciler_lost(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.transition(SessionPhase::Ended(EndReason::ReconcilerLost))
    }

    fn transition(&mut self, next: SessionPhase) -> bool {
        if next == self.phase {
            return false;
        }
        self.phase = next;
        metrics::record_session_transition(next.as_str());
        true
    }

    fn set_video(&mut self, video: VideoStatus) -> bool {
        if self.video == video {
            return false;
        }
        self.video = video;
        true
    }
}
