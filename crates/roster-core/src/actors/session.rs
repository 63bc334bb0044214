//! `SessionActor` - runs the [`LifecycleTracker`] off the reconciler's path.
//!
//! Status changes are published on a `watch` channel so the status line can
//! follow the latest phase without polling.

use crate::errors::RosterError;
use crate::events::SessionEvent;
use crate::lifecycle::{LifecycleTracker, SessionStatus};

use super::messages::SessionMessage;
use super::metrics::{ActorType, MailboxMonitor};

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

const SESSION_CHANNEL_BUFFER: usize = 64;

/// Handle to a `SessionActor`.
#[derive(Clone, Debug)]
pub struct SessionActorHandle {
    sender: mpsc::Sender<SessionMessage>,
    status: watch::Receiver<SessionStatus>,
    mailbox: Arc<MailboxMonitor>,
    cancel_token: CancellationToken,
}

impl SessionActorHandle {
    #[must_use]
    pub fn spawn(session_id: &str, cancel_token: CancellationToken) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_BUFFER);
        let tracker = LifecycleTracker::new();
        let (status_tx, status) = watch::channel(tracker.status());
        let mailbox = MailboxMonitor::new(ActorType::Session, session_id);

        let actor = SessionActor {
            session_id: session_id.to_string(),
            tracker,
            receiver,
            status: status_tx,
            mailbox: Arc::clone(&mailbox),
            cancel_token: cancel_token.clone(),
        };
        let task = tokio::spawn(actor.run());

        (
            Self {
                sender,
                status,
                mailbox,
                cancel_token,
            },
            task,
        )
    }

    pub async fn apply(&self, event: SessionEvent) -> Result<(), RosterError> {
        self.send(SessionMessage::Apply { event }).await
    }

    /// Status after every event queued before this call.
    pub async fn status(&self) -> Result<SessionStatus, RosterError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::GetStatus { respond_to: tx })
            .await?;

        rx.await
            .map_err(|e| RosterError::LifecycleUnavailable(format!("response receive failed: {e}")))
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub(crate) async fn reconciler_lost(&self) -> Result<(), RosterError> {
        self.send(SessionMessage::ReconcilerLost).await
    }

    async fn send(&self, message: SessionMessage) -> Result<(), RosterError> {
        self.mailbox.record_enqueue();
        self.sender.send(message).await.map_err(|e| {
            self.mailbox.record_send_failed();
            RosterError::LifecycleUnavailable(format!("channel send failed: {e}"))
        })
    }
}

struct SessionActor {
    session_id: String,
    tracker: LifecycleTracker,
    receiver: mpsc::Receiver<SessionMessage>,
    status: watch::Sender<SessionStatus>,
    mailbox: Arc<MailboxMonitor>,
    cancel_token: CancellationToken,
}

impl SessionActor {
    #[instrument(skip_all, name = "roster.actor.session", fields(session_id = %self.session_id))]
    async fn run(mut self) {
        info!(
            target: "roster.actor.session",
            session_id = %self.session_id,
            "SessionActor started"
        );

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "roster.actor.session",
                        session_id = %self.session_id,
                        "SessionActor received cancellation signal"
                    );
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.mailbox.record_dequeue();
                            self.handle_message(message);
                        }
                        None => {
                            info!(
                                target: "roster.actor.session",
                                session_id = %self.session_id,
                                "SessionActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "roster.actor.session",
            session_id = %self.session_id,
            phase = self.tracker.phase().as_str(),
            "SessionActor stopped"
        );
    }

    fn handle_message(&mut self, message: SessionMessage) {
        let changed = match message {
            SessionMessage::Apply { event } => self.tracker.apply(event),
            SessionMessage::ReconcilerLost => self.tracker.reconciler_lost(),
            SessionMessage::GetStatus { respond_to } => {
                let _ = respond_to.send(self.tracker.status());
                false
            }
        };

        if changed {
            let status = self.tracker.status();
            info!(
                target: "roster.actor.session",
                session_id = %self.session_id,
                phase = status.phase.as_str(),
                video = ?status.video,
                "session status changed"
            );
            self.status.send_replace(status);
        }
    }
}
