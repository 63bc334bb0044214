//! `ReconcilerActor` - the single serialization point for roster state.
//!
//! Owns the [`Reconciler`] (roster, tile registry, local tile). Every event
//! and every snapshot request goes through one FIFO mailbox, so readers never
//! observe a partially applied event.
//!
//! Outbound:
//! - a `watch` channel carrying the roster version (re-pull signal, no data)
//! - a `broadcast` channel carrying join/departure notices
//!
//! On exit, including a panic, queued events are dropped, the mailbox depth is
//! cleared and every bound surface is released.

use crate::config::Config;
use crate::errors::RosterError;
use crate::events::RosterEvent;
use crate::observability::metrics;
use crate::projector::{self, LocalRenderRecord, RenderRecord};
use crate::reconciler::{Reconciler, RosterNotice, RosterSnapshot};
use crate::surface::SurfaceBinder;

use super::messages::ReconcilerMessage;
use super::metrics::{ActorMetrics, ActorType, MailboxMonitor};

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Handle to a `ReconcilerActor`.
#[derive(Clone, Debug)]
pub struct ReconcilerActorHandle {
    sender: mpsc::Sender<ReconcilerMessage>,
    changes: watch::Receiver<u64>,
    notices: broadcast::Sender<RosterNotice>,
    mailbox: Arc<MailboxMonitor>,
    cancel_token: CancellationToken,
}

impl ReconcilerActorHandle {
    /// Spawn the actor. The `JoinHandle` goes to whoever supervises it.
    #[must_use]
    pub fn spawn(
        session_id: &str,
        config: &Config,
        binder: Arc<dyn SurfaceBinder>,
        metrics: Arc<ActorMetrics>,
        cancel_token: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.mailbox_capacity);
        let (changes_tx, changes) = watch::channel(0);
        let (notices, _) = broadcast::channel(config.notice_capacity);
        let mailbox = MailboxMonitor::new(ActorType::Reconciler, session_id);

        let actor = ReconcilerActor {
            session_id: session_id.to_string(),
            reconciler: Reconciler::new(config, binder),
            receiver,
            changes: changes_tx,
            notices: notices.clone(),
            mailbox: Arc::clone(&mailbox),
            metrics,
            cancel_token: cancel_token.clone(),
        };
        let task = tokio::spawn(actor.run());

        (
            Self {
                sender,
                changes,
                notices,
                mailbox,
                cancel_token,
            },
            task,
        )
    }

    /// Queue one event. Returns once it is in the mailbox, not once applied.
    ///
    /// Waits for mailbox space when the mailbox is full.
    pub async fn apply(&self, event: RosterEvent) -> Result<(), RosterError> {
        self.send(ReconcilerMessage::Apply { event }).await
    }

    /// State after every event queued before this call.
    pub async fn snapshot(&self) -> Result<RosterSnapshot, RosterError> {
        let (tx, rx) = oneshot::channel();
        self.send(ReconcilerMessage::GetSnapshot { respond_to: tx })
            .await?;

        rx.await
            .map_err(|e| RosterError::ReconcilerUnavailable(format!("response receive failed: {e}")))
    }

    /// Render records for remote attendees, in join order.
    pub async fn render_list(&self) -> Result<Vec<RenderRecord>, RosterError> {
        Ok(projector::project(&self.snapshot().await?))
    }

    pub async fn local_render(&self) -> Result<LocalRenderRecord, RosterError> {
        Ok(projector::project_local(&self.snapshot().await?.local))
    }

    /// Version channel; a change means "pull a new render list".
    #[must_use]
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.changes.clone()
    }

    /// Join and departure notices. Slow receivers observe `Lagged`.
    #[must_use]
    pub fn subscribe_notices(&self) -> broadcast::Receiver<RosterNotice> {
        self.notices.subscribe()
    }

    #[must_use]
    pub fn mailbox_depth(&self) -> usize {
        self.mailbox.current_depth()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn send(&self, message: ReconcilerMessage) -> Result<(), RosterError> {
        self.mailbox.record_enqueue();
        self.sender.send(message).await.map_err(|e| {
            self.mailbox.record_send_failed();
            RosterError::ReconcilerUnavailable(format!("channel send failed: {e}"))
        })
    }
}

/// The `ReconcilerActor` implementation.
struct ReconcilerActor {
    session_id: String,
    reconciler: Reconciler,
    receiver: mpsc::Receiver<ReconcilerMessage>,
    changes: watch::Sender<u64>,
    notices: broadcast::Sender<RosterNotice>,
    mailbox: Arc<MailboxMonitor>,
    metrics: Arc<ActorMetrics>,
    cancel_token: CancellationToken,
}

// Runs on normal exit and when the task is torn down by a panic.
impl Drop for ReconcilerActor {
    fn drop(&mut self) {
        self.reconciler.release_surfaces();
        self.mailbox.clear();
    }
}

impl ReconcilerActor {
    #[instrument(skip_all, name = "roster.actor.reconciler", fields(session_id = %self.session_id))]
    async fn run(mut self) {
        info!(
            target: "roster.actor.reconciler",
            session_id = %self.session_id,
            "ReconcilerActor started"
        );

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "roster.actor.reconciler",
                        session_id = %self.session_id,
                        dropped = self.receiver.len(),
                        "ReconcilerActor received cancellation signal"
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
                                target: "roster.actor.reconciler",
                                session_id = %self.session_id,
                                "ReconcilerActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "roster.actor.reconciler",
            session_id = %self.session_id,
            version = self.reconciler.version(),
            messages_processed = self.mailbox.messages_processed(),
            "ReconcilerActor stopped"
        );
    }

    fn handle_message(&mut self, message: ReconcilerMessage) {
        match message {
            ReconcilerMessage::Apply { event } => self.apply(event),
            ReconcilerMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.reconciler.snapshot());
            }
        }
    }

    fn apply(&mut self, event: RosterEvent) {
        let kind = event.kind();
        let start = Instant::now();
        let applied = self.reconciler.apply(event);
        metrics::record_reconcile_latency(kind, start.elapsed());
        self.metrics.record_event_applied();

        if applied.changed {
            let version = self.reconciler.version();
            self.changes.send_replace(version);
            debug!(
                target: "roster.actor.reconciler",
                session_id = %self.session_id,
                event_type = kind,
                version,
                "roster changed"
            );
        }
        for notice in applied.notices {
            // No subscribers is fine.
            let _ = self.notices.send(notice);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::events::{AttendeeInfo, VideoTileState};
    use crate::projector::TileVisual;
    use crate::roster::PauseState;
    use crate::surface::LoggingSurfaceBinder;
    use common::types::{AttendeeId, TileId};
    use std::time::Duration;

    fn spawn() -> (ReconcilerActorHandle, JoinHandle<()>) {
        ReconcilerActorHandle::spawn(
            "session-test",
            &Config::default().with_local_attendee("me"),
            Arc::new(LoggingSurfaceBinder),
            ActorMetrics::new(),
            CancellationToken::new(),
        )
    }

    fn join(id: &str, name: &str) -> RosterEvent {
        RosterEvent::AttendeesJoined {
            attendees: vec![AttendeeInfo::new(id, format!("org#{name}"))],
        }
    }

    #[tokio::test]
    async fn test_apply_then_snapshot_sees_event() {
        let (handle, _task) = spawn();
        handle.apply(join("a1", "Alice")).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.version, 1);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_render_list_projects_snapshot() {
        let (handle, _task) = spawn();
        handle.apply(join("a1", "Alice")).await.unwrap();
        handle
            .apply(RosterEvent::VideoTileAdded {
                tile: VideoTileState {
                    tile_id: TileId(7),
                    attendee_id: AttendeeId::new("a1"),
                    is_local_tile: false,
                    is_content: false,
                    pause_state: PauseState::Unpaused,
                    width: 0,
                    height: 0,
                },
            })
            .await
            .unwrap();

        let records = handle.render_list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records.first().unwrap().display_name.as_deref(), Some("Alice"));
        assert_eq!(
            records.first().unwrap().tile_visual,
            TileVisual::Live {
                tile_id: TileId(7)
            }
        );

        handle.cancel();
    }

    #[tokio::test]
    async fn test_change_signal_carries_version() {
        let (handle, _task) = spawn();
        let mut changes = handle.subscribe_changes();
        assert_eq!(*changes.borrow(), 0);

        handle.apply(join("a1", "Alice")).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), changes.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_notices_broadcast() {
        let (handle, _task) = spawn();
        let mut notices = handle.subscribe_notices();

        handle.apply(join("a1", "Alice")).await.unwrap();
        let notice = tokio::time::timeout(Duration::from_secs(1), notices.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            notice,
            RosterNotice::Joined {
                attendee_id: AttendeeId::new("a1"),
                display_name: "Alice".to_string(),
            }
        );

        handle.cancel();
    }

    #[tokio::test]
    async fn test_calls_fail_after_cancel() {
        let (handle, task) = spawn();
        handle.cancel();
        task.await.unwrap();

        assert!(handle.is_cancelled());
        let result = handle.snapshot().await;
        assert!(matches!(result, Err(RosterError::ReconcilerUnavailable(_))));
        let result = handle.apply(join("a1", "Alice")).await;
        assert!(matches!(result, Err(RosterError::ReconcilerUnavailable(_))));
    }

    #[tokio::test]
    async fn test_mailbox_depth_cleared_when_queue_dropped() {
        let (handle, task) = spawn();
        for i in 0..5 {
            handle.apply(join(&format!("a{i}"), "x")).await.unwrap();
        }
        handle.cancel();
        task.await.unwrap();

        assert_eq!(handle.mailbox_depth(), 0);
    }

    #[tokio::test]
    async fn test_mailbox_depth_returns_to_zero() {
        let (handle, _task) = spawn();
        for i in 0..20 {
            handle.apply(join(&format!("a{i}"), "x")).await.unwrap();
        }
        handle.snapshot().await.unwrap();
        assert_eq!(handle.mailbox_depth(), 0);

        handle.cancel();
    }
}
