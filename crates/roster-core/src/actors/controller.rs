//! `SessionController` - supervisor for one session's actors.
//!
//! - Owns the root `CancellationToken`; children get child tokens
//! - Spawns the `ReconcilerActor` and the `SessionActor`
//! - Watches the reconciler task (panic detection via `JoinHandle`)
//! - Publishes the session outcome on a `watch` channel
//!
//! Loss of the reconciler is the only fatal condition. When its task exits
//! without cancellation, the lifecycle is driven to
//! `Ended(ReconcilerLost)` and the outcome flips to `Ended`; the embedding
//! application then calls [`SessionController::shutdown`].

use crate::config::Config;
use crate::errors::RosterError;
use crate::events::{RosterEvent, SessionEvent};
use crate::lifecycle::{EndReason, SessionPhase, SessionStatus};
use crate::surface::SurfaceBinder;

use super::metrics::{ActorMetrics, ActorType};
use super::reconciler::ReconcilerActorHandle;
use super::session::SessionActorHandle;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Per-child wait during shutdown.
const CHILD_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// What the embedding application should do with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum SessionOutcome {
    Running,
    /// Tear down and show "session ended".
    Ended(EndReason),
}

/// Front door for one session.
#[derive(Debug)]
pub struct SessionController {
    session_id: String,
    started_at: DateTime<Utc>,
    reconciler: ReconcilerActorHandle,
    session: SessionActorHandle,
    outcome: watch::Receiver<SessionOutcome>,
    metrics: Arc<ActorMetrics>,
    cancel_token: CancellationToken,
    supervisor: JoinHandle<()>,
}

impl SessionController {
    /// Spawn the reconciler, the session actor and their supervisor.
    #[must_use]
    pub fn spawn(
        session_id: impl Into<String>,
        config: &Config,
        binder: Arc<dyn SurfaceBinder>,
    ) -> Self {
        let session_id = session_id.into();
        let cancel_token = CancellationToken::new();
        let metrics = ActorMetrics::new();

        let (reconciler, reconciler_task) = ReconcilerActorHandle::spawn(
            &session_id,
            config,
            binder,
            Arc::clone(&metrics),
            cancel_token.child_token(),
        );
        let (session, session_task) =
            SessionActorHandle::spawn(&session_id, cancel_token.child_token());
        let (outcome_tx, outcome) = watch::channel(SessionOutcome::Running);

        let supervisor = Supervisor {
            session_id: session_id.clone(),
            reconciler_task,
            session_task,
            session: session.clone(),
            status: session.subscribe(),
            outcome: outcome_tx,
            metrics: Arc::clone(&metrics),
            cancel_token: cancel_token.clone(),
        };
        let supervisor = tokio::spawn(supervisor.run());

        Self {
            session_id,
            started_at: Utc::now(),
            reconciler,
            session,
            outcome,
            metrics,
            cancel_token,
            supervisor,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn reconciler(&self) -> &ReconcilerActorHandle {
        &self.reconciler
    }

    #[must_use]
    pub fn session(&self) -> &SessionActorHandle {
        &self.session
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<ActorMetrics> {
        &self.metrics
    }

    pub async fn apply(&self, event: RosterEvent) -> Result<(), RosterError> {
        self.reconciler.apply(event).await
    }

    pub async fn apply_session(&self, event: SessionEvent) -> Result<(), RosterError> {
        self.session.apply(event).await
    }

    pub async fn status(&self) -> Result<SessionStatus, RosterError> {
        self.session.status().await
    }

    #[must_use]
    pub fn outcome(&self) -> watch::Receiver<SessionOutcome> {
        self.outcome.clone()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Cancel every actor and wait for the supervisor to finish.
    pub async fn shutdown(self, deadline: Duration) -> Result<(), RosterError> {
        info!(
            target: "roster.actor.controller",
            session_id = %self.session_id,
            "Initiating shutdown"
        );
        self.cancel_token.cancel();

        match tokio::time::timeout(deadline, self.supervisor).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(RosterError::Internal(format!("supervisor task failed: {e}"))),
            Err(_) => Err(RosterError::Internal("shutdown timed out".to_string())),
        }
    }
}

struct Supervisor {
    session_id: String,
    reconciler_task: JoinHandle<()>,
    session_task: JoinHandle<()>,
    session: SessionActorHandle,
    status: watch::Receiver<SessionStatus>,
    outcome: watch::Sender<SessionOutcome>,
    metrics: Arc<ActorMetrics>,
    cancel_token: CancellationToken,
}

impl Supervisor {
    #[instrument(skip_all, name = "roster.actor.controller", fields(session_id = %self.session_id))]
    async fn run(mut self) {
        info!(
            target: "roster.actor.controller",
            session_id = %self.session_id,
            "SessionController started"
        );

        let mut reconciler_done = false;
        let mut session_done = false;

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    debug!(
                        target: "roster.actor.controller",
                        session_id = %self.session_id,
                        "SessionController received cancellation signal"
                    );
                    break;
                }

                result = &mut self.reconciler_task, if !reconciler_done => {
                    reconciler_done = true;
                    self.reconciler_exited(result).await;
                }

                changed = self.status.changed(), if !session_done => {
                    if changed.is_err() {
                        session_done = true;
                        warn!(
                            target: "roster.actor.controller",
                            session_id = %self.session_id,
                            "SessionActor exited unexpectedly"
                        );
                        continue;
                    }
                    let phase = self.status.borrow_and_update().phase;
                    if let SessionPhase::Ended(reason) = phase {
                        self.publish_end(reason);
                    }
                }
            }
        }

        self.graceful_shutdown(reconciler_done).await;
    }

    async fn reconciler_exited(&mut self, result: Result<(), tokio::task::JoinError>) {
        if self.cancel_token.is_cancelled() {
            return;
        }

        match result {
            Ok(()) => warn!(
                target: "roster.actor.controller",
                session_id = %self.session_id,
                "ReconcilerActor exited unexpectedly"
            ),
            Err(join_error) => {
                if join_error.is_panic() {
                    error!(
                        target: "roster.actor.controller",
                        session_id = %self.session_id,
                        error = ?join_error,
                        "ReconcilerActor panicked - ending session"
                    );
                    self.metrics.record_panic(ActorType::Reconciler);
                }
            }
        }

        if let Err(e) = self.session.reconciler_lost().await {
            warn!(
                target: "roster.actor.controller",
                session_id = %self.session_id,
                error = %e,
                "Could not notify SessionActor"
            );
        }
        self.publish_end(EndReason::ReconcilerLost);
    }

    /// First end reason wins.
    fn publish_end(&self, reason: EndReason) {
        let published = self.outcome.send_if_modified(|outcome| {
            if *outcome == SessionOutcome::Running {
                *outcome = SessionOutcome::Ended(reason);
                true
            } else {
                false
            }
        });
        if published {
            info!(
                target: "roster.actor.controller",
                session_id = %self.session_id,
                reason = ?reason,
                "Session ended"
            );
        }
    }

    async fn graceful_shutdown(self, reconciler_done: bool) {
        let Supervisor {
            session_id,
            reconciler_task,
            session_task,
            metrics,
            ..
        } = self;

        let mut children = vec![(ActorType::Session, session_task)];
        if !reconciler_done {
            children.push((ActorType::Reconciler, reconciler_task));
        }

        for (actor_type, task) in children {
            match tokio::time::timeout(CHILD_SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(())) => debug!(
                    target: "roster.actor.controller",
                    session_id = %session_id,
                    actor_type = actor_type.as_str(),
                    "Actor completed cleanly"
                ),
                Ok(Err(e)) => {
                    if e.is_panic() {
                        metrics.record_panic(actor_type);
                    }
                    warn!(
                        target: "roster.actor.controller",
                        session_id = %session_id,
                        actor_type = actor_type.as_str(),
                        error = ?e,
                        "Actor task failed during shutdown"
                    );
                }
                Err(_) => warn!(
                    target: "roster.actor.controller",
                    session_id = %session_id,
                    actor_type = actor_type.as_str(),
                    "Actor shutdown timed out"
                ),
            }
        }

        info!(
            target: "roster.actor.controller",
            session_id = %session_id,
            "SessionController stopped"
        );
    }
}
