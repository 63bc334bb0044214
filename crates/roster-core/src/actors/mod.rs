//! Actor model for one session.
//!
//! ```text
//! SessionController (supervisor, owns the root CancellationToken)
//! ├── ReconcilerActor (owns roster, tile registry, local tile)
//! └── SessionActor (owns the lifecycle tracker)
//! ```
//!
//! # Key Design Decisions
//!
//! - **Single serialization point**: every roster event and every snapshot
//!   request goes through the reconciler's one mailbox, in arrival order
//! - **CancellationToken propagation**: children get child tokens; cancellation
//!   drops queued events
//! - **Mailbox monitoring**: depth thresholds with metrics (Reconciler: 100/400)
//! - **Reconciler loss is fatal**: the supervisor ends the session
//!
//! # Modules
//!
//! - [`controller`] - `SessionController` supervisor
//! - [`reconciler`] - `ReconcilerActor` and its handle
//! - [`session`] - `SessionActor` and its handle
//! - [`messages`] - Message types for actor communication
//! - [`metrics`] - Mailbox monitoring and actor metrics

pub mod controller;
pub mod messages;
pub mod metrics;
pub mod reconciler;
pub mod session;

pub use controller::{SessionController, SessionOutcome};
pub use messages::*;
pub use metrics::{ActorMetrics, ActorType, MailboxLevel, MailboxMonitor};
pub use reconciler::ReconcilerActorHandle;
pub use session::SessionActorHandle;
