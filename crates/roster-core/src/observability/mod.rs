//! Observability for the roster core.
//!
//! # Privacy by Default
//!
//! Actor loops use `#[instrument(skip_all)]` with explicit fields. Display names
//! are never logged above `debug`; metric labels never carry attendee ids.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `roster_events_applied_total` | Counter | `event_type` | Events reconciled |
//! | `roster_events_dropped_total` | Counter | `event_type` | Benign races dropped |
//! | `roster_reconcile_latency_seconds` | Histogram | `event_type` | Time inside the serialized region |
//! | `roster_entries` | Gauge | none | Remote attendees |
//! | `roster_tiles_registered` | Gauge | none | Registered remote tiles |
//! | `roster_surface_failures_total` | Counter | `operation` | Render-layer rejections |
//! | `roster_actor_mailbox_depth` | Gauge | `actor_type` | Backpressure indicator |
//! | `roster_actor_panics_total` | Counter | `actor_type` | Actor panics |
//! | `roster_session_transitions_total` | Counter | `phase` | Lifecycle transitions |

pub mod metrics;

pub use metrics::{
    record_actor_panic, record_event_applied, record_event_dropped, record_reconcile_latency,
    record_session_transition, record_surface_failure, set_actor_mailbox_depth,
    set_roster_entries, set_tiles_registered,
};
