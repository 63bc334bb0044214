//! Metrics definitions for the roster core.
//!
//! All metrics follow Prometheus naming conventions:
//! - `roster_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `event_type`: bounded by `RosterEvent` variants (14 values)
//! - `actor_type`: 2 values (reconciler, session)
//! - `operation`: 2 values (bind, unbind)
//! - `phase`: bounded by `SessionPhase` (6 values)
//!
//! Nothing here installs a recorder; with none installed every call is a no-op.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Record an event applied by the reconciler.
///
/// Metric: `roster_events_applied_total`
/// Labels: `event_type`
pub fn record_event_applied(event_type: &'static str) {
    counter!("roster_events_applied_total", "event_type" => event_type).increment(1);
}

/// Record a batch element dropped as a benign race (unknown attendee or tile).
///
/// Metric: `roster_events_dropped_total`
/// Labels: `event_type`
pub fn record_event_dropped(event_type: &'static str) {
    counter!("roster_events_dropped_total", "event_type" => event_type).increment(1);
}

/// Record time spent applying one event inside the serialized region.
///
/// Metric: `roster_reconcile_latency_seconds`
/// Labels: `event_type`
pub fn record_reconcile_latency(event_type: &'static str, duration: Duration) {
    histogram!("roster_reconcile_latency_seconds", "event_type" => event_type)
        .record(duration.as_secs_f64());
}

/// Set the number of remote attendees in the roster.
///
/// Metric: `roster_entries`
pub fn set_roster_entries(count: usize) {
    // usize to f64 conversion is safe for realistic roster sizes
    #[allow(clippy::cast_precision_loss)]
    gauge!("roster_entries").set(count as f64);
}

/// Set the number of registered remote tiles.
///
/// Metric: `roster_tiles_registered`
pub fn set_tiles_registered(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("roster_tiles_registered").set(count as f64);
}

/// Record a render-layer rejection of a bind or unbind.
///
/// Metric: `roster_surface_failures_total`
/// Labels: `operation` (bind, unbind)
pub fn record_surface_failure(operation: &'static str) {
    counter!("roster_surface_failures_total", "operation" => operation).increment(1);
}

// ============================================================================
// Actor Metrics
// ============================================================================

/// Set the mailbox depth for an actor type.
///
/// Metric: `roster_actor_mailbox_depth`
/// Labels: `actor_type`
pub fn set_actor_mailbox_depth(actor_type: &'static str, depth: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("roster_actor_mailbox_depth", "actor_type" => actor_type).set(depth as f64);
}

/// Record an actor panic event.
///
/// Metric: `roster_actor_panics_total`
/// Labels: `actor_type`
///
/// ALERT: Any non-zero value indicates a bug.
pub fn record_actor_panic(actor_type: &'static str) {
    counter!("roster_actor_panics_total", "actor_type" => actor_type).increment(1);
}

// ============================================================================
// Session Lifecycle Metrics
// ============================================================================

/// Record a session phase transition.
///
/// Metric: `roster_session_transitions_total`
/// Labels: `phase`
pub fn record_session_transition(phase: &'static str) {
    counter!("roster_session_transitions_total", "phase" => phase).increment(1);
}
