//! Roster reconciliation core for an audio/video session client.
//!
//! The real-time engine delivers attendee, audio and video-tile notifications
//! concurrently and out of order. This library keeps one consistent view of
//! who is present and what each attendee's tile should show:
//!
//! - Roster of remote attendees, keyed by attendee id, in join order
//! - Tile registry correlating render surfaces with attendees
//! - A single-slot local tile for the local attendee
//! - A session lifecycle tracker producing the user-visible status line
//!
//! # Architecture
//!
//! ```text
//! engine events ─▶ ReconcilerActor ─▶ RosterSnapshot ─▶ projector ─▶ render list
//!                     │ watch(version), broadcast(notices)
//! session events ─▶ SessionActor ─▶ watch(SessionStatus)
//!                     └─ both supervised by SessionController
//! ```
//!
//! # Modules
//!
//! - [`actors`] - Actor model: reconciler, session, supervisor
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error types
//! - [`events`] - Inbound event contract
//! - [`lifecycle`] - Session phase state machine
//! - [`observability`] - Metrics
//! - [`projector`] - Snapshot to render records
//! - [`reconciler`] - Event application (single-threaded core)
//! - [`replay`] - JSON-lines event replay
//! - [`roster`] - Data model
//! - [`surface`] - Render-surface binding seam

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actors;
pub mod config;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod observability;
pub mod projector;
pub mod reconciler;
pub mod replay;
pub mod roster;
pub mod surface;
