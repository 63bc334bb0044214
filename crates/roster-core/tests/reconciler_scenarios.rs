//! End-to-end reconciliation scenarios against the synchronous core.
//!
//! Drives `Reconciler` with fixture events and checks roster, tile registry,
//! render list and surface calls together.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use common::types::{AttendeeId, TileId};
use roster_core::config::{Config, MuteBatchPolicy};
use roster_core::events::{AttendeeInfo, RosterEvent};
use roster_core::projector::{self, LocalPreview, SignalIcon, TileVisual, VolumeIcon};
use roster_core::reconciler::{DepartureReason, Reconciler, RosterNotice};
use roster_core::roster::{SignalStrength, VolumeLevel};
use roster_test_utils::{events, RecordingSurfaceBinder, SurfaceCall, TestAttendee, TestTile};

const LOCAL_ID: &str = "local-attendee";

fn local_id() -> AttendeeId {
    AttendeeId::new(LOCAL_ID)
}

fn local() -> TestAttendee {
    TestAttendee::with_id(LOCAL_ID, "Me")
}

fn setup() -> (Reconciler, std::sync::Arc<RecordingSurfaceBinder>) {
    let binder = RecordingSurfaceBinder::new();
    let config = Config::default().with_local_attendee(LOCAL_ID);
    (Reconciler::new(&config, binder.clone()), binder)
}

// ============================================================================
// Join -> mute -> signal drop -> leave
// ============================================================================

#[test]
fn test_join_mute_signal_leave() {
    let (mut r, _) = setup();
    let alice = TestAttendee::with_id("a1", "Alice");

    r.apply(RosterEvent::AttendeesJoined {
        attendees: vec![AttendeeInfo::new("a1", "org#Alice")],
    });
    let snapshot = r.snapshot();
    let a1 = snapshot.entry(&alice.attendee_id).unwrap();
    assert_eq!(a1.display_name.text, "Alice");
    assert_eq!(a1.volume_level, VolumeLevel::NotSpeaking);
    assert_eq!(a1.signal_strength, SignalStrength::High);
    assert!(!a1.is_muted);

    r.apply(events::muted(&[&alice]));
    let snapshot = r.snapshot();
    assert_eq!(
        snapshot.entry(&alice.attendee_id).unwrap().volume_level,
        VolumeLevel::Muted
    );

    r.apply(events::signal(&alice, SignalStrength::Low));
    let snapshot = r.snapshot();
    assert_eq!(
        snapshot.entry(&alice.attendee_id).unwrap().signal_strength,
        SignalStrength::Low
    );

    let render = projector::project(&snapshot);
    assert_eq!(render[0].signal_icon, SignalIcon::Medium);
    assert_eq!(render[0].volume_icon, VolumeIcon::Muted);

    let applied = r.apply(events::left(&[&alice]));
    assert!(r.snapshot().entries.is_empty());
    assert_eq!(
        applied.notices,
        vec![RosterNotice::Departed {
            attendee_id: alice.attendee_id.clone(),
            display_name: "Alice".to_string(),
            reason: DepartureReason::Left,
        }]
    );
}

// ============================================================================
// Tile add -> pause -> remove
// ============================================================================

#[test]
fn test_tile_add_pause_remove_unbinds_once() {
    let (mut r, binder) = setup();
    let alice = TestAttendee::with_id("a1", "Alice");
    let tile = TestTile::remote(7, &alice);
    r.apply(events::joined(&[&alice]));

    r.apply(events::tile_added(tile.clone()));
    let snapshot = r.snapshot();
    assert!(snapshot.tile(TileId(7)).is_some());
    assert!(snapshot.entry(&alice.attendee_id).unwrap().tile_added());
    assert_eq!(
        projector::project(&snapshot)[0].tile_visual,
        TileVisual::Live {
            tile_id: TileId(7)
        }
    );

    r.apply(events::tile_paused(tile.clone()));
    let snapshot = r.snapshot();
    assert!(snapshot.entry(&alice.attendee_id).unwrap().tile_paused());
    assert!(snapshot.tile(TileId(7)).is_some());
    assert_eq!(
        projector::project(&snapshot)[0].tile_visual,
        TileVisual::PausedPoorConnection
    );

    r.apply(events::tile_removed(tile.clone()));
    let snapshot = r.snapshot();
    assert!(snapshot.tile(TileId(7)).is_none());
    assert!(snapshot.entry(&alice.attendee_id).unwrap().tile_removed());
    assert_eq!(
        projector::project(&snapshot)[0].tile_visual,
        TileVisual::VideoDisabled
    );
    binder.assert_unbound_once(TileId(7));

    // A duplicate removal is a benign race.
    r.apply(events::tile_removed(tile));
    binder.assert_unbound_once(TileId(7));
}

#[test]
fn test_unbind_failure_still_discards_descriptor() {
    let binder = RecordingSurfaceBinder::builder().fail_unbinds().build();
    let config = Config::default().with_local_attendee(LOCAL_ID);
    let mut r = Reconciler::new(&config, binder.clone());
    let alice = TestAttendee::new("Alice");
    let tile = TestTile::remote(3, &alice);

    r.apply(events::joined(&[&alice]));
    r.apply(events::tile_added(tile.clone()));
    r.apply(events::tile_removed(tile));

    assert!(r.snapshot().tiles.is_empty());
    binder.assert_unbound_once(TileId(3));
}

// ============================================================================
// Out-of-order delivery
// ============================================================================

#[test]
fn test_tile_arrives_before_join() {
    let (mut r, _) = setup();
    let bob = TestAttendee::new("Bob");

    r.apply(events::tile_added(TestTile::remote(4, &bob)));
    assert!(r.snapshot().entries.is_empty());

    r.apply(events::joined(&[&bob]));
    let render = projector::project(&r.snapshot());
    assert_eq!(
        render[0].tile_visual,
        TileVisual::Live {
            tile_id: TileId(4)
        }
    );
}

#[test]
fn test_events_for_absent_attendee_before_join_are_dropped() {
    let (mut r, _) = setup();
    let bob = TestAttendee::new("Bob");

    r.apply(events::muted(&[&bob]));
    r.apply(events::signal(&bob, SignalStrength::None));
    r.apply(events::joined(&[&bob]));

    let snapshot = r.snapshot();
    let entry = snapshot.entry(&bob.attendee_id).unwrap();
    assert!(!entry.is_muted);
    assert_eq!(entry.signal_strength, SignalStrength::High);
}

// ============================================================================
// Local attendee
// ============================================================================

#[test]
fn test_local_attendee_flow() {
    let (mut r, binder) = setup();
    let me = local();
    let alice = TestAttendee::new("Alice");

    r.apply(events::joined(&[&me, &alice]));
    r.apply(events::tile_added(TestTile::local(1, &local_id())));
    r.apply(events::volume(&me, VolumeLevel::High));
    r.apply(events::active_speakers(&[&me]));

    let snapshot = r.snapshot();
    assert_eq!(snapshot.entries.len(), 1);
    assert!(snapshot.entry(&local_id()).is_none());
    assert_eq!(
        binder.calls(),
        vec![SurfaceCall::Bind {
            tile_id: TileId(1),
            mirror: true
        }]
    );

    let local_render = projector::project_local(&snapshot.local);
    assert_eq!(
        local_render.preview,
        LocalPreview::Live {
            tile_id: TileId(1)
        }
    );
    assert!(!local_render.waiting_for_join);

    r.apply(events::tile_paused(TestTile::local(1, &local_id())));
    assert_eq!(
        projector::project_local(&r.snapshot().local).preview,
        LocalPreview::Reconnecting
    );

    r.apply(events::tile_removed(TestTile::local(1, &local_id())));
    assert_eq!(
        projector::project_local(&r.snapshot().local).preview,
        LocalPreview::Placeholder
    );
    binder.assert_unbound_once(TileId(1));
}

// ============================================================================
// Names and notices
// ============================================================================

#[test]
fn test_content_share_display_name() {
    let (mut r, _) = setup();
    let jane = TestAttendee::with_id("a9", "Jane Doe");
    let share = jane.content_share();

    r.apply(events::joined(&[&jane, &share]));
    let names: Vec<_> = projector::project(&r.snapshot())
        .into_iter()
        .map(|record| record.display_name)
        .collect();
    assert_eq!(
        names,
        vec![
            Some("Jane Doe".to_string()),
            Some("Jane Doe <<Content>>".to_string())
        ]
    );
}

#[test]
fn test_malformed_identity_gets_hidden_placeholder() {
    let (mut r, _) = setup();
    let ghost = TestAttendee::malformed("x1");

    let applied = r.apply(events::joined(&[&ghost]));
    assert_eq!(
        applied.notices,
        vec![RosterNotice::Joined {
            attendee_id: ghost.attendee_id.clone(),
            display_name: "Unknown".to_string(),
        }]
    );
    assert_eq!(projector::project(&r.snapshot())[0].display_name, None);

    let applied = r.apply(events::dropped(&[&ghost]));
    assert!(applied.notices.is_empty());
}

// ============================================================================
// Mute batch policy
// ============================================================================

#[test]
fn test_mute_batch_policies() {
    let alice = TestAttendee::new("Alice");
    let bob = TestAttendee::new("Bob");

    for (policy, bob_muted) in [(MuteBatchPolicy::FirstMatch, false), (MuteBatchPolicy::All, true)] {
        let config = Config::default()
            .with_local_attendee(LOCAL_ID)
            .with_mute_batch_policy(policy);
        let mut r = Reconciler::new(&config, RecordingSurfaceBinder::new());
        r.apply(events::joined(&[&alice, &bob]));
        r.apply(events::muted(&[&alice, &bob]));

        let snapshot = r.snapshot();
        assert!(snapshot.entry(&alice.attendee_id).unwrap().is_muted);
        assert_eq!(
            snapshot.entry(&bob.attendee_id).unwrap().is_muted,
            bob_muted,
            "policy {policy:?}"
        );
    }
}

#[test]
fn test_first_match_skips_local_before_stopping() {
    let (mut r, _) = setup();
    let me = local();
    let alice = TestAttendee::new("Alice");
    r.apply(events::joined(&[&alice]));

    // The local element is skipped, not counted as the first match.
    r.apply(events::muted(&[&me, &alice]));
    assert!(r.snapshot().entry(&alice.attendee_id).unwrap().is_muted);

    r.apply(events::unmuted(&[&alice]));
    let snapshot = r.snapshot();
    let entry = snapshot.entry(&alice.attendee_id).unwrap();
    assert!(!entry.is_muted);
    assert_eq!(entry.volume_level, VolumeLevel::NotSpeaking);
}
