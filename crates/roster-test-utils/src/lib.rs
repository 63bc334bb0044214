//! # Roster Test Utilities
//!
//! Shared test utilities for the roster reconciliation core.
//!
//! ## Modules
//!
//! - `fixtures` - Attendee and tile builders, event constructors, replay scripts
//! - `mock_surface` - Recording `SurfaceBinder` with failure injection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_test_utils::*;
//!
//! let alice = TestAttendee::new("Alice");
//! let binder = RecordingSurfaceBinder::new();
//! let mut reconciler = Reconciler::new(&config, binder.clone());
//!
//! reconciler.apply(events::joined(&[&alice]));
//! reconciler.apply(events::tile_added(TestTile::remote(7, &alice)));
//! reconciler.apply(events::tile_removed(TestTile::remote(7, &alice)));
//!
//! assert_eq!(binder.unbind_count(TileId(7)), 1);
//! ```
//!
//! Only usable from `tests/` in `roster-core`: unit tests inside the library
//! would see a second copy of its types.

pub mod fixtures;
pub mod mock_surface;

pub use fixtures::*;
pub use mock_surface::{RecordingSurfaceBinder, SurfaceCall};
