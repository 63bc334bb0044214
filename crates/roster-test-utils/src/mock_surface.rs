//! Recording surface binder for roster testing.
//!
//! Records every bind/unbind in call order and can be configured to reject
//! either operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_test_utils::RecordingSurfaceBinder;
//!
//! let binder = RecordingSurfaceBinder::builder().fail_unbinds().build();
//! let reconciler = Reconciler::new(&config, binder.clone());
//! ```

use common::types::TileId;
use roster_core::errors::SurfaceError;
use roster_core::surface::{BindOptions, SurfaceBinder};
use std::sync::{Arc, Mutex};

/// One recorded binder call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCall {
    Bind { tile_id: TileId, mirror: bool },
    Unbind { tile_id: TileId },
}

#[derive(Debug, Default)]
pub struct RecordingSurfaceBinder {
    calls: Mutex<Vec<SurfaceCall>>,
    fail_binds: bool,
    fail_unbinds: bool,
}

impl RecordingSurfaceBinder {
    /// Binder that accepts everything.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn builder() -> RecordingSurfaceBinderBuilder {
        RecordingSurfaceBinderBuilder::default()
    }

    /// All calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn bind_count(&self, tile_id: TileId) -> usize {
        self.count(|call| matches!(call, SurfaceCall::Bind { tile_id: t, .. } if *t == tile_id))
    }

    #[must_use]
    pub fn unbind_count(&self, tile_id: TileId) -> usize {
        self.count(|call| matches!(call, SurfaceCall::Unbind { tile_id: t } if *t == tile_id))
    }

    /// Tiles bound and not since unbound, sorted.
    #[must_use]
    pub fn bound_tiles(&self) -> Vec<TileId> {
        let mut bound = Vec::new();
        for call in self.calls() {
            match call {
                SurfaceCall::Bind { tile_id, .. } => {
                    if !bound.contains(&tile_id) {
                        bound.push(tile_id);
                    }
                }
                SurfaceCall::Unbind { tile_id } => bound.retain(|t| *t != tile_id),
            }
        }
        bound.sort();
        bound
    }

    /// Panics unless `tile_id` was unbound exactly once.
    pub fn assert_unbound_once(&self, tile_id: TileId) {
        let count = self.unbind_count(tile_id);
        assert_eq!(count, 1, "tile {tile_id} unbound {count} times, expected 1");
    }

    fn count(&self, predicate: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SurfaceBinder for RecordingSurfaceBinder {
    fn bind(&self, tile_id: TileId, options: BindOptions) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Bind {
            tile_id,
            mirror: options.mirror,
        });
        if self.fail_binds {
            return Err(SurfaceError::NoSurface(tile_id));
        }
        Ok(())
    }

    fn unbind(&self, tile_id: TileId) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Unbind { tile_id });
        if self.fail_unbinds {
            return Err(SurfaceError::Rejected {
                tile_id,
                reason: "mock rejection".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`RecordingSurfaceBinder`].
#[derive(Debug, Default)]
pub struct RecordingSurfaceBinderBuilder {
    fail_binds: bool,
    fail_unbinds: bool,
}

impl RecordingSurfaceBinderBuilder {
    #[must_use]
    pub fn fail_binds(mut self) -> Self {
        self.fail_binds = true;
        self
    }

    #[must_use]
    pub fn fail_unbinds(mut self) -> Self {
        self.fail_unbinds = true;
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<RecordingSurfaceBinder> {
        Arc::new(RecordingSurfaceBinder {
            calls: Mutex::new(Vec::new()),
            fail_binds: self.fail_binds,
            fail_unbinds: self.fail_unbinds,
        })
    }
}
