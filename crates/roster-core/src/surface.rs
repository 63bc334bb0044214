//! Render-surface binding seam.
//!
//! The reconciler decides when a tile is bound or unbound; the implementation
//! of [`SurfaceBinder`] carries the request to the render layer (typically by
//! dispatching to the render thread). Binding failures are non-fatal.

use crate::errors::SurfaceError;
use common::types::TileId;
use tracing::debug;

/// Options for binding a tile to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindOptions {
    /// Render horizontally mirrored (local camera preview).
    pub mirror: bool,
}

/// Binds and unbinds video tiles to render surfaces.
///
/// Called from inside the reconciler's serialized region, so implementations
/// must not block.
pub trait SurfaceBinder: Send + Sync {
    fn bind(&self, tile_id: TileId, options: BindOptions) -> Result<(), SurfaceError>;

    fn unbind(&self, tile_id: TileId) -> Result<(), SurfaceError>;
}

/// Binder that only logs requests. Used when no render layer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSurfaceBinder;

impl SurfaceBinder for LoggingSurfaceBinder {
    fn bind(&self, tile_id: TileId, options: BindOptions) -> Result<(), SurfaceError> {
        debug!(
            target: "roster.surface",
            tile_id = %tile_id,
            mirror = options.mirror,
            "bind requested"
        );
        Ok(())
    }

    fn unbind(&self, tile_id: TileId) -> Result<(), SurfaceError> {
        debug!(target: "roster.surface", tile_id = %tile_id, "unbind requested");
        Ok(())
    }
}
