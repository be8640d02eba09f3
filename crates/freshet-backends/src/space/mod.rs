//! Execution space abstraction
//!
//! An execution space is somewhere a tiled kernel can run: the host CPU
//! pool, or the mirrored device space with its own memory manager. Spaces
//! own two decisions the benchmark drivers delegate to them: how to shape
//! tiles for a given iteration range, and how to run a body over the tiled
//! grid.
//!
//! ```text
//! +---------------------------+
//! |       Benchmark driver    |
//! |  (kernels, timing loop)   |
//! +------------+--------------+
//!              |
//!              v
//! +---------------------------+
//! |      ExecutionSpace       |
//! |  recommended_tile()       |
//! |  build_tile_shape()       |
//! |  parallel_for() + fence() |
//! +------+-------------+------+
//!        |             |
//!        v             v
//! +-----------+  +-------------+
//! | HostSpace |  | DeviceSpace |
//! | rayon pool|  | slab memory |
//! +-----------+  +-------------+
//! ```

use crate::error::Result;
use crate::launch::{IndexRange, TileShape};

/// A place tiled kernels execute
///
/// Implementations must be shareable across the worker pool; the dispatch
/// path hands `&self` to every tile.
pub trait ExecutionSpace: Send + Sync {
    /// Human-readable space name for logs and error messages
    fn name(&self) -> &'static str;

    /// The tile shape this space would pick for `range` on its own
    ///
    /// This is the baseline before any spread factor is applied. Every
    /// dimension of the returned shape is at least one.
    fn recommended_tile<const R: usize>(&self, range: &IndexRange<R>) -> TileShape<R>;

    /// Derive the launch tile from a baseline shape and a spread factor
    ///
    /// `spread` trades tile count against tile volume along the leading and
    /// trailing dimensions. How the factor reshapes the tile is specific to
    /// the space, and a space may ignore the baseline entirely (the host
    /// derives its shape from the range alone). Every dimension of the
    /// returned shape is at least one.
    fn build_tile_shape<const R: usize>(
        &self,
        range: &IndexRange<R>,
        baseline: TileShape<R>,
        spread: usize,
    ) -> TileShape<R>;

    /// Run `body` for every index in `range`, scheduled tile by tile
    ///
    /// Tiles may run concurrently and in any order; within a tile the last
    /// dimension varies fastest. Completion of this call does not imply the
    /// writes are visible to other spaces; callers that hand the data off
    /// must [`fence`](Self::fence) first.
    fn parallel_for<const R: usize, F>(
        &self,
        label: &str,
        range: IndexRange<R>,
        tile: TileShape<R>,
        body: F,
    ) -> Result<()>
    where
        F: Fn([usize; R]) + Send + Sync;

    /// Block until all previously launched work on this space is visible
    fn fence(&self) -> Result<()>;
}
