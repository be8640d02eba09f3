//! Host execution space
//!
//! Tiles run directly on the rayon pool over the caller's own slices.
//! The host tiling strategy favours wide outer parallelism for rank one
//! and long contiguous inner runs for higher ranks.

use std::sync::atomic::{fence, Ordering};

use crate::error::Result;
use crate::launch::{IndexRange, TileShape};
use crate::space::ExecutionSpace;
use crate::spaces::dispatch::dispatch_tiles;

/// Second tile dimension used by the host strategy at rank three and up
///
/// Two rows per tile keeps the per-tile working set small while still
/// amortising scheduling overhead across more than one inner run.
pub const DEFAULT_HOST_INNER_TILE: usize = 2;

/// CPU execution space scheduling tiles on the rayon pool
#[derive(Debug, Clone)]
pub struct HostSpace {
    inner_tile: usize,
}

impl HostSpace {
    pub fn new() -> Self {
        Self {
            inner_tile: DEFAULT_HOST_INNER_TILE,
        }
    }

    /// Override the second tile dimension used at rank three and up
    pub fn with_inner_tile(inner_tile: usize) -> Self {
        Self {
            inner_tile: inner_tile.max(1),
        }
    }
}

impl Default for HostSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSpace for HostSpace {
    fn name(&self) -> &'static str {
        "host"
    }

    fn recommended_tile<const R: usize>(&self, range: &IndexRange<R>) -> TileShape<R> {
        // Rank one: split the range so every worker gets a few chunks.
        // Higher ranks: one full innermost run per tile, unit everywhere else.
        let mut dims = [1usize; R];
        if R == 1 {
            let chunks = rayon::current_num_threads() * 4;
            dims[0] = range.extent(0).div_ceil(chunks).max(1);
        } else {
            dims[R - 1] = range.extent(R - 1).max(1);
        }
        TileShape::new(dims)
    }

    fn build_tile_shape<const R: usize>(
        &self,
        range: &IndexRange<R>,
        baseline: TileShape<R>,
        spread: usize,
    ) -> TileShape<R> {
        // At rank two and up the factor stretches the leading tile dimension
        // and divides the trailing one, shifting work from inner runs to
        // outer tiles; the baseline plays no part. Rank one has a single
        // dimension, so the factor just slices the baseline chunk finer.
        let f = spread.max(1);
        let mut dims = [1usize; R];
        match R {
            1 => {
                dims[0] = (baseline.dim(0) / f).max(1);
            }
            2 => {
                dims[0] = f;
                dims[1] = (range.extent(1) / f).max(1);
            }
            _ => {
                dims[0] = f;
                dims[1] = self.inner_tile;
                for d in 2..R - 1 {
                    dims[d] = range.extent(d).max(1);
                }
                dims[R - 1] = (range.extent(R - 1) / f).max(1);
            }
        }
        TileShape::new(dims)
    }

    fn parallel_for<const R: usize, F>(
        &self,
        label: &str,
        range: IndexRange<R>,
        tile: TileShape<R>,
        body: F,
    ) -> Result<()>
    where
        F: Fn([usize; R]) + Send + Sync,
    {
        dispatch_tiles("host", label, range, tile, body)
    }

    fn fence(&self) -> Result<()> {
        fence(Ordering::SeqCst);
        Ok(())
    }
}

// ================================================================================================
// Tests
// ================================================================================================
