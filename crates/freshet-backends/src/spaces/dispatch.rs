//! Shared tiled dispatch over the rayon pool
//!
//! Both spaces schedule the same way: cover the range with a tile grid,
//! hand each tile to the pool as one unit of work, and walk the indices
//! inside a tile with the last dimension fastest so the innermost loop
//! streams over contiguous memory.

use rayon::prelude::*;

use freshet_tracing::performance::record_throughput;
use freshet_tracing::perf_span;

use crate::error::{BackendError, Result};
use crate::launch::{IndexRange, TileGrid, TileShape};

/// Run `body` for every index of `range`, one grid tile per work unit
pub(crate) fn dispatch_tiles<const R: usize, F>(
    space: &'static str,
    label: &str,
    range: IndexRange<R>,
    tile: TileShape<R>,
    body: F,
) -> Result<()>
where
    F: Fn([usize; R]) + Send + Sync,
{
    if !tile.is_valid() {
        return Err(BackendError::invalid_launch(format!(
            "{space}: tile {tile} has a zero dimension for range {range}"
        )));
    }
    if range.is_empty() {
        return Ok(());
    }

    let grid = TileGrid::cover(range, tile);
    let total = grid.total_tiles();
    let _span = perf_span!(
        "parallel_for",
        label = label,
        space = space,
        tiles = total,
        indices = range.len(),
    );

    let start = std::time::Instant::now();
    (0..total).into_par_iter().for_each(|linear| {
        let coords = grid.tile_coords(linear);
        let (lo, hi) = grid.tile_bounds(coords);
        for_each_in_box(lo, hi, &body);
    });
    record_throughput(label, range.len(), start.elapsed().as_micros() as u64);

    Ok(())
}

/// Walk a half-open box `[lo, hi)` in row-major order
///
/// The odometer carries the index array directly instead of dividing a
/// linear counter per element; the hot path is one increment and compare.
fn for_each_in_box<const R: usize, F>(lo: [usize; R], hi: [usize; R], body: &F)
where
    F: Fn([usize; R]),
{
    for d in 0..R {
        if lo[d] >= hi[d] {
            return;
        }
    }
    let mut idx = lo;
    'outer: loop {
        body(idx);
        let mut d = R - 1;
        loop {
            idx[d] += 1;
            if idx[d] < hi[d] {
                break;
            }
            idx[d] = lo[d];
            if d == 0 {
                break 'outer;
            }
            d -= 1;
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
