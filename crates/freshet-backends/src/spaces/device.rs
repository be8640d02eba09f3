//! Device execution space
//!
//! Models an accelerator-style space on top of the same worker pool: its
//! arrays live in [`DeviceMemory`] slabs rather than host vectors, so data
//! reaches it through explicit copies, and its tiling strategy starts from
//! a fixed per-rank recommendation instead of the range extents.

use std::sync::atomic::{fence, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::launch::{IndexRange, TileShape};
use crate::space::ExecutionSpace;
use crate::spaces::dispatch::dispatch_tiles;
use crate::spaces::memory::DeviceMemory;

/// Dimensions beyond this are never tiled; they fall back to the extent
pub const MAX_TILE_RANK: usize = 4;

/// Execution space with slab-managed mirrored memory
#[derive(Clone)]
pub struct DeviceSpace {
    memory: Arc<RwLock<DeviceMemory>>,
}

impl DeviceSpace {
    pub fn new() -> Self {
        Self {
            memory: Arc::new(RwLock::new(DeviceMemory::new())),
        }
    }

    /// Shared handle to this space's memory manager
    pub fn memory(&self) -> &Arc<RwLock<DeviceMemory>> {
        &self.memory
    }
}

impl Default for DeviceSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSpace for DeviceSpace {
    fn name(&self) -> &'static str {
        "device"
    }

    fn recommended_tile<const R: usize>(&self, range: &IndexRange<R>) -> TileShape<R> {
        // Fixed per-rank block shapes, biased towards the leading dimension
        // the way accelerator runtimes shape their thread blocks. At most
        // MAX_TILE_RANK dimensions take part; the rest span their extent.
        let tiled = R.min(MAX_TILE_RANK);
        let table: [usize; MAX_TILE_RANK] = match tiled {
            1 => [256, 1, 1, 1],
            2 => [32, 8, 1, 1],
            3 => [16, 4, 4, 1],
            _ => [8, 4, 4, 2],
        };
        let mut dims = [1usize; R];
        for d in 0..tiled {
            dims[d] = table[d];
        }
        for d in tiled..R {
            dims[d] = range.extent(d).max(1);
        }
        TileShape::new(dims)
    }

    fn build_tile_shape<const R: usize>(
        &self,
        _range: &IndexRange<R>,
        baseline: TileShape<R>,
        spread: usize,
    ) -> TileShape<R> {
        // Shrink the leading block dimension by the factor and stretch the
        // last tiled one, keeping roughly the block volume while exposing
        // more blocks along the slow axis.
        let f = spread.max(1);
        let tiled = R.min(MAX_TILE_RANK);
        let mut dims = baseline.dims();
        dims[0] = (dims[0] / f).max(1);
        dims[tiled - 1] = dims[tiled - 1].saturating_mul(f);
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
        dispatch_tiles("device", label, range, tile, body)
    }

    fn fence(&self) -> Result<()> {
        // Device scope: order launch writes against subsequent copies.
        fence(Ordering::AcqRel);
        Ok(())
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_recommended_tile_per_rank() {
        let space = DeviceSpace::new();
        assert_eq!(
            space.recommended_tile(&IndexRange::<1>::cubic(1 << 20)).dims(),
            [256]
        );
        assert_eq!(
            space.recommended_tile(&IndexRange::<2>::cubic(1024)).dims(),
            [32, 8]
        );
        assert_eq!(
            space.recommended_tile(&IndexRange::<3>::cubic(64)).dims(),
            [16, 4, 4]
        );
        assert_eq!(
            space.recommended_tile(&IndexRange::<4>::cubic(32)).dims(),
            [8, 4, 4, 2]
        );
    }

    #[test]
    fn test_dimensions_past_max_rank_span_extent() {
        let space = DeviceSpace::new();
        let tile = space.recommended_tile(&IndexRange::<5>::new([10, 10, 10, 10, 10]));
        assert_eq!(tile.dims(), [8, 4, 4, 2, 10]);
    }

    #[test]
    fn test_build_with_unit_factor_keeps_baseline() {
        let space = DeviceSpace::new();
        let range = IndexRange::<4>::cubic(32);
        let baseline = space.recommended_tile(&range);
        assert_eq!(space.build_tile_shape(&range, baseline, 1), baseline);
    }

    #[test]
    fn test_build_shifts_volume_to_last_tiled_dim() {
        let space = DeviceSpace::new();
        let range = IndexRange::<4>::cubic(32);
        let baseline = space.recommended_tile(&range);
        let tile = space.build_tile_shape(&range, baseline, 2);
        assert_eq!(tile.dims(), [4, 4, 4, 4]);
        assert_eq!(tile.volume(), baseline.volume());
    }

    #[test]
    fn test_build_rank1_compounds_on_single_dim() {
        let space = DeviceSpace::new();
        let range = IndexRange::<1>::cubic(1 << 20);
        let baseline = space.recommended_tile(&range);
        // Factor larger than the block: leading clamps to one, then stretches.
        let tile = space.build_tile_shape(&range, baseline, 512);
        assert_eq!(tile.dims(), [512]);
    }

    #[test]
    fn test_spaces_share_one_memory_manager() {
        let space = DeviceSpace::new();
        let other = space.clone();
        let handle = space.memory().write().allocate(64).unwrap();
        assert!(other.memory().read().contains(handle));
    }

    #[test]
    fn test_parallel_for_and_fence() {
        let space = DeviceSpace::new();
        let range = IndexRange::<3>::cubic(9);
        let tile = space.recommended_tile(&range);
        let hits = AtomicUsize::new(0);
        space
            .parallel_for("touch", range, tile, |_| {
                hits.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        space.fence().unwrap();
        assert_eq!(hits.load(Ordering::Relaxed), 9 * 9 * 9);
    }
}
