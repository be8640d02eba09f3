//! Launch geometry: index ranges, tile shapes, and tile grids
//!
//! A kernel launch is described by an [`IndexRange`] (the logical iteration
//! domain) and a [`TileShape`] (the per-dimension block of work one
//! scheduling unit processes). [`TileGrid`] covers a range with tiles and
//! maps linear tile indices back to coordinate space for dispatch.

use std::fmt;

/// Handle to an allocated device slab
///
/// Slabs are opaque handles managed by the device memory manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

impl BufferHandle {
    /// Create a new buffer handle
    pub const fn new(id: u64) -> Self {
        BufferHandle(id)
    }

    /// Get the internal ID
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf{}", self.0)
    }
}

/// N-dimensional iteration domain for a kernel launch
///
/// Lower bounds are always zero; upper bounds equal the per-dimension
/// extents. The rank is a compile-time parameter so coordinates are plain
/// fixed-size arrays with no heap traffic on the dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange<const R: usize> {
    extents: [usize; R],
}

impl<const R: usize> IndexRange<R> {
    /// Create a range from explicit per-dimension extents
    pub const fn new(extents: [usize; R]) -> Self {
        Self { extents }
    }

    /// Create a cubic range `[0, edge)^R`
    pub const fn cubic(edge: usize) -> Self {
        Self { extents: [edge; R] }
    }

    /// Rank of the range
    pub const fn rank(&self) -> usize {
        R
    }

    /// Lower bounds (always zero)
    pub const fn lower(&self) -> [usize; R] {
        [0; R]
    }

    /// Upper bounds (the extents)
    pub const fn upper(&self) -> [usize; R] {
        self.extents
    }

    /// Per-dimension extents
    pub const fn extents(&self) -> [usize; R] {
        self.extents
    }

    /// Extent of one dimension
    pub const fn extent(&self, dim: usize) -> usize {
        self.extents[dim]
    }

    /// Total number of indices in the range
    pub fn len(&self) -> usize {
        self.extents.iter().product()
    }

    /// True when any dimension has extent zero
    pub fn is_empty(&self) -> bool {
        self.extents.iter().any(|&e| e == 0)
    }
}

impl<const R: usize> fmt::Display for IndexRange<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.extents.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "0..{e}")?;
        }
        write!(f, "]")
    }
}

/// Per-dimension tile lengths for one scheduling unit
///
/// Tile dimensions may exceed the range extent (the grid clamps at the
/// boundary) but must never be zero; [`crate::space::ExecutionSpace`]
/// strategies guarantee this and dispatch validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileShape<const R: usize> {
    dims: [usize; R],
}

impl<const R: usize> TileShape<R> {
    /// Create a tile shape from explicit per-dimension lengths
    pub const fn new(dims: [usize; R]) -> Self {
        Self { dims }
    }

    /// Create a uniform tile `len^R`
    pub const fn uniform(len: usize) -> Self {
        Self { dims: [len; R] }
    }

    /// Per-dimension tile lengths
    pub const fn dims(&self) -> [usize; R] {
        self.dims
    }

    /// Tile length of one dimension
    pub const fn dim(&self, d: usize) -> usize {
        self.dims[d]
    }

    /// Total indices one tile spans
    pub fn volume(&self) -> usize {
        self.dims.iter().product()
    }

    /// True when every dimension is at least one
    pub fn is_valid(&self) -> bool {
        self.dims.iter().all(|&d| d > 0)
    }
}

impl<const R: usize> fmt::Display for TileShape<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// A range covered by tiles: the grid a launch dispatches over
///
/// The last dimension varies fastest in the linear tile order, matching the
/// row-major element layout of the arrays so neighbouring tiles touch
/// neighbouring memory.
#[derive(Debug, Clone, Copy)]
pub struct TileGrid<const R: usize> {
    range: IndexRange<R>,
    tile: TileShape<R>,
    tiles: [usize; R],
}

impl<const R: usize> TileGrid<R> {
    /// Cover `range` with `tile`, rounding up at the boundary
    pub fn cover(range: IndexRange<R>, tile: TileShape<R>) -> Self {
        let mut tiles = [0usize; R];
        for d in 0..R {
            tiles[d] = range.extent(d).div_ceil(tile.dim(d));
        }
        Self { range, tile, tiles }
    }

    /// Tiles per dimension
    pub const fn tiles_per_dim(&self) -> [usize; R] {
        self.tiles
    }

    /// Total number of tiles in the grid
    pub fn total_tiles(&self) -> usize {
        self.tiles.iter().product()
    }

    /// Decompose a linear tile index into per-dimension tile coordinates
    pub fn tile_coords(&self, mut linear: usize) -> [usize; R] {
        let mut coords = [0usize; R];
        for d in (0..R).rev() {
            coords[d] = linear % self.tiles[d];
            linear /= self.tiles[d];
        }
        coords
    }

    /// Half-open index bounds of one tile, clamped to the range
    pub fn tile_bounds(&self, coords: [usize; R]) -> ([usize; R], [usize; R]) {
        let mut start = [0usize; R];
        let mut end = [0usize; R];
        for d in 0..R {
            start[d] = coords[d] * self.tile.dim(d);
            end[d] = (start[d] + self.tile.dim(d)).min(self.range.extent(d));
        }
        (start, end)
    }
}

/// Row-major strides for the given extents
pub fn row_major_strides<const R: usize>(extents: [usize; R]) -> [usize; R] {
    let mut strides = [1usize; R];
    for d in (0..R.saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * extents[d + 1];
    }
    strides
}

// ================================================================================================
// Tests
// ================================================================================================
