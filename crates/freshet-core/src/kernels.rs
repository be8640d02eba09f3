//! The STREAM kernel set
//!
//! Six rank-generic elementwise kernels: init establishes the starting
//! state, the other five are the timed set. Destination views come first
//! in every signature. Each kernel drains its launch with a fence before
//! returning, so a caller timing the call sees the full data movement and
//! the next kernel observes completed writes.

use freshet_backends::{ArrayView, ArrayViewMut, ExecutionSpace, IndexRange, TileShape};

use crate::element::Element;
use crate::error::Result;

/// `a = ainit; b = binit; c = cinit` at every index
pub fn init<E: Element, S: ExecutionSpace, const R: usize>(
    space: &S,
    range: IndexRange<R>,
    tile: TileShape<R>,
    a: ArrayViewMut<'_, E, R>,
    b: ArrayViewMut<'_, E, R>,
    c: ArrayViewMut<'_, E, R>,
    ainit: E,
    binit: E,
    cinit: E,
) -> Result<()> {
    space.parallel_for("init", range, tile, move |idx| {
        a.set(idx, ainit);
        b.set(idx, binit);
        c.set(idx, cinit);
    })?;
    space.fence()?;
    Ok(())
}

/// `dst = value` at every index
pub fn set<E: Element, S: ExecutionSpace, const R: usize>(
    space: &S,
    range: IndexRange<R>,
    tile: TileShape<R>,
    dst: ArrayViewMut<'_, E, R>,
    value: E,
) -> Result<()> {
    space.parallel_for("set", range, tile, move |idx| dst.set(idx, value))?;
    space.fence()?;
    Ok(())
}

/// `dst = src` at every index
pub fn copy<E: Element, S: ExecutionSpace, const R: usize>(
    space: &S,
    range: IndexRange<R>,
    tile: TileShape<R>,
    dst: ArrayViewMut<'_, E, R>,
    src: ArrayView<'_, E, R>,
) -> Result<()> {
    space.parallel_for("copy", range, tile, move |idx| dst.set(idx, src.get(idx)))?;
    space.fence()?;
    Ok(())
}

/// `dst = scalar * src` at every index
pub fn scale<E: Element, S: ExecutionSpace, const R: usize>(
    space: &S,
    range: IndexRange<R>,
    tile: TileShape<R>,
    dst: ArrayViewMut<'_, E, R>,
    src: ArrayView<'_, E, R>,
    scalar: E,
) -> Result<()> {
    space.parallel_for("scale", range, tile, move |idx| {
        dst.set(idx, scalar * src.get(idx))
    })?;
    space.fence()?;
    Ok(())
}

/// `dst = src_a + src_b` at every index
pub fn add<E: Element, S: ExecutionSpace, const R: usize>(
    space: &S,
    range: IndexRange<R>,
    tile: TileShape<R>,
    dst: ArrayViewMut<'_, E, R>,
    src_a: ArrayView<'_, E, R>,
    src_b: ArrayView<'_, E, R>,
) -> Result<()> {
    space.parallel_for("add", range, tile, move |idx| {
        dst.set(idx, src_a.get(idx) + src_b.get(idx))
    })?;
    space.fence()?;
    Ok(())
}

/// `dst = src_b + scalar * src_c` at every index
pub fn triad<E: Element, S: ExecutionSpace, const R: usize>(
    space: &S,
    range: IndexRange<R>,
    tile: TileShape<R>,
    dst: ArrayViewMut<'_, E, R>,
    src_b: ArrayView<'_, E, R>,
    src_c: ArrayView<'_, E, R>,
    scalar: E,
) -> Result<()> {
    space.parallel_for("triad", range, tile, move |idx| {
        dst.set(idx, src_b.get(idx) + scalar * src_c.get(idx))
    })?;
    space.fence()?;
    Ok(())
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use freshet_backends::{DeviceArray, DeviceSpace, HostArray, HostSpace};

    fn device_setup(edge: usize) -> (DeviceSpace, IndexRange<1>, TileShape<1>) {
        let space = DeviceSpace::new();
        let range = IndexRange::<1>::cubic(edge);
        let tile = space.recommended_tile(&range);
        (space, range, tile)
    }

    #[test]
    fn test_kernel_sequence_rank1() {
        let (space, range, tile) = device_setup(4);
        let mut a = DeviceArray::<f64, 1>::allocate(&space, [4]).unwrap();
        let mut b = DeviceArray::<f64, 1>::allocate(&space, [4]).unwrap();
        let mut c = DeviceArray::<f64, 1>::allocate(&space, [4]).unwrap();

        set(&space, range, tile, c.view_mut(), 1.5).unwrap();
        assert!(c.to_vec().unwrap().iter().all(|&x| x == 1.5));

        // a starts zeroed; copying c over it leaves every element 1.5.
        copy(&space, range, tile, a.view_mut(), c.view()).unwrap();
        assert!(a.to_vec().unwrap().iter().all(|&x| x == 1.5));

        scale(&space, range, tile, b.view_mut(), c.view(), 1.1).unwrap();
        let expected_b = 1.1 * 1.5;
        assert!(b.to_vec().unwrap().iter().all(|&x| x == expected_b));

        add(&space, range, tile, c.view_mut(), a.view(), b.view()).unwrap();
        let expected_c = 1.5 + expected_b;
        assert!(c.to_vec().unwrap().iter().all(|&x| x == expected_c));

        triad(&space, range, tile, a.view_mut(), b.view(), c.view(), 1.1).unwrap();
        let expected_a = expected_b + 1.1 * expected_c;
        assert!(a.to_vec().unwrap().iter().all(|&x| x == expected_a));
    }

    #[test]
    fn test_init_writes_all_three_arrays() {
        let space = HostSpace::new();
        let range = IndexRange::<2>::cubic(16);
        let tile = space.recommended_tile(&range);
        let mut a = HostArray::<f64, 2>::cubic(16);
        let mut b = HostArray::<f64, 2>::cubic(16);
        let mut c = HostArray::<f64, 2>::cubic(16);

        init(
            &space,
            range,
            tile,
            a.view_mut(),
            b.view_mut(),
            c.view_mut(),
            1.0,
            1.1,
            0.0,
        )
        .unwrap();

        assert!(a.as_slice().iter().all(|&x| x == 1.0));
        assert!(b.as_slice().iter().all(|&x| x == 1.1));
        assert!(c.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_kernels_respect_rank4_layout() {
        let space = DeviceSpace::new();
        let range = IndexRange::<4>::cubic(3);
        let tile = space.recommended_tile(&range);
        let mut a = DeviceArray::<f32, 4>::allocate(&space, [3; 4]).unwrap();
        let mut b = DeviceArray::<f32, 4>::allocate(&space, [3; 4]).unwrap();

        set(&space, range, tile, a.view_mut(), 2.0_f32).unwrap();
        scale(&space, range, tile, b.view_mut(), a.view(), 0.5_f32).unwrap();

        let data = b.to_vec().unwrap();
        assert_eq!(data.len(), 81);
        assert!(data.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_copy_on_host_space() {
        let space = HostSpace::new();
        let range = IndexRange::<1>::cubic(100);
        let tile = space.recommended_tile(&range);
        let mut src = HostArray::<f32, 1>::cubic(100);
        for (i, x) in src.as_mut_slice().iter_mut().enumerate() {
            *x = i as f32;
        }
        let mut dst = HostArray::<f32, 1>::cubic(100);

        copy(&space, range, tile, dst.view_mut(), src.view()).unwrap();
        assert_eq!(dst.as_slice(), src.as_slice());
    }
}
