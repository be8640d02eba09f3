//! Benchmark driver
//!
//! One call runs the whole protocol: allocate the three mirrored arrays,
//! initialize them, run twenty timed trials of the kernel sequence on the
//! device space, copy back, validate against the analytic reference, and
//! print the report. The returned count of failed arrays becomes the
//! process exit code.

use std::mem::size_of;
use std::time::Instant;

use freshet_backends::{
    DeviceArray, DeviceSpace, ExecutionSpace, HostArray, HostSpace, IndexRange,
};
use freshet_tracing::{perf_event, timed_block};

use crate::config::{InitFlow, RunConfig, AINIT, BINIT, CINIT, NTIMES, SCALAR, SET_SCALAR};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::kernels;
use crate::report;
use crate::timing::{Kernel, KernelTimings};
use crate::validate;

/// Run the full benchmark at rank `R` over elements of type `E`
#[tracing::instrument(level = "info", skip(cfg), fields(rank = R, edge = cfg.edge, spread = cfg.spread, element = E::NAME))]
pub fn run_stream<E: Element, const R: usize>(cfg: &RunConfig) -> Result<u32> {
    cfg.validate().map_err(Error::invalid_config)?;

    report::print_preamble::<E, R>(cfg);

    let host_space = HostSpace::with_inner_tile(cfg.host_inner_tile);
    let device_space = DeviceSpace::new();

    let extents = [cfg.edge; R];
    let range = IndexRange::new(extents);

    let mut a = HostArray::<E, R>::zeroed(extents);
    let mut b = HostArray::<E, R>::zeroed(extents);
    let mut c = HostArray::<E, R>::zeroed(extents);

    let mut dev_a = DeviceArray::<E, R>::allocate(&device_space, extents)?;
    let mut dev_b = DeviceArray::<E, R>::allocate(&device_space, extents)?;
    let mut dev_c = DeviceArray::<E, R>::allocate(&device_space, extents)?;

    let scalar = E::from_f64(SCALAR);
    let set_value = E::from_f64(SET_SCALAR);
    let (ainit, binit, cinit) = (
        E::from_f64(AINIT),
        E::from_f64(BINIT),
        E::from_f64(CINIT),
    );

    println!("Initializing views...");

    // One tile shape per execution context, reused for every launch.
    let host_tile =
        host_space.build_tile_shape(&range, host_space.recommended_tile(&range), cfg.spread);
    let recommended = device_space.recommended_tile(&range);
    let device_tile = device_space.build_tile_shape(&range, recommended, cfg.spread);

    kernels::init(
        &host_space,
        range,
        host_tile,
        a.view_mut(),
        b.view_mut(),
        c.view_mut(),
        ainit,
        binit,
        cinit,
    )?;

    if cfg.report_tiling {
        report::print_tiling(recommended, device_tile);
    }

    match cfg.init_flow {
        InitFlow::HostThenCopy => {
            dev_a.copy_from_host(&a)?;
            dev_b.copy_from_host(&b)?;
            dev_c.copy_from_host(&c)?;
        }
        InitFlow::DualLaunch => {
            kernels::init(
                &device_space,
                range,
                device_tile,
                dev_a.view_mut(),
                dev_b.view_mut(),
                dev_c.view_mut(),
                ainit,
                binit,
                cinit,
            )?;
        }
    }

    println!("Starting benchmarking...");

    let mut timings = KernelTimings::new();

    for trial in 0..NTIMES {
        let started = Instant::now();

        let timer = Instant::now();
        kernels::set(&device_space, range, device_tile, dev_c.view_mut(), set_value)?;
        timings.record(Kernel::Set, timer.elapsed().as_secs_f64());

        let timer = Instant::now();
        kernels::copy(&device_space, range, device_tile, dev_c.view_mut(), dev_a.view())?;
        timings.record(Kernel::Copy, timer.elapsed().as_secs_f64());

        let timer = Instant::now();
        kernels::scale(
            &device_space,
            range,
            device_tile,
            dev_b.view_mut(),
            dev_c.view(),
            scalar,
        )?;
        timings.record(Kernel::Scale, timer.elapsed().as_secs_f64());

        let timer = Instant::now();
        kernels::add(
            &device_space,
            range,
            device_tile,
            dev_c.view_mut(),
            dev_a.view(),
            dev_b.view(),
        )?;
        timings.record(Kernel::Add, timer.elapsed().as_secs_f64());

        let timer = Instant::now();
        kernels::triad(
            &device_space,
            range,
            device_tile,
            dev_a.view_mut(),
            dev_b.view(),
            dev_c.view(),
            scalar,
        )?;
        timings.record(Kernel::Triad, timer.elapsed().as_secs_f64());

        perf_event!(
            "trial_complete",
            trial = trial,
            duration_us = started.elapsed().as_micros() as u64,
        );
    }

    dev_a.copy_to_host(&mut a)?;
    dev_b.copy_to_host(&mut b)?;
    dev_c.copy_to_host(&mut c)?;

    println!("Performing validation...");
    let (validation, _) = timed_block!("validation", { validate::validate(&a, &b, &c, scalar) });
    report::print_validation(&validation);

    report::print_bandwidth_table(&timings, size_of::<E>() * range.len());

    Ok(validation.failure_count())
}
