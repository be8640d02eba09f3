//! End-to-end tests for the benchmark driver
//!
//! Runs the full protocol at several ranks and element widths, then drives
//! the trial loop by hand to confirm the library pieces compose the same
//! way the driver does.

use std::time::Instant;

use freshet_backends::{DeviceArray, DeviceSpace, ExecutionSpace, HostArray, HostSpace};
use freshet_core::config::{AINIT, BINIT, CINIT, SET_SCALAR};
use freshet_core::validate::tolerance;
use freshet_core::{
    kernels, run_stream, validate, InitFlow, Kernel, KernelTimings, RunConfig, NTIMES, SCALAR,
};

#[test]
fn test_full_run_rank1_f32() -> freshet_core::Result<()> {
    let mut cfg = RunConfig::new(4096);
    cfg.init_flow = InitFlow::HostThenCopy;

    let failures = run_stream::<f32, 1>(&cfg)?;

    assert_eq!(failures, 0);
    Ok(())
}

#[test]
fn test_full_run_rank2_f64() -> freshet_core::Result<()> {
    // Dual-launch flow: host and device arrays initialized independently
    let cfg = RunConfig::new(64);

    let failures = run_stream::<f64, 2>(&cfg)?;

    assert_eq!(failures, 0);
    Ok(())
}

#[test]
fn test_full_run_rank4_with_spread() -> freshet_core::Result<()> {
    let mut cfg = RunConfig::new(6);
    cfg.spread = 2;
    cfg.report_tiling = true;

    let failures = run_stream::<f64, 4>(&cfg)?;

    assert_eq!(failures, 0);
    Ok(())
}

#[test]
fn test_degenerate_edge_is_rejected() {
    let cfg = RunConfig::new(0);

    assert!(run_stream::<f64, 1>(&cfg).is_err());
}

#[test]
fn test_manual_trial_loop_matches_reference() -> freshet_core::Result<()> {
    let edge = 32usize;
    let host = HostSpace::new();
    let device = DeviceSpace::new();

    let mut a_host = HostArray::<f64, 2>::cubic(edge);
    let mut b_host = HostArray::<f64, 2>::cubic(edge);
    let mut c_host = HostArray::<f64, 2>::cubic(edge);

    let range = a_host.range();
    let host_tile = host.recommended_tile(&range);
    let device_tile = device.recommended_tile(&range);

    kernels::init(
        &host,
        range,
        host_tile,
        a_host.view_mut(),
        b_host.view_mut(),
        c_host.view_mut(),
        AINIT,
        BINIT,
        CINIT,
    )?;

    let mut a_dev = DeviceArray::<f64, 2>::allocate(&device, [edge; 2])?;
    let mut b_dev = DeviceArray::<f64, 2>::allocate(&device, [edge; 2])?;
    let mut c_dev = DeviceArray::<f64, 2>::allocate(&device, [edge; 2])?;

    a_dev.copy_from_host(&a_host)?;
    b_dev.copy_from_host(&b_host)?;
    c_dev.copy_from_host(&c_host)?;

    // Same kernel order and operand bindings the driver uses
    let mut timings = KernelTimings::new();
    for _ in 0..NTIMES {
        let start = Instant::now();
        kernels::set(&device, range, device_tile, c_dev.view_mut(), SET_SCALAR)?;
        timings.record(Kernel::Set, start.elapsed().as_secs_f64());

        let start = Instant::now();
        kernels::copy(&device, range, device_tile, c_dev.view_mut(), a_dev.view())?;
        timings.record(Kernel::Copy, start.elapsed().as_secs_f64());

        let start = Instant::now();
        kernels::scale(
            &device,
            range,
            device_tile,
            b_dev.view_mut(),
            c_dev.view(),
            SCALAR,
        )?;
        timings.record(Kernel::Scale, start.elapsed().as_secs_f64());

        let start = Instant::now();
        kernels::add(
            &device,
            range,
            device_tile,
            c_dev.view_mut(),
            a_dev.view(),
            b_dev.view(),
        )?;
        timings.record(Kernel::Add, start.elapsed().as_secs_f64());

        let start = Instant::now();
        kernels::triad(
            &device,
            range,
            device_tile,
            a_dev.view_mut(),
            b_dev.view(),
            c_dev.view(),
            SCALAR,
        )?;
        timings.record(Kernel::Triad, start.elapsed().as_secs_f64());
    }

    a_dev.copy_to_host(&mut a_host)?;
    b_dev.copy_to_host(&mut b_host)?;
    c_dev.copy_to_host(&mut c_host)?;

    let report = validate(&a_host, &b_host, &c_host, SCALAR);

    assert_eq!(report.failure_count(), 0);
    assert!(report.a.avg_error < tolerance::<f64>());
    assert!(report.b.avg_error < tolerance::<f64>());
    assert!(report.c.avg_error < tolerance::<f64>());

    // Every kernel ran twenty times, so every minimum is a real duration
    for kernel in Kernel::ALL {
        assert!(timings.min_seconds(kernel).is_finite());
        assert!(timings.bandwidth_gbs(kernel, 8 * edge * edge) > 0.0);
    }

    Ok(())
}

#[test]
fn test_validation_flags_a_corrupted_array() -> freshet_core::Result<()> {
    let edge = 16usize;
    let device = DeviceSpace::new();

    let mut a_host = HostArray::<f64, 2>::cubic(edge);
    let mut b_host = HostArray::<f64, 2>::cubic(edge);
    let mut c_host = HostArray::<f64, 2>::cubic(edge);

    let range = a_host.range();
    let tile = device.recommended_tile(&range);

    let mut a_dev = DeviceArray::<f64, 2>::allocate(&device, [edge; 2])?;
    let mut b_dev = DeviceArray::<f64, 2>::allocate(&device, [edge; 2])?;
    let mut c_dev = DeviceArray::<f64, 2>::allocate(&device, [edge; 2])?;

    kernels::init(
        &device,
        range,
        tile,
        a_dev.view_mut(),
        b_dev.view_mut(),
        c_dev.view_mut(),
        AINIT,
        BINIT,
        CINIT,
    )?;

    for _ in 0..NTIMES {
        kernels::set(&device, range, tile, c_dev.view_mut(), SET_SCALAR)?;
        kernels::copy(&device, range, tile, c_dev.view_mut(), a_dev.view())?;
        kernels::scale(&device, range, tile, b_dev.view_mut(), c_dev.view(), SCALAR)?;
        kernels::add(
            &device,
            range,
            tile,
            c_dev.view_mut(),
            a_dev.view(),
            b_dev.view(),
        )?;
        kernels::triad(
            &device,
            range,
            tile,
            a_dev.view_mut(),
            b_dev.view(),
            c_dev.view(),
            SCALAR,
        )?;
    }

    a_dev.copy_to_host(&mut a_host)?;
    b_dev.copy_to_host(&mut b_host)?;
    c_dev.copy_to_host(&mut c_host)?;

    // Push one element of c far outside the tolerance band
    let poisoned = c_host.get([3, 7]) * 2.0 + 100.0;
    c_host.set([3, 7], poisoned);

    let report = validate(&a_host, &b_host, &c_host, SCALAR);

    assert!(!report.a.failed);
    assert!(!report.b.failed);
    assert!(report.c.failed);
    assert_eq!(report.failure_count(), 1);
    Ok(())
}
