//! Run configuration and protocol constants

use freshet_backends::DEFAULT_HOST_INNER_TILE;

/// Trials per kernel; only the fastest survives
pub const NTIMES: usize = 20;

/// Scalar applied by the scale and triad kernels
pub const SCALAR: f64 = 1.1;

/// Value the set kernel writes
pub const SET_SCALAR: f64 = 1.5;

/// Initial array contents: (a, b, c)
pub const AINIT: f64 = 1.0;
pub const BINIT: f64 = 1.1;
pub const CINIT: f64 = 0.0;

/// How the arrays reach their initial state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitFlow {
    /// Initialize host arrays, then bulk-copy them to the device
    HostThenCopy,
    /// Initialize host and device arrays with separate launches
    DualLaunch,
}

/// Parameters of one benchmark run
///
/// Everything else the protocol needs (trial count, kernel scalars,
/// initial values) is fixed by convention and lives in this module's
/// constants.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Per-dimension edge length; arrays hold `edge^R` elements
    pub edge: usize,
    /// Tile-spread factor handed to the tiling strategies
    pub spread: usize,
    /// Initialization flow for the mirrored arrays
    pub init_flow: InitFlow,
    /// Print the recommended and used device tile shapes before the trials
    pub report_tiling: bool,
    /// Second host tile dimension at rank three and up, a tuned default
    pub host_inner_tile: usize,
}

impl RunConfig {
    pub fn new(edge: usize) -> Self {
        Self {
            edge,
            spread: 1,
            init_flow: InitFlow::DualLaunch,
            report_tiling: false,
            host_inner_tile: DEFAULT_HOST_INNER_TILE,
        }
    }

    /// Flag anything outside the supported parameter domain
    pub fn validate(&self) -> Result<(), String> {
        if self.edge == 0 {
            return Err("edge length must be at least 1".into());
        }
        if self.spread == 0 {
            return Err("spread factor must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RunConfig::new(1024);
        assert_eq!(cfg.edge, 1024);
        assert_eq!(cfg.spread, 1);
        assert_eq!(cfg.init_flow, InitFlow::DualLaunch);
        assert!(!cfg.report_tiling);
        assert_eq!(cfg.host_inner_tile, DEFAULT_HOST_INNER_TILE);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_degenerate_parameters_are_rejected() {
        assert!(RunConfig::new(0).validate().is_err());
        let mut cfg = RunConfig::new(32);
        cfg.spread = 0;
        assert!(cfg.validate().is_err());
    }
}
