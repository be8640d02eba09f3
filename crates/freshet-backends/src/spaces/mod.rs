//! Execution space implementations
//!
//! Two spaces back the benchmark: [`HostSpace`] schedules tiles straight
//! onto the rayon pool, and [`DeviceSpace`] pairs the same pool with a
//! slab memory manager so arrays live in mirrored storage and move through
//! explicit copies. Both share one dispatch path in [`dispatch`].

pub mod device;
pub mod dispatch;
pub mod host;
pub mod memory;

pub use device::{DeviceSpace, MAX_TILE_RANK};
pub use host::{HostSpace, DEFAULT_HOST_INNER_TILE};
pub use memory::DeviceMemory;
