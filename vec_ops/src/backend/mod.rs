//! Execution backends. The dispatcher validates a call, then hands the
//! resolved buffers to exactly one of these.

mod device;
pub(crate) use device::DeviceBackend;

mod host;
pub(crate) use host::{HostBackend, HostPools};
pub use host::HOST_NUM_THREADS;
