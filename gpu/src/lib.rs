//! A host-simulated accelerator runtime.
//!
//! Device memory lives in runtime-owned buffers with capacity accounting,
//! kernels are closures launched onto streams, and every stream is a FIFO
//! worker thread. Callers only ever see [`DeviceVec`] handles and
//! [`StreamHandle`] identifiers.

mod errors;
pub use errors::*;

mod device;
pub use device::*;

mod memory;
pub use memory::*;

mod stream;
pub use stream::StreamHandle;
