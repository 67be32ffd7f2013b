use thiserror::Error;

use crate::{DeviceId, StreamHandle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpuError {
    #[error("out of memory on {device}: requested {requested} bytes, {available} bytes free")]
    OutOfMemory {
        device: DeviceId,
        requested: usize,
        available: usize,
    },

    #[error("kernel launch of {size} elements exceeds the device limit of {max}")]
    LaunchTooLarge { size: usize, max: usize },

    #[error("unknown stream {0}")]
    UnknownStream(StreamHandle),

    #[error("stream {0} is closed")]
    StreamClosed(StreamHandle),

    #[error("failed to spawn stream worker: {0}")]
    StreamSpawn(String),

    #[error("kernel fault: {0}")]
    KernelFault(String),

    #[error("device buffer lock poisoned by a faulted kernel")]
    Poisoned,

    #[error("length mismatch: device buffer holds {device} elements, host slice {host}")]
    LengthMismatch { device: usize, host: usize },
}

pub type GpuResult<T> = std::result::Result<T, GpuError>;
