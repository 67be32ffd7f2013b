use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    stream::Stream,
    DeviceVec, GpuError, GpuResult, StreamHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device:{}", self.0)
    }
}

/// Static limits of a simulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProperties {
    pub name: String,
    /// bytes of device memory available to allocations
    pub memory_capacity: usize,
    /// largest number of elements a single kernel launch may cover
    pub max_launch_size: usize,
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self {
            name: "simulated-device".to_string(),
            memory_capacity: 1 << 32,
            max_launch_size: 1 << 30,
        }
    }
}

const DEFAULT_STREAM_INDEX: u64 = 0;

pub struct Device {
    id: DeviceId,
    properties: DeviceProperties,
    allocated: Arc<AtomicUsize>,
    default_stream: Arc<Stream>,
    streams: Mutex<HashMap<u64, Arc<Stream>>>,
    next_stream: AtomicU64,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("properties", &self.properties)
            .field("memory_used", &self.memory_used())
            .finish()
    }
}

impl Device {
    pub fn new(id: DeviceId, properties: DeviceProperties) -> GpuResult<Self> {
        let default_stream = Stream::spawn(StreamHandle {
            device: id,
            index: DEFAULT_STREAM_INDEX,
        })?;
        log::debug!("{id}: {} initialised", properties.name);

        Ok(Self {
            id,
            properties,
            allocated: Arc::new(AtomicUsize::new(0)),
            default_stream: Arc::new(default_stream),
            streams: Mutex::new(HashMap::new()),
            next_stream: AtomicU64::new(DEFAULT_STREAM_INDEX + 1),
        })
    }

    #[inline]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    #[inline]
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    #[inline]
    pub fn memory_used(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    #[inline]
    pub fn memory_free(&self) -> usize {
        self.properties.memory_capacity - self.memory_used()
    }

    // ========================
    // memory
    // ========================

    /// Allocate `len` default-initialised elements.
    pub fn alloc<F: Copy + Default>(&self, len: usize) -> GpuResult<DeviceVec<F>> {
        let requested = len.saturating_mul(std::mem::size_of::<F>());
        let capacity = self.properties.memory_capacity;
        self.allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(requested).filter(|&total| total <= capacity)
            })
            .map_err(|used| GpuError::OutOfMemory {
                device: self.id,
                requested,
                available: capacity - used,
            })?;

        Ok(DeviceVec::new(len, self.id, requested, self.allocated.clone()))
    }

    /// Allocate a buffer holding a copy of `src`.
    pub fn alloc_from_host<F: Copy + Default>(&self, src: &[F]) -> GpuResult<DeviceVec<F>> {
        let mut buf = self.alloc(src.len())?;
        buf.copy_from_host(src)?;
        Ok(buf)
    }

    // ========================
    // streams
    // ========================

    #[inline]
    pub fn default_stream(&self) -> StreamHandle {
        self.default_stream.handle()
    }

    pub fn create_stream(&self) -> GpuResult<StreamHandle> {
        let handle = StreamHandle {
            device: self.id,
            index: self.next_stream.fetch_add(1, Ordering::Relaxed),
        };
        let stream = Stream::spawn(handle)?;
        self.streams
            .lock()
            .map_err(|_| GpuError::Poisoned)?
            .insert(handle.index, Arc::new(stream));
        Ok(handle)
    }

    /// Drain and remove a stream. Reports a fault left unsynchronized on it.
    pub fn destroy_stream(&self, handle: StreamHandle) -> GpuResult<()> {
        if handle.device != self.id || handle.index == DEFAULT_STREAM_INDEX {
            return Err(GpuError::UnknownStream(handle));
        }
        let stream = self
            .streams
            .lock()
            .map_err(|_| GpuError::Poisoned)?
            .remove(&handle.index)
            .ok_or(GpuError::UnknownStream(handle))?;
        stream.close()
    }

    pub fn has_stream(&self, handle: StreamHandle) -> bool {
        self.stream(Some(handle)).is_ok()
    }

    /// Resolve a handle; `None` selects the device's default stream.
    fn stream(&self, handle: Option<StreamHandle>) -> GpuResult<Arc<Stream>> {
        let handle = match handle {
            None => return Ok(self.default_stream.clone()),
            Some(handle) => handle,
        };
        if handle.device != self.id {
            return Err(GpuError::UnknownStream(handle));
        }
        if handle.index == DEFAULT_STREAM_INDEX {
            return Ok(self.default_stream.clone());
        }
        self.streams
            .lock()
            .map_err(|_| GpuError::Poisoned)?
            .get(&handle.index)
            .cloned()
            .ok_or(GpuError::UnknownStream(handle))
    }

    /// Wait for all work on the stream and surface the first kernel fault.
    pub fn synchronize(&self, handle: Option<StreamHandle>) -> GpuResult<()> {
        self.stream(handle)?.synchronize()
    }

    // ========================
    // kernels
    // ========================

    /// Enqueue `kernel` covering `work_size` elements on the given stream.
    ///
    /// Launch limits are checked here, before anything is enqueued; faults
    /// raised while the kernel runs are reported by [`Device::synchronize`].
    pub fn launch<K>(
        &self,
        stream: Option<StreamHandle>,
        work_size: usize,
        kernel: K,
    ) -> GpuResult<()>
    where
        K: FnOnce() -> GpuResult<()> + Send + 'static,
    {
        self.launch_stream(stream, work_size)?
            .enqueue(Box::new(kernel))
    }

    /// Launch `kernel` and wait for it, after everything queued before it on
    /// the stream. Returns the kernel's own result; faults of earlier work
    /// stay pending for [`Device::synchronize`].
    pub fn launch_sync<K>(
        &self,
        stream: Option<StreamHandle>,
        work_size: usize,
        kernel: K,
    ) -> GpuResult<()>
    where
        K: FnOnce() -> GpuResult<()> + Send + 'static,
    {
        self.launch_stream(stream, work_size)?
            .run(Box::new(kernel))
    }

    fn launch_stream(
        &self,
        stream: Option<StreamHandle>,
        work_size: usize,
    ) -> GpuResult<Arc<Stream>> {
        let max = self.properties.max_launch_size;
        if work_size > max {
            return Err(GpuError::LaunchTooLarge {
                size: work_size,
                max,
            });
        }
        let stream = self.stream(stream)?;
        log::trace!("{}: launch over {work_size} elements", stream.handle());
        Ok(stream)
    }
}
