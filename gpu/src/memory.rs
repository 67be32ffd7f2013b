use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

use crate::{DeviceId, GpuError, GpuResult};

/// Shared handle to the storage behind a [`DeviceVec`].
///
/// Kernels capture a clone of this so that work enqueued on a stream can
/// outlive the call that launched it.
pub struct DeviceStorage<F> {
    data: Arc<RwLock<Vec<F>>>,
}

impl<F> Clone for DeviceStorage<F> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<F> DeviceStorage<F> {
    #[inline]
    pub fn read(&self) -> GpuResult<RwLockReadGuard<'_, Vec<F>>> {
        self.data.read().map_err(|_| GpuError::Poisoned)
    }

    #[inline]
    pub fn write(&self) -> GpuResult<RwLockWriteGuard<'_, Vec<F>>> {
        self.data.write().map_err(|_| GpuError::Poisoned)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// A fixed-size buffer of elements resident on a [`crate::Device`].
///
/// The buffer is released (and its bytes returned to the device budget) on
/// drop. Not `Clone`: one owner, borrowed per call.
pub struct DeviceVec<F> {
    storage: DeviceStorage<F>,
    len: usize,
    device: DeviceId,
    bytes: usize,
    allocated: Arc<AtomicUsize>,
}

impl<F> fmt::Debug for DeviceVec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceVec")
            .field("device", &self.device)
            .field("len", &self.len)
            .field("bytes", &self.bytes)
            .finish()
    }
}

impl<F: Copy + Default> DeviceVec<F> {
    pub(crate) fn new(
        len: usize,
        device: DeviceId,
        bytes: usize,
        allocated: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            storage: DeviceStorage {
                data: Arc::new(RwLock::new(vec![F::default(); len])),
            },
            len,
            device,
            bytes,
            allocated,
        }
    }

    /// Copy `src` into the buffer. Blocks while a kernel holds the buffer.
    pub fn copy_from_host(&mut self, src: &[F]) -> GpuResult<()> {
        if src.len() != self.len {
            return Err(GpuError::LengthMismatch {
                device: self.len,
                host: src.len(),
            });
        }
        self.storage.write()?.copy_from_slice(src);
        Ok(())
    }

    /// Copy the buffer into `dst`. The caller synchronizes any stream still
    /// writing this buffer before relying on the contents.
    pub fn copy_to_host(&self, dst: &mut [F]) -> GpuResult<()> {
        if dst.len() != self.len {
            return Err(GpuError::LengthMismatch {
                device: self.len,
                host: dst.len(),
            });
        }
        dst.copy_from_slice(&self.storage.read()?);
        Ok(())
    }

    pub fn to_host_vec(&self) -> GpuResult<Vec<F>> {
        Ok(self.storage.read()?.clone())
    }
}

impl<F> DeviceVec<F> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn device_id(&self) -> DeviceId {
        self.device
    }

    /// Storage handle for kernel launches.
    #[inline]
    pub fn storage(&self) -> DeviceStorage<F> {
        self.storage.clone()
    }

    #[inline]
    pub fn same_buffer(&self, other: &Self) -> bool {
        self.storage.ptr_eq(&other.storage)
    }
}

impl<F> Drop for DeviceVec<F> {
    fn drop(&mut self) {
        self.allocated.fetch_sub(self.bytes, Ordering::AcqRel);
    }
}
