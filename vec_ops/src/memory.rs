use std::fmt;

use gpu::{DeviceId, DeviceVec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLocation {
    Host,
    Device,
}

impl fmt::Display for MemoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryLocation::Host => write!(f, "host"),
            MemoryLocation::Device => write!(f, "device"),
        }
    }
}

/// Read-only view over a run of field elements on the host or on a device.
///
/// The view borrows the caller's storage for the duration of one call; the
/// engines never allocate, free or retain it.
pub enum MemoryView<'a, F> {
    Host(&'a [F]),
    Device(&'a DeviceVec<F>),
}

/// Writable counterpart of [`MemoryView`], used for outputs and in-place
/// operands. Being a unique borrow, it can never alias an input view.
pub enum MemoryViewMut<'a, F> {
    Host(&'a mut [F]),
    Device(&'a mut DeviceVec<F>),
}

impl<F> Clone for MemoryView<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for MemoryView<'_, F> {}

impl<'a, F> MemoryView<'a, F> {
    #[inline]
    pub fn host(data: &'a [F]) -> Self {
        MemoryView::Host(data)
    }

    #[inline]
    pub fn device(data: &'a DeviceVec<F>) -> Self {
        MemoryView::Device(data)
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            MemoryView::Host(data) => data.len(),
            MemoryView::Device(data) => data.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn location(&self) -> MemoryLocation {
        match self {
            MemoryView::Host(_) => MemoryLocation::Host,
            MemoryView::Device(_) => MemoryLocation::Device,
        }
    }

    #[inline]
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            MemoryView::Host(_) => None,
            MemoryView::Device(data) => Some(data.device_id()),
        }
    }
}

impl<'a, F> MemoryViewMut<'a, F> {
    #[inline]
    pub fn host(data: &'a mut [F]) -> Self {
        MemoryViewMut::Host(data)
    }

    #[inline]
    pub fn device(data: &'a mut DeviceVec<F>) -> Self {
        MemoryViewMut::Device(data)
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            MemoryViewMut::Host(data) => data.len(),
            MemoryViewMut::Device(data) => data.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn location(&self) -> MemoryLocation {
        match self {
            MemoryViewMut::Host(_) => MemoryLocation::Host,
            MemoryViewMut::Device(_) => MemoryLocation::Device,
        }
    }

    #[inline]
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            MemoryViewMut::Host(_) => None,
            MemoryViewMut::Device(data) => Some(data.device_id()),
        }
    }
}

impl<'a, F> From<&'a [F]> for MemoryView<'a, F> {
    fn from(data: &'a [F]) -> Self {
        MemoryView::Host(data)
    }
}

impl<'a, F> From<&'a Vec<F>> for MemoryView<'a, F> {
    fn from(data: &'a Vec<F>) -> Self {
        MemoryView::Host(data)
    }
}

impl<'a, F> From<&'a DeviceVec<F>> for MemoryView<'a, F> {
    fn from(data: &'a DeviceVec<F>) -> Self {
        MemoryView::Device(data)
    }
}

impl<'a, F> From<&'a mut [F]> for MemoryViewMut<'a, F> {
    fn from(data: &'a mut [F]) -> Self {
        MemoryViewMut::Host(data)
    }
}

impl<'a, F> From<&'a mut Vec<F>> for MemoryViewMut<'a, F> {
    fn from(data: &'a mut Vec<F>) -> Self {
        MemoryViewMut::Host(data)
    }
}

impl<'a, F> From<&'a mut DeviceVec<F>> for MemoryViewMut<'a, F> {
    fn from(data: &'a mut DeviceVec<F>) -> Self {
        MemoryViewMut::Device(data)
    }
}
