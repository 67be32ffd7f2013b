use gpu::{Device, DeviceVec, GpuResult, StreamHandle};

use crate::{KernelField, VecOpsConfig, VecOpsResult};

/// Launches kernels on a device stream.
///
/// Each launch captures the storage handles of its buffers, so enqueued work
/// stays valid after the launching call returns. Synchronous calls wait for
/// their own kernel, which runs after earlier work on the same stream, and
/// report only that kernel's outcome. Kernels lock their inputs before their
/// output.
pub(crate) struct DeviceBackend<'d> {
    device: &'d Device,
    stream: Option<StreamHandle>,
    is_async: bool,
}

impl<'d> DeviceBackend<'d> {
    pub(crate) fn new(device: &'d Device, cfg: &VecOpsConfig) -> Self {
        for (key, value) in cfg.ext.iter() {
            log::trace!("{}: forwarding extension {key} = {value:?}", device.id());
        }
        Self {
            device,
            stream: cfg.stream,
            is_async: cfg.is_async,
        }
    }

    fn submit<K>(&self, work_size: usize, kernel: K) -> VecOpsResult<()>
    where
        K: FnOnce() -> GpuResult<()> + Send + 'static,
    {
        if self.is_async {
            self.device.launch(self.stream, work_size, kernel)?;
        } else {
            self.device.launch_sync(self.stream, work_size, kernel)?;
        }
        Ok(())
    }

    /// `kernel(input, out)`
    pub(crate) fn launch_unary<F, K>(
        &self,
        input: &DeviceVec<F>,
        out: &mut DeviceVec<F>,
        work_size: usize,
        kernel: K,
    ) -> VecOpsResult<()>
    where
        F: KernelField,
        K: FnOnce(&[F], &mut [F]) + Send + 'static,
    {
        debug_assert!(!input.same_buffer(out));
        let (input, out) = (input.storage(), out.storage());

        self.submit(work_size, move || {
            let input = input.read()?;
            let mut out = out.write()?;
            kernel(&input, &mut out);
            Ok(())
        })
    }

    /// `kernel(a, b, out)`; `a` and `b` may be the same buffer.
    pub(crate) fn launch_binary<F, K>(
        &self,
        a: &DeviceVec<F>,
        b: &DeviceVec<F>,
        out: &mut DeviceVec<F>,
        work_size: usize,
        kernel: K,
    ) -> VecOpsResult<()>
    where
        F: KernelField,
        K: FnOnce(&[F], &[F], &mut [F]) + Send + 'static,
    {
        debug_assert!(!a.same_buffer(out) && !b.same_buffer(out));
        let same_inputs = a.same_buffer(b);
        let (a, b, out) = (a.storage(), b.storage(), out.storage());

        self.submit(work_size, move || {
            let a = a.read()?;
            // a second read lock from this thread could deadlock
            let b_guard = if same_inputs { None } else { Some(b.read()?) };
            let b: &[F] = match &b_guard {
                Some(b) => b,
                None => &a,
            };
            let mut out = out.write()?;
            kernel(&a, b, &mut out);
            Ok(())
        })
    }

    /// `kernel(inout, other)` with `inout` updated in place.
    pub(crate) fn launch_update<F, K>(
        &self,
        inout: &mut DeviceVec<F>,
        other: &DeviceVec<F>,
        work_size: usize,
        kernel: K,
    ) -> VecOpsResult<()>
    where
        F: KernelField,
        K: FnOnce(&mut [F], &[F]) + Send + 'static,
    {
        debug_assert!(!inout.same_buffer(other));
        let (inout, other) = (inout.storage(), other.storage());

        self.submit(work_size, move || {
            let other = other.read()?;
            let mut inout = inout.write()?;
            kernel(&mut inout, &other);
            Ok(())
        })
    }

    /// `kernel(inout)` with `inout` updated in place.
    pub(crate) fn launch_inplace<F, K>(
        &self,
        inout: &mut DeviceVec<F>,
        work_size: usize,
        kernel: K,
    ) -> VecOpsResult<()>
    where
        F: KernelField,
        K: FnOnce(&mut [F]) + Send + 'static,
    {
        let inout = inout.storage();

        self.submit(work_size, move || {
            let mut inout = inout.write()?;
            kernel(&mut inout);
            Ok(())
        })
    }
}
