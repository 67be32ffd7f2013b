use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{mpsc, Arc, Condvar, Mutex},
    thread::{self, JoinHandle},
};

use crate::{DeviceId, GpuError, GpuResult};

/// Opaque identifier of a stream owned by a [`crate::Device`].
///
/// Handles are plain values; copying one never affects the stream's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamHandle {
    pub(crate) device: DeviceId,
    pub(crate) index: u64,
}

impl StreamHandle {
    #[inline]
    pub fn device(&self) -> DeviceId {
        self.device
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/stream:{}", self.device, self.index)
    }
}

pub(crate) type Job = Box<dyn FnOnce() -> GpuResult<()> + Send + 'static>;

/// A queued job, plus where to deliver its result. Jobs without a waiter
/// leave their fault on the stream for the next synchronize.
struct Entry {
    job: Job,
    waiter: Option<mpsc::Sender<GpuResult<()>>>,
}

#[derive(Debug, Default)]
struct Progress {
    enqueued: u64,
    completed: u64,
    // first fault since the last synchronize
    fault: Option<GpuError>,
}

/// A FIFO queue of kernels drained by one worker thread.
pub(crate) struct Stream {
    handle: StreamHandle,
    sender: Mutex<Option<mpsc::Sender<Entry>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    progress: Arc<(Mutex<Progress>, Condvar)>,
}

impl Stream {
    pub(crate) fn spawn(handle: StreamHandle) -> GpuResult<Self> {
        let (sender, receiver) = mpsc::channel::<Entry>();
        let progress = Arc::new((Mutex::new(Progress::default()), Condvar::new()));

        let worker_progress = progress.clone();
        let worker = thread::Builder::new()
            .name(format!("{handle}"))
            .spawn(move || {
                for Entry { job, waiter } in receiver {
                    let result = catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
                        Err(GpuError::KernelFault("kernel panicked".to_string()))
                    });
                    if let Err(e) = &result {
                        log::error!("{handle}: {e}");
                    }
                    // a waiting caller owns the result; an abandoned one leaves
                    // it to synchronize
                    let unclaimed = match waiter {
                        Some(waiter) => waiter
                            .send(result)
                            .err()
                            .map_or(Ok(()), |mpsc::SendError(result)| result),
                        None => result,
                    };

                    let (lock, cvar) = &*worker_progress;
                    let mut progress = match lock.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    progress.completed += 1;
                    if let Err(e) = unclaimed {
                        progress.fault.get_or_insert(e);
                    }
                    cvar.notify_all();
                }
            })
            .map_err(|e| GpuError::StreamSpawn(e.to_string()))?;

        log::debug!("spawned {handle}");

        Ok(Self {
            handle,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            progress,
        })
    }

    #[inline]
    pub(crate) fn handle(&self) -> StreamHandle {
        self.handle
    }

    pub(crate) fn enqueue(&self, job: Job) -> GpuResult<()> {
        self.push(Entry { job, waiter: None })
    }

    /// Enqueue `job` and block until it has run, returning its own result.
    ///
    /// Jobs ahead of it on the stream finish first; their faults stay on the
    /// stream for [`Stream::synchronize`].
    pub(crate) fn run(&self, job: Job) -> GpuResult<()> {
        let (waiter, done) = mpsc::channel();
        self.push(Entry {
            job,
            waiter: Some(waiter),
        })?;
        done.recv().unwrap_or(Err(GpuError::StreamClosed(self.handle)))
    }

    fn push(&self, entry: Entry) -> GpuResult<()> {
        let sender = self.sender.lock().map_err(|_| GpuError::Poisoned)?;
        let sender = sender.as_ref().ok_or(GpuError::StreamClosed(self.handle))?;

        // count before sending so a concurrent synchronize cannot miss the job
        self.update(|p| p.enqueued += 1)?;
        if sender.send(entry).is_err() {
            self.update(|p| p.enqueued -= 1)?;
            return Err(GpuError::StreamClosed(self.handle));
        }
        Ok(())
    }

    /// Block until every job enqueued so far has run, then report (and
    /// clear) the first fault recorded since the previous synchronize.
    pub(crate) fn synchronize(&self) -> GpuResult<()> {
        let (lock, cvar) = &*self.progress;
        let guard = lock.lock().map_err(|_| GpuError::Poisoned)?;
        let mut progress = cvar
            .wait_while(guard, |p| p.completed < p.enqueued)
            .map_err(|_| GpuError::Poisoned)?;
        match progress.fault.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Drain the stream, stop the worker and report any pending fault.
    pub(crate) fn close(&self) -> GpuResult<()> {
        let result = self.synchronize();
        self.shutdown();
        result
    }

    fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(worker) = worker.take() {
                if worker.join().is_err() {
                    log::warn!("{}: worker exited abnormally", self.handle);
                }
            }
        }
        log::debug!("closed {}", self.handle);
    }

    fn update(&self, f: impl FnOnce(&mut Progress)) -> GpuResult<()> {
        let (lock, _) = &*self.progress;
        let mut progress = lock.lock().map_err(|_| GpuError::Poisoned)?;
        f(&mut progress);
        Ok(())
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.shutdown();
    }
}
