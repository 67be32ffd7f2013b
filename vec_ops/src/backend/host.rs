use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{BackendError, ConfigExtension, VecOpsConfig, VecOpsResult};

/// Extension key: run host kernels on a dedicated pool of this many threads
/// instead of the global rayon pool.
pub const HOST_NUM_THREADS: &str = "host.num_threads";

/// Dedicated host pools keyed by thread count, built on first use and shared
/// by every clone of the owning dispatcher.
#[derive(Debug, Default, Clone)]
pub(crate) struct HostPools {
    pools: Arc<Mutex<HashMap<usize, Arc<ThreadPool>>>>,
}

impl HostPools {
    pub(crate) fn get(&self, threads: usize) -> VecOpsResult<Arc<ThreadPool>> {
        let mut pools = self.pools.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(pool) = pools.get(&threads) {
            return Ok(pool.clone());
        }

        log::debug!("building host pool with {threads} threads");
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(BackendError::from)?,
        );
        pools.insert(threads, pool.clone());
        Ok(pool)
    }
}

/// Runs kernels on the calling thread's rayon pool. Host work always
/// completes before the call returns, asynchronous or not.
pub(crate) struct HostBackend<'c> {
    ext: &'c ConfigExtension,
    pools: &'c HostPools,
}

impl<'c> HostBackend<'c> {
    pub(crate) fn new(cfg: &'c VecOpsConfig, pools: &'c HostPools) -> Self {
        if cfg.is_async {
            log::debug!("host backend completes asynchronous requests before returning");
        }
        if cfg.stream.is_some() {
            log::debug!("host backend ignores the configured stream");
        }
        Self {
            ext: &cfg.ext,
            pools,
        }
    }

    pub(crate) fn run<R, K>(&self, kernel: K) -> VecOpsResult<R>
    where
        R: Send,
        K: FnOnce() -> R + Send,
    {
        let threads = match self.ext.get(HOST_NUM_THREADS) {
            None => return Ok(kernel()),
            Some(value) => match value.as_u64() {
                Some(n) => n as usize,
                None => {
                    log::warn!("ignoring non-integer {HOST_NUM_THREADS} = {value:?}");
                    return Ok(kernel());
                }
            },
        };

        Ok(self.pools.get(threads)?.install(kernel))
    }
}
