//! Batched element-wise vector arithmetic and matrix transposition over
//! finite-field elements, dispatched to host or device memory.
//!
//! Callers describe buffers with [`MemoryView`] / [`MemoryViewMut`], describe
//! batching, placement and asynchrony with [`VecOpsConfig`], and submit work
//! through a [`Dispatcher`]. Every call either completes (or, for asynchronous
//! device work, is enqueued) or fails as a whole; validation failures never
//! touch the output.

use arith::Field;

mod errors;
pub use errors::*;

mod memory;
pub use memory::*;

mod config;
pub use config::*;

mod layout;
pub use layout::BatchPlan;

mod vec_ops;
pub use vec_ops::{ReduceOp, VecOp};

mod transpose;

mod backend;
pub use backend::HOST_NUM_THREADS;

mod dispatcher;
pub use dispatcher::Dispatcher;

/// Field elements the engines can move across threads and onto streams.
pub trait KernelField: Field + Send + Sync + 'static {}

impl<F: Field + Send + Sync + 'static> KernelField for F {}
