use std::{fmt, process::exit, str::FromStr, sync::Arc, time::Instant};

use clap::{Parser, Subcommand};
use gpu::{Device, DeviceId, DeviceProperties};
use log::info;
use rand::thread_rng;
use vec_ops::{
    BatchLayout, Dispatcher, KernelField, MemoryView, MemoryViewMut, VecOp, VecOpsConfig,
    VecOpsResult, HOST_NUM_THREADS,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct VecOpsExecArgs {
    /// Field: M31, Goldilocks, or BN254
    #[arg(short, long, default_value = "M31")]
    pub field: String,

    /// Elements per batch, as a power of two
    #[arg(short, long, default_value_t = 16)]
    pub log_size: usize,

    /// Number of batches
    #[arg(short, long, default_value_t = 1)]
    pub batch_size: usize,

    /// Interleave batches as matrix columns instead of contiguous blocks
    #[arg(long, default_value_t = false)]
    pub columns: bool,

    /// Run on a simulated device instead of the host
    #[arg(short, long, default_value_t = false)]
    pub device: bool,

    /// Enqueue device work on a fresh stream and synchronize afterwards
    #[arg(long = "async", default_value_t = false)]
    pub is_async: bool,

    /// Host thread pool size; the global pool is used when absent
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// VecOp, Transpose, or BitReverse subcommands
    #[clap(subcommand)]
    pub subcommands: VecOpsExecSubCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum VecOpsExecSubCommand {
    VecOp {
        /// Add, Sub, or Mul
        #[arg(short, long, default_value = "add")]
        op: String,
    },
    Transpose {
        /// Rows of each matrix, as a power of two; the rest of `log_size`
        /// goes to the columns
        #[arg(short, long)]
        log_rows: usize,
    },
    BitReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    M31,
    Goldilocks,
    BN254,
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m31" => Ok(FieldKind::M31),
            "goldilocks" => Ok(FieldKind::Goldilocks),
            "bn254" => Ok(FieldKind::BN254),
            _ => Err(format!("unknown field `{s}`")),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl VecOpsExecArgs {
    pub fn config(&self) -> VecOpsConfig {
        let layout = if self.columns {
            BatchLayout::Columns
        } else {
            BatchLayout::Contiguous
        };
        let mut cfg = VecOpsConfig::default().with_batch(self.batch_size, layout);
        if let Some(threads) = self.threads {
            cfg.ext.set(HOST_NUM_THREADS, threads);
        }
        cfg
    }

    pub fn total(&self) -> usize {
        (1 << self.log_size) * self.batch_size
    }
}

/// Where the operands of one run live.
enum Placement {
    Host,
    Device(Arc<Device>),
}

/// Copy inputs to the chosen placement, run `call` against them and bring the
/// output back.
fn run_placed<F, C>(
    placement: &Placement,
    cfg: &VecOpsConfig,
    inputs: &[&[F]],
    out_len: usize,
    call: C,
) -> VecOpsResult<Vec<F>>
where
    F: KernelField,
    C: FnOnce(&[MemoryView<'_, F>], MemoryViewMut<'_, F>, &VecOpsConfig) -> VecOpsResult<()>,
{
    match placement {
        Placement::Host => {
            let mut out = vec![F::zero(); out_len];
            let views = inputs.iter().map(|v| MemoryView::host(*v)).collect::<Vec<_>>();
            call(&views, MemoryViewMut::host(&mut out), cfg)?;
            Ok(out)
        }
        Placement::Device(device) => {
            let mut cfg = cfg.clone().on_device();
            if cfg.is_async {
                cfg.stream = Some(device.create_stream()?);
            }
            let buffers = inputs
                .iter()
                .map(|v| device.alloc_from_host(v))
                .collect::<Result<Vec<_>, _>>()?;
            let mut out = device.alloc::<F>(out_len)?;
            let views = buffers.iter().map(MemoryView::device).collect::<Vec<_>>();

            call(&views, MemoryViewMut::device(&mut out), &cfg)?;
            if let Some(stream) = cfg.stream {
                device.synchronize(Some(stream))?;
                device.destroy_stream(stream)?;
            }
            Ok(out.to_host_vec()?)
        }
    }
}

pub fn run_command<F: KernelField>(args: &VecOpsExecArgs) -> VecOpsResult<bool> {
    let mut rng = thread_rng();
    let mut cfg = args.config();
    cfg.is_async = args.is_async;

    let (dispatcher, placement) = if args.device {
        let device = Arc::new(Device::new(DeviceId(0), DeviceProperties::default())?);
        (
            Dispatcher::with_device(device.clone()),
            Placement::Device(device),
        )
    } else {
        (Dispatcher::host(), Placement::Host)
    };

    let total = args.total();
    let a = (0..total)
        .map(|_| F::random_unsafe(&mut rng))
        .collect::<Vec<_>>();
    let per_batch = 1 << args.log_size;

    let timer = Instant::now();
    let verified = match &args.subcommands {
        VecOpsExecSubCommand::VecOp { op } => {
            let op = VecOp::from_str(op)?;
            let b = (0..total)
                .map(|_| F::random_unsafe(&mut rng))
                .collect::<Vec<_>>();
            let out = run_placed(&placement, &cfg, &[&a, &b], total, |views, out, cfg| {
                dispatcher.vec_op(op, views[0], views[1], out, cfg)
            })?;
            info!("{op} over {total} elements took {:?}", timer.elapsed());

            out.iter()
                .zip(a.iter().zip(&b))
                .all(|(o, (x, y))| *o == op.apply(x, y))
        }
        VecOpsExecSubCommand::Transpose { log_rows } => {
            let log_rows = (*log_rows).min(args.log_size);
            let (rows, cols) = (1 << log_rows, 1 << (args.log_size - log_rows));
            let out = run_placed(&placement, &cfg, &[&a], total, |views, out, cfg| {
                dispatcher.transpose(views[0], rows, cols, out, cfg)
            })?;
            info!(
                "transpose of {} {rows}x{cols} matrices took {:?}",
                args.batch_size,
                timer.elapsed()
            );

            // transposing back must restore the input
            let back = run_placed(&placement, &cfg, &[&out], total, |views, out, cfg| {
                dispatcher.transpose(views[0], cols, rows, out, cfg)
            })?;
            back == a
        }
        VecOpsExecSubCommand::BitReverse => {
            let out = run_placed(&placement, &cfg, &[&a], total, |views, out, cfg| {
                dispatcher.bit_reverse(views[0], out, cfg)
            })?;
            info!(
                "bit reversal of {} batches of {per_batch} took {:?}",
                args.batch_size,
                timer.elapsed()
            );

            let back = run_placed(&placement, &cfg, &[&out], total, |views, out, cfg| {
                dispatcher.bit_reverse(views[0], out, cfg)
            })?;
            back == a
        }
    };
    Ok(verified)
}

pub fn exit_on_failure(field: FieldKind, result: VecOpsResult<bool>) {
    match result {
        Ok(true) => info!("{field}: output verified"),
        Ok(false) => {
            log::error!("{field}: output does not match the reference");
            exit(1);
        }
        Err(e) => {
            log::error!("{field}: {e} ({:?})", e.code());
            exit(1);
        }
    }
}
