use gpu::GpuError;
use rayon::ThreadPoolBuildError;
use thiserror::Error;

/// Failures reported by an execution backend while running a validated call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Device(#[from] GpuError),

    #[error("host thread pool: {0}")]
    HostThreadPool(#[from] ThreadPoolBuildError),
}

#[derive(Debug, Error)]
pub enum VecOpsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("backend failure: {0}")]
    BackendFailure(#[from] BackendError),
}

impl From<GpuError> for VecOpsError {
    fn from(e: GpuError) -> Self {
        VecOpsError::BackendFailure(BackendError::Device(e))
    }
}

pub type VecOpsResult<T> = std::result::Result<T, VecOpsError>;

/// Closed set of call outcomes, for callers that work with plain codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResultCode {
    Success = 0,
    InvalidArgument = 1,
    BackendFailure = 2,
    UnsupportedConfiguration = 3,
}

impl VecOpsError {
    #[inline]
    pub fn code(&self) -> ResultCode {
        match self {
            VecOpsError::InvalidArgument(_) => ResultCode::InvalidArgument,
            VecOpsError::UnsupportedConfiguration(_) => ResultCode::UnsupportedConfiguration,
            VecOpsError::BackendFailure(_) => ResultCode::BackendFailure,
        }
    }
}

impl<T> From<&VecOpsResult<T>> for ResultCode {
    #[inline]
    fn from(result: &VecOpsResult<T>) -> Self {
        match result {
            Ok(_) => ResultCode::Success,
            Err(e) => e.code(),
        }
    }
}

macro_rules! invalid_argument {
    ($($arg:tt)*) => {
        $crate::VecOpsError::InvalidArgument(format!($($arg)*))
    };
}

macro_rules! unsupported {
    ($($arg:tt)*) => {
        $crate::VecOpsError::UnsupportedConfiguration(format!($($arg)*))
    };
}

pub(crate) use {invalid_argument, unsupported};
