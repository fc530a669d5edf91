use std::fmt;

use kernel::KernelErr;

/// The result type used in the entire driver crate.
pub type Result<T> = std::result::Result<T, DriverError>;

/// All errors that can occur while preparing or running a problem.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverError {
    /// The problem specification is inconsistent, caught before any kernel call.
    InvalidProblem(String),
    /// The kernel rejected its setup or arguments.
    Kernel(KernelErr),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProblem(msg) => write!(f, "invalid problem: {msg}"),
            Self::Kernel(e) => write!(f, "kernel error: {e}"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Kernel(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KernelErr> for DriverError {
    fn from(e: KernelErr) -> Self {
        Self::Kernel(e)
    }
}
