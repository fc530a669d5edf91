use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire kernel crate.
pub type Result<T> = std::result::Result<T, KernelErr>;

/// Contract violations detected while setting up or invoking the kernel.
///
/// None of these are raised from inside the polydispersity loop, every check
/// happens once before the first grid point is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    TooManyDimensions {
        got: usize,
        max: usize,
    },
    EmptyGrid {
        dim: usize,
    },
    InconsistentStride {
        dim: usize,
        got: usize,
        expected: usize,
    },
    TooManyEvaluations {
        dim: usize,
    },
    InconsistentEvaluations {
        got: usize,
        expected: usize,
    },
    GridOutOfBounds {
        dim: usize,
        end: usize,
        len: usize,
    },
    InvalidParameterIndex {
        what: &'static str,
        index: usize,
        num_pars: usize,
    },
    DuplicateParameter {
        index: usize,
    },
    RequiresPlaneQ {
        what: &'static str,
    },
    InvalidRange {
        start: usize,
        stop: usize,
        total: usize,
    },
}

impl Display for KernelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch in {what}: got {got}, expected {expected}"),
            KernelErr::TooManyDimensions { got, max } => write!(
                f,
                "{got} polydisperse dimensions requested but at most {max} are supported"
            ),
            KernelErr::EmptyGrid { dim } => {
                write!(f, "polydispersity dimension {dim} has an empty grid")
            }
            KernelErr::InconsistentStride { dim, got, expected } => write!(
                f,
                "polydispersity dimension {dim} has stride {got}, expected {expected}"
            ),
            KernelErr::TooManyEvaluations { dim } => write!(
                f,
                "the polydispersity grids overflow the evaluation count at dimension {dim}"
            ),
            KernelErr::InconsistentEvaluations { got, expected } => write!(
                f,
                "the descriptor declares {got} evaluations but its grids span {expected}"
            ),
            KernelErr::GridOutOfBounds { dim, end, len } => write!(
                f,
                "polydispersity dimension {dim} ends at {end}, past the {len} stored weights"
            ),
            KernelErr::InvalidParameterIndex {
                what,
                index,
                num_pars,
            } => write!(
                f,
                "{what} index {index} is outside the {num_pars} model parameters"
            ),
            KernelErr::DuplicateParameter { index } => {
                write!(f, "parameter {index} is targeted more than once")
            }
            KernelErr::RequiresPlaneQ { what } => {
                write!(f, "{what} requires (qx, qy) pairs as input")
            }
            KernelErr::InvalidRange { start, stop, total } => write!(
                f,
                "invalid polydispersity range {start}..{stop} for {total} evaluations"
            ),
        }
    }
}

impl Error for KernelErr {}
