pub mod accumulator;
pub mod config;
pub mod details;
pub mod error;
pub mod kernel;
pub mod magnetic;
pub mod orientation;
pub mod parameters;
pub mod shape;
pub mod walker;
pub mod weights;

pub use accumulator::Accumulator;
pub use config::{KernelConfig, MAX_PD, OrientationMode, QInput};
pub use details::{PolyDim, ProblemDetails};
pub use error::{KernelErr, Result};
pub use kernel::{Kernel, KernelCall, Projection, kernel_iq};
pub use parameters::{ParameterBlock, ParameterLayout, ParameterTable};
pub use shape::ShapeModel;
