pub mod problem;
pub mod q;

pub use problem::{DispersionSpec, MagnetismSpec, ProblemSpec};
pub use q::QSpec;
