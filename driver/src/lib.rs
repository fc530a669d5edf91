pub mod adapter;
pub mod error;
pub mod q;
pub mod session;

pub use adapter::{Adapter, Problem};
pub use error::{DriverError, Result};
pub use q::QPoints;
pub use session::{Intensity, Session};

use specs::ProblemSpec;

/// Validates and evaluates a problem specification in one go.
pub fn compute(spec: &ProblemSpec) -> Result<Intensity> {
    let problem = Adapter::new().adapt(spec)?;
    Session::new(problem).run()
}
