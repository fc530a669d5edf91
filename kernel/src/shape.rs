use crate::parameters::{ParameterLayout, ParameterTable};

/// A particle shape whose scattering the kernel averages.
///
/// Only `iq` is mandatory. Oriented shapes override `iq_ac` (symmetric about
/// their `c` axis) or `iq_abc` (no symmetry); the defaults fall back to the
/// magnitude of the rotated vector, which is exact for isotropic shapes.
pub trait ShapeModel: Sync {
    /// Returns the names of the model parameters, in parameter-vector order.
    fn layout(&self) -> &ParameterLayout;

    /// Returns the particle volume used to normalize the average.
    fn volume(&self, pars: &ParameterTable<'_>) -> f64;

    /// Whether the parameter combination is physically meaningless and must be skipped.
    fn is_invalid(&self, _pars: &ParameterTable<'_>) -> bool {
        false
    }

    /// Scattering at the magnitude `q`.
    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64;

    /// Scattering of an axially symmetric particle at in-plane `qa` and axial `qc`.
    fn iq_ac(&self, qa: f64, qc: f64, pars: &ParameterTable<'_>) -> f64 {
        self.iq(qa.hypot(qc), pars)
    }

    /// Scattering of an asymmetric particle at `(qa, qb, qc)` in its own frame.
    fn iq_abc(&self, qa: f64, qb: f64, qc: f64, pars: &ParameterTable<'_>) -> f64 {
        self.iq_ac(qa.hypot(qb), qc, pars)
    }
}
