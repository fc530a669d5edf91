use std::collections::HashSet;

use crate::error::{KernelErr, Result};

/// Maximum number of simultaneously polydisperse parameters.
pub const MAX_PD: usize = 5;

/// Leading `values` entries that precede the model parameters (scale, background).
pub const NUM_LEADING: usize = 2;

/// Polarization entries (up_frac_i, up_frac_f, up_angle) preceding the magnetization vectors.
pub const NUM_POLARIZATION: usize = 3;

/// How the shape model is oriented with respect to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationMode {
    /// Orientation is not modeled; 2-D input collapses to `|q|`.
    #[default]
    None,
    /// Rotationally symmetric about the particle axis: `theta, phi`.
    Symmetric,
    /// Fully asymmetric particle: `theta, phi, psi`.
    Asymmetric,
}

impl OrientationMode {
    /// Returns the amount of consecutive orientation angles in the parameter vector.
    pub fn num_angles(self) -> usize {
        match self {
            OrientationMode::None => 0,
            OrientationMode::Symmetric => 2,
            OrientationMode::Asymmetric => 3,
        }
    }
}

/// Shape of the `q` input array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QInput {
    /// One scalar `|q|` per point.
    #[default]
    Radial,
    /// One `(qx, qy)` pair per point.
    Plane,
}

impl QInput {
    /// Returns the amount of scalars used per q point.
    pub fn stride(self) -> usize {
        match self {
            QInput::Radial => 1,
            QInput::Plane => 2,
        }
    }
}

/// Immutable configuration of a kernel, the runtime counterpart of the
/// variant selection that happens once per computation.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelConfig {
    num_pars: usize,
    orientation: OrientationMode,
    q_input: QInput,
    magnetic_slds: Vec<usize>,
    parallel_q: bool,
}

impl KernelConfig {
    /// Creates a new non-magnetic, unoriented configuration.
    ///
    /// # Arguments
    /// * `num_pars` - The amount of model parameters, scale and background excluded.
    /// * `q_input` - The shape of the q input array.
    ///
    /// # Returns
    /// A new `KernelConfig` instance.
    pub fn new(num_pars: usize, q_input: QInput) -> Self {
        Self {
            num_pars,
            orientation: OrientationMode::None,
            q_input,
            magnetic_slds: Vec::new(),
            parallel_q: true,
        }
    }

    /// Sets the orientation mode.
    pub fn with_orientation(mut self, orientation: OrientationMode) -> Self {
        self.orientation = orientation;
        self
    }

    /// Enables magnetism for the given scattering length density parameters.
    ///
    /// # Arguments
    /// * `slds` - Parameter indices of the densities that carry a magnetization vector,
    ///   in the same order as the magnetization triplets in `values`.
    pub fn with_magnetism<I>(mut self, slds: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.magnetic_slds = slds.into_iter().collect();
        self
    }

    /// Toggles distributing the per-q loop over the rayon thread pool.
    pub fn with_parallel_q(mut self, parallel_q: bool) -> Self {
        self.parallel_q = parallel_q;
        self
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Returns
    /// An error describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.orientation != OrientationMode::None && self.q_input != QInput::Plane {
            return Err(KernelErr::RequiresPlaneQ {
                what: "orientation",
            });
        }

        if self.is_magnetic() && self.q_input != QInput::Plane {
            return Err(KernelErr::RequiresPlaneQ { what: "magnetism" });
        }

        let mut seen = HashSet::with_capacity(self.magnetic_slds.len());
        for &index in &self.magnetic_slds {
            if index >= self.num_pars {
                return Err(KernelErr::InvalidParameterIndex {
                    what: "magnetic sld",
                    index,
                    num_pars: self.num_pars,
                });
            }

            if !seen.insert(index) {
                return Err(KernelErr::DuplicateParameter { index });
            }
        }

        Ok(())
    }

    #[inline]
    pub fn num_pars(&self) -> usize {
        self.num_pars
    }

    #[inline]
    pub fn orientation(&self) -> OrientationMode {
        self.orientation
    }

    #[inline]
    pub fn q_input(&self) -> QInput {
        self.q_input
    }

    #[inline]
    pub fn magnetic_slds(&self) -> &[usize] {
        &self.magnetic_slds
    }

    #[inline]
    pub fn num_magnetic(&self) -> usize {
        self.magnetic_slds.len()
    }

    #[inline]
    pub fn is_magnetic(&self) -> bool {
        !self.magnetic_slds.is_empty()
    }

    #[inline]
    pub fn parallel_q(&self) -> bool {
        self.parallel_q
    }

    /// Returns the offset of the polarization entries in `values`.
    pub fn polarization_offset(&self) -> usize {
        NUM_LEADING + self.num_pars
    }

    /// Returns the offset of the `k`-th magnetization triplet in `values`.
    pub fn magnetization_offset(&self, k: usize) -> usize {
        self.polarization_offset() + NUM_POLARIZATION + 3 * k
    }

    /// Total number of fixed entries in `values` before the polydispersity grids.
    pub fn num_values(&self) -> usize {
        let magnetic = if self.is_magnetic() {
            NUM_POLARIZATION + 3 * self.num_magnetic()
        } else {
            0
        };

        NUM_LEADING + self.num_pars + magnetic
    }
}
