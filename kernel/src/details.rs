use std::collections::HashSet;

use crate::{
    config::MAX_PD,
    error::{KernelErr, Result},
};

/// One active polydispersity dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolyDim {
    /// Index of the targeted parameter in the parameter block.
    pub parameter: usize,
    /// Length of this dimension's value and weight grids.
    pub length: usize,
    /// Offset of the grids inside the shared weight storage.
    pub offset: usize,
    /// Distance in flat-index steps between consecutive grid indices.
    pub stride: usize,
}

/// Static description of the polydispersity hypercube.
///
/// Dimensions are ordered from the fastest to the slowest varying one, so
/// `dims[0].stride == 1` and every other stride is the product of the lengths
/// of the dimensions before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemDetails {
    dims: [PolyDim; MAX_PD],
    num_active: usize,
    num_eval: usize,
    num_weights: usize,
    theta_par: Option<usize>,
}

impl ProblemDetails {
    /// Creates a new `ProblemDetails` from fully specified dimensions.
    ///
    /// # Arguments
    /// * `dims` - The active dimensions, fastest first.
    /// * `num_weights` - Combined length of every dimension's grid.
    /// * `theta_par` - Index of the first orientation parameter, if orientation is modeled.
    ///
    /// # Returns
    /// The descriptor, or an error if the mixed-radix encoding is inconsistent.
    pub fn new(dims: &[PolyDim], num_weights: usize, theta_par: Option<usize>) -> Result<Self> {
        if dims.len() > MAX_PD {
            return Err(KernelErr::TooManyDimensions {
                got: dims.len(),
                max: MAX_PD,
            });
        }

        let mut expected_stride = 1usize;
        let mut parameters = HashSet::with_capacity(dims.len());

        for (k, dim) in dims.iter().enumerate() {
            if dim.length == 0 {
                return Err(KernelErr::EmptyGrid { dim: k });
            }

            if dim.stride != expected_stride {
                return Err(KernelErr::InconsistentStride {
                    dim: k,
                    got: dim.stride,
                    expected: expected_stride,
                });
            }

            let end = dim.offset.saturating_add(dim.length);
            if end > num_weights {
                return Err(KernelErr::GridOutOfBounds {
                    dim: k,
                    end,
                    len: num_weights,
                });
            }

            if !parameters.insert(dim.parameter) {
                return Err(KernelErr::DuplicateParameter {
                    index: dim.parameter,
                });
            }

            expected_stride = expected_stride
                .checked_mul(dim.length)
                .ok_or(KernelErr::TooManyEvaluations { dim: k })?;
        }

        let mut stored = [PolyDim::default(); MAX_PD];
        stored[..dims.len()].copy_from_slice(dims);

        Ok(Self {
            dims: stored,
            num_active: dims.len(),
            num_eval: expected_stride,
            num_weights,
            theta_par,
        })
    }

    /// Lays out the grids contiguously and derives offsets and strides.
    ///
    /// # Arguments
    /// * `grids` - `(parameter, length)` pairs, fastest varying first.
    /// * `theta_par` - Index of the first orientation parameter, if orientation is modeled.
    pub fn from_lengths(grids: &[(usize, usize)], theta_par: Option<usize>) -> Result<Self> {
        let mut dims = Vec::with_capacity(grids.len());
        let mut offset = 0usize;
        let mut stride = 1usize;

        for (k, &(parameter, length)) in grids.iter().enumerate() {
            dims.push(PolyDim {
                parameter,
                length,
                offset,
                stride,
            });

            offset = offset
                .checked_add(length)
                .ok_or(KernelErr::TooManyEvaluations { dim: k })?;
            stride = stride
                .checked_mul(length.max(1))
                .ok_or(KernelErr::TooManyEvaluations { dim: k })?;
        }

        Self::new(&dims, offset, theta_par)
    }

    /// Like `new` but also checks a declared total evaluation count, as
    /// received from hosts that ship the count alongside the dimensions.
    pub fn with_declared_evaluations(
        dims: &[PolyDim],
        num_weights: usize,
        num_eval: usize,
        theta_par: Option<usize>,
    ) -> Result<Self> {
        let details = Self::new(dims, num_weights, theta_par)?;

        if details.num_eval != num_eval {
            return Err(KernelErr::InconsistentEvaluations {
                got: num_eval,
                expected: details.num_eval,
            });
        }

        Ok(details)
    }

    /// Returns the active dimensions, fastest first.
    #[inline]
    pub fn active(&self) -> &[PolyDim] {
        &self.dims[..self.num_active]
    }

    #[inline]
    pub fn num_active(&self) -> usize {
        self.num_active
    }

    /// Size of the full Cartesian product of the grids.
    #[inline]
    pub fn num_eval(&self) -> usize {
        self.num_eval
    }

    /// Combined length of all grids inside the weight storage.
    #[inline]
    pub fn num_weights(&self) -> usize {
        self.num_weights
    }

    #[inline]
    pub fn theta_par(&self) -> Option<usize> {
        self.theta_par
    }

    /// Reconstructs the per-dimension grid indices of a flat step.
    ///
    /// # Arguments
    /// * `step` - A flat index in `[0, num_eval)`.
    ///
    /// # Returns
    /// The index for each active dimension; unused trailing slots are zero.
    pub fn decode(&self, step: usize) -> [usize; MAX_PD] {
        let mut index = [0; MAX_PD];

        for (i, dim) in index.iter_mut().zip(self.active()) {
            *i = (step / dim.stride) % dim.length;
        }

        index
    }

    /// Checks that the parameter and orientation indices fit a parameter block.
    ///
    /// # Arguments
    /// * `num_pars` - The amount of model parameters.
    /// * `num_angles` - Consecutive orientation angles starting at `theta_par`.
    pub fn validate_against(&self, num_pars: usize, num_angles: usize) -> Result<()> {
        for dim in self.active() {
            if dim.parameter >= num_pars {
                return Err(KernelErr::InvalidParameterIndex {
                    what: "polydisperse parameter",
                    index: dim.parameter,
                    num_pars,
                });
            }
        }

        match (self.theta_par, num_angles) {
            (None, 0) => Ok(()),
            (Some(theta), n) if theta < num_pars && n <= num_pars - theta => Ok(()),
            (theta, _) => Err(KernelErr::InvalidParameterIndex {
                what: "orientation",
                index: theta.unwrap_or(usize::MAX),
                num_pars,
            }),
        }
    }
}

impl Default for ProblemDetails {
    /// A descriptor without polydispersity: a single evaluation.
    fn default() -> Self {
        Self {
            dims: [PolyDim::default(); MAX_PD],
            num_active: 0,
            num_eval: 1,
            num_weights: 0,
            theta_par: None,
        }
    }
}
