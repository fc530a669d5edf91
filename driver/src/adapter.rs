use std::{collections::HashSet, num::NonZeroUsize};

use kernel::{KernelConfig, MAX_PD, OrientationMode, ProblemDetails, QInput, ShapeModel};
use log::debug;
use shapes::{ParameterKind, Shape};
use specs::{DispersionSpec, MagnetismSpec, ProblemSpec};

use crate::{
    error::{DriverError, Result},
    q::QPoints,
};

/// A validated problem, ready to be handed to the kernel.
#[derive(Debug, Clone)]
pub struct Problem {
    pub shape: Shape,
    pub config: KernelConfig,
    pub details: ProblemDetails,
    /// The full kernel `values` array.
    pub values: Vec<f64>,
    pub q: QPoints,
    pub scale: f64,
    pub background: f64,
    pub cutoff: f64,
    pub chunk: Option<NonZeroUsize>,
    pub shards: Option<NonZeroUsize>,
}

/// Turns problem specifications into kernel inputs.
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Validates a specification and lays out its kernel inputs.
    ///
    /// # Arguments
    /// * `spec` - The problem as read from the user.
    ///
    /// # Returns
    /// The validated problem or the first inconsistency found.
    pub fn adapt(&self, spec: &ProblemSpec) -> Result<Problem> {
        let shape = Shape::by_name(&spec.model).ok_or_else(|| {
            DriverError::InvalidProblem(format!(
                "unknown model {:?}, expected one of {:?}",
                spec.model,
                Shape::NAMES
            ))
        })?;

        let q = QPoints::from_spec(&spec.q)?;

        self.validate_dispersions(&shape, &spec.dispersions, q.input())?;
        if let Some(magnetism) = &spec.magnetism {
            self.validate_magnetism(&shape, magnetism, q.input())?;
        }

        let pars = self.adapt_parameters(&shape, spec)?;
        let (theta_par, orientation) = match (q.input(), shape.orientation()) {
            (QInput::Plane, (theta, mode)) => (theta, mode),
            (QInput::Radial, _) => (None, OrientationMode::None),
        };

        let magnetic = spec
            .magnetism
            .as_ref()
            .map(|m| self.adapt_magnetism(&shape, m))
            .unwrap_or_default();

        let config = KernelConfig::new(pars.len(), q.input())
            .with_orientation(orientation)
            .with_magnetism(magnetic.iter().map(|&(index, _)| index));

        let grids = spec
            .dispersions
            .iter()
            .map(|d| Ok((self.index_of(&shape, &d.parameter)?, d.values.len())))
            .collect::<Result<Vec<_>>>()?;
        let details = ProblemDetails::from_lengths(&grids, theta_par)?;

        let mut values = Vec::with_capacity(config.num_values() + 2 * details.num_weights());
        values.extend([spec.scale, spec.background]);
        values.extend(&pars);

        // without a magnetized density the kernel runs the nuclear path
        if let Some(m) = spec.magnetism.as_ref().filter(|_| !magnetic.is_empty()) {
            values.extend([m.up_frac_i, m.up_frac_f, m.up_angle]);
            for (_, magnetization) in &magnetic {
                values.extend(magnetization);
            }
        }

        for dispersion in &spec.dispersions {
            values.extend(&dispersion.values);
        }
        for dispersion in &spec.dispersions {
            values.extend(&dispersion.weights);
        }

        debug!(
            "adapted {}: {} parameters, {} dispersions, {} magnetic densities, {} q points",
            shape.name(),
            pars.len(),
            spec.dispersions.len(),
            magnetic.len(),
            q.len()
        );

        Ok(Problem {
            shape,
            config,
            details,
            values,
            q,
            scale: spec.scale,
            background: spec.background,
            cutoff: spec.cutoff,
            chunk: spec.chunk,
            shards: spec.shards,
        })
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate_dispersions(
        &self,
        shape: &Shape,
        dispersions: &[DispersionSpec],
        input: QInput,
    ) -> Result<()> {
        if dispersions.len() > MAX_PD {
            return Err(DriverError::InvalidProblem(format!(
                "{} dispersions requested but at most {MAX_PD} are supported",
                dispersions.len()
            )));
        }

        let mut seen = HashSet::with_capacity(dispersions.len());
        for d in dispersions {
            let index = self.index_of(shape, &d.parameter)?;

            if !seen.insert(index) {
                return Err(DriverError::InvalidProblem(format!(
                    "parameter {:?} is dispersed more than once",
                    d.parameter
                )));
            }

            if d.values.is_empty() {
                return Err(DriverError::InvalidProblem(format!(
                    "dispersion of {:?} has an empty grid",
                    d.parameter
                )));
            }

            if d.values.len() != d.weights.len() {
                return Err(DriverError::InvalidProblem(format!(
                    "dispersion of {:?} has {} values but {} weights",
                    d.parameter,
                    d.values.len(),
                    d.weights.len()
                )));
            }

            let kind = shape.parameters()[index].kind;
            if kind == ParameterKind::Orientation && input == QInput::Radial {
                return Err(DriverError::InvalidProblem(format!(
                    "orientation dispersion of {:?} requires (qx, qy) input",
                    d.parameter
                )));
            }
        }

        Ok(())
    }

    fn validate_magnetism(
        &self,
        shape: &Shape,
        magnetism: &MagnetismSpec,
        input: QInput,
    ) -> Result<()> {
        if input == QInput::Radial {
            return Err(DriverError::InvalidProblem(
                "magnetism requires (qx, qy) input".into(),
            ));
        }

        for name in magnetism.magnetization.keys() {
            let index = self.index_of(shape, name)?;

            if !shape.is_sld(index) {
                return Err(DriverError::InvalidProblem(format!(
                    "{name:?} is not a scattering length density of {}",
                    shape.name()
                )));
            }
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    fn adapt_parameters(&self, shape: &Shape, spec: &ProblemSpec) -> Result<Vec<f64>> {
        let mut pars = shape.defaults();

        for (name, &value) in &spec.parameters {
            pars[self.index_of(shape, name)?] = value;
        }

        Ok(pars)
    }

    /// Returns the magnetic densities sorted by parameter index.
    fn adapt_magnetism(&self, shape: &Shape, magnetism: &MagnetismSpec) -> Vec<(usize, [f64; 3])> {
        let mut magnetic: Vec<(usize, [f64; 3])> = magnetism
            .magnetization
            .iter()
            .filter_map(|(name, &m)| shape.layout().index_of(name).map(|index| (index, m)))
            .collect();

        magnetic.sort_by_key(|&(index, _)| index);
        magnetic
    }

    fn index_of(&self, shape: &Shape, name: &str) -> Result<usize> {
        shape.layout().index_of(name).ok_or_else(|| {
            DriverError::InvalidProblem(format!(
                "{} has no parameter {name:?}",
                shape.name()
            ))
        })
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new()
    }
}
