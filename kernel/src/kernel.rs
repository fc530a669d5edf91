use std::ops::Range;

use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    accumulator::Accumulator,
    config::{KernelConfig, NUM_LEADING, OrientationMode, QInput},
    details::ProblemDetails,
    error::{KernelErr, Result},
    magnetic::Magnetism,
    orientation::{Angles, Rotation},
    parameters::{ParameterBlock, ParameterLayout, ParameterTable},
    shape::ShapeModel,
    walker::PdCursor,
    weights::WeightStorage,
};

/// Below this many q points the per-q loop stays on the calling thread.
const MIN_PARALLEL_Q: usize = 32;

/// Evaluates the shape model at one q point.
type QEval<M> = fn(&M, &Rotation, &[f64], &ParameterTable<'_>) -> f64;

/// How a q point reaches the shape model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// `iq(q)` on 1-D input.
    Radial1d,
    /// `iq(|q|)` on `(qx, qy)` input.
    Radial2d,
    /// `iq_ac` after the symmetric orientation transform.
    Symmetric,
    /// `iq_abc` after the full orientation transform.
    Asymmetric,
}

impl Projection {
    /// Selects the projection for a configuration.
    pub fn resolve(config: &KernelConfig) -> Self {
        match (config.q_input(), config.orientation()) {
            (QInput::Radial, _) => Projection::Radial1d,
            (QInput::Plane, OrientationMode::None) => Projection::Radial2d,
            (QInput::Plane, OrientationMode::Symmetric) => Projection::Symmetric,
            (QInput::Plane, OrientationMode::Asymmetric) => Projection::Asymmetric,
        }
    }

    fn eval_fn<M: ShapeModel>(self) -> QEval<M> {
        match self {
            Projection::Radial1d => radial_1d::<M> as QEval<M>,
            Projection::Radial2d => radial_2d::<M> as QEval<M>,
            Projection::Symmetric => symmetric::<M> as QEval<M>,
            Projection::Asymmetric => asymmetric::<M> as QEval<M>,
        }
    }
}

fn radial_1d<M: ShapeModel>(model: &M, _: &Rotation, q: &[f64], pars: &ParameterTable<'_>) -> f64 {
    model.iq(q[0], pars)
}

fn radial_2d<M: ShapeModel>(model: &M, _: &Rotation, q: &[f64], pars: &ParameterTable<'_>) -> f64 {
    model.iq(q[0].hypot(q[1]), pars)
}

fn symmetric<M: ShapeModel>(
    model: &M,
    rotation: &Rotation,
    q: &[f64],
    pars: &ParameterTable<'_>,
) -> f64 {
    let (qa, qc) = rotation.symmetric(q[0], q[1]);
    model.iq_ac(qa, qc, pars)
}

fn asymmetric<M: ShapeModel>(
    model: &M,
    rotation: &Rotation,
    q: &[f64],
    pars: &ParameterTable<'_>,
) -> f64 {
    let (qa, qb, qc) = rotation.asymmetric(q[0], q[1]);
    model.iq_abc(qa, qb, qc, pars)
}

/// The arguments of one kernel invocation.
#[derive(Debug, Clone)]
pub struct KernelCall<'a> {
    /// Amount of q points.
    pub nq: usize,
    /// Half-open range of flat polydispersity steps to evaluate.
    pub pd: Range<usize>,
    /// `[scale, background, pars.., magnetic.., pd values.., pd weights..]`.
    pub values: &'a [f64],
    /// `nq` magnitudes or `nq` `(qx, qy)` pairs.
    pub q: &'a [f64],
    /// Grid points with a combined weight at or below this are skipped.
    pub cutoff: f64,
}

/// Everything needed to evaluate one grid point over all q.
struct Point<'p, M> {
    model: &'p M,
    layout: &'p ParameterLayout,
    eval: QEval<M>,
    rotation: Rotation,
    weight: f64,
    block: &'p ParameterBlock,
}

/// The polydispersity integration engine for one shape model.
#[derive(Debug)]
pub struct Kernel<'m, M: ShapeModel> {
    model: &'m M,
    config: KernelConfig,
    details: ProblemDetails,
    projection: Projection,
}

impl<'m, M: ShapeModel> Kernel<'m, M> {
    /// Creates a new `Kernel`, validating the configuration and descriptor once.
    ///
    /// # Arguments
    /// * `model` - The shape model to average.
    /// * `config` - The variant selection.
    /// * `details` - The polydispersity hypercube.
    ///
    /// # Returns
    /// A new kernel or the first contract violation found.
    pub fn new(model: &'m M, config: KernelConfig, details: ProblemDetails) -> Result<Self> {
        config.validate()?;

        let num_pars = model.layout().len();
        if num_pars != config.num_pars() {
            return Err(KernelErr::SizeMismatch {
                what: "model parameters",
                got: config.num_pars(),
                expected: num_pars,
            });
        }

        details.validate_against(num_pars, config.orientation().num_angles())?;

        let projection = Projection::resolve(&config);
        debug!(
            "kernel ready: {} pars, {} pd dims, {} evaluations, {projection:?}, magnetic={}",
            num_pars,
            details.num_active(),
            details.num_eval(),
            config.is_magnetic()
        );

        Ok(Self {
            model,
            config,
            details,
            projection,
        })
    }

    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[inline]
    pub fn details(&self) -> &ProblemDetails {
        &self.details
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Minimum length of a `values` array for this kernel.
    pub fn num_values(&self) -> usize {
        self.config.num_values() + 2 * self.details.num_weights()
    }

    /// Walks `call.pd` and accumulates into `result`.
    ///
    /// `result` holds `nq` weighted sums followed by the normalization; it is
    /// cleared when `call.pd.start == 0` and added into otherwise, so
    /// consecutive calls over adjacent ranges compose into one computation.
    ///
    /// # Returns
    /// An error if the arguments don't fit the kernel; `result` is untouched then.
    pub fn run(&self, call: &KernelCall<'_>, result: &mut [f64]) -> Result<()> {
        self.check(call)?;

        let KernelCall {
            nq,
            ref pd,
            values,
            q,
            cutoff,
        } = *call;

        let mut acc = Accumulator::open(result, nq, pd.start)?;
        let layout = self.model.layout();
        let num_pars = self.config.num_pars();

        let mut block = ParameterBlock::new(&values[NUM_LEADING..NUM_LEADING + num_pars]);
        let view = self.view_angles(values, &mut block);
        let magnetism = self
            .config
            .is_magnetic()
            .then(|| Magnetism::from_values(&self.config, values));

        let storage = WeightStorage::new(
            &values[self.config.num_values()..],
            self.details.num_weights(),
        );
        let mut cursor = PdCursor::new(&self.details, storage, pd.start);
        cursor.load(&mut block);

        let eval = self.projection.eval_fn::<M>();
        let mut evaluated = 0usize;
        let mut step = pd.start;

        while step < pd.end {
            let weight = cursor.weight();

            // zero weights stay excluded whatever the cutoff
            if weight != 0.0 && weight > cutoff && !self.model.is_invalid(&block.table(layout)) {
                acc.add_norm(weight * self.model.volume(&block.table(layout)));

                let point = Point {
                    model: self.model,
                    layout,
                    eval,
                    rotation: self.rotation(view.as_ref(), &block),
                    weight,
                    block: &block,
                };

                match &magnetism {
                    Some(magnetism) => self.scatter_magnetic(&point, magnetism, q, acc.sums_mut()),
                    None => self.scatter(&point, q, acc.sums_mut()),
                }

                evaluated += 1;
            }

            step += 1;
            if !cursor.advance(&mut block) {
                break;
            }
        }

        trace!(
            "pd steps {}..{}: evaluated {evaluated}, skipped {}",
            pd.start,
            step,
            step - pd.start - evaluated
        );

        acc.finish();
        Ok(())
    }

    fn check(&self, call: &KernelCall<'_>) -> Result<()> {
        let total = self.details.num_eval();
        if call.pd.start > call.pd.end || call.pd.end > total {
            return Err(KernelErr::InvalidRange {
                start: call.pd.start,
                stop: call.pd.end,
                total,
            });
        }

        let expected = call.nq * self.config.q_input().stride();
        if call.q.len() != expected {
            return Err(KernelErr::SizeMismatch {
                what: "q",
                got: call.q.len(),
                expected,
            });
        }

        let expected = self.num_values();
        if call.values.len() < expected {
            return Err(KernelErr::SizeMismatch {
                what: "values",
                got: call.values.len(),
                expected,
            });
        }

        Ok(())
    }

    /// Reads the mean orientation and clears the jitter slots of the block.
    fn view_angles(&self, values: &[f64], block: &mut ParameterBlock) -> Option<Angles> {
        let num_angles = self.config.orientation().num_angles();
        let theta = self.details.theta_par().filter(|_| num_angles > 0)?;

        let mean = &values[NUM_LEADING + theta..NUM_LEADING + theta + num_angles];
        for k in 0..num_angles {
            block.set(theta + k, 0.0);
        }

        Some(Angles::new(
            mean[0],
            mean[1],
            mean.get(2).copied().unwrap_or(0.0),
        ))
    }

    fn rotation(&self, view: Option<&Angles>, block: &ParameterBlock) -> Rotation {
        let (Some(view), Some(theta)) = (view, self.details.theta_par()) else {
            return Rotation::identity();
        };

        let psi = match self.config.orientation() {
            OrientationMode::Asymmetric => block.get(theta + 2),
            _ => 0.0,
        };
        let jitter = Angles::new(block.get(theta), block.get(theta + 1), psi);

        Rotation::new(view, &jitter)
    }

    fn scatter(&self, point: &Point<'_, M>, q: &[f64], sums: &mut [f64]) {
        let stride = self.config.q_input().stride();
        let table = point.block.table(point.layout);

        let add = |(sum, q): (&mut f64, &[f64])| {
            *sum += point.weight * (point.eval)(point.model, &point.rotation, q, &table);
        };

        if self.parallel(sums.len()) {
            sums.par_iter_mut().zip(q.par_chunks(stride)).for_each(add);
        } else {
            sums.iter_mut().zip(q.chunks(stride)).for_each(add);
        }
    }

    fn scatter_magnetic(
        &self,
        point: &Point<'_, M>,
        magnetism: &Magnetism,
        q: &[f64],
        sums: &mut [f64],
    ) {
        let add = |local: &mut ParameterBlock, (sum, q): (&mut f64, &[f64])| {
            let scattering = magnetism.scatter(q[0], q[1], point.block, local, |prepared| {
                (point.eval)(
                    point.model,
                    &point.rotation,
                    q,
                    &prepared.table(point.layout),
                )
            });

            *sum += point.weight * scattering;
        };

        if self.parallel(sums.len()) {
            sums.par_iter_mut()
                .zip(q.par_chunks(2))
                .for_each_init(|| point.block.clone(), add);
        } else {
            let mut local = point.block.clone();
            sums.iter_mut()
                .zip(q.chunks(2))
                .for_each(|item| add(&mut local, item));
        }
    }

    #[inline]
    fn parallel(&self, nq: usize) -> bool {
        self.config.parallel_q() && nq >= MIN_PARALLEL_Q
    }
}

/// Runs a single invocation without keeping the kernel around.
///
/// # Arguments
/// * `model` - The shape model to average.
/// * `config` - The variant selection.
/// * `details` - The polydispersity hypercube.
/// * `call` - The invocation arguments.
/// * `result` - The `nq + 1` long accumulation buffer.
pub fn kernel_iq<M: ShapeModel>(
    model: &M,
    config: KernelConfig,
    details: ProblemDetails,
    call: &KernelCall<'_>,
    result: &mut [f64],
) -> Result<()> {
    Kernel::new(model, config, details)?.run(call, result)
}
