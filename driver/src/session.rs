use std::ops::Range;

use kernel::{Accumulator, Kernel, KernelCall};
use log::{debug, info, warn};
use rayon::prelude::*;
use shapes::Shape;

use crate::{adapter::Problem, error::Result};

/// The final scattering curve of a problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Intensity {
    /// The q points, flattened as in the problem.
    pub q: Vec<f64>,
    /// `scale * sum / norm + background` per q point.
    pub iq: Vec<f64>,
    /// The accumulated normalization.
    pub norm: f64,
}

/// Runs one problem through the kernel.
#[derive(Debug)]
pub struct Session {
    problem: Problem,
}

impl Session {
    pub fn new(problem: Problem) -> Self {
        Self { problem }
    }

    #[inline]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Evaluates the whole polydispersity cube.
    ///
    /// With more than one shard the cube is split into contiguous ranges that
    /// are evaluated in parallel on fresh buffers and merged afterwards,
    /// otherwise it is walked in `chunk` sized resumed invocations.
    ///
    /// # Returns
    /// The scaled intensity, or the first kernel error.
    pub fn run(&self) -> Result<Intensity> {
        let problem = &self.problem;
        let kernel = Kernel::new(
            &problem.shape,
            problem.config.clone(),
            problem.details.clone(),
        )?;

        let total = kernel.details().num_eval();
        let nq = problem.q.len();
        let shards = problem.shards.map_or(1, |s| s.get()).min(total);

        info!(
            "running {}: {total} grid points over {nq} q points in {shards} shard(s)",
            problem.shape.name()
        );

        let result = if shards > 1 {
            self.run_sharded(&kernel, total, shards)?
        } else {
            let mut result = vec![0.0; nq + 1];
            self.run_range(&kernel, 0..total, &mut result)?;
            result
        };

        Ok(self.intensity(result))
    }

    /// Walks `range` in consecutive chunks over the same buffer.
    fn run_range(
        &self,
        kernel: &Kernel<'_, Shape>,
        range: Range<usize>,
        result: &mut [f64],
    ) -> Result<()> {
        let problem = &self.problem;
        let chunk = problem.chunk.map_or(range.len(), |c| c.get()).max(1);

        let mut start = range.start;
        loop {
            let stop = (start + chunk).min(range.end);
            let call = KernelCall {
                nq: problem.q.len(),
                pd: start..stop,
                values: &problem.values,
                q: problem.q.as_slice(),
                cutoff: problem.cutoff,
            };

            kernel.run(&call, result)?;
            debug!("pd {start}..{stop} of {} done", range.end);

            start = stop;
            if start >= range.end {
                return Ok(());
            }
        }
    }

    fn run_sharded(
        &self,
        kernel: &Kernel<'_, Shape>,
        total: usize,
        shards: usize,
    ) -> Result<Vec<f64>> {
        let nq = self.problem.q.len();

        let partials = (0..shards)
            .into_par_iter()
            .map(|shard| {
                let range = shard_range(total, shards, shard);
                let mut partial = vec![0.0; nq + 1];
                self.run_range(kernel, range, &mut partial)?;
                Ok(partial)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = vec![0.0; nq + 1];
        for partial in &partials {
            Accumulator::merge(&mut result, partial)?;
        }

        Ok(result)
    }

    fn intensity(&self, mut result: Vec<f64>) -> Intensity {
        let problem = &self.problem;
        let norm = result.pop().unwrap_or_default();

        let iq = if norm == 0.0 {
            warn!("every grid point was pruned, returning the background");
            vec![problem.background; result.len()]
        } else {
            result
                .iter()
                .map(|sum| problem.scale * sum / norm + problem.background)
                .collect()
        };

        Intensity {
            q: problem.q.as_slice().to_vec(),
            iq,
            norm,
        }
    }
}

/// Returns the contiguous slice of `0..total` owned by `shard`.
///
/// The first `total % shards` shards take one extra grid point.
fn shard_range(total: usize, shards: usize, shard: usize) -> Range<usize> {
    let (base, extra) = (total / shards, total % shards);
    let start = shard * base + shard.min(extra);
    let len = base + usize::from(shard < extra);

    start..start + len
}
