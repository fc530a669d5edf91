use crate::{
    config::MAX_PD,
    details::{PolyDim, ProblemDetails},
    parameters::ParameterBlock,
    weights::WeightStorage,
};

/// A mixed-radix odometer over the polydispersity hypercube.
///
/// The first active dimension advances every step; when it wraps, the carry
/// propagates to the next slower one. Its whole state is derived from the
/// flat step it was opened at, so resuming at step `k` visits exactly the
/// points a single walk would have visited from `k` on.
#[derive(Debug, Clone)]
pub struct PdCursor<'a> {
    dims: &'a [PolyDim],
    storage: WeightStorage<'a>,
    index: [usize; MAX_PD],
}

impl<'a> PdCursor<'a> {
    /// Opens a cursor at a flat step.
    ///
    /// # Arguments
    /// * `details` - The hypercube description.
    /// * `storage` - The grids the cursor reads values and weights from.
    /// * `step` - The flat step to start at.
    pub fn new(details: &'a ProblemDetails, storage: WeightStorage<'a>, step: usize) -> Self {
        Self {
            dims: details.active(),
            storage,
            index: details.decode(step),
        }
    }

    /// Writes the current grid value of every active dimension into the block.
    pub fn load(&self, block: &mut ParameterBlock) {
        for (k, dim) in self.dims.iter().enumerate() {
            self.write(k, dim, block);
        }
    }

    /// Returns the combined weight of the current grid point.
    ///
    /// The product runs from the slowest to the fastest dimension; an empty
    /// hypercube has weight one.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.dims
            .iter()
            .zip(&self.index[..self.dims.len()])
            .rev()
            .fold(1.0, |acc, (dim, &i)| self.storage.weights(dim)[i] * acc)
    }

    /// Moves to the next grid point, rewriting only the dimensions that changed.
    ///
    /// # Returns
    /// `false` once the whole hypercube has been walked.
    pub fn advance(&mut self, block: &mut ParameterBlock) -> bool {
        let dims = self.dims;

        for (k, dim) in dims.iter().enumerate() {
            self.index[k] += 1;

            if self.index[k] < dim.length {
                self.write(k, dim, block);
                return true;
            }

            self.index[k] = 0;
            self.write(k, dim, block);
        }

        false
    }

    /// Returns the per-dimension indices of the current grid point.
    pub fn index(&self) -> &[usize] {
        &self.index[..self.dims.len()]
    }

    #[inline]
    fn write(&self, k: usize, dim: &PolyDim, block: &mut ParameterBlock) {
        block.set(dim.parameter, self.storage.values(dim)[self.index[k]]);
    }
}
