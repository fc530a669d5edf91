use crate::details::PolyDim;

/// Read-only view over the polydispersity value and weight grids.
///
/// Both regions have the same length and are sliced per dimension using the
/// dimension's offset and grid length.
#[derive(Debug, Clone, Copy)]
pub struct WeightStorage<'a> {
    values: &'a [f64],
    weights: &'a [f64],
}

impl<'a> WeightStorage<'a> {
    /// Splits the tail of a `values` array into the two grid regions.
    ///
    /// # Arguments
    /// * `tail` - The entries after the fixed parameters, at least `2 * num_weights` long.
    /// * `num_weights` - The combined length of every grid.
    pub fn new(tail: &'a [f64], num_weights: usize) -> Self {
        let (values, rest) = tail.split_at(num_weights);
        Self {
            values,
            weights: &rest[..num_weights],
        }
    }

    /// Returns the parameter values of a dimension's grid.
    #[inline]
    pub fn values(&self, dim: &PolyDim) -> &'a [f64] {
        &self.values[dim.offset..dim.offset + dim.length]
    }

    /// Returns the probability weights of a dimension's grid.
    #[inline]
    pub fn weights(&self, dim: &PolyDim) -> &'a [f64] {
        &self.weights[dim.offset..dim.offset + dim.length]
    }
}
