use crate::error::{KernelErr, Result};

/// Running sums carried across resumed invocations inside the caller's result buffer.
///
/// The buffer holds `nq` weighted intensity sums followed by the normalization.
/// Opening at `pd_start == 0` clears it; any later start continues from what
/// is stored.
#[derive(Debug)]
pub struct Accumulator<'r> {
    sums: &'r mut [f64],
    slot: &'r mut f64,
    norm: f64,
}

impl<'r> Accumulator<'r> {
    /// Opens the accumulator over a result buffer.
    ///
    /// # Arguments
    /// * `result` - The caller owned buffer, exactly `nq + 1` long.
    /// * `nq` - The amount of q points.
    /// * `pd_start` - The first flat step of this invocation.
    ///
    /// # Returns
    /// A `SizeMismatch` error if the buffer length is not `nq + 1`.
    pub fn open(result: &'r mut [f64], nq: usize, pd_start: usize) -> Result<Self> {
        if result.len() != nq + 1 {
            return Err(KernelErr::SizeMismatch {
                what: "result",
                got: result.len(),
                expected: nq + 1,
            });
        }

        let (sums, tail) = result.split_at_mut(nq);
        let slot = &mut tail[0];

        let norm = if pd_start == 0 {
            sums.fill(0.0);
            0.0
        } else {
            *slot
        };

        Ok(Self { sums, slot, norm })
    }

    #[inline]
    pub fn add_norm(&mut self, value: f64) {
        self.norm += value;
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Per-q running sums, updated in place.
    #[inline]
    pub fn sums_mut(&mut self) -> &mut [f64] {
        &mut *self.sums
    }

    /// Persists the normalization back into the buffer.
    pub fn finish(self) {
        *self.slot = self.norm;
    }

    /// Adds a partial result buffer into another, both `nq + 1` long.
    ///
    /// Used to reduce independently accumulated shards of one computation.
    pub fn merge(into: &mut [f64], partial: &[f64]) -> Result<()> {
        if into.len() != partial.len() {
            return Err(KernelErr::SizeMismatch {
                what: "partial result",
                got: partial.len(),
                expected: into.len(),
            });
        }

        into.iter_mut().zip(partial).for_each(|(acc, p)| *acc += p);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_resets_the_buffer() {
        let mut result = [3.0, 4.0, 9.0];
        let mut acc = Accumulator::open(&mut result, 2, 0).unwrap();

        assert_eq!(acc.norm(), 0.0);
        acc.sums_mut()[1] += 1.5;
        acc.add_norm(2.0);
        acc.finish();

        assert_eq!(result, [0.0, 1.5, 2.0]);
    }

    #[test]
    fn later_steps_continue_from_the_buffer() {
        let mut result = [3.0, 4.0, 9.0];
        let mut acc = Accumulator::open(&mut result, 2, 7).unwrap();

        assert_eq!(acc.norm(), 9.0);
        acc.sums_mut()[0] += 1.0;
        acc.add_norm(1.0);
        acc.finish();

        assert_eq!(result, [4.0, 4.0, 10.0]);
    }

    #[test]
    fn rejects_wrong_buffer_length() {
        let mut result = [0.0; 3];
        let err = Accumulator::open(&mut result, 3, 0).unwrap_err();

        assert_eq!(
            err,
            KernelErr::SizeMismatch {
                what: "result",
                got: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn merge_adds_elementwise() {
        let mut total = [1.0, 2.0, 3.0];
        Accumulator::merge(&mut total, &[0.5, 0.5, 1.0]).unwrap();
        assert_eq!(total, [1.5, 2.5, 4.0]);

        assert!(Accumulator::merge(&mut total, &[1.0]).is_err());
    }
}
