use kernel::QInput;
use ndarray::{Array1, Array2};
use specs::QSpec;

use crate::error::{DriverError, Result};

/// The q points of a problem, flattened the way the kernel reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct QPoints {
    values: Vec<f64>,
    input: QInput,
}

impl QPoints {
    /// Creates a new `QPoints` from flat values.
    ///
    /// # Arguments
    /// * `values` - Magnitudes, or interleaved `(qx, qy)` pairs.
    /// * `input` - How `values` is laid out.
    ///
    /// # Returns
    /// An error if `values` can't be split into whole points.
    pub fn new(values: Vec<f64>, input: QInput) -> Result<Self> {
        if values.len() % input.stride() != 0 {
            return Err(DriverError::InvalidProblem(format!(
                "{} q values can't be split into pairs",
                values.len()
            )));
        }

        Ok(Self { values, input })
    }

    /// Generates the q points described by a spec.
    pub fn from_spec(spec: &QSpec) -> Result<Self> {
        match *spec {
            QSpec::List { ref q } => Self::new(q.clone(), QInput::Radial),
            QSpec::Linspace { start, stop, num } => Self::new(
                Array1::linspace(start, stop, num).to_vec(),
                QInput::Radial,
            ),
            QSpec::Logspace { start, stop, num } => {
                if start <= 0.0 || stop <= 0.0 {
                    return Err(DriverError::InvalidProblem(format!(
                        "logspace bounds must be positive, got [{start}, {stop}]"
                    )));
                }

                let q = Array1::logspace(10.0, start.log10(), stop.log10(), num);
                Self::new(q.to_vec(), QInput::Radial)
            }
            QSpec::Pairs { ref qx, ref qy } => {
                if qx.len() != qy.len() {
                    return Err(DriverError::InvalidProblem(format!(
                        "{} qx values but {} qy values",
                        qx.len(),
                        qy.len()
                    )));
                }

                let values = qx.iter().zip(qy).flat_map(|(&x, &y)| [x, y]).collect();
                Self::new(values, QInput::Plane)
            }
            QSpec::Grid { q_max, num } => Self::new(mesh(q_max, num), QInput::Plane),
        }
    }

    /// Returns the amount of q points.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.input.stride()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn input(&self) -> QInput {
        self.input
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over the points, one slice of one or two values each.
    pub fn points(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.input.stride())
    }
}

/// A `num x num` detector mesh with `qx` varying fastest.
fn mesh(q_max: f64, num: usize) -> Vec<f64> {
    let axis = Array1::linspace(-q_max, q_max, num);
    let mut pairs = Array2::<f64>::zeros((num * num, 2));

    for (k, mut row) in pairs.rows_mut().into_iter().enumerate() {
        row[0] = axis[k % num];
        row[1] = axis[k / num];
    }

    pairs.iter().copied().collect()
}
