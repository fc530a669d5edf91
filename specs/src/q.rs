use serde::{Deserialize, Serialize};

/// The specification of the q points to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QSpec {
    /// Explicit 1-D magnitudes.
    List { q: Vec<f64> },
    /// `num` evenly spaced magnitudes in `[start, stop]`.
    Linspace { start: f64, stop: f64, num: usize },
    /// `num` logarithmically spaced magnitudes in `[start, stop]`, both positive.
    Logspace { start: f64, stop: f64, num: usize },
    /// Explicit `(qx, qy)` pairs.
    Pairs { qx: Vec<f64>, qy: Vec<f64> },
    /// A `num x num` detector mesh over `[-q_max, q_max]` on both axes.
    Grid { q_max: f64, num: usize },
}

impl QSpec {
    /// Whether the q points are `(qx, qy)` pairs.
    pub fn is_plane(&self) -> bool {
        matches!(self, QSpec::Pairs { .. } | QSpec::Grid { .. })
    }
}
