use std::{collections::BTreeMap, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

use crate::q::QSpec;

/// The discrete distribution of one polydisperse parameter.
///
/// Grids are given explicitly, they are never generated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispersionSpec {
    pub parameter: String,
    pub values: Vec<f64>,
    pub weights: Vec<f64>,
}

/// Beam polarization and the magnetization of the magnetic densities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnetismSpec {
    pub up_frac_i: f64,
    pub up_frac_f: f64,
    /// Polarization angle in degrees.
    pub up_angle: f64,
    /// `(mx, my, mz)` for each magnetic density, keyed by parameter name.
    pub magnetization: BTreeMap<String, [f64; 3]>,
}

/// The specification of a full I(q) computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSpec {
    pub model: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_background")]
    pub background: f64,
    /// Overrides of the model defaults, keyed by parameter name.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Fastest varying first.
    #[serde(default)]
    pub dispersions: Vec<DispersionSpec>,
    #[serde(default)]
    pub magnetism: Option<MagnetismSpec>,
    pub q: QSpec,
    #[serde(default)]
    pub cutoff: f64,
    /// Grid points per kernel invocation, the whole cube when absent.
    #[serde(default)]
    pub chunk: Option<NonZeroUsize>,
    /// Independent partial computations merged at the end.
    #[serde(default)]
    pub shards: Option<NonZeroUsize>,
}

fn default_scale() -> f64 {
    1.0
}

fn default_background() -> f64 {
    1.0e-3
}

impl ProblemSpec {
    /// Parses a specification from its JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_problem_takes_defaults() {
        let spec = ProblemSpec::from_json(
            r#"{ "model": "sphere", "q": { "linspace": { "start": 0.001, "stop": 0.5, "num": 100 } } }"#,
        )
        .unwrap();

        assert_eq!(spec.model, "sphere");
        assert_eq!(spec.scale, 1.0);
        assert_eq!(spec.background, 1.0e-3);
        assert!(spec.parameters.is_empty());
        assert!(spec.dispersions.is_empty());
        assert!(spec.magnetism.is_none());
        assert_eq!(spec.cutoff, 0.0);
        assert_eq!(spec.chunk, None);
        assert!(!spec.q.is_plane());
    }

    #[test]
    fn full_problem_parses() {
        let spec = ProblemSpec::from_json(
            r#"{
                "model": "ellipsoid",
                "scale": 0.5,
                "background": 0.0,
                "parameters": { "radius_polar": 30.0, "theta": 10.0 },
                "dispersions": [
                    { "parameter": "radius_polar", "values": [25.0, 30.0, 35.0], "weights": [1.0, 2.0, 1.0] }
                ],
                "magnetism": {
                    "up_frac_i": 0.9,
                    "up_frac_f": 0.1,
                    "up_angle": 45.0,
                    "magnetization": { "sld": [1.0, 0.0, 0.5] }
                },
                "q": { "grid": { "q_max": 0.2, "num": 64 } },
                "cutoff": 1e-3,
                "chunk": 2,
                "shards": 4
            }"#,
        )
        .unwrap();

        assert_eq!(spec.parameters["theta"], 10.0);
        assert_eq!(spec.dispersions[0].weights, [1.0, 2.0, 1.0]);
        assert_eq!(spec.magnetism.unwrap().magnetization["sld"], [1.0, 0.0, 0.5]);
        assert_eq!(spec.q, QSpec::Grid { q_max: 0.2, num: 64 });
        assert!(spec.q.is_plane());
        assert_eq!(spec.chunk.map(NonZeroUsize::get), Some(2));
        assert_eq!(spec.shards.map(NonZeroUsize::get), Some(4));
    }

    #[test]
    fn zero_chunk_is_rejected() {
        let err = ProblemSpec::from_json(
            r#"{ "model": "sphere", "q": { "list": { "q": [0.1] } }, "chunk": 0 }"#,
        );

        assert!(err.is_err());
    }

    #[test]
    fn survives_a_json_round_trip() {
        let spec = ProblemSpec {
            model: "lorentz".into(),
            scale: 2.0,
            background: 0.1,
            parameters: BTreeMap::from([("cor_length".to_string(), 20.0)]),
            dispersions: Vec::new(),
            magnetism: None,
            q: QSpec::Pairs {
                qx: vec![0.1, 0.2],
                qy: vec![0.0, 0.1],
            },
            cutoff: 0.0,
            chunk: None,
            shards: NonZeroUsize::new(2),
        };

        let text = spec.to_json().unwrap();
        assert_eq!(ProblemSpec::from_json(&text).unwrap(), spec);
    }
}
