use kernel::{ParameterLayout, ParameterTable, ShapeModel};

use crate::table::{ParameterInfo, ParameterKind, layout_of};

/// Ornstein-Zernike correlation length model, `1 / (1 + (q L)^2)`.
#[derive(Debug, Clone)]
pub struct Lorentz {
    layout: ParameterLayout,
}

impl Lorentz {
    pub const PARAMETERS: [ParameterInfo; 1] = [ParameterInfo::new(
        "cor_length",
        50.0,
        (0.0, f64::INFINITY),
        ParameterKind::Standard,
    )];

    pub fn new() -> Self {
        Self {
            layout: layout_of(&Self::PARAMETERS),
        }
    }
}

impl Default for Lorentz {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeModel for Lorentz {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, _: &ParameterTable<'_>) -> f64 {
        1.0
    }

    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        let x = q * pars[0];
        1.0 / (1.0 + x * x)
    }
}
