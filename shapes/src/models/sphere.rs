use kernel::{ParameterLayout, ParameterTable, ShapeModel};

use crate::{
    special::{FOUR_PI_3, sas_3j1x_x},
    table::{ParameterInfo, layout_of, out_of_limits},
};

/// A homogeneous sphere.
#[derive(Debug, Clone)]
pub struct Sphere {
    layout: ParameterLayout,
}

impl Sphere {
    pub const PARAMETERS: [ParameterInfo; 3] = [
        ParameterInfo::sld("sld", 1.0),
        ParameterInfo::sld("sld_solvent", 6.0),
        ParameterInfo::volume("radius", 50.0),
    ];

    pub fn new() -> Self {
        Self {
            layout: layout_of(&Self::PARAMETERS),
        }
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeModel for Sphere {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, pars: &ParameterTable<'_>) -> f64 {
        FOUR_PI_3 * pars[2].powi(3)
    }

    fn is_invalid(&self, pars: &ParameterTable<'_>) -> bool {
        out_of_limits(&Self::PARAMETERS, pars)
    }

    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        let (sld, sld_solvent, radius) = (pars[0], pars[1], pars[2]);
        let f = (sld - sld_solvent) * self.volume(pars) * sas_3j1x_x(q * radius);

        1.0e-4 * f * f
    }
}
