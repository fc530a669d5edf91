use kernel::{ParameterLayout, ParameterTable, ShapeModel};

use crate::{
    special::{FOUR_PI_3, sas_3j1x_x},
    table::{ParameterInfo, layout_of, out_of_limits},
};

/// A sphere with a concentric shell of a different density.
#[derive(Debug, Clone)]
pub struct CoreShellSphere {
    layout: ParameterLayout,
}

impl CoreShellSphere {
    pub const PARAMETERS: [ParameterInfo; 5] = [
        ParameterInfo::volume("radius", 60.0),
        ParameterInfo::volume("thickness", 10.0),
        ParameterInfo::sld("sld_core", 1.0),
        ParameterInfo::sld("sld_shell", 2.0),
        ParameterInfo::sld("sld_solvent", 3.0),
    ];

    pub fn new() -> Self {
        Self {
            layout: layout_of(&Self::PARAMETERS),
        }
    }
}

impl Default for CoreShellSphere {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeModel for CoreShellSphere {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, pars: &ParameterTable<'_>) -> f64 {
        FOUR_PI_3 * (pars[0] + pars[1]).powi(3)
    }

    fn is_invalid(&self, pars: &ParameterTable<'_>) -> bool {
        out_of_limits(&Self::PARAMETERS, pars)
    }

    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        let (radius, thickness) = (pars[0], pars[1]);
        let (core, shell, solvent) = (pars[2], pars[3], pars[4]);
        let outer = radius + thickness;

        let f = FOUR_PI_3 * radius.powi(3) * (core - shell) * sas_3j1x_x(q * radius)
            + FOUR_PI_3 * outer.powi(3) * (shell - solvent) * sas_3j1x_x(q * outer);

        1.0e-4 * f * f
    }
}
