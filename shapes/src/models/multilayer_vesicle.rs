use kernel::{ParameterLayout, ParameterTable, ShapeModel};

use crate::{
    special::{FOUR_PI_3, sas_3j1x_x},
    table::{ParameterInfo, ParameterKind, layout_of, out_of_limits},
};

/// Concentric shells separated by solvent layers.
///
/// The amplitude is squared as `fval * volfraction * 1e-4 * fval / v`, where
/// `v` is the volume enclosed by the outermost shell, and the reported form
/// volume is one: the model normalizes itself.
#[derive(Debug, Clone)]
pub struct MultilayerVesicle {
    layout: ParameterLayout,
}

impl MultilayerVesicle {
    pub const PARAMETERS: [ParameterInfo; 7] = [
        ParameterInfo::new("volfraction", 0.05, (0.0, 1.0), ParameterKind::Standard),
        ParameterInfo::volume("radius", 60.0),
        ParameterInfo::volume("thick_shell", 10.0),
        ParameterInfo::volume("thick_solvent", 10.0),
        ParameterInfo::sld("sld_solvent", 6.4),
        ParameterInfo::sld("sld", 0.4),
        ParameterInfo::new("n_pairs", 2.0, (1.0, f64::INFINITY), ParameterKind::Volume),
    ];

    pub fn new() -> Self {
        Self {
            layout: layout_of(&Self::PARAMETERS),
        }
    }
}

impl Default for MultilayerVesicle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeModel for MultilayerVesicle {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, _: &ParameterTable<'_>) -> f64 {
        1.0
    }

    fn is_invalid(&self, pars: &ParameterTable<'_>) -> bool {
        out_of_limits(&Self::PARAMETERS, pars)
    }

    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        let (volfraction, radius, thick_shell, thick_solvent) = (pars[0], pars[1], pars[2], pars[3]);
        let contrast = pars[4] - pars[5];
        let n_pairs = ((pars[6] + 0.5) as usize).max(1);

        let mut fval = 0.0;
        let mut voli = 0.0;

        for pair in 0..n_pairs {
            let inner = radius + pair as f64 * (thick_shell + thick_solvent);
            voli = FOUR_PI_3 * inner.powi(3);
            fval += voli * contrast * sas_3j1x_x(inner * q);

            let outer = inner + thick_shell;
            voli = FOUR_PI_3 * outer.powi(3);
            fval -= voli * contrast * sas_3j1x_x(outer * q);
        }

        fval * volfraction * 1.0e-4 * fval / voli
    }
}
