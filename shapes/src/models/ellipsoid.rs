use kernel::{ParameterLayout, ParameterTable, ShapeModel};

use crate::{
    special::{FOUR_PI_3, GaussLegendre, sas_3j1x_x},
    table::{ParameterInfo, layout_of, out_of_limits},
};

/// Quadrature points of the 1-D orientation average.
const GAUSS_N: usize = 76;

/// An ellipsoid of revolution about its polar `c` axis.
#[derive(Debug, Clone)]
pub struct Ellipsoid {
    layout: ParameterLayout,
    quadrature: GaussLegendre,
}

impl Ellipsoid {
    pub const PARAMETERS: [ParameterInfo; 6] = [
        ParameterInfo::sld("sld", 4.0),
        ParameterInfo::sld("sld_solvent", 1.0),
        ParameterInfo::volume("radius_polar", 20.0),
        ParameterInfo::volume("radius_equatorial", 400.0),
        ParameterInfo::angle("theta", 60.0),
        ParameterInfo::angle("phi", 60.0),
    ];

    pub fn new() -> Self {
        Self {
            layout: layout_of(&Self::PARAMETERS),
            quadrature: GaussLegendre::new(GAUSS_N),
        }
    }

    fn amplitude(&self, r: f64, pars: &ParameterTable<'_>) -> f64 {
        (pars[0] - pars[1]) * self.volume(pars) * sas_3j1x_x(r)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeModel for Ellipsoid {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, pars: &ParameterTable<'_>) -> f64 {
        FOUR_PI_3 * pars[2] * pars[3] * pars[3]
    }

    fn is_invalid(&self, pars: &ParameterTable<'_>) -> bool {
        out_of_limits(&Self::PARAMETERS, pars)
    }

    /// Orientation average over `u = cos(alpha)` in `[0, 1]`.
    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        let (polar, equatorial) = (pars[2], pars[3]);
        let (polar2, equatorial2) = (polar * polar, equatorial * equatorial);

        let average = self.quadrature.integrate(0.0, 1.0, |u| {
            let r = (equatorial2 * (1.0 - u * u) + polar2 * u * u).sqrt();
            sas_3j1x_x(q * r).powi(2)
        });

        let s = (pars[0] - pars[1]) * self.volume(pars);
        1.0e-4 * s * s * average
    }

    fn iq_ac(&self, qa: f64, qc: f64, pars: &ParameterTable<'_>) -> f64 {
        let r = (qa * pars[3]).hypot(qc * pars[2]);
        let f = self.amplitude(r, pars);

        1.0e-4 * f * f
    }
}
