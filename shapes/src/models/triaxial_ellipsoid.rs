use std::f64::consts::FRAC_PI_2;

use kernel::{ParameterLayout, ParameterTable, ShapeModel};

use crate::{
    special::{FOUR_PI_3, GaussLegendre, sas_3j1x_x},
    table::{ParameterInfo, layout_of, out_of_limits},
};

/// Quadrature points per axis of the 1-D orientation average.
const GAUSS_N: usize = 76;

/// An ellipsoid with three independent semi-axes `a`, `b` and `c`.
#[derive(Debug, Clone)]
pub struct TriaxialEllipsoid {
    layout: ParameterLayout,
    quadrature: GaussLegendre,
}

impl TriaxialEllipsoid {
    pub const PARAMETERS: [ParameterInfo; 8] = [
        ParameterInfo::sld("sld", 4.0),
        ParameterInfo::sld("sld_solvent", 1.0),
        ParameterInfo::volume("radius_equat_minor", 20.0),
        ParameterInfo::volume("radius_equat_major", 400.0),
        ParameterInfo::volume("radius_polar", 10.0),
        ParameterInfo::angle("theta", 60.0),
        ParameterInfo::angle("phi", 60.0),
        ParameterInfo::angle("psi", -60.0),
    ];

    pub fn new() -> Self {
        Self {
            layout: layout_of(&Self::PARAMETERS),
            quadrature: GaussLegendre::new(GAUSS_N),
        }
    }
}

impl Default for TriaxialEllipsoid {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeModel for TriaxialEllipsoid {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, pars: &ParameterTable<'_>) -> f64 {
        FOUR_PI_3 * pars[2] * pars[3] * pars[4]
    }

    fn is_invalid(&self, pars: &ParameterTable<'_>) -> bool {
        out_of_limits(&Self::PARAMETERS, pars)
    }

    /// Orientation average over the azimuth in `[0, pi/2]` and `u = cos(alpha)` in `[0, 1]`.
    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        let (a2, b2, c2) = (pars[2].powi(2), pars[3].powi(2), pars[4].powi(2));

        let outer = self.quadrature.integrate(0.0, FRAC_PI_2, |phi| {
            let (sin_phi, cos_phi) = phi.sin_cos();
            let ab2 = a2 * cos_phi * cos_phi + b2 * sin_phi * sin_phi;

            self.quadrature.integrate(0.0, 1.0, |u| {
                let r = (ab2 * (1.0 - u * u) + c2 * u * u).sqrt();
                sas_3j1x_x(q * r).powi(2)
            })
        });

        let s = (pars[0] - pars[1]) * self.volume(pars);
        1.0e-4 * s * s * outer / FRAC_PI_2
    }

    fn iq_abc(&self, qa: f64, qb: f64, qc: f64, pars: &ParameterTable<'_>) -> f64 {
        let (a, b, c) = (qa * pars[2], qb * pars[3], qc * pars[4]);
        let r = (a * a + b * b + c * c).sqrt();
        let f = (pars[0] - pars[1]) * self.volume(pars) * sas_3j1x_x(r);

        1.0e-4 * f * f
    }
}
