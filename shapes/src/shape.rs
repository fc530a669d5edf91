use kernel::{OrientationMode, ParameterLayout, ParameterTable, ShapeModel};

use crate::{
    models::{CoreShellSphere, Ellipsoid, Lorentz, MultilayerVesicle, Sphere, TriaxialEllipsoid},
    table::{ParameterInfo, ParameterKind, orientation_of},
};

/// Every shape model known by name.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    CoreShellSphere(CoreShellSphere),
    MultilayerVesicle(MultilayerVesicle),
    Lorentz(Lorentz),
    Ellipsoid(Ellipsoid),
    TriaxialEllipsoid(TriaxialEllipsoid),
}
use Shape::*;

impl Shape {
    /// The names accepted by `by_name`.
    pub const NAMES: [&'static str; 6] = [
        "sphere",
        "core_shell_sphere",
        "multilayer_vesicle",
        "lorentz",
        "ellipsoid",
        "triaxial_ellipsoid",
    ];

    /// Builds a model from its name.
    pub fn by_name(name: &str) -> Option<Self> {
        let shape = match name {
            "sphere" => Sphere(Sphere::new()),
            "core_shell_sphere" => CoreShellSphere(CoreShellSphere::new()),
            "multilayer_vesicle" => MultilayerVesicle(MultilayerVesicle::new()),
            "lorentz" => Lorentz(Lorentz::new()),
            "ellipsoid" => Ellipsoid(Ellipsoid::new()),
            "triaxial_ellipsoid" => TriaxialEllipsoid(TriaxialEllipsoid::new()),
            _ => return None,
        };

        Some(shape)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sphere(_) => "sphere",
            CoreShellSphere(_) => "core_shell_sphere",
            MultilayerVesicle(_) => "multilayer_vesicle",
            Lorentz(_) => "lorentz",
            Ellipsoid(_) => "ellipsoid",
            TriaxialEllipsoid(_) => "triaxial_ellipsoid",
        }
    }

    /// Returns the parameter table, in parameter-vector order.
    pub fn parameters(&self) -> &'static [ParameterInfo] {
        match self {
            Sphere(_) => &Sphere::PARAMETERS,
            CoreShellSphere(_) => &CoreShellSphere::PARAMETERS,
            MultilayerVesicle(_) => &MultilayerVesicle::PARAMETERS,
            Lorentz(_) => &Lorentz::PARAMETERS,
            Ellipsoid(_) => &Ellipsoid::PARAMETERS,
            TriaxialEllipsoid(_) => &TriaxialEllipsoid::PARAMETERS,
        }
    }

    /// Returns the default value of every parameter.
    pub fn defaults(&self) -> Vec<f64> {
        self.parameters().iter().map(|info| info.default).collect()
    }

    /// Whether the parameter at `index` is a scattering length density.
    pub fn is_sld(&self, index: usize) -> bool {
        self.parameters()
            .get(index)
            .is_some_and(|info| info.kind == ParameterKind::Sld)
    }

    /// Returns where the orientation angles start and how many there are.
    pub fn orientation(&self) -> (Option<usize>, OrientationMode) {
        orientation_of(self.parameters())
    }
}

impl ShapeModel for Shape {
    fn layout(&self) -> &ParameterLayout {
        match self {
            Sphere(m) => m.layout(),
            CoreShellSphere(m) => m.layout(),
            MultilayerVesicle(m) => m.layout(),
            Lorentz(m) => m.layout(),
            Ellipsoid(m) => m.layout(),
            TriaxialEllipsoid(m) => m.layout(),
        }
    }

    fn volume(&self, pars: &ParameterTable<'_>) -> f64 {
        match self {
            Sphere(m) => m.volume(pars),
            CoreShellSphere(m) => m.volume(pars),
            MultilayerVesicle(m) => m.volume(pars),
            Lorentz(m) => m.volume(pars),
            Ellipsoid(m) => m.volume(pars),
            TriaxialEllipsoid(m) => m.volume(pars),
        }
    }

    fn is_invalid(&self, pars: &ParameterTable<'_>) -> bool {
        match self {
            Sphere(m) => m.is_invalid(pars),
            CoreShellSphere(m) => m.is_invalid(pars),
            MultilayerVesicle(m) => m.is_invalid(pars),
            Lorentz(m) => m.is_invalid(pars),
            Ellipsoid(m) => m.is_invalid(pars),
            TriaxialEllipsoid(m) => m.is_invalid(pars),
        }
    }

    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        match self {
            Sphere(m) => m.iq(q, pars),
            CoreShellSphere(m) => m.iq(q, pars),
            MultilayerVesicle(m) => m.iq(q, pars),
            Lorentz(m) => m.iq(q, pars),
            Ellipsoid(m) => m.iq(q, pars),
            TriaxialEllipsoid(m) => m.iq(q, pars),
        }
    }

    fn iq_ac(&self, qa: f64, qc: f64, pars: &ParameterTable<'_>) -> f64 {
        match self {
            Ellipsoid(m) => m.iq_ac(qa, qc, pars),
            TriaxialEllipsoid(m) => m.iq_ac(qa, qc, pars),
            _ => self.iq(qa.hypot(qc), pars),
        }
    }

    fn iq_abc(&self, qa: f64, qb: f64, qc: f64, pars: &ParameterTable<'_>) -> f64 {
        match self {
            TriaxialEllipsoid(m) => m.iq_abc(qa, qb, qc, pars),
            _ => self.iq_ac(qa.hypot(qb), qc, pars),
        }
    }
}
