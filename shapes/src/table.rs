use kernel::{OrientationMode, ParameterLayout, ParameterTable};

/// What role a parameter plays in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Standard,
    /// A scattering length density, may carry a magnetization vector.
    Sld,
    /// Enters the particle volume; values outside its limits are invalid.
    Volume,
    /// An orientation angle in degrees.
    Orientation,
}

/// One row of a model parameter table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub default: f64,
    pub limits: (f64, f64),
    pub kind: ParameterKind,
}

impl ParameterInfo {
    pub const fn new(
        name: &'static str,
        default: f64,
        limits: (f64, f64),
        kind: ParameterKind,
    ) -> Self {
        Self {
            name,
            default,
            limits,
            kind,
        }
    }

    pub const fn sld(name: &'static str, default: f64) -> Self {
        Self::new(name, default, (f64::NEG_INFINITY, f64::INFINITY), ParameterKind::Sld)
    }

    pub const fn volume(name: &'static str, default: f64) -> Self {
        Self::new(name, default, (0.0, f64::INFINITY), ParameterKind::Volume)
    }

    pub const fn angle(name: &'static str, default: f64) -> Self {
        Self::new(name, default, (-360.0, 360.0), ParameterKind::Orientation)
    }
}

/// Builds the kernel layout of a parameter table.
pub fn layout_of(table: &[ParameterInfo]) -> ParameterLayout {
    ParameterLayout::new(table.iter().map(|info| info.name))
}

/// Whether any volume parameter lies outside its limits.
pub fn out_of_limits(table: &[ParameterInfo], pars: &ParameterTable<'_>) -> bool {
    table
        .iter()
        .zip(pars.as_slice())
        .filter(|(info, _)| info.kind == ParameterKind::Volume)
        .any(|(info, &value)| value < info.limits.0 || value > info.limits.1)
}

/// Returns the index of the first orientation angle and the orientation mode.
pub fn orientation_of(table: &[ParameterInfo]) -> (Option<usize>, OrientationMode) {
    let theta = table
        .iter()
        .position(|info| info.kind == ParameterKind::Orientation);
    let count = table
        .iter()
        .filter(|info| info.kind == ParameterKind::Orientation)
        .count();

    let mode = match count {
        2 => OrientationMode::Symmetric,
        3 => OrientationMode::Asymmetric,
        _ => OrientationMode::None,
    };

    (theta, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [ParameterInfo; 4] = [
        ParameterInfo::sld("sld", 1.0),
        ParameterInfo::volume("radius", 50.0),
        ParameterInfo::angle("theta", 0.0),
        ParameterInfo::angle("phi", 0.0),
    ];

    #[test]
    fn only_volume_parameters_are_bounded() {
        let layout = layout_of(&TABLE);

        let inside = [-3.0, 10.0, 500.0, 0.0];
        assert!(!out_of_limits(&TABLE, &ParameterTable::new(&inside, &layout)));

        let negative = [1.0, -1.0, 0.0, 0.0];
        assert!(out_of_limits(&TABLE, &ParameterTable::new(&negative, &layout)));
    }

    #[test]
    fn two_angles_make_a_symmetric_particle() {
        assert_eq!(orientation_of(&TABLE), (Some(2), OrientationMode::Symmetric));
        assert_eq!(orientation_of(&TABLE[..2]), (None, OrientationMode::None));
    }
}
