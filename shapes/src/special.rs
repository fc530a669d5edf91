use std::f64::consts::PI;

/// `4 pi / 3`, the volume of the unit sphere.
pub const FOUR_PI_3: f64 = 4.0 * PI / 3.0;

/// Below this argument `sas_3j1x_x` switches to its Taylor expansion.
const J1C_CUTOFF: f64 = 0.1;

/// Returns `3 j1(x) / x`, the normalized sphere form factor amplitude.
///
/// Tends to one at the origin; the series avoids the cancellation in
/// `sin x - x cos x` for small arguments.
pub fn sas_3j1x_x(x: f64) -> f64 {
    if x.abs() < J1C_CUTOFF {
        let x2 = x * x;
        return 1.0 + x2 * (-3.0 / 30.0 + x2 * (3.0 / 840.0 + x2 * (-3.0 / 45360.0)));
    }

    let (sin_x, cos_x) = x.sin_cos();
    3.0 * (sin_x / x - cos_x) / (x * x)
}

/// Gauss-Legendre quadrature nodes and weights on `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Computes an `n` point rule by Newton iteration on the Legendre polynomial roots.
    pub fn new(n: usize) -> Self {
        let mut nodes = Vec::with_capacity(n);
        let mut weights = Vec::with_capacity(n);

        for i in 1..=n {
            let mut x = (PI * (i as f64 - 0.25) / (n as f64 + 0.5)).cos();

            for _ in 0..100 {
                let (p, dp) = legendre(n, x);
                let dx = p / dp;
                x -= dx;
                if dx.abs() < 1e-16 {
                    break;
                }
            }

            let (_, dp) = legendre(n, x);
            nodes.push(x);
            weights.push(2.0 / ((1.0 - x * x) * dp * dp));
        }

        Self { nodes, weights }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the `(node, weight)` pairs mapped onto `[low, high]`.
    pub fn on(&self, low: f64, high: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let half = 0.5 * (high - low);
        let mid = 0.5 * (high + low);

        self.nodes
            .iter()
            .zip(&self.weights)
            .map(move |(&z, &w)| (mid + half * z, half * w))
    }

    /// Integrates `f` over `[low, high]`.
    pub fn integrate<F>(&self, low: f64, high: f64, mut f: F) -> f64
    where
        F: FnMut(f64) -> f64,
    {
        self.on(low, high).map(|(x, w)| w * f(x)).sum()
    }
}

/// Returns `(P_n(x), P_n'(x))` by the three term recurrence.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let (mut p0, mut p1) = (1.0, x);
    for k in 2..=n {
        let k = k as f64;
        (p0, p1) = (p1, ((2.0 * k - 1.0) * x * p1 - (k - 1.0) * p0) / k);
    }

    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_amplitude_is_continuous_at_the_cutoff() {
        let below = sas_3j1x_x(J1C_CUTOFF - 1e-12);
        let above = sas_3j1x_x(J1C_CUTOFF + 1e-12);

        assert!((below - above).abs() < 1e-10);
        assert_eq!(sas_3j1x_x(0.0), 1.0);
    }

    #[test]
    fn sphere_amplitude_vanishes_at_the_first_zero() {
        // first root of tan x = x
        assert!(sas_3j1x_x(4.493_409_457_909_064).abs() < 1e-12);
    }

    #[test]
    fn quadrature_is_exact_for_polynomials() {
        let rule = GaussLegendre::new(10);

        let total: f64 = rule.integrate(-1.0, 1.0, |_| 1.0);
        assert!((total - 2.0).abs() < 1e-14);

        // degree 19 is the highest integrated exactly by 10 points
        let odd = rule.integrate(0.0, 1.0, |x| x.powi(19));
        assert!((odd - 0.05).abs() < 1e-14);
    }

    #[test]
    fn quadrature_integrates_smooth_functions() {
        let rule = GaussLegendre::new(76);
        let total = rule.integrate(0.0, PI, f64::sin);

        assert_eq!(rule.len(), 76);
        assert!((total - 2.0).abs() < 1e-13);
    }
}
