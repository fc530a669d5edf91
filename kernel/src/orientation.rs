//! Detector-frame to particle-frame rotations for oriented 2-D scattering.
//!
//! All angles are in degrees. The view rotation takes `(qx, qy, 0)` into the
//! mean particle frame, the jitter rotation then applies the orientational
//! disorder of the current grid point.

use std::f64::consts::PI;

const RADIANS: f64 = PI / 180.0;

/// A set of orientation angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Angles {
    pub theta: f64,
    pub phi: f64,
    pub psi: f64,
}

impl Angles {
    pub fn new(theta: f64, phi: f64, psi: f64) -> Self {
        Self { theta, phi, psi }
    }

    /// Angles of a particle symmetric about its axis, `psi` is irrelevant.
    pub fn symmetric(theta: f64, phi: f64) -> Self {
        Self::new(theta, phi, 0.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct SinCos {
    sin_theta: f64,
    cos_theta: f64,
    sin_phi: f64,
    cos_phi: f64,
    sin_psi: f64,
    cos_psi: f64,
}

impl SinCos {
    fn new(angles: &Angles) -> Self {
        let (sin_theta, cos_theta) = (angles.theta * RADIANS).sin_cos();
        let (sin_phi, cos_phi) = (angles.phi * RADIANS).sin_cos();
        let (sin_psi, cos_psi) = (angles.psi * RADIANS).sin_cos();

        Self {
            sin_theta,
            cos_theta,
            sin_phi,
            cos_phi,
            sin_psi,
            cos_psi,
        }
    }

    /// Reverse view matrix applied to `(qx, qy, 0)`, only its first two columns.
    fn view(&self) -> [[f64; 2]; 3] {
        let &Self {
            sin_theta: st,
            cos_theta: ct,
            sin_phi: sp,
            cos_phi: cp,
            sin_psi: ss,
            cos_psi: cs,
        } = self;

        [
            [sp * ss + cp * cs * ct, sp * cs * ct - ss * cp],
            [-sp * cs + ss * cp * ct, sp * ss * ct + cp * cs],
            [st * cp, sp * st],
        ]
    }

    /// Reverse jitter matrix.
    fn jitter(&self) -> [[f64; 3]; 3] {
        let &Self {
            sin_theta: st,
            cos_theta: ct,
            sin_phi: sp,
            cos_phi: cp,
            sin_psi: ss,
            cos_psi: cs,
        } = self;

        [
            [cs * ct, sp * st * cs - ss * cp, -sp * ss - st * cp * cs],
            [ss * ct, sp * ss * st + cp * cs, sp * cs - ss * st * cp],
            [st, -sp * ct, cp * ct],
        ]
    }
}

/// Maps `(qx, qy)` to `(qa, qc)` for a particle symmetric about its `c` axis.
///
/// The in-plane magnitude comes from `qa^2 = |q|^2 - qc^2`, so the azimuthal
/// part of the jitter never has to be evaluated.
pub fn view_symmetric(qx: f64, qy: f64, view: &Angles, jitter: &Angles) -> (f64, f64) {
    let (sin_theta, cos_theta) = (view.theta * RADIANS).sin_cos();
    let (sin_phi, cos_phi) = (view.phi * RADIANS).sin_cos();

    let qa = qx * cos_phi * cos_theta + qy * sin_phi * cos_theta;
    let qb = -qx * sin_phi + qy * cos_phi;
    let qc = qx * sin_theta * cos_phi + qy * sin_phi * sin_theta;

    let (sin_theta, cos_theta) = (jitter.theta * RADIANS).sin_cos();
    let (sin_phi, cos_phi) = (jitter.phi * RADIANS).sin_cos();
    let dqc = qa * sin_theta - qb * sin_phi * cos_theta + qc * cos_phi * cos_theta;
    let dqa = (qx * qx + qy * qy - dqc * dqc).max(0.0).sqrt();

    (dqa, dqc)
}

/// Maps `(qx, qy)` to `(qa, qb, qc)` for a particle without rotational symmetry.
pub fn view_asymmetric(qx: f64, qy: f64, view: &Angles, jitter: &Angles) -> (f64, f64, f64) {
    let v = SinCos::new(view).view();
    let qa = v[0][0] * qx + v[0][1] * qy;
    let qb = v[1][0] * qx + v[1][1] * qy;
    let qc = v[2][0] * qx + v[2][1] * qy;

    let j = SinCos::new(jitter).jitter();
    let dqa = j[0][0] * qa + j[0][1] * qb + j[0][2] * qc;
    let dqb = j[1][0] * qa + j[1][1] * qb + j[1][2] * qc;
    let dqc = j[2][0] * qa + j[2][1] * qb + j[2][2] * qc;

    (dqa, dqb, dqc)
}

/// The composed jitter x view rotation for one grid point.
///
/// Built once per grid point so that each q point only costs six multiply-adds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    r: [[f64; 2]; 3],
}

impl Rotation {
    pub fn new(view: &Angles, jitter: &Angles) -> Self {
        let v = SinCos::new(view).view();
        let j = SinCos::new(jitter).jitter();
        let mut r = [[0.0; 2]; 3];

        for (row, j_row) in r.iter_mut().zip(&j) {
            for (col, value) in row.iter_mut().enumerate() {
                *value = j_row[0] * v[0][col] + j_row[1] * v[1][col] + j_row[2] * v[2][col];
            }
        }

        Self { r }
    }

    /// The identity on the detector plane, used when orientation is not modeled.
    pub fn identity() -> Self {
        Self {
            r: [[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]],
        }
    }

    #[inline]
    pub fn symmetric(&self, qx: f64, qy: f64) -> (f64, f64) {
        let dqc = self.r[2][0] * qx + self.r[2][1] * qy;
        let dqa = (qx * qx + qy * qy - dqc * dqc).max(0.0).sqrt();
        (dqa, dqc)
    }

    #[inline]
    pub fn asymmetric(&self, qx: f64, qy: f64) -> (f64, f64, f64) {
        let r = &self.r;
        (
            r[0][0] * qx + r[0][1] * qy,
            r[1][0] * qx + r[1][1] * qy,
            r[2][0] * qx + r[2][1] * qy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= TOL * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn zero_angles_are_the_identity() {
        let zero = Angles::default();
        let (qx, qy) = (0.03, -0.07);

        let (qa, qc) = view_symmetric(qx, qy, &zero, &zero);
        assert!(close(qa, (qx * qx + qy * qy).sqrt()));
        assert!(close(qc, 0.0));

        let (qa, qb, qc) = view_asymmetric(qx, qy, &zero, &zero);
        assert!(close(qa, qx));
        assert!(close(qb, qy));
        assert!(close(qc, 0.0));
    }

    #[test]
    fn rotation_preserves_magnitude() {
        let view = Angles::new(35.0, 20.0, 70.0);
        let jitter = Angles::new(-5.0, 12.0, 3.0);
        let (qx, qy) = (0.1, 0.04);

        let (qa, qb, qc) = view_asymmetric(qx, qy, &view, &jitter);
        assert!(close(qa * qa + qb * qb + qc * qc, qx * qx + qy * qy));
    }

    #[test]
    fn tilting_by_ninety_degrees_moves_q_onto_the_axis() {
        let view = Angles::symmetric(90.0, 0.0);
        let (qa, qc) = view_symmetric(0.2, 0.0, &view, &Angles::default());

        assert!(close(qc, 0.2));
        assert!(qa.abs() < 1e-9);
    }

    #[test]
    fn precomputed_rotation_matches_direct_views() {
        let cases = [
            (Angles::new(60.0, 15.0, 0.0), Angles::new(4.0, -8.0, 0.0)),
            (Angles::new(-30.0, 120.0, 45.0), Angles::new(2.0, 1.0, -6.0)),
            (Angles::new(80.0, 10.0, 200.0), Angles::default()),
        ];

        for (view, jitter) in cases {
            let rotation = Rotation::new(&view, &jitter);

            for (qx, qy) in [(0.1, 0.0), (0.0, 0.1), (0.05, -0.02), (-0.3, 0.2)] {
                let (a, b, c) = view_asymmetric(qx, qy, &view, &jitter);
                let (ra, rb, rc) = rotation.asymmetric(qx, qy);
                assert!(close(a, ra) && close(b, rb) && close(c, rc));

                let sym_view = Angles::symmetric(view.theta, view.phi);
                let sym_jitter = Angles::symmetric(jitter.theta, jitter.phi);
                let (sa, sc) = view_symmetric(qx, qy, &sym_view, &sym_jitter);
                let (rsa, rsc) = Rotation::new(&sym_view, &sym_jitter).symmetric(qx, qy);
                assert!(close(sa, rsa) && close(sc, rsc));
            }
        }
    }

    #[test]
    fn identity_rotation_passes_q_through() {
        let (qa, qb, qc) = Rotation::identity().asymmetric(0.3, 0.4);
        assert_eq!((qa, qb, qc), (0.3, 0.4, 0.0));
        assert_eq!(Rotation::identity().symmetric(0.3, 0.4), (0.5, 0.0));
    }
}
