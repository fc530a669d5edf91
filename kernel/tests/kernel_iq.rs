use std::ops::Range;

use rand::{Rng, SeedableRng, rngs::StdRng};

use kernel::{
    Kernel, KernelCall, KernelConfig, KernelErr, OrientationMode, ParameterLayout,
    ParameterTable, ProblemDetails, Projection, QInput, ShapeModel, kernel_iq,
};

/// Scatters its first parameter, optionally refusing values above a limit.
#[derive(Debug)]
struct Echo {
    layout: ParameterLayout,
    invalid_above: f64,
}

impl Echo {
    fn new(names: &[&'static str]) -> Self {
        Self {
            layout: ParameterLayout::new(names.iter().copied()),
            invalid_above: f64::INFINITY,
        }
    }
}

impl ShapeModel for Echo {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, _: &ParameterTable<'_>) -> f64 {
        1.0
    }

    fn is_invalid(&self, pars: &ParameterTable<'_>) -> bool {
        pars[0] > self.invalid_above
    }

    fn iq(&self, _: f64, pars: &ParameterTable<'_>) -> f64 {
        pars[0]
    }
}

/// A q dependent model with a parameter dependent volume.
#[derive(Debug)]
struct Decay {
    layout: ParameterLayout,
}

impl Decay {
    fn new() -> Self {
        Self {
            layout: ParameterLayout::new(["radius", "length", "sld"]),
        }
    }
}

impl ShapeModel for Decay {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, pars: &ParameterTable<'_>) -> f64 {
        pars[0] * pars[0] * pars[1]
    }

    fn iq(&self, q: f64, pars: &ParameterTable<'_>) -> f64 {
        let x = q * pars[0];
        pars[2] * pars[2] * self.volume(pars) / (1.0 + x * x)
    }
}

/// Reports the rotated components so the projection can be observed.
#[derive(Debug)]
struct Frame {
    layout: ParameterLayout,
}

impl Frame {
    fn new() -> Self {
        Self {
            layout: ParameterLayout::new(["scale_a", "theta", "phi", "psi"]),
        }
    }
}

impl ShapeModel for Frame {
    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn volume(&self, _: &ParameterTable<'_>) -> f64 {
        1.0
    }

    fn iq(&self, q: f64, _: &ParameterTable<'_>) -> f64 {
        q
    }

    fn iq_ac(&self, _qa: f64, qc: f64, _: &ParameterTable<'_>) -> f64 {
        qc
    }

    fn iq_abc(&self, qa: f64, qb: f64, qc: f64, pars: &ParameterTable<'_>) -> f64 {
        pars[0] * qa + qb + 100.0 * qc
    }
}

fn assert_close(got: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(got.len(), expected.len());
    for (i, (g, e)) in got.iter().zip(expected).enumerate() {
        assert!(
            (g - e).abs() <= tol * e.abs().max(1.0),
            "index {i}: got {g}, expected {e}"
        );
    }
}

#[test]
fn weighted_sum_over_one_dimension() {
    let model = Echo::new(&["x"]);
    let details = ProblemDetails::from_lengths(&[(0, 3)], None).unwrap();
    let values = [1.0, 0.0, 9.0, 1.0, 2.0, 3.0, 0.25, 0.5, 0.25];
    let q = [0.1];
    let mut result = [f64::NAN; 2];

    let call = KernelCall {
        nq: 1,
        pd: 0..3,
        values: &values,
        q: &q,
        cutoff: 0.0,
    };
    kernel_iq(
        &model,
        KernelConfig::new(1, QInput::Radial),
        details,
        &call,
        &mut result,
    )
    .unwrap();

    assert_eq!(result, [2.0, 1.0]);
}

#[test]
fn no_polydispersity_is_a_single_evaluation() {
    let model = Decay::new();
    let values = [1.0, 0.0, 2.0, 3.0, 0.5];
    let q = [0.0, 0.5, 1.0];
    let mut result = [0.0; 4];

    let kernel = Kernel::new(
        &model,
        KernelConfig::new(3, QInput::Radial),
        ProblemDetails::default(),
    )
    .unwrap();
    kernel
        .run(
            &KernelCall {
                nq: 3,
                pd: 0..1,
                values: &values,
                q: &q,
                cutoff: 0.0,
            },
            &mut result,
        )
        .unwrap();

    let table_values = [2.0, 3.0, 0.5];
    let table = ParameterTable::new(&table_values, &model.layout);
    let expected: Vec<f64> = q
        .iter()
        .map(|&q| model.iq(q, &table))
        .chain([12.0])
        .collect();
    assert_eq!(result.to_vec(), expected);
}

#[test]
fn cutoff_skips_light_points_without_normalizing_them() {
    let model = Echo::new(&["x"]);
    let details = ProblemDetails::from_lengths(&[(0, 3)], None).unwrap();
    let values = [1.0, 0.0, 9.0, 1.0, 2.0, 3.0, 0.25, 0.5, 0.25];
    let mut result = [0.0; 2];

    let call = KernelCall {
        nq: 1,
        pd: 0..3,
        values: &values,
        q: &[0.1],
        cutoff: 0.3,
    };
    kernel_iq(
        &model,
        KernelConfig::new(1, QInput::Radial),
        details,
        &call,
        &mut result,
    )
    .unwrap();

    assert_eq!(result, [1.0, 0.5]);
}

#[test]
fn zero_and_nan_weights_never_contribute() {
    let model = Echo::new(&["x"]);
    let details = ProblemDetails::from_lengths(&[(0, 3)], None).unwrap();
    // the zero weight sits on an infinite value, evaluating it would poison the sum
    let values = [1.0, 0.0, 9.0, f64::INFINITY, 2.0, 3.0, 0.0, f64::NAN, 1.0];
    let mut result = [0.0; 2];

    let call = KernelCall {
        nq: 1,
        pd: 0..3,
        values: &values,
        q: &[0.1],
        cutoff: -1.0,
    };
    kernel_iq(
        &model,
        KernelConfig::new(1, QInput::Radial),
        details,
        &call,
        &mut result,
    )
    .unwrap();

    assert_eq!(result, [3.0, 1.0]);
}

#[test]
fn invalid_points_are_skipped() {
    let mut model = Echo::new(&["x"]);
    model.invalid_above = 2.5;
    let details = ProblemDetails::from_lengths(&[(0, 3)], None).unwrap();
    let values = [1.0, 0.0, 9.0, 1.0, 2.0, 3.0, 0.25, 0.5, 0.25];
    let mut result = [0.0; 2];

    let call = KernelCall {
        nq: 1,
        pd: 0..3,
        values: &values,
        q: &[0.1],
        cutoff: 0.0,
    };
    kernel_iq(
        &model,
        KernelConfig::new(1, QInput::Radial),
        details,
        &call,
        &mut result,
    )
    .unwrap();

    assert_eq!(result, [1.25, 0.75]);
}

/// `values` for `Decay` with radius and length polydisperse.
fn decay_problem(rng: &mut StdRng) -> (ProblemDetails, Vec<f64>) {
    let details = ProblemDetails::from_lengths(&[(0, 4), (1, 3)], None).unwrap();
    let mut values = vec![1.0, 0.0, 20.0, 40.0, 1.5];

    let radii: Vec<f64> = (0..4).map(|_| rng.random_range(10.0..30.0)).collect();
    let lengths: Vec<f64> = (0..3).map(|_| rng.random_range(20.0..60.0)).collect();
    let weights: Vec<f64> = (0..7).map(|_| rng.random_range(0.0..1.0)).collect();

    values.extend(radii);
    values.extend(lengths);
    values.extend(weights);

    (details, values)
}

#[test]
fn resumed_runs_match_a_single_run() {
    let mut rng = StdRng::seed_from_u64(7);
    let model = Decay::new();
    let q: Vec<f64> = (1..=16).map(|i| 0.01 * i as f64).collect();

    for _ in 0..20 {
        let (details, values) = decay_problem(&mut rng);
        let kernel = Kernel::new(&model, KernelConfig::new(3, QInput::Radial), details).unwrap();
        let total = kernel.details().num_eval();

        let mut single = vec![0.0; q.len() + 1];
        kernel
            .run(
                &KernelCall {
                    nq: q.len(),
                    pd: 0..total,
                    values: &values,
                    q: &q,
                    cutoff: 0.0,
                },
                &mut single,
            )
            .unwrap();

        let mut cuts: Vec<usize> = (0..3).map(|_| rng.random_range(1..total)).collect();
        cuts.push(0);
        cuts.push(total);
        cuts.sort_unstable();

        let mut resumed = vec![f64::NAN; q.len() + 1];
        for range in cuts.windows(2) {
            kernel
                .run(
                    &KernelCall {
                        nq: q.len(),
                        pd: range[0]..range[1],
                        values: &values,
                        q: &q,
                        cutoff: 0.0,
                    },
                    &mut resumed,
                )
                .unwrap();
        }

        assert_close(&resumed, &single, 1e-12);
    }
}

#[test]
fn raising_the_cutoff_never_increases_the_sums_or_the_norm() {
    let mut rng = StdRng::seed_from_u64(11);
    let model = Decay::new();
    let (details, values) = decay_problem(&mut rng);
    let kernel = Kernel::new(&model, KernelConfig::new(3, QInput::Radial), details).unwrap();
    let q = [0.0, 0.01, 0.05, 0.1, 0.3];

    let mut last = [f64::INFINITY; 6];
    for cutoff in [0.0, 0.05, 0.1, 0.2, 0.4, 0.8] {
        let mut result = [0.0; 6];
        kernel
            .run(
                &KernelCall {
                    nq: q.len(),
                    pd: 0..12,
                    values: &values,
                    q: &q,
                    cutoff,
                },
                &mut result,
            )
            .unwrap();

        for (i, (now, before)) in result.iter().zip(&last).enumerate() {
            assert!(now <= before, "cutoff {cutoff}, slot {i}: {now} > {before}");
        }
        last = result;
    }
}

#[test]
fn parallel_and_serial_q_loops_agree() {
    let mut rng = StdRng::seed_from_u64(3);
    let model = Decay::new();
    let (details, values) = decay_problem(&mut rng);
    let q: Vec<f64> = (0..200).map(|i| 0.002 * i as f64).collect();

    let mut runs = Vec::new();
    for parallel in [false, true] {
        let config = KernelConfig::new(3, QInput::Radial).with_parallel_q(parallel);
        let mut result = vec![0.0; q.len() + 1];
        kernel_iq(
            &model,
            config,
            details.clone(),
            &KernelCall {
                nq: q.len(),
                pd: 0..12,
                values: &values,
                q: &q,
                cutoff: 0.0,
            },
            &mut result,
        )
        .unwrap();
        runs.push(result);
    }

    assert_eq!(runs[0], runs[1]);
}

#[test]
fn plane_input_without_orientation_uses_the_magnitude() {
    let model = Frame::new();
    let config = KernelConfig::new(4, QInput::Plane);
    let kernel = Kernel::new(&model, config, ProblemDetails::default()).unwrap();
    assert_eq!(kernel.projection(), Projection::Radial2d);

    let mut result = [0.0; 2];
    kernel
        .run(
            &KernelCall {
                nq: 1,
                pd: 0..1,
                values: &[1.0, 0.0, 1.0, 0.0, 0.0, 0.0],
                q: &[0.3, 0.4],
                cutoff: 0.0,
            },
            &mut result,
        )
        .unwrap();

    assert_close(&result, &[0.5, 1.0], 1e-15);
}

#[test]
fn unrotated_asymmetric_particle_sees_the_detector_frame() {
    let model = Frame::new();
    let config = KernelConfig::new(4, QInput::Plane).with_orientation(OrientationMode::Asymmetric);
    let details = ProblemDetails::from_lengths(&[], Some(1)).unwrap();
    let kernel = Kernel::new(&model, config, details).unwrap();
    assert_eq!(kernel.projection(), Projection::Asymmetric);

    let mut result = [0.0; 2];
    kernel
        .run(
            &KernelCall {
                nq: 1,
                pd: 0..1,
                values: &[1.0, 0.0, 10.0, 0.0, 0.0, 0.0],
                q: &[0.3, 0.4],
                cutoff: 0.0,
            },
            &mut result,
        )
        .unwrap();

    // qa = qx, qb = qy, qc = 0
    assert_close(&result, &[3.4, 1.0], 1e-12);
}

#[test]
fn tilted_symmetric_particle_projects_qx_onto_its_axis() {
    let model = Frame::new();
    let config = KernelConfig::new(4, QInput::Plane).with_orientation(OrientationMode::Symmetric);
    let details = ProblemDetails::from_lengths(&[], Some(1)).unwrap();

    let mut result = [0.0; 2];
    kernel_iq(
        &model,
        config,
        details,
        &KernelCall {
            nq: 1,
            pd: 0..1,
            values: &[1.0, 0.0, 1.0, 90.0, 0.0, 0.0],
            q: &[0.3, 0.4],
            cutoff: 0.0,
        },
        &mut result,
    )
    .unwrap();

    assert_close(&result, &[0.3, 1.0], 1e-12);
}

#[test]
fn jitter_grid_rotates_around_the_mean_orientation() {
    let model = Frame::new();
    let config = KernelConfig::new(4, QInput::Plane).with_orientation(OrientationMode::Symmetric);
    // theta jitter of +-90 around a mean of zero
    let details = ProblemDetails::from_lengths(&[(1, 2)], Some(1)).unwrap();
    let values = [1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 90.0, -90.0, 0.5, 0.5];

    let mut result = [0.0; 2];
    kernel_iq(
        &model,
        config,
        details,
        &KernelCall {
            nq: 1,
            pd: 0..2,
            values: &values,
            q: &[0.3, 0.0],
            cutoff: 0.0,
        },
        &mut result,
    )
    .unwrap();

    // opposite tilts give opposite qc, the weighted sum cancels
    assert!(result[0].abs() < 1e-12);
    assert_eq!(result[1], 1.0);
}

#[test]
fn magnetic_scattering_vanishes_at_the_origin() {
    let model = Echo::new(&["sld", "radius"]);
    let config = KernelConfig::new(2, QInput::Plane).with_magnetism([0]);
    let values = [1.0, 0.0, 4.0, 10.0, 0.5, 0.5, 0.0, 1.0, 2.0, 3.0];

    let mut result = [f64::NAN; 3];
    kernel_iq(
        &model,
        config,
        ProblemDetails::default(),
        &KernelCall {
            nq: 2,
            pd: 0..1,
            values: &values,
            q: &[0.0, 0.0, 0.1, 0.0],
            cutoff: 0.0,
        },
        &mut result,
    )
    .unwrap();

    assert_eq!(result[0], 0.0);
    assert!(result[1] != 0.0);
    assert_eq!(result[2], 1.0);
}

#[test]
fn spin_down_unmagnetized_matches_the_nuclear_kernel() {
    let model = Echo::new(&["sld", "radius"]);
    let q: Vec<f64> = (1..=40).flat_map(|i| [0.01 * i as f64, 0.005]).collect();
    let details = ProblemDetails::from_lengths(&[(1, 2)], None).unwrap();

    let nuclear_values = [1.0, 0.0, 4.0, 10.0, 2.0, 6.0, 0.5, 0.5];
    let mut nuclear = vec![0.0; 41];
    kernel_iq(
        &model,
        KernelConfig::new(2, QInput::Plane),
        details.clone(),
        &KernelCall {
            nq: 40,
            pd: 0..2,
            values: &nuclear_values,
            q: &q,
            cutoff: 0.0,
        },
        &mut nuclear,
    )
    .unwrap();

    // up_frac_i = up_frac_f = 0 leaves only the dd channel with unit amplitude
    let magnetic_values = [
        1.0, 0.0, 4.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 6.0, 0.5, 0.5,
    ];
    let mut magnetic = vec![0.0; 41];
    kernel_iq(
        &model,
        KernelConfig::new(2, QInput::Plane).with_magnetism([0]),
        details,
        &KernelCall {
            nq: 40,
            pd: 0..2,
            values: &magnetic_values,
            q: &q,
            cutoff: 0.0,
        },
        &mut magnetic,
    )
    .unwrap();

    assert_close(&magnetic, &nuclear, 1e-15);
}

#[test]
fn magnetic_densities_start_from_the_nominal_value() {
    let model = Echo::new(&["sld", "radius"]);
    let details = ProblemDetails::from_lengths(&[(0, 2)], None).unwrap();

    // sld 4.0 dispersed over [2, 6], spin down beam, no magnetization
    let values = [
        1.0, 0.0, 4.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 6.0, 0.25, 0.75,
    ];
    let mut result = [0.0; 2];
    kernel_iq(
        &model,
        KernelConfig::new(2, QInput::Plane).with_magnetism([0]),
        details,
        &KernelCall {
            nq: 1,
            pd: 0..2,
            values: &values,
            q: &[0.1, 0.0],
            cutoff: 0.0,
        },
        &mut result,
    )
    .unwrap();

    assert_close(&result, &[4.0, 1.0], 1e-15);
}

#[test]
fn empty_q_only_accumulates_the_norm() {
    let model = Echo::new(&["x"]);
    let details = ProblemDetails::from_lengths(&[(0, 3)], None).unwrap();
    let values = [1.0, 0.0, 9.0, 1.0, 2.0, 3.0, 0.25, 0.5, 0.25];
    let mut result = [0.0];

    kernel_iq(
        &model,
        KernelConfig::new(1, QInput::Radial),
        details,
        &KernelCall {
            nq: 0,
            pd: 0..3,
            values: &values,
            q: &[],
            cutoff: 0.0,
        },
        &mut result,
    )
    .unwrap();

    assert_eq!(result, [1.0]);
}

fn call<'a>(pd: Range<usize>, values: &'a [f64], q: &'a [f64]) -> KernelCall<'a> {
    KernelCall {
        nq: 1,
        pd,
        values,
        q,
        cutoff: 0.0,
    }
}

#[test]
fn rejects_malformed_calls() {
    let model = Echo::new(&["x"]);
    let details = ProblemDetails::from_lengths(&[(0, 3)], None).unwrap();
    let kernel = Kernel::new(&model, KernelConfig::new(1, QInput::Radial), details).unwrap();
    let values = [1.0, 0.0, 9.0, 1.0, 2.0, 3.0, 0.25, 0.5, 0.25];
    let mut result = [7.0, 7.0];


    assert_eq!(
        kernel.run(&call(0..4, &values, &[0.1]), &mut result),
        Err(KernelErr::InvalidRange {
            start: 0,
            stop: 4,
            total: 3
        })
    );
    assert!(matches!(
        kernel.run(&call(2..1, &values, &[0.1]), &mut result),
        Err(KernelErr::InvalidRange { .. })
    ));
    assert!(matches!(
        kernel.run(&call(0..3, &values, &[0.1, 0.2]), &mut result),
        Err(KernelErr::SizeMismatch { what: "q", .. })
    ));
    assert!(matches!(
        kernel.run(&call(0..3, &values[..8], &[0.1]), &mut result),
        Err(KernelErr::SizeMismatch { what: "values", .. })
    ));
    assert!(matches!(
        kernel.run(&call(0..3, &values, &[0.1]), &mut [0.0; 3]),
        Err(KernelErr::SizeMismatch { what: "result", .. })
    ));

    // nothing was written by the failed calls
    assert_eq!(result, [7.0, 7.0]);
}

#[test]
fn rejects_inconsistent_setups() {
    let model = Frame::new();

    let oriented_radial =
        KernelConfig::new(4, QInput::Radial).with_orientation(OrientationMode::Symmetric);
    assert_eq!(
        Kernel::new(&model, oriented_radial, ProblemDetails::default()).unwrap_err(),
        KernelErr::RequiresPlaneQ {
            what: "orientation"
        }
    );

    let no_theta = KernelConfig::new(4, QInput::Plane).with_orientation(OrientationMode::Asymmetric);
    assert!(matches!(
        Kernel::new(&model, no_theta, ProblemDetails::default()),
        Err(KernelErr::InvalidParameterIndex {
            what: "orientation",
            ..
        })
    ));

    let wrong_count = KernelConfig::new(3, QInput::Plane);
    assert!(matches!(
        Kernel::new(&model, wrong_count, ProblemDetails::default()),
        Err(KernelErr::SizeMismatch { .. })
    ));

    let details = ProblemDetails::from_lengths(&[(7, 2)], None).unwrap();
    assert!(matches!(
        Kernel::new(&model, KernelConfig::new(4, QInput::Plane), details),
        Err(KernelErr::InvalidParameterIndex { index: 7, .. })
    ));
}
