//! Polarized magnetic scattering.
//!
//! The four spin cross sections convert into effective scattering length
//! densities as:
//!
//! ```text
//! uu: sld - m_perp_x
//! dd: sld + m_perp_x
//! ud: m_perp_y + i m_perp_z
//! du: m_perp_y - i m_perp_z
//! ```
//!
//! Each contributing channel substitutes its densities into a copy of the
//! parameter block and evaluates the shape model once per magnetic axis.

use std::f64::consts::PI;

use crate::{
    config::{KernelConfig, NUM_LEADING},
    parameters::ParameterBlock,
};

/// Channels with an amplitude at or below this are skipped.
pub const SPIN_THRESHOLD: f64 = 1e-8;

/// Below this `|q|^2` magnetic scattering is taken to be zero.
pub const ORIGIN_THRESHOLD: f64 = 1e-16;

/// Returns `value` restricted to `[low, high]`.
#[inline]
pub fn clip(value: f64, low: f64, high: f64) -> f64 {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

/// Spin channel amplitudes in `[dd, du, ud, uu]` order.
///
/// These are fourth roots of the channel probabilities, so `amp^4` sums to one
/// over the four channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinWeights(pub [f64; 4]);

impl SpinWeights {
    /// Computes the amplitudes from the incident and scattered up fractions.
    ///
    /// # Arguments
    /// * `in_spin` - Fraction of up spins in the incident beam, clipped to `[0, 1]`.
    /// * `out_spin` - Fraction of up spins accepted by the analyzer, clipped to `[0, 1]`.
    pub fn new(in_spin: f64, out_spin: f64) -> Self {
        let in_spin = clip(in_spin, 0.0, 1.0);
        let out_spin = clip(out_spin, 0.0, 1.0);

        Self([
            ((1.0 - in_spin) * (1.0 - out_spin)).sqrt().sqrt(),
            ((1.0 - in_spin) * out_spin).sqrt().sqrt(),
            (in_spin * (1.0 - out_spin)).sqrt().sqrt(),
            (in_spin * out_spin).sqrt().sqrt(),
        ])
    }

    #[inline]
    pub fn amplitudes(&self) -> &[f64; 4] {
        &self.0
    }
}

/// Effective density of a non spin-flip channel (or the first spin-flip axis
/// when `sld` is zero).
#[inline]
pub fn mag_sld(qx: f64, qy: f64, p: f64, mx: f64, my: f64, sld: f64) -> f64 {
    let perp = qy * mx - qx * my;
    sld + perp * p
}

/// Where a magnetic density lives and where its magnetization is read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticSld {
    /// Index of the density in the parameter block.
    pub density_index: usize,
    /// The nominal density as given in `values`, not its dispersed grid value.
    pub nominal: f64,
    /// Magnetization vector `(mx, my, mz)`.
    pub magnetization: [f64; 3],
}

/// Per-computation magnetic state, resolved once from `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct Magnetism {
    spins: SpinWeights,
    sin_mspin: f64,
    cos_mspin: f64,
    slds: Vec<MagneticSld>,
}

impl Magnetism {
    /// Reads the polarization and magnetization entries from a `values` array.
    ///
    /// # Arguments
    /// * `config` - The kernel configuration, must be magnetic.
    /// * `values` - The full `values` array.
    pub fn from_values(config: &KernelConfig, values: &[f64]) -> Self {
        let offset = config.polarization_offset();
        let spins = SpinWeights::new(values[offset], values[offset + 1]);
        let (sin_mspin, cos_mspin) = (-values[offset + 2] * PI / 180.0).sin_cos();

        let slds = config
            .magnetic_slds()
            .iter()
            .enumerate()
            .map(|(k, &density_index)| {
                let m = config.magnetization_offset(k);
                MagneticSld {
                    density_index,
                    nominal: values[NUM_LEADING + density_index],
                    magnetization: [values[m], values[m + 1], values[m + 2]],
                }
            })
            .collect();

        Self {
            spins,
            sin_mspin,
            cos_mspin,
            slds,
        }
    }

    #[inline]
    pub fn spins(&self) -> &SpinWeights {
        &self.spins
    }

    #[inline]
    pub fn slds(&self) -> &[MagneticSld] {
        &self.slds
    }

    /// Sums the shape model over every contributing spin channel and axis for one q point.
    ///
    /// # Arguments
    /// * `qx`, `qy` - The scattering vector.
    /// * `base` - The parameter block of the current grid point, left untouched.
    ///   Non-flip channels use the nominal densities rather than the block's.
    /// * `local` - Scratch block the effective densities are written into.
    /// * `eval` - Evaluates the shape model for a prepared block.
    ///
    /// # Returns
    /// The summed scattering, exactly zero at the origin.
    pub fn scatter<F>(
        &self,
        qx: f64,
        qy: f64,
        base: &ParameterBlock,
        local: &mut ParameterBlock,
        mut eval: F,
    ) -> f64
    where
        F: FnMut(&ParameterBlock) -> f64,
    {
        let qsq = qx * qx + qy * qy;
        if qsq <= ORIGIN_THRESHOLD {
            return 0.0;
        }

        let p_nonflip = (qy * self.cos_mspin + qx * self.sin_mspin) / qsq;
        let p_flip = (qy * self.sin_mspin - qx * self.cos_mspin) / qsq;
        let p = [p_nonflip, p_flip, p_flip, -p_nonflip];

        local.copy_from(base);
        let mut scattering = 0.0;

        for (index, (&xs, &pk)) in self.spins.amplitudes().iter().zip(&p).enumerate() {
            if xs <= SPIN_THRESHOLD {
                continue;
            }

            let spin_flip = index == 1 || index == 2;
            let axes = if spin_flip { 2 } else { 1 };

            for axis in 0..axes {
                for sld in &self.slds {
                    let [mx, my, mz] = sld.magnetization;

                    let effective = if axis == 1 {
                        if index == 1 { -mz } else { mz }
                    } else {
                        let nominal = if spin_flip { 0.0 } else { sld.nominal };
                        mag_sld(qx, qy, pk, mx, my, nominal)
                    };

                    local.set(sld.density_index, xs * effective);
                }

                scattering += eval(local);
            }
        }

        scattering
    }
}
