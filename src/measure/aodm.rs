//! Apparent optical depth column densities.
//!
//! Following Savage & Sembach (1991), each pixel's apparent optical depth
//! `τ = -ln f` is summed over velocity and scaled by `m_e c / (π e² f λ)` to
//! give the column density in cm⁻².
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::SPEED_OF_LIGHT;
use crate::line::{ColumnDensity, ColumnDensityFlag};

const ELECTRON_MASS_G: f64 = 9.1093837015e-28;
const ELECTRON_CHARGE_ESU: f64 = 4.80320471e-10;
const SPEED_OF_LIGHT_CM_S: f64 = 2.99792458e10;

/// `m_e c / (π e²)` for velocities in km/s and wavelengths in Ångström, giving
/// column densities in cm⁻²
pub const AOD_CONSTANT: f64 = ELECTRON_MASS_G * SPEED_OF_LIGHT_CM_S
    / (PI * ELECTRON_CHARGE_ESU * ELECTRON_CHARGE_ESU)
    * 1e5
    / 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AodmConfig {
    /// A column density below `nsig` times its uncertainty is an upper limit
    pub nsig: f64,
    /// A pixel is saturated when its flux is at or below this multiple of its
    /// uncertainty...
    pub sat_sigma_fraction: f64,
    /// ...or at or below this absolute normalized flux, whichever is larger
    pub sat_flux_floor: f64,
    /// The shortest run of contiguous saturated pixels that flags the line
    pub min_saturated_run: usize,
}

impl Default for AodmConfig {
    fn default() -> Self {
        Self {
            nsig: 3.0,
            sat_sigma_fraction: 0.2,
            sat_flux_floor: 0.05,
            min_saturated_run: 1,
        }
    }
}

/// The raw sums behind an apparent column density
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AodmSums {
    /// `Σ τ Δv`, in km/s
    pub tau_dv: f64,
    /// `Σ (σ/f)² Δv²`, in (km/s)²
    pub variance: f64,
    pub valid_pixels: usize,
    pub saturated_pixels: usize,
    pub longest_saturated_run: usize,
}

impl AodmSums {
    /// Accumulate over normalized pixels with observed wavelength `wavelength`
    /// and width `width` (Å)
    pub fn accumulate(
        wavelength: &[f64],
        flux: &[f64],
        sigma: &[f64],
        width: &[f64],
        config: &AodmConfig,
    ) -> Self {
        let mut sums = Self::default();
        let mut run = 0usize;
        for (((w, f), s), dw) in wavelength
            .iter()
            .zip(flux.iter())
            .zip(sigma.iter())
            .zip(width.iter())
        {
            if !f.is_finite() || !s.is_finite() || *s <= 0.0 {
                run = 0;
                continue;
            }
            sums.valid_pixels += 1;

            let floor = (s * config.sat_sigma_fraction).max(config.sat_flux_floor);
            let mut f = *f;
            if f <= floor {
                f = floor;
                sums.saturated_pixels += 1;
                run += 1;
                sums.longest_saturated_run = sums.longest_saturated_run.max(run);
            } else {
                run = 0;
            }

            let tau = if f >= 1.0 { 0.0 } else { -f.ln() };
            let dv = SPEED_OF_LIGHT * dw / w;
            sums.tau_dv += tau * dv;
            sums.variance += (s / f).powi(2) * dv * dv;
        }
        sums
    }
}

/// The apparent column density of a transition with rest wavelength `wrest`
/// (Å) and oscillator strength `fosc` over the given pixels
pub fn apparent_column_density(
    wavelength: &[f64],
    flux: &[f64],
    sigma: &[f64],
    width: &[f64],
    wrest: f64,
    fosc: f64,
    config: &AodmConfig,
) -> ColumnDensity {
    let sums = AodmSums::accumulate(wavelength, flux, sigma, width, config);
    let invalid = wavelength.len() - sums.valid_pixels;
    if invalid > 0 {
        log::warn!("Skipped {invalid} of {} pixels with invalid flux or sigma", wavelength.len());
    }
    if sums.valid_pixels == 0 {
        log::warn!("No valid pixels for column density of {wrest} Å");
        return ColumnDensity::failure();
    }

    let scale = AOD_CONSTANT / (fosc * wrest);
    let value = scale * sums.tau_dv;
    let sigma = scale * sums.variance.sqrt();

    let flag = if sums.saturated_pixels > 0
        && sums.longest_saturated_run >= config.min_saturated_run.max(1)
    {
        log::warn!(
            "{} saturated pixels for {wrest} Å, column density is a lower limit",
            sums.saturated_pixels
        );
        ColumnDensityFlag::Saturated
    } else if value < config.nsig * sigma {
        ColumnDensityFlag::UpperLimit
    } else {
        ColumnDensityFlag::Good
    };
    log::debug!(
        "AODM over {} pixels for {wrest} Å: N={value:e} ± {sigma:e} ({flag:?})",
        sums.valid_pixels
    );
    ColumnDensity {
        value,
        sigma,
        flag,
        saturated_pixels: sums.saturated_pixels,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coordinate::CoordinateRange;
    use crate::line::SpectralCut;
    use crate::test_data;

    fn assert_rel(x: f64, y: f64) {
        assert!((x - y).abs() <= 1e-9 * y.abs(), "{x} != {y}");
    }

    #[test]
    fn test_constant() {
        assert_rel(AOD_CONSTANT, 376788494637694.56);
    }

    #[test]
    fn test_fixture() {
        test_data::init_logging();
        let spec = test_data::read_spectrum_from_file("./test/data/civ_1548.txt").unwrap();
        let cut = SpectralCut::new(&spec, &CoordinateRange::closed(6080.78, 6087.82)).unwrap();
        let n = apparent_column_density(
            &cut.wavelength,
            &cut.flux,
            &cut.sigma,
            &cut.width,
            1548.195,
            0.1908,
            &AodmConfig::default(),
        );
        assert_rel(n.value, 63647810721173.61);
        assert_rel(n.sigma, 1307868672105.1855);
        assert_eq!(n.saturated_pixels, 0);
        assert_eq!(n.flag, ColumnDensityFlag::Good);
    }

    #[test]
    fn test_flags() {
        let wv = [1000.0, 1000.1, 1000.2, 1000.3];
        let width = [0.1; 4];
        let config = AodmConfig::default();

        let n = apparent_column_density(
            &wv,
            &[0.9, 0.02, 0.01, 0.9],
            &[0.01; 4],
            &width,
            1000.0,
            0.5,
            &config,
        );
        assert_eq!(n.flag, ColumnDensityFlag::Saturated);
        assert_eq!(n.saturated_pixels, 2);

        // a single saturated pixel does not meet a longer run requirement
        let strict = AodmConfig {
            min_saturated_run: 2,
            ..config
        };
        let n = apparent_column_density(
            &wv,
            &[0.9, 0.02, 0.5, 0.9],
            &[0.01; 4],
            &width,
            1000.0,
            0.5,
            &strict,
        );
        assert_eq!(n.saturated_pixels, 1);
        assert_eq!(n.flag, ColumnDensityFlag::Good);

        let n = apparent_column_density(
            &wv,
            &[1.0, 0.99, 1.01, 1.0],
            &[0.1; 4],
            &width,
            1000.0,
            0.5,
            &config,
        );
        assert_eq!(n.flag, ColumnDensityFlag::UpperLimit);
        assert!(n.value > 0.0);

        let n = apparent_column_density(
            &wv,
            &[f64::NAN, 0.5, 0.5, 0.5],
            &[0.1, 0.0, -0.1, f64::INFINITY],
            &width,
            1000.0,
            0.5,
            &config,
        );
        assert_eq!(n, ColumnDensity::failure());
    }

    #[test]
    fn test_emission_clipped() {
        let sums = AodmSums::accumulate(
            &[1000.0, 1000.1],
            &[1.2, 1.0],
            &[0.1, 0.1],
            &[0.1, 0.1],
            &AodmConfig::default(),
        );
        assert_eq!(sums.tau_dv, 0.0);
        assert_eq!(sums.valid_pixels, 2);
        assert!(sums.variance > 0.0);
    }
}
