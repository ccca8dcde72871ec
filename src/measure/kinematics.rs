//! Velocity statistics of an optical depth profile, after Prochaska & Wolfe
//! (1997).
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MeasurementError;
use crate::line::Kinematics;

use super::median;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinematicsConfig {
    /// Cumulative optical depth fraction marking the blue edge of `dv`
    pub fraction_low: f64,
    /// Cumulative optical depth fraction marking the red edge of `dv`
    pub fraction_high: f64,
    /// Width of the boxcar the optical depth is smoothed with, in km/s
    pub smooth_kms: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            fraction_low: 0.05,
            fraction_high: 0.95,
            smooth_kms: 2.0,
        }
    }
}

#[inline]
fn is_valid_pixel(flux: f64, sigma: f64) -> bool {
    flux.is_finite() && sigma.is_finite() && sigma > 0.0
}

/// Convert normalized flux into optical depth.
///
/// Pixels at or below half their uncertainty are treated as saturated and take
/// the optical depth `ln(2/σ)`. Negative optical depths are clipped to zero, as
/// are pixels with a non-finite flux or a non-finite or non-positive σ.
pub fn optical_depth_profile(flux: &[f64], sigma: &[f64]) -> Vec<f64> {
    flux.iter()
        .zip(sigma.iter())
        .map(|(f, s)| {
            if !is_valid_pixel(*f, *s) {
                return 0.0;
            }
            let tau = if *f > s / 2.0 && *f > 0.0 {
                -f.ln()
            } else {
                (2.0 / s).ln()
            };
            if tau.is_finite() {
                tau.max(0.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Centered running mean over `nbin` pixels, treating pixels past either end
/// as zero
fn smooth(values: &[f64], nbin: usize) -> Vec<f64> {
    if nbin <= 1 {
        return values.to_vec();
    }
    let half = nbin / 2;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + nbin - half).min(values.len());
            values[start..end].iter().sum::<f64>() / nbin as f64
        })
        .collect()
}

/// The first index of the largest value
fn first_argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, best), (i, v)| {
            if *v > best {
                (i, *v)
            } else {
                (bi, best)
            }
        })
        .0
}

/// Compute the kinematic statistics of absorption at velocities `velocity`
/// (km/s, increasing) with normalized `flux` and `sigma`
pub fn kinematics(
    velocity: &[f64],
    flux: &[f64],
    sigma: &[f64],
    config: &KinematicsConfig,
) -> Result<Kinematics, MeasurementError> {
    let npix = velocity.len();
    if npix < 2 {
        return Err(MeasurementError::TooFewPixels { got: npix, min: 2 });
    }
    let invalid = flux
        .iter()
        .zip(sigma.iter())
        .filter(|(f, s)| !is_valid_pixel(**f, **s))
        .count();
    if invalid > 0 {
        log::warn!("Ignoring {invalid} of {npix} pixels with invalid flux or sigma");
    }
    let mut tau = optical_depth_profile(flux, sigma);

    let steps: Vec<f64> = velocity.windows(2).map(|w| w[1] - w[0]).collect();
    let nbin = match median(&steps) {
        Some(dv) if dv > 0.0 && config.smooth_kms > 0.0 => {
            ((config.smooth_kms / dv).round() as usize).max(1)
        }
        _ => 1,
    };
    if nbin > 1 {
        log::debug!("Smoothing optical depth over {nbin} pixels");
        tau = smooth(&tau, nbin);
    }

    let total: f64 = tau.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return Err(MeasurementError::NoAbsorption);
    }
    let mut acc = 0.0;
    let cumulative: Vec<f64> = tau
        .iter()
        .map(|t| {
            acc += t;
            acc / total
        })
        .collect();

    let lft = cumulative
        .iter()
        .position(|c| *c > config.fraction_low)
        .unwrap_or(0);
    let rgt = cumulative
        .iter()
        .position(|c| *c > config.fraction_high)
        .unwrap_or(npix - 1);
    let dv = velocity[rgt] - velocity[lft];
    let v_mid = 0.5 * (velocity[lft] + velocity[rgt]);

    let v_peak = velocity[first_argmax(&tau)];
    let median_index = cumulative
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(bi, best), (i, c)| {
            let d = (c - 0.5).abs();
            if d < best {
                (i, d)
            } else {
                (bi, best)
            }
        })
        .0;
    let v_median = velocity[median_index];

    let (fedg, fmm) = if dv > 0.0 {
        (
            (v_peak - v_mid).abs() / (dv / 2.0),
            (v_median - v_mid).abs() / (dv / 2.0),
        )
    } else {
        (0.0, 0.0)
    };
    let centroid = velocity
        .iter()
        .zip(tau.iter())
        .map(|(v, t)| v * t)
        .sum::<f64>()
        / total;

    log::debug!("Kinematics over {npix} pixels: lft={lft}, rgt={rgt}, dv={dv}");
    Ok(Kinematics {
        dv,
        fedg,
        fmm,
        v_peak,
        v_mid,
        centroid,
        npix,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coordinate::{CoordinateRange, Velocity};
    use crate::line::SpectralCut;
    use crate::test_data;

    #[test]
    fn test_optical_depth() {
        let tau = optical_depth_profile(&[0.5, 1.2, 0.001, -0.1], &[0.01; 4]);
        assert!((tau[0] - 2f64.ln()).abs() < 1e-12);
        assert_eq!(tau[1], 0.0);
        assert!((tau[2] - 200f64.ln()).abs() < 1e-12);
        assert!((tau[3] - 200f64.ln()).abs() < 1e-12);

        let tau = optical_depth_profile(
            &[f64::NAN, 0.5, 0.5, 0.001],
            &[0.01, 0.0, f64::NAN, -0.01],
        );
        assert_eq!(tau, vec![0.0; 4]);
    }

    #[test]
    fn test_smooth() {
        let values = [0.0, 0.0, 3.0, 0.0, 0.0];
        assert_eq!(smooth(&values, 1), values.to_vec());
        assert_eq!(smooth(&values, 3), vec![0.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(smooth(&[3.0, 0.0], 3), vec![1.0, 1.0]);
    }

    #[test]
    fn test_symmetric_profile() {
        let velocity: Vec<f64> = (-50..=50).map(|v| v as f64).collect();
        let flux: Vec<f64> = velocity
            .iter()
            .map(|v| (-0.8 * (-v * v / (2.0 * 10.0 * 10.0)).exp()).exp())
            .collect();
        let sigma = vec![0.01; flux.len()];
        let config = KinematicsConfig {
            smooth_kms: 0.0,
            ..Default::default()
        };
        let kin = kinematics(&velocity, &flux, &sigma, &config).unwrap();
        assert_eq!(kin.v_peak, 0.0);
        assert!(kin.v_mid.abs() <= 0.5);
        assert!(kin.centroid.abs() < 1e-9);
        assert!(kin.fedg <= 0.05);
        assert!(kin.dv > 20.0 && kin.dv < 40.0);
        assert_eq!(kin.npix, 101);
    }

    #[test]
    fn test_masked_pixel() {
        let velocity: Vec<f64> = (-20..=20).map(|v| v as f64).collect();
        let mut flux: Vec<f64> = velocity
            .iter()
            .map(|v| if v.abs() <= 3.0 { 0.5 } else { 1.0 })
            .collect();
        let sigma = vec![0.01; flux.len()];
        let config = KinematicsConfig {
            smooth_kms: 0.0,
            ..Default::default()
        };
        let clean = kinematics(&velocity, &flux, &sigma, &config).unwrap();
        assert_eq!(clean.dv, 6.0);
        assert_eq!(clean.v_peak, -3.0);
        assert!(clean.centroid.abs() < 1e-12);

        // a bad pixel far from the absorption does not move the statistics
        flux[38] = f64::NAN;
        let masked = kinematics(&velocity, &flux, &sigma, &config).unwrap();
        assert_eq!(masked, clean);
    }

    #[test]
    fn test_no_absorption() {
        let velocity = [-1.0, 0.0, 1.0];
        let err = kinematics(&velocity, &[1.0; 3], &[0.01; 3], &KinematicsConfig::default())
            .unwrap_err();
        assert_eq!(err, MeasurementError::NoAbsorption);
    }

    #[test]
    fn test_fixture() {
        test_data::init_logging();
        let spec = test_data::read_spectrum_from_file("./test/data/nii_1741.txt").unwrap();
        let reference = 1741.5531 * (1.0 + 2.307922);
        let window = CoordinateRange::closed(
            Velocity::to_wavelength(-70.0, reference),
            Velocity::to_wavelength(70.0, reference),
        );
        let cut = SpectralCut::new(&spec, &window).unwrap();
        let velocity = cut.velocities(reference);
        let kin =
            kinematics(&velocity, &cut.flux, &cut.sigma, &KinematicsConfig::default()).unwrap();
        assert_eq!(kin.npix, 70);
        assert!((kin.dv - 62.000794280538116).abs() < 1e-6, "{kin:?}");
        assert!((kin.fedg - 0.6129357159051584).abs() < 1e-6, "{kin:?}");
        assert!((kin.fmm - 0.4839142878739024).abs() < 1e-6, "{kin:?}");
        assert!((kin.v_peak - -14.066324924973191).abs() < 1e-6);
        assert!((kin.v_mid - 4.934925689541849).abs() < 1e-6);
        assert!((kin.centroid - -1.668120936211385).abs() < 1e-6);
    }
}
