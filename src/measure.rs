//! Estimators over a window of normalized spectrum pixels.
//!
//! The functions here are pure: they take slices (usually the columns of a
//! [`SpectralCut`](crate::line::SpectralCut)) and return values. The
//! [`SpectralLine`](crate::SpectralLine) methods resolve windows and record
//! the results.
pub mod aodm;
pub mod ew;
pub mod gauss;
pub mod kinematics;

pub use aodm::{apparent_column_density, AodmConfig, AodmSums, AOD_CONSTANT};
pub use ew::{boxcar_ew, equivalent_width};
pub use gauss::{fit_gaussian, GaussianFit, GaussianFitConfig, GaussianGuess};
pub use kinematics::{kinematics, optical_depth_profile, KinematicsConfig};

/// The median of `values`, or `None` if there are none
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2]))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}
