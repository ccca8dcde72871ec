//! Equivalent widths.
use crate::error::MeasurementError;
use crate::line::{EquivalentWidth, EwMethod, SpectralCut};

use super::gauss::{fit_gaussian, GaussianFitConfig};

/// Sum the absorbed fraction `1 - f` over the pixels, weighted by pixel width.
///
/// Returns the equivalent width and its uncertainty, in the units of `width`.
/// Pixels with a non-finite flux contribute nothing.
pub fn boxcar_ew(flux: &[f64], sigma: &[f64], width: &[f64]) -> (f64, f64) {
    let mut ew = 0.0;
    let mut var = 0.0;
    let mut skipped = 0usize;
    for ((f, s), dw) in flux.iter().zip(sigma.iter()).zip(width.iter()) {
        if !f.is_finite() {
            skipped += 1;
            continue;
        }
        ew += (1.0 - f) * dw;
        if s.is_finite() {
            var += dw * dw * s * s;
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {skipped} pixels with non-finite flux");
    }
    (ew, var.sqrt())
}

/// Measure the observed-frame equivalent width of the pixels in `cut`
pub fn equivalent_width(
    cut: &SpectralCut,
    method: EwMethod,
    config: &GaussianFitConfig,
) -> Result<EquivalentWidth, MeasurementError> {
    let (value, sigma) = match method {
        EwMethod::Boxcar => boxcar_ew(&cut.flux, &cut.sigma, &cut.width),
        EwMethod::Gaussian => {
            let absorbed: Vec<f64> = cut.flux.iter().map(|f| 1.0 - f).collect();
            let fit = fit_gaussian(&cut.wavelength, &absorbed, &cut.sigma, config)?;
            (fit.area(), fit.area_sigma())
        }
    };
    log::debug!(
        "{method:?} EW over {} pixels: {value} ± {sigma} Å",
        cut.len()
    );
    Ok(EquivalentWidth::observed(value, sigma, method))
}
