//! Read-only access to a one-dimensional spectrum.
//!
//! A spectrum is a triple of equal-length arrays: wavelength in Ångström
//! (finite and strictly increasing), flux, and the 1σ flux uncertainty, with
//! an optional continuum. Measurement code only ever sees the spectrum through
//! the [`SpectrumLike`] trait, so callers may plug in their own storage. Two
//! implementations are provided: the owning [`Spectrum`] and the borrowing
//! [`SpectrumView`].
use std::ops::RangeInclusive;

use crate::coordinate::{CoordinateRange, Wavelength};
use crate::error::MeasurementError;
use crate::units::LengthUnit;

/// The minimum number of pixels a spectrum must have so that every pixel has a
/// defined width
pub const MIN_PIXELS: usize = 2;

/// The interface measurement code reads spectra through.
///
/// Implementors must uphold the invariants checked by [`validate_arrays`].
pub trait SpectrumLike {
    /// Wavelength of each pixel, in Ångström
    fn wavelength(&self) -> &[f64];
    fn flux(&self) -> &[f64];
    fn sigma(&self) -> &[f64];

    /// The continuum level of each pixel. When absent the flux is taken to be
    /// normalized already.
    fn continuum(&self) -> Option<&[f64]> {
        None
    }

    fn len(&self) -> usize {
        self.wavelength().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the pixel whose wavelength is closest to `wavelength` and the
    /// magnitude of the error
    fn find_wavelength(&self, wavelength: f64) -> (Option<usize>, f64) {
        let wv = self.wavelength();
        if wv.is_empty() {
            return (None, wavelength);
        }
        let i = match wv.binary_search_by(|wi| wi.total_cmp(&wavelength)) {
            Ok(i) => i,
            Err(i) => i,
        };
        let low = i.saturating_sub(1);
        (low..(i + 1).min(wv.len()))
            .map(|j| (Some(j), (wv[j] - wavelength).abs()))
            .min_by(|(_, e), (_, d)| e.total_cmp(d))
            .unwrap_or((None, wavelength))
    }

    /// The inclusive range of pixel indices whose wavelengths fall inside
    /// `window`, or `None` if no pixel does. An open end of `window` extends to
    /// the end of the spectrum.
    fn pixel_range(&self, window: &CoordinateRange<Wavelength>) -> Option<RangeInclusive<usize>> {
        let wv = self.wavelength();
        let start = match window.start {
            Some(low) => wv.partition_point(|w| *w < low),
            None => 0,
        };
        let end = match window.end {
            Some(high) => wv.partition_point(|w| *w <= high),
            None => wv.len(),
        };
        if start >= end {
            None
        } else {
            Some(start..=(end - 1))
        }
    }

    /// The wavelength extent of pixel `index`, taken as the distance to the
    /// previous pixel. The first pixel borrows the width of the second.
    fn pixel_width(&self, index: usize) -> f64 {
        let wv = self.wavelength();
        if wv.len() < MIN_PIXELS {
            return 0.0;
        }
        if index == 0 {
            wv[1] - wv[0]
        } else {
            wv[index] - wv[index - 1]
        }
    }

    /// Flux divided by the continuum, if there is one
    fn normalized_flux(&self, index: usize) -> f64 {
        match self.continuum() {
            Some(cont) => self.flux()[index] / cont[index],
            None => self.flux()[index],
        }
    }

    /// Uncertainty divided by the continuum, if there is one
    fn normalized_sigma(&self, index: usize) -> f64 {
        match self.continuum() {
            Some(cont) => self.sigma()[index] / cont[index],
            None => self.sigma()[index],
        }
    }

    /// The wavelength range covered by the spectrum
    fn wavelength_range(&self) -> CoordinateRange<Wavelength> {
        let wv = self.wavelength();
        CoordinateRange::new(wv.first().copied(), wv.last().copied())
    }
}

impl<T: SpectrumLike> SpectrumLike for &T {
    fn wavelength(&self) -> &[f64] {
        (*self).wavelength()
    }

    fn flux(&self) -> &[f64] {
        (*self).flux()
    }

    fn sigma(&self) -> &[f64] {
        (*self).sigma()
    }

    fn continuum(&self) -> Option<&[f64]> {
        (*self).continuum()
    }
}

/// Check the invariants every [`SpectrumLike`] must satisfy
pub fn validate_arrays(
    wavelength: &[f64],
    flux: &[f64],
    sigma: &[f64],
    continuum: Option<&[f64]>,
) -> Result<(), MeasurementError> {
    let n = wavelength.len();
    if n != flux.len() || n != sigma.len() {
        return Err(MeasurementError::MismatchedSpectrum {
            wavelength: n,
            flux: flux.len(),
            sigma: sigma.len(),
        });
    }
    if n < MIN_PIXELS {
        return Err(MeasurementError::TooFewPixels {
            got: n,
            min: MIN_PIXELS,
        });
    }
    if let Some(cont) = continuum {
        if cont.len() != n {
            return Err(MeasurementError::MismatchedContinuum {
                continuum: cont.len(),
                expected: n,
            });
        }
    }
    if let Some(i) = wavelength.iter().position(|w| !w.is_finite()) {
        return Err(MeasurementError::NonMonotonicWavelength(i));
    }
    if let Some(i) = wavelength.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(MeasurementError::NonMonotonicWavelength(i + 1));
    }
    Ok(())
}

/// An owned spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelength: Vec<f64>,
    flux: Vec<f64>,
    sigma: Vec<f64>,
    continuum: Option<Vec<f64>>,
}

impl Spectrum {
    /// Create a new spectrum from wavelengths in Ångström
    pub fn new(
        wavelength: Vec<f64>,
        flux: Vec<f64>,
        sigma: Vec<f64>,
    ) -> Result<Self, MeasurementError> {
        validate_arrays(&wavelength, &flux, &sigma, None)?;
        Ok(Self {
            wavelength,
            flux,
            sigma,
            continuum: None,
        })
    }

    /// Create a new spectrum whose wavelengths are given in `unit`, converting
    /// them to Ångström
    pub fn from_units(
        wavelength: Vec<f64>,
        unit: LengthUnit,
        flux: Vec<f64>,
        sigma: Vec<f64>,
    ) -> Result<Self, MeasurementError> {
        let wavelength = wavelength.into_iter().map(|w| unit.to_angstrom(w)).collect();
        Self::new(wavelength, flux, sigma)
    }

    /// Attach a continuum, against which flux and sigma will be normalized
    pub fn with_continuum(mut self, continuum: Vec<f64>) -> Result<Self, MeasurementError> {
        validate_arrays(&self.wavelength, &self.flux, &self.sigma, Some(&continuum))?;
        self.continuum = Some(continuum);
        Ok(self)
    }

    pub fn as_view(&self) -> SpectrumView<'_> {
        SpectrumView {
            wavelength: &self.wavelength,
            flux: &self.flux,
            sigma: &self.sigma,
            continuum: self.continuum.as_deref(),
        }
    }

    pub fn into_inner(self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Option<Vec<f64>>) {
        (self.wavelength, self.flux, self.sigma, self.continuum)
    }
}

impl SpectrumLike for Spectrum {
    fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    fn flux(&self) -> &[f64] {
        &self.flux
    }

    fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    fn continuum(&self) -> Option<&[f64]> {
        self.continuum.as_deref()
    }
}

/// A borrowed spectrum over externally owned arrays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumView<'a> {
    wavelength: &'a [f64],
    flux: &'a [f64],
    sigma: &'a [f64],
    continuum: Option<&'a [f64]>,
}

impl<'a> SpectrumView<'a> {
    pub fn new(
        wavelength: &'a [f64],
        flux: &'a [f64],
        sigma: &'a [f64],
    ) -> Result<Self, MeasurementError> {
        validate_arrays(wavelength, flux, sigma, None)?;
        Ok(Self {
            wavelength,
            flux,
            sigma,
            continuum: None,
        })
    }

    pub fn with_continuum(self, continuum: &'a [f64]) -> Result<Self, MeasurementError> {
        validate_arrays(self.wavelength, self.flux, self.sigma, Some(continuum))?;
        Ok(Self {
            continuum: Some(continuum),
            ..self
        })
    }

    pub fn to_spectrum(&self) -> Spectrum {
        Spectrum {
            wavelength: self.wavelength.to_vec(),
            flux: self.flux.to_vec(),
            sigma: self.sigma.to_vec(),
            continuum: self.continuum.map(|c| c.to_vec()),
        }
    }
}

impl<'a> SpectrumLike for SpectrumView<'a> {
    fn wavelength(&self) -> &[f64] {
        self.wavelength
    }

    fn flux(&self) -> &[f64] {
        self.flux
    }

    fn sigma(&self) -> &[f64] {
        self.sigma
    }

    fn continuum(&self) -> Option<&[f64]> {
        self.continuum
    }
}
