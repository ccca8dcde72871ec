use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::{CoordinateRange, CoordinateSystem, Velocity, Wavelength};
use crate::error::MeasurementError;
use crate::spectrum::SpectrumLike;

/// The region of the spectrum a line is analysed over.
///
/// Exactly one window is in force at a time: setting a wavelength window on a
/// line replaces any velocity window and vice versa.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalysisWindow {
    /// Observed-frame wavelengths, in Ångström
    Wavelength(CoordinateRange<Wavelength>),
    /// Velocities in km/s relative to the line's redshifted rest wavelength
    Velocity(CoordinateRange<Velocity>),
}

fn validated<C: CoordinateSystem>(
    range: CoordinateRange<C>,
) -> Result<CoordinateRange<C>, MeasurementError> {
    if range.is_valid_window() {
        Ok(range)
    } else {
        Err(MeasurementError::InvalidWindow {
            axis: C::name(),
            start: range.start,
            end: range.end,
        })
    }
}

impl AnalysisWindow {
    pub fn wavelength(
        range: impl Into<CoordinateRange<Wavelength>>,
    ) -> Result<Self, MeasurementError> {
        validated(range.into()).map(Self::Wavelength)
    }

    pub fn velocity(range: impl Into<CoordinateRange<Velocity>>) -> Result<Self, MeasurementError> {
        validated(range.into()).map(Self::Velocity)
    }

    pub fn is_velocity(&self) -> bool {
        matches!(self, Self::Velocity(_))
    }

    /// Resolve the window into observed wavelengths for a line with rest
    /// wavelength `wrest` at redshift `z`. Only velocity windows need `z`.
    pub fn observed_range(
        &self,
        wrest: f64,
        z: Option<f64>,
    ) -> Result<CoordinateRange<Wavelength>, MeasurementError> {
        match self {
            Self::Wavelength(range) => Ok(*range),
            Self::Velocity(range) => {
                let z = check_redshift(z)?;
                let (low, high) = range.bounds().ok_or(MeasurementError::InvalidWindow {
                    axis: Velocity::name(),
                    start: range.start,
                    end: range.end,
                })?;
                let reference = wrest * (1.0 + z);
                Ok(CoordinateRange::closed(
                    Velocity::to_wavelength(low, reference),
                    Velocity::to_wavelength(high, reference),
                ))
            }
        }
    }
}

/// Require a usable redshift
pub(crate) fn check_redshift(z: Option<f64>) -> Result<f64, MeasurementError> {
    match z {
        None => Err(MeasurementError::MissingRedshift),
        Some(z) if !z.is_finite() || z <= -1.0 => Err(MeasurementError::InvalidRedshift(z)),
        Some(z) => Ok(z),
    }
}

/// The pixels of a spectrum that fall inside an analysis window, with flux and
/// uncertainty normalized by the continuum
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralCut {
    pub indices: RangeInclusive<usize>,
    /// Observed wavelength, in Ångström
    pub wavelength: Vec<f64>,
    pub flux: Vec<f64>,
    pub sigma: Vec<f64>,
    /// Pixel widths taken from the full spectrum, in Ångström
    pub width: Vec<f64>,
}

impl SpectralCut {
    pub fn new(
        spectrum: &dyn SpectrumLike,
        window: &CoordinateRange<Wavelength>,
    ) -> Result<Self, MeasurementError> {
        let indices = spectrum
            .pixel_range(window)
            .ok_or(MeasurementError::EmptyWindow {
                start: window.start.unwrap_or(f64::NEG_INFINITY),
                end: window.end.unwrap_or(f64::INFINITY),
            })?;
        let wv = spectrum.wavelength();
        let cut = Self {
            wavelength: wv[indices.clone()].to_vec(),
            flux: indices.clone().map(|i| spectrum.normalized_flux(i)).collect(),
            sigma: indices.clone().map(|i| spectrum.normalized_sigma(i)).collect(),
            width: indices.clone().map(|i| spectrum.pixel_width(i)).collect(),
            indices,
        };
        log::debug!(
            "Cut {} pixels ({}..={}) for window {window} Å",
            cut.len(),
            cut.indices.start(),
            cut.indices.end()
        );
        Ok(cut)
    }

    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// Velocity of each pixel relative to `reference` (Å), in km/s
    pub fn velocities(&self, reference: f64) -> Vec<f64> {
        self.wavelength
            .iter()
            .map(|w| Velocity::from_wavelength(*w, reference))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spectrum::Spectrum;
    use crate::SPEED_OF_LIGHT;

    #[test]
    fn test_validation() {
        assert!(AnalysisWindow::wavelength((6080.78, 6087.82)).is_ok());
        let err = AnalysisWindow::wavelength((0.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            MeasurementError::InvalidWindow {
                axis: "wavelength",
                start: Some(0.0),
                end: Some(0.0)
            }
        );
        assert!(err.is_configuration());
        assert!(AnalysisWindow::velocity((150.0, -150.0)).is_err());
        assert!(AnalysisWindow::velocity((-150.0, 150.0)).unwrap().is_velocity());
    }

    #[test]
    fn test_observed_range() {
        let window = AnalysisWindow::wavelength((1500.0, 1510.0)).unwrap();
        assert_eq!(
            window.observed_range(1215.67, None).unwrap().bounds(),
            Some((1500.0, 1510.0))
        );

        let window = AnalysisWindow::velocity((-150.0, 150.0)).unwrap();
        assert_eq!(
            window.observed_range(1548.195, None),
            Err(MeasurementError::MissingRedshift)
        );
        assert_eq!(
            window.observed_range(1548.195, Some(-1.0)),
            Err(MeasurementError::InvalidRedshift(-1.0))
        );
        assert!(window.observed_range(1548.195, Some(f64::NAN)).is_err());

        let z = 2.92929;
        let (low, high) = window
            .observed_range(1548.195, Some(z))
            .unwrap()
            .bounds()
            .unwrap();
        let center = 1548.195 * (1.0 + z);
        assert!((low - center * (1.0 - 150.0 / SPEED_OF_LIGHT)).abs() < 1e-9);
        assert!((high - center * (1.0 + 150.0 / SPEED_OF_LIGHT)).abs() < 1e-9);
    }

    #[test]
    fn test_cut() {
        let spec = Spectrum::new(
            vec![1000.0, 1000.5, 1001.0, 1001.5, 1002.0],
            vec![2.0, 1.6, 1.0, 1.6, 2.0],
            vec![0.2; 5],
        )
        .unwrap()
        .with_continuum(vec![2.0; 5])
        .unwrap();
        let cut = SpectralCut::new(&spec, &CoordinateRange::closed(1000.4, 1001.6)).unwrap();
        assert_eq!(cut.indices, 1..=3);
        assert_eq!(cut.flux, vec![0.8, 0.5, 0.8]);
        assert_eq!(cut.sigma, vec![0.1, 0.1, 0.1]);
        assert_eq!(cut.width, vec![0.5, 0.5, 0.5]);
        let v = cut.velocities(1001.0);
        assert_eq!(v[1], 0.0);
        assert!(v[0] < 0.0 && v[2] > 0.0);

        let err = SpectralCut::new(&spec, &CoordinateRange::closed(1000.6, 1000.9)).unwrap_err();
        assert_eq!(
            err,
            MeasurementError::EmptyWindow {
                start: 1000.6,
                end: 1000.9
            }
        );
    }
}
