//! The failure modes of line configuration and measurement.
//!
//! Every fallible operation on a [`SpectralLine`](crate::SpectralLine) returns a
//! [`MeasurementError`]. Callers that only care about the broad class of a
//! failure, e.g. to treat a missing window as an expected signal rather than a
//! fatal condition, can branch on [`MeasurementError::kind`].
use thiserror::Error;

use crate::linelist::TransitionNameParseError;

/// The broad classes of [`MeasurementError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required input (window, redshift, spectrum, atomic data) is missing or
    /// invalid
    Configuration,
    /// The Gaussian fit did not converge
    FitConvergence,
    /// An operation's precondition on the data was not met
    Value,
    /// A line identity is not known to the reference catalog
    Lookup,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("rest wavelength must be finite and positive, got {0}")]
    InvalidRestWavelength(f64),
    #[error("no analysis window has been set")]
    MissingWindow,
    #[error("invalid {axis} window [{start:?}, {end:?}]")]
    InvalidWindow {
        axis: &'static str,
        start: Option<f64>,
        end: Option<f64>,
    },
    #[error("a velocity window is required for this measurement")]
    MissingVelocityWindow,
    #[error("redshift has not been set")]
    MissingRedshift,
    #[error("redshift must be finite and greater than -1, got {0}")]
    InvalidRedshift(f64),
    #[error("no spectrum has been attached to the line")]
    MissingSpectrum,
    #[error("no oscillator strength is known for the line at {0} Å")]
    MissingAtomicData(f64),

    #[error("spectrum arrays differ in length (wavelength={wavelength}, flux={flux}, sigma={sigma})")]
    MismatchedSpectrum {
        wavelength: usize,
        flux: usize,
        sigma: usize,
    },
    #[error("continuum length {continuum} does not match spectrum length {expected}")]
    MismatchedContinuum { continuum: usize, expected: usize },
    #[error("spectrum wavelengths must be finite and strictly increasing (violated at pixel {0})")]
    NonMonotonicWavelength(usize),
    #[error("a spectrum needs at least {min} pixels, got {got}")]
    TooFewPixels { got: usize, min: usize },
    #[error("the window [{start}, {end}] Å contains no spectrum pixels")]
    EmptyWindow { start: f64, end: f64 },
    #[error("the optical depth profile contains no absorption")]
    NoAbsorption,
    #[error("line at {0} Å has no resolvable wavelength window")]
    NoResolvableWindow(f64),

    #[error("Gaussian fit did not converge after {iterations} iterations")]
    FitDidNotConverge { iterations: usize },
    #[error("Gaussian fit produced a degenerate solution (amplitude={amplitude}, center={center}, stddev={stddev})")]
    DegenerateFit {
        amplitude: f64,
        center: f64,
        stddev: f64,
    },

    #[error(transparent)]
    MalformedTransitionName(#[from] TransitionNameParseError),
    #[error("unknown transition {0}")]
    UnknownTransition(String),
}

impl MeasurementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRestWavelength(_)
            | Self::MissingWindow
            | Self::InvalidWindow { .. }
            | Self::MissingVelocityWindow
            | Self::MissingRedshift
            | Self::InvalidRedshift(_)
            | Self::MissingSpectrum
            | Self::MissingAtomicData(_) => ErrorKind::Configuration,
            Self::FitDidNotConverge { .. } | Self::DegenerateFit { .. } => {
                ErrorKind::FitConvergence
            }
            Self::MismatchedSpectrum { .. }
            | Self::MismatchedContinuum { .. }
            | Self::NonMonotonicWavelength(_)
            | Self::TooFewPixels { .. }
            | Self::EmptyWindow { .. }
            | Self::NoAbsorption
            | Self::NoResolvableWindow(_) => ErrorKind::Value,
            Self::MalformedTransitionName(_) | Self::UnknownTransition(_) => ErrorKind::Lookup,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
