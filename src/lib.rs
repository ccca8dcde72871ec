//! Measure absorption lines in one-dimensional astronomical spectra.
//!
//! A [`SpectralLine`] is configured with a spectrum, an analysis window in
//! either observed wavelength or velocity, and optionally a redshift. It then
//! supports:
//!
//! - equivalent widths by boxcar summation or a single Gaussian fit, in the
//!   observed or rest frame
//! - apparent optical depth column densities with a quality flag
//! - velocity-width and asymmetry statistics of the optical depth profile
//! - matching lines against one another and testing whether their windows
//!   overlap
//!
//! Wavelengths are in Ångström, velocities in km/s and column densities in
//! cm⁻².
pub mod coordinate;
pub mod error;
pub mod line;
pub mod line_utils;
pub mod linelist;
pub mod measure;
pub mod prelude;
pub mod spectrum;
pub mod tolerance;
pub mod units;

#[cfg(test)]
mod test_data;

pub use crate::coordinate::{
    CoordinateLike, CoordinateRange, CoordinateSystem, Velocity, Wavelength, SPEED_OF_LIGHT,
};
pub use crate::error::{ErrorKind, MeasurementError};
pub use crate::line::{
    AnalysisWindow, ColumnDensity, ColumnDensityFlag, EquivalentWidth, EwMethod, Frame,
    Kinematics, LineAttributes, SpectralLine,
};
pub use crate::line_utils::{transition_table, TransitionRow};
pub use crate::linelist::{AtomicData, BuiltinLineList, LineList, TransitionName};
pub use crate::measure::{AodmConfig, GaussianFitConfig, GaussianGuess, KinematicsConfig};
pub use crate::spectrum::{Spectrum, SpectrumLike, SpectrumView};
pub use crate::tolerance::Tolerance;
