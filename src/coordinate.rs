//! Coordinate systems that spectral quantities live in, and intervals over them.
//!
//! Wavelengths are always expressed in Ångström and velocities in km/s. The
//! zero-sized [`Wavelength`] and [`Velocity`] marker types tag values and
//! ranges with the axis they belong to, so a velocity window cannot be handed
//! to code expecting a wavelength window.
mod dim;
mod range;

pub use dim::{
    CoordinateLike, CoordinateSystem, Dimension, HasProximity, Velocity, Wavelength,
    WavelengthLocated, SPEED_OF_LIGHT,
};

pub use range::{CoordinateRange, CoordinateRangeParseError};
