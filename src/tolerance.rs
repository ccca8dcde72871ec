use std::{error::Error, fmt::Display, ops, ops::RangeInclusive, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::SPEED_OF_LIGHT;

/// A failure to parse a wavelength tolerance quantity from a string
#[derive(Debug, PartialEq, Eq)]
pub enum ToleranceParsingError {
    /// The unit isn't empty, but not recognized
    UnknownUnit,
    /// The magnitude of the error tolerated couldn't be determined
    InvalidMagnitude,
}

impl Display for ToleranceParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("{:?}", self))
    }
}

impl Error for ToleranceParsingError {}

impl FromStr for Tolerance {
    type Err = ToleranceParsingError;

    /// Parse a string of the form "<magnitude:f64><unit:a|ppm|kms>"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let n = s.len();
        if n < 2 {
            return Err(ToleranceParsingError::InvalidMagnitude);
        }
        let (magnitude, suffix) = if s.ends_with("ppm") {
            (&s[0..n - 3], "ppm")
        } else if s.ends_with("km/s") {
            (&s[0..n - 4], "kms")
        } else if s.ends_with("kms") {
            (&s[0..n - 3], "kms")
        } else if s.ends_with("aa") {
            (&s[0..n - 2], "a")
        } else if s.ends_with('a') {
            (&s[0..n - 1], "a")
        } else {
            return Err(ToleranceParsingError::UnknownUnit);
        };
        let magnitude = match magnitude.trim().parse::<f64>() {
            Ok(magnitude) if magnitude.is_finite() && magnitude >= 0.0 => magnitude,
            _ => return Err(ToleranceParsingError::InvalidMagnitude),
        };
        match suffix {
            "ppm" => Ok(Self::PPM(magnitude)),
            "kms" => Ok(Self::Velocity(magnitude)),
            _ => Ok(Self::Angstrom(magnitude)),
        }
    }
}

/// How far apart two wavelengths may be while still being considered the same
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tolerance {
    /// An absolute difference in Ångström
    Angstrom(f64),
    /// A relative difference in parts-per-million
    PPM(f64),
    /// A relative difference expressed as a Doppler velocity in km/s
    Velocity(f64),
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Angstrom(tol) => write!(f, "{}A", tol),
            Self::PPM(tol) => write!(f, "{}PPM", tol),
            Self::Velocity(tol) => write!(f, "{}km/s", tol),
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Angstrom(1e-3)
    }
}

impl Tolerance {
    /// The half-width of the tolerated interval around `query`, in Ångström
    pub fn width(&self, query: f64) -> f64 {
        match self {
            Tolerance::Angstrom(tol) => *tol,
            Tolerance::PPM(tol) => query.abs() * *tol / 1e6,
            Tolerance::Velocity(tol) => query.abs() * *tol / SPEED_OF_LIGHT,
        }
    }

    /// The interval around `query` which is within this `Tolerance`
    /// instance's range.
    pub fn bounds(&self, query: f64) -> (f64, f64) {
        let width = self.width(query);
        (query - width, query + width)
    }

    /// Compute the error between the two wavelengths, in the appropriate units
    pub fn call(&self, query: f64, reference: f64) -> f64 {
        match self {
            Self::Angstrom(_) => query - reference,
            Self::PPM(_) => (query - reference) / reference * 1e6,
            Self::Velocity(_) => (query - reference) / reference * SPEED_OF_LIGHT,
        }
    }

    /// Return the numeric value of the error threshold in its units
    pub fn tol(&self) -> f64 {
        match self {
            Self::Angstrom(tol) => *tol,
            Self::PPM(tol) => *tol,
            Self::Velocity(tol) => *tol,
        }
    }

    /// Check if `query` is within the tolerated error interval around `reference`.
    ///
    /// Relative tolerances are scaled by the larger of the two magnitudes so that
    /// `test(a, b) == test(b, a)` always holds.
    pub fn test(&self, query: f64, reference: f64) -> bool {
        let scale = if query.abs() > reference.abs() {
            query
        } else {
            reference
        };
        (query - reference).abs() <= self.width(scale)
    }

    pub fn as_range(&self, query: f64) -> RangeInclusive<f64> {
        let (low, hi) = self.bounds(query);
        RangeInclusive::new(low, hi)
    }
}

/// Tolerance objects can by scaled up or down by a floating point value
impl ops::Mul<f64> for Tolerance {
    type Output = Tolerance;

    fn mul(self, rhs: f64) -> Self::Output {
        match self {
            Self::Angstrom(val) => Self::Angstrom(rhs * val),
            Self::PPM(val) => Self::PPM(rhs * val),
            Self::Velocity(val) => Self::Velocity(rhs * val),
        }
    }
}
