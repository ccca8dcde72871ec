//! Explicit unit conversions into the crate's working units.
//!
//! Every wavelength handled by the crate is in Ångström and every velocity in
//! km/s. Data arriving in any other unit must pass through one of these
//! conversions first.
use std::{error::Error, fmt::Display, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::SPEED_OF_LIGHT;

/// A unit of length for wavelength arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LengthUnit {
    #[default]
    Angstrom,
    Nanometer,
    Micron,
    Centimeter,
    Meter,
}

impl LengthUnit {
    /// The number of Ångström in one of this unit
    pub const fn angstrom_per_unit(&self) -> f64 {
        match self {
            LengthUnit::Angstrom => 1.0,
            LengthUnit::Nanometer => 10.0,
            LengthUnit::Micron => 1e4,
            LengthUnit::Centimeter => 1e8,
            LengthUnit::Meter => 1e10,
        }
    }

    #[inline]
    pub fn to_angstrom(&self, value: f64) -> f64 {
        value * self.angstrom_per_unit()
    }

    #[inline]
    pub fn from_angstrom(&self, value: f64) -> f64 {
        value / self.angstrom_per_unit()
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Angstrom => "Å",
            LengthUnit::Nanometer => "nm",
            LengthUnit::Micron => "um",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
        }
    }
}

/// A unit of line-of-sight velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VelocityUnit {
    #[default]
    KilometersPerSecond,
    MetersPerSecond,
    /// A fraction of the speed of light, `v/c`
    SpeedOfLight,
}

impl VelocityUnit {
    pub const fn kms_per_unit(&self) -> f64 {
        match self {
            VelocityUnit::KilometersPerSecond => 1.0,
            VelocityUnit::MetersPerSecond => 1e-3,
            VelocityUnit::SpeedOfLight => SPEED_OF_LIGHT,
        }
    }

    #[inline]
    pub fn to_kms(&self, value: f64) -> f64 {
        value * self.kms_per_unit()
    }

    #[inline]
    pub fn from_kms(&self, value: f64) -> f64 {
        value / self.kms_per_unit()
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            VelocityUnit::KilometersPerSecond => "km/s",
            VelocityUnit::MetersPerSecond => "m/s",
            VelocityUnit::SpeedOfLight => "c",
        }
    }
}

/// A unit symbol that could not be recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUnitError(pub String);

impl Display for UnknownUnitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown unit {:?}", self.0)
    }
}

impl Error for UnknownUnitError {}

impl FromStr for LengthUnit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" | "aa" | "å" | "angstrom" => Ok(Self::Angstrom),
            "nm" | "nanometer" => Ok(Self::Nanometer),
            "um" | "micron" => Ok(Self::Micron),
            "cm" | "centimeter" => Ok(Self::Centimeter),
            "m" | "meter" => Ok(Self::Meter),
            _ => Err(UnknownUnitError(s.to_string())),
        }
    }
}

impl FromStr for VelocityUnit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km/s" | "kms" => Ok(Self::KilometersPerSecond),
            "m/s" | "ms" => Ok(Self::MetersPerSecond),
            "c" => Ok(Self::SpeedOfLight),
            _ => Err(UnknownUnitError(s.to_string())),
        }
    }
}

impl Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Display for VelocityUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(LengthUnit::Nanometer.to_angstrom(608.5), 6085.0);
        assert!((LengthUnit::Centimeter.to_angstrom(1.548195e-5) - 1548.195).abs() < 1e-9);
        assert_eq!(LengthUnit::Micron.from_angstrom(1e4), 1.0);
        assert_eq!("AA".parse::<LengthUnit>().unwrap(), LengthUnit::Angstrom);
        assert_eq!("nm".parse::<LengthUnit>().unwrap(), LengthUnit::Nanometer);
        assert!("furlong".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn test_velocity() {
        assert_eq!(VelocityUnit::MetersPerSecond.to_kms(150_000.0), 150.0);
        assert_eq!(VelocityUnit::SpeedOfLight.to_kms(1.0), SPEED_OF_LIGHT);
        assert_eq!(VelocityUnit::SpeedOfLight.from_kms(SPEED_OF_LIGHT), 1.0);
        assert_eq!("km/s".parse::<VelocityUnit>().unwrap().to_string(), "km/s");
    }
}
