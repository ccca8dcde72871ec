use std::fmt::Display;

use num_traits::{Float, FromPrimitive};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The speed of light in vacuum, in km/s
pub const SPEED_OF_LIGHT: f64 = 299_792.458;

/// An enum over the different coordinate planes
#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dimension {
    Wavelength(Wavelength),
    Velocity(Velocity),
}

macro_rules! dim_dispatch {
    ($d:ident, $f:tt) => {
        match $d {
            Dimension::Wavelength(_) => <Wavelength as CoordinateSystem>::$f(),
            Dimension::Velocity(_) => <Velocity as CoordinateSystem>::$f(),
        }
    };
}

impl Dimension {
    pub const fn name(&self) -> &'static str {
        match self {
            Dimension::Wavelength(_) => "wavelength",
            Dimension::Velocity(_) => "velocity",
        }
    }

    /// The unit every coordinate on this axis is expressed in
    pub const fn unit(&self) -> &'static str {
        match self {
            Dimension::Wavelength(_) => "Å",
            Dimension::Velocity(_) => "km/s",
        }
    }

    pub fn minimum_value(&self) -> f64 {
        dim_dispatch!(self, minimum_value)
    }

    pub fn maximum_value(&self) -> f64 {
        dim_dispatch!(self, maximum_value)
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.unit())
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// The wavelength coordinate system, in Ångström
pub struct Wavelength();

impl Wavelength {
    /// Access the wavelength of the coordinate type
    #[inline]
    pub fn coordinate<T: CoordinateLike<Wavelength>>(inst: &T) -> f64 {
        CoordinateLike::<Wavelength>::coordinate(inst)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// The line-of-sight velocity coordinate system, in km/s relative to some
/// reference wavelength
pub struct Velocity();

impl Velocity {
    /// Access the velocity of the coordinate type
    #[inline]
    pub fn coordinate<T: CoordinateLike<Velocity>>(inst: &T) -> f64 {
        CoordinateLike::<Velocity>::coordinate(inst)
    }

    /// Map a velocity offset around `reference` (Å) to an observed wavelength
    /// using the non-relativistic Doppler formula
    #[inline]
    pub fn to_wavelength(velocity: f64, reference: f64) -> f64 {
        reference * (1.0 + velocity / SPEED_OF_LIGHT)
    }

    /// The inverse of [`Velocity::to_wavelength`]
    #[inline]
    pub fn from_wavelength(wavelength: f64, reference: f64) -> f64 {
        SPEED_OF_LIGHT * (wavelength / reference - 1.0)
    }
}

/// Describe a coordinate system as an object itself rather than as a type parameter
pub trait CoordinateSystem: Sized {
    #[inline]
    fn coordinate<T: CoordinateLike<Self>>(inst: &T) -> f64 {
        CoordinateLike::<Self>::coordinate(inst)
    }

    fn name_of(&self) -> &'static str {
        Self::name()
    }

    fn dimension() -> Dimension;

    fn name() -> &'static str {
        Self::dimension().name()
    }

    fn unit() -> &'static str {
        Self::dimension().unit()
    }

    fn minimum_value() -> f64 {
        0.0
    }

    fn maximum_value() -> f64 {
        f64::INFINITY
    }
}

impl CoordinateSystem for Wavelength {
    fn dimension() -> Dimension {
        Dimension::Wavelength(Self())
    }
}

impl CoordinateSystem for Velocity {
    fn dimension() -> Dimension {
        Dimension::Velocity(Self())
    }

    fn minimum_value() -> f64 {
        -SPEED_OF_LIGHT
    }

    fn maximum_value() -> f64 {
        SPEED_OF_LIGHT
    }
}

/// Denote a type has a coordinate value on coordinate system `T`
pub trait CoordinateLike<T>: PartialOrd {
    /// The trait method for accessing the coordinate of the object on coordinate
    /// system `T`
    fn coordinate(&self) -> f64;
}

/// A named coordinate system membership for wavelength
pub trait WavelengthLocated: CoordinateLike<Wavelength> {
    #[inline]
    fn wavelength(&self) -> f64 {
        CoordinateLike::<Wavelength>::coordinate(self)
    }
}

impl<T: CoordinateLike<C>, C> CoordinateLike<C> for &T {
    fn coordinate(&self) -> f64 {
        (*self).coordinate()
    }
}

impl<T: CoordinateLike<Wavelength>> WavelengthLocated for T {}

pub(crate) fn _isclose<T>(x: T, y: T, rtol: T, atol: T) -> bool
where
    T: Float,
{
    (x - y).abs() <= (atol + rtol * x.abs().max(y.abs()))
}

/// Symmetric closeness test with a relative tolerance of 1e-5 and an absolute
/// tolerance of 1e-8
pub(crate) fn isclose<T>(x: T, y: T) -> bool
where
    T: Float + FromPrimitive,
{
    _isclose(x, y, T::from_f64(1e-5).unwrap(), T::from_f64(1e-8).unwrap())
}

pub trait HasProximity: PartialEq + PartialOrd + Copy {
    fn is_close(&self, other: &Self) -> bool {
        self == other
    }
}

macro_rules! impl_has_proximity {
    ($t:ty) => {
        impl $crate::coordinate::HasProximity for $t {
            fn is_close(&self, other: &Self) -> bool {
                isclose(*self, *other)
            }
        }
    };
}

impl_has_proximity!(f32);
impl_has_proximity!(f64);

impl<T: HasProximity> HasProximity for Option<T> {
    fn is_close(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(x), Some(y)) => x.is_close(y),
            _ => false,
        }
    }
}

impl HasProximity for usize {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_close() {
        assert!(0.0.is_close(&0.0));
        assert!(Some(0.0).is_close(&Some(0.0)));
        assert!(!Some(0.0).is_close(&None));
        assert!(5usize.is_close(&5));
        assert!(1548.195.is_close(&1548.1951));
        assert!(!1548.195.is_close(&1548.3));
        // symmetric even when the magnitudes differ
        assert_eq!(1.0.is_close(&1.00001), 1.00001.is_close(&1.0));
    }

    #[test]
    fn test_axes() {
        let dims = [Dimension::Wavelength(Wavelength()), Dimension::Velocity(Velocity())];
        for dim in dims {
            match dim {
                Dimension::Wavelength(x) => {
                    assert_eq!(x.name_of(), "wavelength");
                    assert_eq!(Wavelength::unit(), "Å");
                    assert_eq!(dim.to_string(), "wavelength (Å)");
                    assert_eq!(dim.minimum_value(), 0.0);
                    assert_eq!(dim.maximum_value(), f64::INFINITY);
                }
                Dimension::Velocity(x) => {
                    assert_eq!(x.name_of(), "velocity");
                    assert_eq!(Velocity::unit(), "km/s");
                    assert_eq!(dim.to_string(), "velocity (km/s)");
                    assert_eq!(dim.minimum_value(), -SPEED_OF_LIGHT);
                    assert_eq!(dim.maximum_value(), SPEED_OF_LIGHT);
                }
            }
        }
    }

    #[test]
    fn test_doppler() {
        let reference = 6083.31;
        let w = Velocity::to_wavelength(150.0, reference);
        assert!(w > reference);
        assert!((Velocity::from_wavelength(w, reference) - 150.0).abs() < 1e-8);
        assert_eq!(Velocity::to_wavelength(0.0, reference), reference);
    }
}
