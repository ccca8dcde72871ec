//! A prelude to bring into scope all the traits of this library.

pub use crate::coordinate::{CoordinateLike, CoordinateSystem, HasProximity, WavelengthLocated};
pub use crate::linelist::LineList;
pub use crate::spectrum::SpectrumLike;
