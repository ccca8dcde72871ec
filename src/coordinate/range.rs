use std::{
    error::Error,
    fmt::Display,
    marker::PhantomData,
    num::ParseFloatError,
    ops::{Bound, Range, RangeBounds, RangeTo},
    str::FromStr,
};

use super::{CoordinateLike, CoordinateSystem, HasProximity};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An inclusive interval within a single dimension. Either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoordinateRange<C> {
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip))]
    coord: PhantomData<C>,
}

impl<C> CoordinateRange<C> {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            start,
            end,
            coord: PhantomData,
        }
    }

    /// Create a range with both ends closed
    pub fn closed(start: f64, end: f64) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn contains<T: CoordinateLike<C>>(&self, point: &T) -> bool {
        let x = CoordinateLike::<C>::coordinate(point);
        RangeBounds::<f64>::contains(&self, &x)
    }

    pub fn contains_raw(&self, x: &f64) -> bool {
        RangeBounds::<f64>::contains(&self, x)
    }

    /// Both ends, if both are present
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn width(&self) -> Option<f64> {
        self.bounds().map(|(start, end)| end - start)
    }

    pub fn midpoint(&self) -> Option<f64> {
        self.bounds().map(|(start, end)| (start + end) / 2.0)
    }

    /// Test whether this range and `interval` share at least one point. An open
    /// end extends to infinity in its direction.
    pub fn overlaps<T: RangeBounds<f64>>(&self, interval: &T) -> bool {
        let interval_start = match interval.start_bound() {
            Bound::Included(x) => *x,
            Bound::Excluded(x) => *x,
            Bound::Unbounded => f64::NEG_INFINITY,
        };

        let interval_end = match interval.end_bound() {
            Bound::Included(y) => *y,
            Bound::Excluded(y) => *y,
            Bound::Unbounded => f64::INFINITY,
        };
        (self.end.unwrap_or(f64::INFINITY) >= interval_start
            && interval_end >= self.start.unwrap_or(f64::NEG_INFINITY))
            || (self.end.is_close(&Some(interval_end))
                && self.start.is_close(&Some(interval_start)))
    }
}

impl<C: CoordinateSystem> CoordinateRange<C> {
    /// Check that both ends are present, finite and ordered, that the start lies
    /// strictly above the coordinate system's minimum and the end at or below
    /// its maximum
    pub fn is_valid_window(&self) -> bool {
        match self.bounds() {
            Some((start, end)) => {
                start.is_finite()
                    && end.is_finite()
                    && start < end
                    && start > C::minimum_value()
                    && end <= C::maximum_value()
            }
            None => false,
        }
    }
}

impl<C> Default for CoordinateRange<C> {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            coord: PhantomData,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum CoordinateRangeParseError {
    MalformedStart(ParseFloatError),
    MalformedEnd(ParseFloatError),
    MissingEnd,
}

impl Display for CoordinateRangeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateRangeParseError::MalformedStart(e) => {
                write!(f, "Failed to parse range start {e}")
            }
            CoordinateRangeParseError::MalformedEnd(e) => {
                write!(f, "Failed to parse range end {e}")
            }
            CoordinateRangeParseError::MissingEnd => {
                write!(f, "Range has no separator between start and end")
            }
        }
    }
}

impl Error for CoordinateRangeParseError {}

impl<C> FromStr for CoordinateRange<C> {
    type Err = CoordinateRangeParseError;

    /// Parse `"<start>:<end>"`, `"<start> <end>"` or `"<start>,<end>"`. Either
    /// side may be empty to leave that end open. `-` is not a separator here
    /// because velocities are signed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut tokens = if s.contains(':') {
            s.split(':')
        } else if s.contains(',') {
            s.split(',')
        } else {
            s.split(' ')
        };
        let start_s = tokens.next().unwrap_or_default().trim();
        let start_t = if start_s.is_empty() {
            None
        } else {
            match start_s.parse() {
                Ok(val) => Some(val),
                Err(e) => return Err(CoordinateRangeParseError::MalformedStart(e)),
            }
        };
        let end_s = match tokens.next() {
            Some(end_s) => end_s.trim(),
            None => return Err(CoordinateRangeParseError::MissingEnd),
        };
        let end_t = if end_s.is_empty() {
            None
        } else {
            match end_s.parse() {
                Ok(val) => Some(val),
                Err(e) => return Err(CoordinateRangeParseError::MalformedEnd(e)),
            }
        };
        Ok(CoordinateRange {
            start: start_t,
            end: end_t,
            coord: PhantomData,
        })
    }
}

impl<C> Display for CoordinateRange<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{start}:{end}"),
            (Some(start), None) => write!(f, "{start}:"),
            (None, Some(end)) => write!(f, ":{end}"),
            (None, None) => write!(f, ":"),
        }
    }
}

impl<C> From<RangeTo<f64>> for CoordinateRange<C> {
    fn from(value: RangeTo<f64>) -> Self {
        Self::new(None, Some(value.end))
    }
}

impl<C> From<Range<f64>> for CoordinateRange<C> {
    fn from(value: Range<f64>) -> Self {
        Self::new(Some(value.start), Some(value.end))
    }
}

impl<C> RangeBounds<f64> for CoordinateRange<C> {
    fn start_bound(&self) -> Bound<&f64> {
        if let Some(start) = self.start.as_ref() {
            Bound::Included(start)
        } else {
            Bound::Unbounded
        }
    }

    fn end_bound(&self) -> Bound<&f64> {
        if let Some(end) = self.end.as_ref() {
            Bound::Included(end)
        } else {
            Bound::Unbounded
        }
    }
}

impl<C> RangeBounds<f64> for &CoordinateRange<C> {
    fn start_bound(&self) -> Bound<&f64> {
        (*self).start_bound()
    }

    fn end_bound(&self) -> Bound<&f64> {
        (*self).end_bound()
    }
}

impl<C> From<(f64, f64)> for CoordinateRange<C> {
    fn from(value: (f64, f64)) -> Self {
        Self::new(Some(value.0), Some(value.1))
    }
}

impl<C> From<[f64; 2]> for CoordinateRange<C> {
    fn from(value: [f64; 2]) -> Self {
        Self::new(Some(value[0]), Some(value[1]))
    }
}
