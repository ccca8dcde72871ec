use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How an equivalent width was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EwMethod {
    /// Direct summation of the absorbed fraction over the window
    #[default]
    Boxcar,
    /// The area of a single Gaussian fit to the absorbed fraction
    Gaussian,
}

/// The reference frame an equivalent width is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Frame {
    Observed,
    Rest,
}

/// An equivalent width and its 1σ uncertainty, in Ångström
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EquivalentWidth {
    pub value: f64,
    pub sigma: f64,
    pub frame: Frame,
    pub method: EwMethod,
}

impl EquivalentWidth {
    pub fn observed(value: f64, sigma: f64, method: EwMethod) -> Self {
        Self {
            value,
            sigma,
            frame: Frame::Observed,
            method,
        }
    }

    /// Divide out the `(1 + z)` stretch of an observed-frame width. A width that
    /// is already in the rest frame is returned unchanged.
    pub fn to_rest_frame(&self, z: f64) -> Self {
        match self.frame {
            Frame::Rest => *self,
            Frame::Observed => Self {
                value: self.value / (1.0 + z),
                sigma: self.sigma / (1.0 + z),
                frame: Frame::Rest,
                method: self.method,
            },
        }
    }
}

impl fmt::Display for EquivalentWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = match self.frame {
            Frame::Observed => "observed",
            Frame::Rest => "rest",
        };
        write!(f, "{:.4} ± {:.4} Å ({frame})", self.value, self.sigma)
    }
}

/// The quality of a column density measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ColumnDensityFlag {
    #[default]
    Unmeasured = 0,
    Good = 1,
    /// Saturated pixels make the value a lower limit
    Saturated = 2,
    /// The value is not significant and should be read as an upper limit
    UpperLimit = 3,
    /// No pixel in the window could be used
    Failure = 4,
}

impl ColumnDensityFlag {
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    pub const fn is_limit(&self) -> bool {
        matches!(self, Self::Saturated | Self::UpperLimit)
    }
}

/// An apparent column density and its 1σ uncertainty, in cm⁻²
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnDensity {
    pub value: f64,
    pub sigma: f64,
    pub flag: ColumnDensityFlag,
    pub saturated_pixels: usize,
}

impl ColumnDensity {
    pub fn failure() -> Self {
        Self {
            value: 0.0,
            sigma: 0.0,
            flag: ColumnDensityFlag::Failure,
            saturated_pixels: 0,
        }
    }

    /// `log10(N)` and its propagated uncertainty, defined only for `N > 0`
    pub fn log10(&self) -> Option<(f64, f64)> {
        if self.value > 0.0 && self.value.is_finite() {
            let log_n = self.value.log10();
            let sig_log_n = self.sigma / (self.value * std::f64::consts::LN_10);
            Some((log_n, sig_log_n))
        } else {
            None
        }
    }
}

impl fmt::Display for ColumnDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4e} ± {:.4e} cm^-2 (flag={})",
            self.value,
            self.sigma,
            self.flag.code()
        )
    }
}

/// Velocity statistics of an optical depth profile. Velocities are in km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kinematics {
    /// Width of the interval enclosing the central fraction of optical depth
    pub dv: f64,
    /// Edge-leading statistic: offset of the optical depth peak from `v_mid`
    /// in units of `dv / 2`
    pub fedg: f64,
    /// Mean-median statistic: offset of the optical depth median from `v_mid`
    /// in units of `dv / 2`
    pub fmm: f64,
    pub v_peak: f64,
    /// Midpoint of the `dv` interval
    pub v_mid: f64,
    /// Optical depth weighted mean velocity
    pub centroid: f64,
    pub npix: usize,
}

impl fmt::Display for Kinematics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dv={:.1} km/s, fedg={:.4}, fmm={:.4}",
            self.dv, self.fedg, self.fmm
        )
    }
}

/// The measured properties of a line. Each field stays `None` until the
/// corresponding estimator has succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineAttributes {
    pub z: Option<f64>,
    pub ew: Option<EquivalentWidth>,
    pub column_density: Option<ColumnDensity>,
    pub kinematics: Option<Kinematics>,
}

impl LineAttributes {
    pub fn flag_n(&self) -> ColumnDensityFlag {
        self.column_density
            .map(|n| n.flag)
            .unwrap_or(ColumnDensityFlag::Unmeasured)
    }
}
