//! A spectral line: an identity (rest wavelength and optional atomic data), the
//! configuration needed to analyse it in a spectrum, and the measurements made
//! so far.
//!
//! ```
//! use abslines::{EwMethod, Spectrum, SpectralLine};
//!
//! let wave: Vec<f64> = (0..100).map(|i| 6070.0 + 0.25 * i as f64).collect();
//! let flux: Vec<f64> = wave.iter().map(|w| {
//!     1.0 - 0.5 * (-(w - 6083.3f64).powi(2) / (2.0 * 0.5 * 0.5)).exp()
//! }).collect();
//! let spec = Spectrum::new(wave, flux, vec![0.02; 100]).unwrap();
//!
//! let mut line: SpectralLine = "CIV 1548".parse().unwrap();
//! line.set_spectrum(&spec);
//! line.set_redshift(2.92929).unwrap();
//! line.set_velocity_window((-150.0, 150.0)).unwrap();
//!
//! let ew = line.measure_restew(EwMethod::Boxcar).unwrap();
//! assert!(ew.value > 0.0);
//! let n = line.measure_aodm().unwrap();
//! assert!(n.log10().unwrap().0 > 13.0);
//! ```
use std::cmp;
use std::fmt;
use std::str::FromStr;

use crate::coordinate::{CoordinateLike, CoordinateRange, Velocity, Wavelength};
use crate::error::MeasurementError;
use crate::linelist::{AtomicData, BuiltinLineList, LineList, TransitionName};
use crate::measure::{
    apparent_column_density, equivalent_width, kinematics, AodmConfig, GaussianFitConfig,
    KinematicsConfig,
};
use crate::spectrum::SpectrumLike;
use crate::tolerance::Tolerance;

mod results;
mod window;

pub use results::{
    ColumnDensity, ColumnDensityFlag, EquivalentWidth, EwMethod, Frame, Kinematics,
    LineAttributes,
};
pub use window::{AnalysisWindow, SpectralCut};

use window::check_redshift;

/// The default redshift tolerance used by [`SpectralLine::ismatch`]
pub const REDSHIFT_TOLERANCE: f64 = 1e-6;

/// Where and over what range a line is analysed
#[derive(Clone, Default)]
pub struct AnalysisConfig<'a> {
    pub spectrum: Option<&'a dyn SpectrumLike>,
    pub window: Option<AnalysisWindow>,
}

impl fmt::Debug for AnalysisConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("spectrum", &self.spectrum.map(|s| s.len()))
            .field("window", &self.window)
            .finish()
    }
}

/// An absorption line at a known rest wavelength.
///
/// A line borrows the spectrum it is measured in, so a single spectrum can be
/// shared by many lines. Measurements are recorded in the line's
/// [`LineAttributes`] and also returned to the caller. A failed measurement
/// leaves the attributes unchanged.
#[derive(Debug, Clone)]
pub struct SpectralLine<'a> {
    wrest: f64,
    transition: Option<AtomicData>,
    analysis: AnalysisConfig<'a>,
    attributes: LineAttributes,
}

impl<'a> SpectralLine<'a> {
    /// Create a line with no atomic data other than its rest wavelength in Å
    pub fn new(wrest: f64) -> Result<Self, MeasurementError> {
        if !wrest.is_finite() || wrest <= 0.0 {
            return Err(MeasurementError::InvalidRestWavelength(wrest));
        }
        Ok(Self {
            wrest,
            transition: None,
            analysis: AnalysisConfig::default(),
            attributes: LineAttributes::default(),
        })
    }

    pub fn from_transition(transition: AtomicData) -> Result<Self, MeasurementError> {
        let mut line = Self::new(transition.wrest)?;
        line.transition = Some(transition);
        Ok(line)
    }

    /// Look up a transition like `"CII 1334"` in `llist`
    pub fn from_name<L: LineList + ?Sized>(name: &str, llist: &L) -> Result<Self, MeasurementError> {
        let name: TransitionName = name.parse()?;
        let transition = llist.by_name(&name)?;
        Self::from_transition(transition.clone())
    }

    /// Look up the transition at `wrest` in `llist`
    pub fn from_wavelength<L: LineList + ?Sized>(
        wrest: f64,
        llist: &L,
    ) -> Result<Self, MeasurementError> {
        if !wrest.is_finite() || wrest <= 0.0 {
            return Err(MeasurementError::InvalidRestWavelength(wrest));
        }
        let transition = llist.by_wavelength(wrest, Tolerance::default())?;
        Self::from_transition(transition.clone())
    }

    #[inline]
    pub fn wrest(&self) -> f64 {
        self.wrest
    }

    pub fn name(&self) -> Option<&TransitionName> {
        self.transition.as_ref().map(|t| &t.name)
    }

    pub fn transition(&self) -> Option<&AtomicData> {
        self.transition.as_ref()
    }

    pub fn oscillator_strength(&self) -> Option<f64> {
        self.transition.as_ref().map(|t| t.f)
    }

    pub fn analysis(&self) -> &AnalysisConfig<'a> {
        &self.analysis
    }

    pub fn attributes(&self) -> &LineAttributes {
        &self.attributes
    }

    pub fn set_spectrum(&mut self, spectrum: &'a dyn SpectrumLike) {
        self.analysis.spectrum = Some(spectrum);
    }

    pub fn window(&self) -> Option<&AnalysisWindow> {
        self.analysis.window.as_ref()
    }

    pub fn set_window(&mut self, window: AnalysisWindow) {
        log::debug!("Setting window of {} to {window:?}", self);
        self.analysis.window = Some(window);
    }

    /// Analyse the line over observed wavelengths (Å), replacing any velocity
    /// window
    pub fn set_wavelength_window(
        &mut self,
        range: impl Into<CoordinateRange<Wavelength>>,
    ) -> Result<(), MeasurementError> {
        self.set_window(AnalysisWindow::wavelength(range)?);
        Ok(())
    }

    /// Analyse the line over velocities (km/s) around its redshifted rest
    /// wavelength, replacing any wavelength window
    pub fn set_velocity_window(
        &mut self,
        range: impl Into<CoordinateRange<Velocity>>,
    ) -> Result<(), MeasurementError> {
        self.set_window(AnalysisWindow::velocity(range)?);
        Ok(())
    }

    pub fn clear_window(&mut self) {
        self.analysis.window = None;
    }

    pub fn redshift(&self) -> Option<f64> {
        self.attributes.z
    }

    pub fn set_redshift(&mut self, z: f64) -> Result<(), MeasurementError> {
        self.attributes.z = Some(check_redshift(Some(z))?);
        Ok(())
    }

    /// The observed wavelength range the line is analysed over
    pub fn wavelength_window(&self) -> Result<CoordinateRange<Wavelength>, MeasurementError> {
        let window = self.analysis.window.ok_or(MeasurementError::MissingWindow)?;
        window.observed_range(self.wrest, self.attributes.z)
    }

    /// Cut the pixels inside the line's window out of its spectrum
    pub fn cut(&self) -> Result<SpectralCut, MeasurementError> {
        let window = self.wavelength_window()?;
        let spectrum = self.analysis.spectrum.ok_or(MeasurementError::MissingSpectrum)?;
        SpectralCut::new(spectrum, &window)
    }

    /// Measure the observed-frame equivalent width
    pub fn measure_ew(&mut self, method: EwMethod) -> Result<EquivalentWidth, MeasurementError> {
        self.measure_ew_with(method, &GaussianFitConfig::default())
    }

    pub fn measure_ew_with(
        &mut self,
        method: EwMethod,
        config: &GaussianFitConfig,
    ) -> Result<EquivalentWidth, MeasurementError> {
        let cut = self.cut()?;
        let ew = equivalent_width(&cut, method, config)?;
        self.attributes.ew = Some(ew);
        Ok(ew)
    }

    /// Measure the rest-frame equivalent width, which requires a redshift
    pub fn measure_restew(
        &mut self,
        method: EwMethod,
    ) -> Result<EquivalentWidth, MeasurementError> {
        self.measure_restew_with(method, &GaussianFitConfig::default())
    }

    pub fn measure_restew_with(
        &mut self,
        method: EwMethod,
        config: &GaussianFitConfig,
    ) -> Result<EquivalentWidth, MeasurementError> {
        let z = check_redshift(self.attributes.z)?;
        let cut = self.cut()?;
        let ew = equivalent_width(&cut, method, config)?.to_rest_frame(z);
        self.attributes.ew = Some(ew);
        Ok(ew)
    }

    /// Measure the apparent optical depth column density. A window that
    /// selects no pixels is recorded as a [`ColumnDensityFlag::Failure`].
    pub fn measure_aodm(&mut self) -> Result<ColumnDensity, MeasurementError> {
        self.measure_aodm_with(&AodmConfig::default())
    }

    pub fn measure_aodm_with(
        &mut self,
        config: &AodmConfig,
    ) -> Result<ColumnDensity, MeasurementError> {
        let fosc = self
            .oscillator_strength()
            .ok_or(MeasurementError::MissingAtomicData(self.wrest))?;
        let cut = match self.cut() {
            Ok(cut) => cut,
            Err(MeasurementError::EmptyWindow { start, end }) => {
                log::warn!("No pixels in {start}:{end} Å for column density of {}", self);
                let column = ColumnDensity::failure();
                self.attributes.column_density = Some(column);
                return Ok(column);
            }
            Err(e) => return Err(e),
        };
        let column = apparent_column_density(
            &cut.wavelength,
            &cut.flux,
            &cut.sigma,
            &cut.width,
            self.wrest,
            fosc,
            config,
        );
        self.attributes.column_density = Some(column);
        Ok(column)
    }

    /// Measure the velocity statistics of the optical depth profile, which
    /// requires a velocity window and a redshift
    pub fn measure_kin(&mut self) -> Result<Kinematics, MeasurementError> {
        self.measure_kin_with(&KinematicsConfig::default())
    }

    pub fn measure_kin_with(
        &mut self,
        config: &KinematicsConfig,
    ) -> Result<Kinematics, MeasurementError> {
        if !matches!(self.analysis.window, Some(AnalysisWindow::Velocity(_))) {
            return Err(MeasurementError::MissingVelocityWindow);
        }
        let z = check_redshift(self.attributes.z)?;
        let cut = self.cut()?;
        let velocity = cut.velocities(self.wrest * (1.0 + z));
        let kin = kinematics(&velocity, &cut.flux, &cut.sigma, config)?;
        self.attributes.kinematics = Some(kin);
        Ok(kin)
    }

    /// Whether `other` is the same line: equal rest wavelengths within 1 mÅ
    /// and equal redshifts. Two lines without a redshift match, a line with a
    /// redshift never matches one without.
    pub fn ismatch<K: Into<LineKey>>(&self, other: K) -> bool {
        self.ismatch_within(other, Tolerance::default(), REDSHIFT_TOLERANCE)
    }

    pub fn ismatch_within<K: Into<LineKey>>(
        &self,
        other: K,
        wrest_tolerance: Tolerance,
        z_tolerance: f64,
    ) -> bool {
        let other: LineKey = other.into();
        let z_match = match (self.attributes.z, other.z) {
            (None, None) => true,
            (Some(z1), Some(z2)) => (z1 - z2).abs() <= z_tolerance,
            _ => false,
        };
        z_match && wrest_tolerance.test(self.wrest, other.wrest)
    }

    /// Whether the observed wavelength windows of the two lines overlap.
    /// Both lines need a window that resolves to wavelengths.
    pub fn coincident_line(&self, other: &SpectralLine<'_>) -> Result<bool, MeasurementError> {
        let mine = self.resolvable_window()?;
        let theirs = other.resolvable_window()?;
        Ok(mine.overlaps(&theirs))
    }

    fn resolvable_window(&self) -> Result<CoordinateRange<Wavelength>, MeasurementError> {
        self.wavelength_window()
            .map_err(|_| MeasurementError::NoResolvableWindow(self.wrest))
    }
}

/// The identity of a line for matching: its redshift and rest wavelength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineKey {
    pub z: Option<f64>,
    pub wrest: f64,
}

impl From<&SpectralLine<'_>> for LineKey {
    fn from(line: &SpectralLine<'_>) -> Self {
        Self {
            z: line.redshift(),
            wrest: line.wrest(),
        }
    }
}

/// `(redshift, rest wavelength)`
impl From<(f64, f64)> for LineKey {
    fn from((z, wrest): (f64, f64)) -> Self {
        Self { z: Some(z), wrest }
    }
}

impl fmt::Display for SpectralLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[AbsLine: ")?;
        if let Some(name) = self.name() {
            write!(f, "{name}, ")?;
        }
        write!(f, "wrest={:.4} Å", self.wrest)?;
        if let Some(z) = self.attributes.z {
            write!(f, ", z={z:.4}")?;
        }
        write!(f, "]")
    }
}

impl cmp::PartialEq for SpectralLine<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.ismatch(other)
    }
}

impl cmp::PartialOrd for SpectralLine<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        if self == other {
            return Some(cmp::Ordering::Equal);
        }
        match self.wrest.partial_cmp(&other.wrest) {
            Some(cmp::Ordering::Equal) => self.attributes.z.partial_cmp(&other.attributes.z),
            ord => ord,
        }
    }
}

impl CoordinateLike<Wavelength> for SpectralLine<'_> {
    #[inline]
    fn coordinate(&self) -> f64 {
        self.wrest
    }
}

/// Parse a transition name against the built-in catalog
impl FromStr for SpectralLine<'_> {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s, &BuiltinLineList::new())
    }
}
