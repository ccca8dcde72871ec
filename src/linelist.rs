//! Atomic data for absorption-line transitions.
//!
//! Transitions are named in the conventional `"<element><ionization> <wavelength>"`
//! form, e.g. `"CIV 1548"` or `"HI 1215"`, where the ionization stage is a Roman
//! numeral and the wavelength is the integer part of the rest wavelength in
//! Ångström. Names are parsed into a [`TransitionName`] eagerly so malformed
//! names are rejected before any catalog lookup happens.
//!
//! Catalogs implement [`LineList`]. A small built-in catalog of strong UV
//! resonance lines is provided by [`BuiltinLineList`].
use std::{cmp, error::Error, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::{CoordinateLike, Wavelength, WavelengthLocated};
use crate::error::MeasurementError;
use crate::tolerance::Tolerance;

const ROMAN_NUMERALS: [&str; 30] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
    "XVI", "XVII", "XVIII", "XIX", "XX", "XXI", "XXII", "XXIII", "XXIV", "XXV", "XXVI", "XXVII",
    "XXVIII", "XXIX", "XXX",
];

/// A failure to parse a transition name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionNameParseError {
    /// The name has no wavelength component
    MissingWavelength(String),
    /// The element symbol is not one capital letter optionally followed by a
    /// lowercase letter
    MalformedElement(String),
    /// The ionization stage is not a Roman numeral from I to XXX
    InvalidIonization(String),
    /// The wavelength is not a non-negative integer
    InvalidWavelength(String),
}

impl fmt::Display for TransitionNameParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWavelength(s) => write!(f, "Transition name {s:?} has no wavelength"),
            Self::MalformedElement(s) => write!(f, "Malformed element symbol in {s:?}"),
            Self::InvalidIonization(s) => write!(f, "Invalid ionization stage in {s:?}"),
            Self::InvalidWavelength(s) => write!(f, "Invalid wavelength in {s:?}"),
        }
    }
}

impl Error for TransitionNameParseError {}

/// A parsed transition name like `"NiII 1741"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionName {
    element: String,
    ionization: u8,
    wavelength: u32,
}

impl TransitionName {
    /// `ionization` is 1 for the neutral species
    pub fn new(element: &str, ionization: u8, wavelength: u32) -> Self {
        Self {
            element: element.to_string(),
            ionization,
            wavelength,
        }
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn ionization(&self) -> u8 {
        self.ionization
    }

    /// The integer part of the rest wavelength, in Ångström
    pub fn wavelength(&self) -> u32 {
        self.wavelength
    }

    /// The element symbol and ionization stage, e.g. `"CIV"`
    pub fn ion(&self) -> String {
        format!("{}{}", self.element, roman_numeral(self.ionization))
    }
}

fn roman_numeral(value: u8) -> &'static str {
    match value {
        1..=30 => ROMAN_NUMERALS[value as usize - 1],
        _ => "?",
    }
}

impl fmt::Display for TransitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ion(), self.wavelength)
    }
}

impl FromStr for TransitionName {
    type Err = TransitionNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let ion = tokens
            .next()
            .ok_or_else(|| TransitionNameParseError::MissingWavelength(s.to_string()))?;
        let wavelength = tokens
            .next()
            .ok_or_else(|| TransitionNameParseError::MissingWavelength(s.to_string()))?;
        if tokens.next().is_some() {
            return Err(TransitionNameParseError::InvalidWavelength(s.to_string()));
        }

        let mut chars = ion.char_indices();
        let split = match chars.next() {
            Some((_, c)) if c.is_ascii_uppercase() => match chars.next() {
                Some((i, c)) if c.is_ascii_lowercase() => i + c.len_utf8(),
                Some((i, _)) => i,
                None => ion.len(),
            },
            _ => return Err(TransitionNameParseError::MalformedElement(s.to_string())),
        };
        let (element, stage) = ion.split_at(split);
        let ionization = ROMAN_NUMERALS
            .iter()
            .position(|numeral| *numeral == stage)
            .ok_or_else(|| TransitionNameParseError::InvalidIonization(s.to_string()))?;

        let wavelength = wavelength
            .parse::<u32>()
            .map_err(|_| TransitionNameParseError::InvalidWavelength(s.to_string()))?;

        Ok(Self {
            element: element.to_string(),
            ionization: ionization as u8 + 1,
            wavelength,
        })
    }
}

/// The atomic data of a single transition
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AtomicData {
    pub name: TransitionName,
    /// Rest wavelength in vacuum, in Ångström
    pub wrest: f64,
    /// Oscillator strength
    pub f: f64,
    /// Einstein A coefficient (transition probability), in s⁻¹
    pub a: Option<f64>,
}

impl AtomicData {
    pub fn new(name: TransitionName, wrest: f64, f: f64, a: Option<f64>) -> Self {
        Self { name, wrest, f, a }
    }
}

impl fmt::Display for AtomicData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.4} Å, f={})", self.name, self.wrest, self.f)
    }
}

impl CoordinateLike<Wavelength> for AtomicData {
    #[inline]
    fn coordinate(&self) -> f64 {
        self.wrest
    }
}

impl cmp::PartialEq for AtomicData {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.wrest == other.wrest
    }
}

impl cmp::PartialOrd for AtomicData {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.wrest.partial_cmp(&other.wrest)
    }
}

/// A searchable catalog of transitions
pub trait LineList {
    /// All transitions, sorted by rest wavelength
    fn transitions(&self) -> &[AtomicData];

    fn by_name(&self, name: &TransitionName) -> Result<&AtomicData, MeasurementError> {
        self.transitions()
            .iter()
            .find(|t| t.name == *name)
            .ok_or_else(|| MeasurementError::UnknownTransition(name.to_string()))
    }

    /// Find the transition whose rest wavelength is nearest to `wrest`, if it
    /// is within `tolerance`
    fn by_wavelength(
        &self,
        wrest: f64,
        tolerance: Tolerance,
    ) -> Result<&AtomicData, MeasurementError> {
        let transitions = self.transitions();
        let i = transitions.partition_point(|t| t.wavelength() < wrest);
        let low = i.saturating_sub(1);
        (low..(i + 1).min(transitions.len()))
            .map(|j| &transitions[j])
            .filter(|t| tolerance.test(t.wavelength(), wrest))
            .min_by(|a, b| {
                (a.wrest - wrest)
                    .abs()
                    .total_cmp(&(b.wrest - wrest).abs())
            })
            .ok_or_else(|| MeasurementError::UnknownTransition(format!("{wrest} Å")))
    }
}

// element, ionization, rest wavelength (Å), oscillator strength, A (s⁻¹)
const BUILTIN_TRANSITIONS: &[(&str, u8, f64, f64, Option<f64>)] = &[
    ("H", 1, 949.7430, 0.01394, Some(4.204e7)),
    ("H", 1, 972.5367, 0.02900, Some(8.127e7)),
    ("H", 1, 1025.7222, 0.07912, Some(1.897e8)),
    ("O", 6, 1031.9261, 0.1325, Some(4.16e8)),
    ("O", 6, 1037.6167, 0.06580, Some(4.09e8)),
    ("H", 1, 1215.6700, 0.4164, Some(6.265e8)),
    ("N", 5, 1238.8210, 0.1560, Some(3.40e8)),
    ("N", 5, 1242.8040, 0.07770, Some(3.37e8)),
    ("Si", 2, 1260.4221, 1.18, None),
    ("C", 2, 1334.5323, 0.1278, None),
    ("Si", 4, 1393.7602, 0.513, Some(8.80e8)),
    ("Si", 4, 1402.7729, 0.254, Some(8.63e8)),
    ("Si", 2, 1526.7070, 0.133, None),
    ("C", 4, 1548.1950, 0.1908, Some(2.65e8)),
    ("C", 4, 1550.7700, 0.09522, Some(2.64e8)),
    ("Al", 2, 1670.7886, 1.77, Some(1.39e9)),
    ("Ni", 2, 1741.5531, 0.0427, None),
    ("Fe", 2, 2382.7652, 0.320, Some(3.13e8)),
    ("Fe", 2, 2600.1729, 0.239, Some(2.35e8)),
    ("Mg", 2, 2796.3540, 0.6155, Some(2.625e8)),
    ("Mg", 2, 2803.5310, 0.3058, Some(2.595e8)),
];

/// A catalog of common ultraviolet resonance transitions seen in quasar
/// absorption systems
#[derive(Debug, Clone)]
pub struct BuiltinLineList {
    transitions: Vec<AtomicData>,
}

impl Default for BuiltinLineList {
    fn default() -> Self {
        let mut transitions: Vec<AtomicData> = BUILTIN_TRANSITIONS
            .iter()
            .map(|(element, ionization, wrest, f, a)| {
                AtomicData::new(
                    TransitionName::new(element, *ionization, wrest.floor() as u32),
                    *wrest,
                    *f,
                    *a,
                )
            })
            .collect();
        transitions.sort_by(|a, b| a.wrest.total_cmp(&b.wrest));
        Self { transitions }
    }
}

impl BuiltinLineList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineList for BuiltinLineList {
    fn transitions(&self) -> &[AtomicData] {
        &self.transitions
    }
}

/// A user-assembled catalog
#[derive(Debug, Clone, Default)]
pub struct CustomLineList {
    transitions: Vec<AtomicData>,
}

impl CustomLineList {
    pub fn new(mut transitions: Vec<AtomicData>) -> Self {
        transitions.sort_by(|a, b| a.wrest.total_cmp(&b.wrest));
        Self { transitions }
    }

    pub fn push(&mut self, transition: AtomicData) {
        let i = self
            .transitions
            .partition_point(|t| t.wrest < transition.wrest);
        self.transitions.insert(i, transition);
    }
}

impl LineList for CustomLineList {
    fn transitions(&self) -> &[AtomicData] {
        &self.transitions
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_name() {
        let name: TransitionName = "NiII 1741".parse().unwrap();
        assert_eq!(name.element(), "Ni");
        assert_eq!(name.ionization(), 2);
        assert_eq!(name.wavelength(), 1741);
        assert_eq!(name.to_string(), "NiII 1741");

        let name: TransitionName = "HI 1215".parse().unwrap();
        assert_eq!(name.element(), "H");
        assert_eq!(name.ionization(), 1);
        assert_eq!(name.ion(), "HI");

        let name: TransitionName = "  CIV   1548 ".parse().unwrap();
        assert_eq!(name, TransitionName::new("C", 4, 1548));
    }

    #[test]
    fn test_parse_name_errors() {
        assert!(matches!(
            "CII".parse::<TransitionName>(),
            Err(TransitionNameParseError::MissingWavelength(_))
        ));
        assert!(matches!(
            "cII 1334".parse::<TransitionName>(),
            Err(TransitionNameParseError::MalformedElement(_))
        ));
        assert!(matches!(
            "CQ 1334".parse::<TransitionName>(),
            Err(TransitionNameParseError::InvalidIonization(_))
        ));
        assert!(matches!(
            "C 1334".parse::<TransitionName>(),
            Err(TransitionNameParseError::InvalidIonization(_))
        ));
        assert!(matches!(
            "CII 1334.5".parse::<TransitionName>(),
            Err(TransitionNameParseError::InvalidWavelength(_))
        ));
        assert!(matches!(
            "CII 1334 extra".parse::<TransitionName>(),
            Err(TransitionNameParseError::InvalidWavelength(_))
        ));
    }

    #[test]
    fn test_builtin_lookup() {
        let llist = BuiltinLineList::new();
        let transitions = llist.transitions();
        for pair in transitions.windows(2) {
            assert!(pair[0].wrest < pair[1].wrest);
        }

        let cii = llist.by_name(&"CII 1334".parse().unwrap()).unwrap();
        assert_eq!(cii.wrest, 1334.5323);

        let lya = llist.by_wavelength(1215.67, Tolerance::default()).unwrap();
        assert_eq!(lya.name.to_string(), "HI 1215");
        assert_eq!(lya.a, Some(626500000.0));

        let civ = llist.by_wavelength(1548.195, Tolerance::default()).unwrap();
        assert_eq!(civ.f, 0.1908);

        let err = llist.by_wavelength(1300.0, Tolerance::default()).unwrap_err();
        assert!(matches!(err, MeasurementError::UnknownTransition(_)));
        let err = llist.by_name(&"ZnII 2026".parse().unwrap()).unwrap_err();
        assert_eq!(err, MeasurementError::UnknownTransition("ZnII 2026".to_string()));

        // a loose tolerance picks the nearest transition
        let civ2 = llist.by_wavelength(1550.0, Tolerance::Angstrom(5.0)).unwrap();
        assert_eq!(civ2.wrest, 1550.77);
    }

    #[test]
    fn test_custom_list() {
        let mut llist = CustomLineList::default();
        llist.push(AtomicData::new(TransitionName::new("Zn", 2, 2026), 2026.137, 0.501, None));
        llist.push(AtomicData::new(TransitionName::new("Cr", 2, 2056), 2056.2569, 0.103, None));
        llist.push(AtomicData::new(TransitionName::new("Zn", 2, 2062), 2062.6604, 0.246, None));
        llist.push(AtomicData::new(TransitionName::new("Cr", 2, 2062), 2062.2361, 0.0759, None));
        let wrests: Vec<_> = llist.transitions().iter().map(|t| t.wrest).collect();
        assert_eq!(wrests, vec![2026.137, 2056.2569, 2062.2361, 2062.6604]);
        let crii = llist.by_wavelength(2062.3, Tolerance::Angstrom(0.3)).unwrap();
        assert_eq!(crii.name.to_string(), "CrII 2062");
    }
}
