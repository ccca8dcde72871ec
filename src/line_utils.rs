//! Tabulate the identities and measurements of many lines at once.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::line::SpectralLine;

/// A single scalar property of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineField {
    Wrest,
    Redshift,
    /// Oscillator strength
    F,
    /// Einstein A coefficient
    A,
    Ew,
    SigEw,
    LogN,
    SigLogN,
    FlagN,
}

impl LineField {
    /// Read this field from `line`. Fields the line has no value for yet are
    /// `None`.
    pub fn get(&self, line: &SpectralLine<'_>) -> Option<f64> {
        let attrs = line.attributes();
        let log_n = attrs.column_density.and_then(|n| n.log10());
        match self {
            Self::Wrest => Some(line.wrest()),
            Self::Redshift => attrs.z,
            Self::F => line.oscillator_strength(),
            Self::A => line.transition().and_then(|t| t.a),
            Self::Ew => attrs.ew.map(|ew| ew.value),
            Self::SigEw => attrs.ew.map(|ew| ew.sigma),
            Self::LogN => log_n.map(|(v, _)| v),
            Self::SigLogN => log_n.map(|(_, s)| s),
            Self::FlagN => Some(attrs.flag_n().code() as f64),
        }
    }
}

/// Pull one field out of every line
pub fn parse_speclines(lines: &[SpectralLine<'_>], field: LineField) -> Vec<Option<f64>> {
    lines.iter().map(|line| field.get(line)).collect()
}

/// A summary of one line's identity and measurements
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionRow {
    pub name: Option<String>,
    pub wrest: f64,
    pub z: Option<f64>,
    pub f: Option<f64>,
    #[cfg_attr(feature = "serde", serde(rename = "EW"))]
    pub ew: Option<f64>,
    #[cfg_attr(feature = "serde", serde(rename = "sig_EW"))]
    pub sig_ew: Option<f64>,
    #[cfg_attr(feature = "serde", serde(rename = "flag_N"))]
    pub flag_n: u8,
    #[cfg_attr(feature = "serde", serde(rename = "logN"))]
    pub log_n: Option<f64>,
    #[cfg_attr(feature = "serde", serde(rename = "sig_logN"))]
    pub sig_log_n: Option<f64>,
}

impl From<&SpectralLine<'_>> for TransitionRow {
    fn from(line: &SpectralLine<'_>) -> Self {
        Self {
            name: line.name().map(|n| n.to_string()),
            wrest: line.wrest(),
            z: LineField::Redshift.get(line),
            f: LineField::F.get(line),
            ew: LineField::Ew.get(line),
            sig_ew: LineField::SigEw.get(line),
            flag_n: line.attributes().flag_n().code(),
            log_n: LineField::LogN.get(line),
            sig_log_n: LineField::SigLogN.get(line),
        }
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "--".to_string(),
    }
}

impl fmt::Display for TransitionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:>10.4} {:>8} {:>8} {:>8} {:>8} {:>2} {:>7} {:>6}",
            self.name.as_deref().unwrap_or("--"),
            self.wrest,
            fmt_opt(self.z, 5),
            fmt_opt(self.f, 4),
            fmt_opt(self.ew, 4),
            fmt_opt(self.sig_ew, 4),
            self.flag_n,
            fmt_opt(self.log_n, 3),
            fmt_opt(self.sig_log_n, 3),
        )
    }
}

/// Summarize each line, in the order given
pub fn transition_table(lines: &[SpectralLine<'_>]) -> Vec<TransitionRow> {
    lines.iter().map(TransitionRow::from).collect()
}
