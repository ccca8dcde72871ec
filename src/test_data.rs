use std::fs;
use std::io;
use std::io::prelude::*;

use crate::spectrum::Spectrum;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Read a whitespace-separated `wavelength flux sigma` table
pub(crate) fn read_spectrum_from_file(path: &str) -> io::Result<Spectrum> {
    let reader = io::BufReader::new(fs::File::open(path)?);
    let mut wavelength = Vec::new();
    let mut flux = Vec::new();
    let mut sigma = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let pref = line.trim();
        if pref.is_empty() || pref.starts_with('#') {
            continue;
        }
        let chunks: Vec<&str> = pref.split_whitespace().collect();
        wavelength.push(chunks[0].parse::<f64>().expect("Expected number for wavelength"));
        flux.push(chunks[1].parse::<f64>().expect("Expected number for flux"));
        sigma.push(chunks[2].parse::<f64>().expect("Expected number for sigma"));
    }
    Spectrum::new(wavelength, flux, sigma)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
