//! Single Gaussian fits to an absorption profile.
//!
//! The model `A exp(-(x - μ)² / 2s²)` is fit to the absorbed fraction `1 - f`
//! by weighted Levenberg-Marquardt least squares, and the equivalent width is
//! its area `A |s| √(2π)`.
use std::f64::consts::PI;

use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MeasurementError;

use super::median;

/// The fewest usable pixels a three-parameter fit is attempted on
pub const MIN_FIT_PIXELS: usize = 4;

const MIN_LAMBDA: f64 = 1e-12;
const MAX_LAMBDA: f64 = 1e12;

/// Starting parameters for a Gaussian fit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianGuess {
    pub amplitude: f64,
    pub center: f64,
    pub stddev: f64,
}

impl GaussianGuess {
    pub fn new(amplitude: f64, center: f64, stddev: f64) -> Self {
        Self {
            amplitude,
            center,
            stddev,
        }
    }

    fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.amplitude, self.center, self.stddev)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianFitConfig {
    pub max_iterations: usize,
    /// Converged once an accepted step lowers χ² by no more than this fraction
    pub tolerance: f64,
    /// Damping applied to the first step
    pub initial_lambda: f64,
    /// When `None`, the guess is taken from the data: the peak of the absorbed
    /// fraction and three times the median pixel width
    pub initial_guess: Option<GaussianGuess>,
}

impl Default for GaussianFitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
            initial_lambda: 1.0,
            initial_guess: None,
        }
    }
}

impl GaussianFitConfig {
    pub fn with_guess(mut self, guess: GaussianGuess) -> Self {
        self.initial_guess = Some(guess);
        self
    }
}

/// The best-fit parameters and their covariance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFit {
    pub amplitude: f64,
    pub center: f64,
    pub stddev: f64,
    /// Covariance of `(amplitude, center, stddev)`
    pub covariance: Matrix3<f64>,
    pub chi2: f64,
    pub iterations: usize,
}

impl GaussianFit {
    /// The integral of the fitted profile
    pub fn area(&self) -> f64 {
        self.amplitude * self.stddev.abs() * (2.0 * PI).sqrt()
    }

    /// The uncertainty of [`GaussianFit::area`] propagated from the covariance
    pub fn area_sigma(&self) -> f64 {
        let (a, s) = (self.amplitude, self.stddev);
        let c = &self.covariance;
        let var = 2.0 * PI * (s * s * c[(0, 0)] + a * a * c[(2, 2)] + 2.0 * a * s * c[(0, 2)]);
        var.max(0.0).sqrt()
    }
}

/// The model value and its gradient with respect to `(A, μ, s)`
fn evaluate(params: &Vector3<f64>, x: f64) -> (f64, Vector3<f64>) {
    let (a, mu, s) = (params[0], params[1], params[2]);
    let d = (x - mu) / s;
    let g = (-0.5 * d * d).exp();
    (a * g, Vector3::new(g, a * g * d / s, a * g * d * d / s))
}

/// The usable samples and their weights `1/σ²`
struct Samples {
    x: Vec<f64>,
    y: Vec<f64>,
    weight: Vec<f64>,
}

impl Samples {
    fn new(x: &[f64], y: &[f64], sigma: &[f64]) -> Self {
        let mut samples = Self {
            x: Vec::with_capacity(x.len()),
            y: Vec::with_capacity(x.len()),
            weight: Vec::with_capacity(x.len()),
        };
        for ((xi, yi), si) in x.iter().zip(y.iter()).zip(sigma.iter()) {
            if si.is_finite() && *si > 0.0 && yi.is_finite() {
                samples.x.push(*xi);
                samples.y.push(*yi);
                samples.weight.push(1.0 / (si * si));
            }
        }
        samples
    }

    fn len(&self) -> usize {
        self.x.len()
    }

    fn chi2(&self, params: &Vector3<f64>) -> f64 {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.weight.iter())
            .map(|((x, y), w)| {
                let r = y - evaluate(params, *x).0;
                r * r * w
            })
            .sum()
    }

    /// `JᵀWJ` and `JᵀWr`
    fn normal_equations(&self, params: &Vector3<f64>) -> (Matrix3<f64>, Vector3<f64>) {
        let mut hessian = Matrix3::zeros();
        let mut gradient = Vector3::zeros();
        for ((x, y), w) in self.x.iter().zip(self.y.iter()).zip(self.weight.iter()) {
            let (model, jac) = evaluate(params, *x);
            hessian += jac * jac.transpose() * *w;
            gradient += jac * ((y - model) * w);
        }
        (hessian, gradient)
    }

    fn default_guess(&self) -> GaussianGuess {
        let (peak, amplitude) = self
            .y
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, best), (i, y)| {
                if *y > best {
                    (i, *y)
                } else {
                    (bi, best)
                }
            });
        let widths: Vec<f64> = self.x.windows(2).map(|w| w[1] - w[0]).collect();
        let stddev = 3.0 * median(&widths).unwrap_or(1.0);
        GaussianGuess::new(amplitude, self.x[peak], stddev)
    }
}

/// Fit a Gaussian to `y(x)` with 1σ uncertainties `sigma`.
///
/// Samples with a non-positive or non-finite uncertainty are ignored.
pub fn fit_gaussian(
    x: &[f64],
    y: &[f64],
    sigma: &[f64],
    config: &GaussianFitConfig,
) -> Result<GaussianFit, MeasurementError> {
    let samples = Samples::new(x, y, sigma);
    if samples.len() < MIN_FIT_PIXELS {
        return Err(MeasurementError::TooFewPixels {
            got: samples.len(),
            min: MIN_FIT_PIXELS,
        });
    }
    let guess = config
        .initial_guess
        .unwrap_or_else(|| samples.default_guess());
    log::debug!("Fitting Gaussian to {} pixels from {guess:?}", samples.len());

    let mut params = guess.to_vector();
    let mut lambda = config.initial_lambda;
    let mut chi2 = samples.chi2(&params);

    for iteration in 0..config.max_iterations {
        let (hessian, gradient) = samples.normal_equations(&params);
        loop {
            let mut damped = hessian;
            for k in 0..3 {
                damped[(k, k)] *= 1.0 + lambda;
            }
            let step = damped.lu().solve(&gradient);
            if let Some(step) = step {
                let trial = params + step;
                let trial_chi2 = samples.chi2(&trial);
                let small_step = step
                    .iter()
                    .zip(params.iter())
                    .all(|(d, p)| d.abs() <= config.tolerance * (p.abs() + config.tolerance));

                if trial_chi2.is_finite() && trial_chi2 <= chi2 {
                    lambda = (lambda / 10.0).max(MIN_LAMBDA);
                    let converged =
                        (chi2 - trial_chi2) <= config.tolerance * chi2.max(f64::MIN_POSITIVE);
                    params = trial;
                    chi2 = trial_chi2;
                    if converged || small_step {
                        return finish(&samples, params, chi2, iteration + 1);
                    }
                    break;
                } else if small_step {
                    // Already at the minimum to within rounding
                    return finish(&samples, params, chi2, iteration + 1);
                }
            }
            lambda *= 10.0;
            if lambda > MAX_LAMBDA {
                log::warn!(
                    "Gaussian fit stalled after {} iterations at {params:?}",
                    iteration + 1
                );
                return Err(MeasurementError::FitDidNotConverge {
                    iterations: iteration + 1,
                });
            }
        }
    }
    log::warn!(
        "Gaussian fit did not converge in {} iterations",
        config.max_iterations
    );
    Err(MeasurementError::FitDidNotConverge {
        iterations: config.max_iterations,
    })
}

fn finish(
    samples: &Samples,
    params: Vector3<f64>,
    chi2: f64,
    iterations: usize,
) -> Result<GaussianFit, MeasurementError> {
    let (amplitude, center, stddev) = (params[0], params[1], params[2]);
    let degenerate = MeasurementError::DegenerateFit {
        amplitude,
        center,
        stddev,
    };
    let (low, high) = (samples.x[0], samples.x[samples.len() - 1]);
    if !params.iter().all(|p| p.is_finite())
        || stddev == 0.0
        || center < low
        || center > high
    {
        log::warn!("Gaussian fit converged to a degenerate solution {params:?}");
        return Err(degenerate);
    }
    let (hessian, _) = samples.normal_equations(&params);
    let covariance = hessian.try_inverse().ok_or(degenerate)?;
    log::debug!("Gaussian fit converged in {iterations} iterations with chi2={chi2}");
    Ok(GaussianFit {
        amplitude,
        center,
        stddev,
        covariance,
        chi2,
        iterations,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::spectrum::SpectrumLike;
    use crate::test_data;

    fn synthetic() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..101).map(|i| 6000.0 + 0.1 * i as f64).collect();
        let y = x
            .iter()
            .map(|x| 0.4 * (-(x - 6005.0).powi(2) / (2.0 * 0.5 * 0.5)).exp())
            .collect();
        (x, y, vec![0.01; 101])
    }

    #[test]
    fn test_exact_profile() {
        test_data::init_logging();
        let (x, y, s) = synthetic();
        let fit = fit_gaussian(&x, &y, &s, &GaussianFitConfig::default()).unwrap();
        assert!((fit.amplitude - 0.4).abs() < 1e-6, "{fit:?}");
        assert!((fit.center - 6005.0).abs() < 1e-6, "{fit:?}");
        assert!((fit.stddev.abs() - 0.5).abs() < 1e-6, "{fit:?}");
        let expected = 0.4 * 0.5 * (2.0 * PI).sqrt();
        assert!((fit.area() - expected).abs() < 1e-6);
        assert!(fit.area_sigma() > 0.0);
    }

    #[test]
    fn test_explicit_guess() {
        let (x, y, s) = synthetic();
        let config = GaussianFitConfig::default().with_guess(GaussianGuess::new(0.2, 6004.5, 1.0));
        let fit = fit_gaussian(&x, &y, &s, &config).unwrap();
        assert!((fit.center - 6005.0).abs() < 1e-6, "{fit:?}");
    }

    #[test]
    fn test_fixture_guesses() {
        test_data::init_logging();
        let spec = test_data::read_spectrum_from_file("./test/data/civ_1548.txt").unwrap();
        let wv = &spec.wavelength()[208..=278];
        let sigma = &spec.sigma()[208..=278];
        let y: Vec<f64> = spec.flux()[208..=278].iter().map(|f| 1.0 - f).collect();
        let fit = fit_gaussian(wv, &y, sigma, &GaussianFitConfig::default()).unwrap();
        assert!((fit.amplitude - 0.54847).abs() < 1e-3, "{fit:?}");
        assert!((fit.center - 6083.2976).abs() < 1e-3, "{fit:?}");
        assert!((fit.area() - 0.75195).abs() < 1e-3, "{fit:?}");

        let config = GaussianFitConfig::default().with_guess(GaussianGuess::new(0.5, 6081.0, 1.0));
        let refit = fit_gaussian(wv, &y, sigma, &config).unwrap();
        assert!((refit.area() - fit.area()).abs() < 1e-4);
    }

    #[test]
    fn test_failures() {
        let x = [1.0, 2.0, 3.0];
        let err = fit_gaussian(&x, &[0.0; 3], &[0.1; 3], &GaussianFitConfig::default()).unwrap_err();
        assert_eq!(err, MeasurementError::TooFewPixels { got: 3, min: 4 });

        // flagged pixels do not count toward the minimum
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let err = fit_gaussian(
            &x,
            &[0.0, 0.1, 0.2, 0.1, 0.0],
            &[0.1, 0.0, -1.0, f64::NAN, 0.1],
            &GaussianFitConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, MeasurementError::TooFewPixels { got: 2, min: 4 });

        // no absorption leaves the center and width unconstrained
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let err = fit_gaussian(&x, &[0.0; 20], &[0.1; 20], &GaussianFitConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FitConvergence);
    }
}
