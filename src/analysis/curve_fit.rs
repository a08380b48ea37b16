// src/analysis/curve_fit.rs
//! Nonlinear least squares.
//!
//! Levenberg–Marquardt on the normal equations with a forward-difference
//! Jacobian. The damping term is updated from the gain ratio of each accepted
//! step (Nielsen's rule) and grown geometrically on rejected steps.

use nalgebra::{DMatrix, DVector};

use super::spline::SmoothingSpline;
use super::validate_xy;
use crate::error::{StreakError, Result};

/// Default tolerance for `ftol`, `xtol` and `gtol`
pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;

/// Initial damping relative to the largest diagonal entry of `JᵀJ`
const INITIAL_DAMPING: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Starting parameters; their count is the number of model parameters
    pub initial: Vec<f64>,
    /// Number of points the smoothed curve is sampled on before fitting
    pub spline_size: usize,
    /// Per-point standard deviations of the fitted samples
    pub sigma: Option<Vec<f64>>,
    /// Treat `sigma` as absolute instead of scaling the covariance by the residual variance
    pub absolute_sigma: bool,
    /// Model evaluation budget; defaults to `200 × (parameters + 1)`
    pub max_evaluations: Option<usize>,
    /// Relative reduction of the cost below which the fit has converged
    pub ftol: f64,
    /// Relative step size below which the fit has converged
    pub xtol: f64,
    /// Gradient magnitude below which the fit has converged
    pub gtol: f64,
}

impl FitOptions {
    pub fn new(initial: Vec<f64>) -> Self {
        FitOptions {
            initial,
            spline_size: 1000,
            sigma: None,
            absolute_sigma: false,
            max_evaluations: None,
            ftol: DEFAULT_TOLERANCE,
            xtol: DEFAULT_TOLERANCE,
            gtol: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_spline_size(mut self, spline_size: usize) -> Self {
        self.spline_size = spline_size;
        self
    }

    pub fn with_sigma(mut self, sigma: Vec<f64>) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_absolute_sigma(mut self, absolute_sigma: bool) -> Self {
        self.absolute_sigma = absolute_sigma;
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    pub fn with_tolerances(mut self, ftol: f64, xtol: f64, gtol: f64) -> Self {
        self.ftol = ftol;
        self.xtol = xtol;
        self.gtol = gtol;
        self
    }
}

/// Result of a nonlinear fit
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFit {
    pub params: Vec<f64>,
    /// Estimated covariance of `params`; all `+∞` when it cannot be determined
    pub covariance: DMatrix<f64>,
    /// Number of residual vector evaluations spent
    pub evaluations: usize,
}

impl CurveFit {
    /// One standard deviation of each parameter
    pub fn std_errors(&self) -> Vec<f64> {
        self.covariance.diagonal().iter().map(|v| v.sqrt()).collect()
    }
}

/// Fit `model` to a noisy curve.
///
/// The curve is first smoothed with a [`SmoothingSpline`] and sampled on
/// `spline_size` evenly spaced points; `sigma`, when given, applies to those
/// samples. See [`least_squares`] for the fit itself.
///
/// # Example
///
/// ```
/// use streak_rs::analysis::{curve_fit, FitOptions};
///
/// let x: Vec<f64> = (0..100).map(|i| i as f64 * 0.1).collect();
/// let y: Vec<f64> = x.iter().map(|v| 3.0 * (-v / 2.0).exp()).collect();
/// let fit = curve_fit(
///     |t, p| p[0] * (-t / p[1]).exp(),
///     &x,
///     &y,
///     &FitOptions::new(vec![1.0, 1.0]),
/// )
/// .unwrap();
/// assert!((fit.params[0] - 3.0).abs() < 1e-2);
/// assert!((fit.params[1] - 2.0).abs() < 1e-2);
/// ```
pub fn curve_fit<F>(model: F, x: &[f64], y: &[f64], options: &FitOptions) -> Result<CurveFit>
where
    F: Fn(f64, &[f64]) -> f64,
{
    validate_xy(x, y)?;
    if options.spline_size == 0 {
        return Err(StreakError::Validation("spline_size must be positive".into()));
    }
    let spline = SmoothingSpline::fit(x, y)?;
    let (xs, ys) = spline.resample(options.spline_size);
    least_squares(model, &xs, &ys, options)
}

/// Fit `model` to `(x, y)` directly, without smoothing.
///
/// Minimizes `Σ ((model(xᵢ, p) − yᵢ) / σᵢ)²` starting from `options.initial`.
pub fn least_squares<F>(model: F, x: &[f64], y: &[f64], options: &FitOptions) -> Result<CurveFit>
where
    F: Fn(f64, &[f64]) -> f64,
{
    validate_xy(x, y)?;
    if options.initial.is_empty() {
        return Err(StreakError::Validation("initial parameters must not be empty".into()));
    }
    let weights: Vec<f64> = match &options.sigma {
        Some(sigma) if sigma.len() != x.len() => {
            return Err(StreakError::Validation(format!(
                "sigma has {} entries for {} samples",
                sigma.len(),
                x.len()
            )));
        }
        Some(sigma) => {
            if sigma.iter().any(|s| !(*s > 0.0 && s.is_finite())) {
                return Err(StreakError::Validation("sigma must be positive and finite".into()));
            }
            sigma.iter().map(|s| 1.0 / s).collect()
        }
        None => vec![1.0; x.len()],
    };

    let problem = Problem { model: &model, x, y, weights: &weights };
    problem.solve(options)
}

struct Problem<'a, F> {
    model: &'a F,
    x: &'a [f64],
    y: &'a [f64],
    weights: &'a [f64],
}

impl<'a, F> Problem<'a, F>
where
    F: Fn(f64, &[f64]) -> f64,
{
    fn residuals(&self, p: &[f64]) -> DVector<f64> {
        DVector::from_iterator(
            self.x.len(),
            self.x
                .iter()
                .zip(self.y)
                .zip(self.weights)
                .map(|((&xi, &yi), &w)| ((self.model)(xi, p) - yi) * w),
        )
    }

    fn jacobian(&self, p: &DVector<f64>, r: &DVector<f64>) -> DMatrix<f64> {
        let mut jac = DMatrix::zeros(self.x.len(), p.len());
        let mut shifted: Vec<f64> = p.iter().copied().collect();
        for j in 0..p.len() {
            let mut step = f64::EPSILON.sqrt() * p[j].abs();
            if step == 0.0 {
                step = f64::EPSILON.sqrt();
            }
            shifted[j] = p[j] + step;
            let rj = self.residuals(&shifted);
            shifted[j] = p[j];
            jac.set_column(j, &((rj - r) / step));
        }
        jac
    }

    fn solve(&self, options: &FitOptions) -> Result<CurveFit> {
        let n = self.x.len();
        let np = options.initial.len();
        let max_evaluations = options.max_evaluations.unwrap_or(200 * (np + 1));

        let mut p = DVector::from_column_slice(&options.initial);
        let mut r = self.residuals(p.as_slice());
        let mut evaluations = 1;
        if r.iter().any(|v| !v.is_finite()) {
            return Err(StreakError::FitFailure(
                "residuals are not finite at the initial parameters".into(),
            ));
        }
        let mut cost = 0.5 * r.norm_squared();

        let mut damping: Option<f64> = None;
        let mut nu = 2.0;
        'outer: loop {
            let jac = self.jacobian(&p, &r);
            evaluations += np;
            if jac.iter().any(|v| !v.is_finite()) {
                return Err(StreakError::FitFailure(
                    "Jacobian is not finite at the current parameters".into(),
                ));
            }
            let jtj = jac.tr_mul(&jac);
            let gradient = jac.tr_mul(&r);
            if gradient.amax() <= options.gtol {
                break;
            }
            let mu = damping.get_or_insert_with(|| {
                INITIAL_DAMPING * jtj.diagonal().max().max(f64::MIN_POSITIVE)
            });

            loop {
                if evaluations >= max_evaluations {
                    return Err(StreakError::FitFailure(format!(
                        "maximum number of function evaluations ({}) exceeded",
                        max_evaluations
                    )));
                }

                let mut system = jtj.clone();
                for i in 0..np {
                    system[(i, i)] += *mu;
                }
                let step = match system.cholesky() {
                    Some(chol) => chol.solve(&(-&gradient)),
                    None => {
                        *mu *= nu;
                        nu *= 2.0;
                        if !mu.is_finite() {
                            return Err(StreakError::FitFailure(
                                "damped normal equations could not be factorized".into(),
                            ));
                        }
                        continue;
                    }
                };

                let candidate = &p + &step;
                let r_new = self.residuals(candidate.as_slice());
                evaluations += 1;
                let cost_new = if r_new.iter().all(|v| v.is_finite()) {
                    0.5 * r_new.norm_squared()
                } else {
                    f64::INFINITY
                };

                let predicted = 0.5 * step.dot(&(&step * *mu - &gradient));
                let actual = cost - cost_new;
                let small_step = step.norm() <= options.xtol * (p.norm() + options.xtol);

                if actual > 0.0 && predicted > 0.0 {
                    let rho = actual / predicted;
                    let converged = small_step
                        || (actual <= options.ftol * cost && predicted <= options.ftol * cost)
                        || cost_new == 0.0;
                    p = candidate;
                    r = r_new;
                    cost = cost_new;
                    *mu *= (1.0f64 / 3.0).max(1.0 - (2.0 * rho - 1.0).powi(3));
                    nu = 2.0;
                    if converged {
                        break 'outer;
                    }
                    break;
                }
                if small_step {
                    break 'outer;
                }
                *mu *= nu;
                nu *= 2.0;
            }
        }

        log::debug!(
            "least squares converged after {} evaluations, cost {:e}",
            evaluations,
            cost
        );

        let jac = self.jacobian(&p, &r);
        let covariance = self.covariance(&jac, cost, n, np, options.absolute_sigma);
        Ok(CurveFit {
            params: p.iter().copied().collect(),
            covariance,
            evaluations,
        })
    }

    fn covariance(
        &self,
        jac: &DMatrix<f64>,
        cost: f64,
        n: usize,
        np: usize,
        absolute_sigma: bool,
    ) -> DMatrix<f64> {
        let undetermined = || DMatrix::from_element(np, np, f64::INFINITY);
        let inverse = match jac.tr_mul(jac).try_inverse() {
            Some(inv) if inv.iter().all(|v| v.is_finite()) => inv,
            _ => {
                log::warn!("covariance of the parameters could not be estimated: JᵀJ is singular");
                return undetermined();
            }
        };
        if absolute_sigma {
            return inverse;
        }
        if n <= np {
            log::warn!(
                "covariance of the parameters could not be estimated: {} samples for {} parameters",
                n,
                np
            );
            return undetermined();
        }
        inverse * (2.0 * cost / (n - np) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::linspace;

    fn noise(i: usize, amplitude: f64) -> f64 {
        amplitude * ((i as f64 * 12.9898).sin() * 43758.5453).fract()
    }

    #[test]
    fn test_exact_line() {
        let x = linspace(0.0, 10.0, 50);
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let fit = least_squares(|t, p| p[0] * t + p[1], &x, &y, &FitOptions::new(vec![0.0, 0.0]))
            .unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-6);
        assert!((fit.params[1] - 1.0).abs() < 1e-6);
        assert!(fit.evaluations > 1);
    }

    #[test]
    fn test_noisy_sine() {
        let x = linspace(0.0, 2.0 * std::f64::consts::PI, 100);
        let x0 = std::f64::consts::FRAC_PI_4;
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| (v - x0).sin() + noise(i, 0.1))
            .collect();
        let fit = curve_fit(|t, p| p[0] * (t - p[1]).sin(), &x, &y, &FitOptions::new(vec![1.0, 1.0]))
            .unwrap();
        assert!((fit.params[0] - 1.0).abs() < 0.05, "a = {}", fit.params[0]);
        assert!((fit.params[1] - x0).abs() < 0.05, "x0 = {}", fit.params[1]);
        assert!(fit.std_errors().iter().all(|e| e.is_finite()));
    }

    #[test]
    fn test_covariance_of_weighted_line() {
        let x = linspace(0.0, 1.0, 10);
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| v + noise(i, 0.01)).collect();
        let options = FitOptions::new(vec![0.5, 0.5])
            .with_sigma(vec![0.01; 10])
            .with_absolute_sigma(true);
        let fit = least_squares(|t, p| p[0] * t + p[1], &x, &y, &options).unwrap();
        assert_eq!(fit.covariance.shape(), (2, 2));
        // absolute sigma: covariance of the slope is σ² / Σ(x - x̄)²
        let mean = x.iter().sum::<f64>() / 10.0;
        let sxx: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
        assert!((fit.covariance[(0, 0)] - 1e-4 / sxx).abs() < 1e-7);
    }

    #[test]
    fn test_underdetermined_covariance_is_infinite() {
        let fit = least_squares(
            |t, p| p[0] * t + p[1],
            &[0.0, 1.0],
            &[1.0, 3.0],
            &FitOptions::new(vec![0.0, 0.0]),
        )
        .unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-6);
        assert!(fit.covariance.iter().all(|v| *v == f64::INFINITY));
    }

    #[test]
    fn test_evaluation_budget() {
        let x = linspace(0.0, 5.0, 30);
        let y: Vec<f64> = x.iter().map(|v| 4.0 * (-v).exp()).collect();
        let options = FitOptions::new(vec![1.0, 3.0]).with_max_evaluations(2);
        let result = least_squares(|t, p| p[0] * (-t / p[1]).exp(), &x, &y, &options);
        assert!(matches!(result, Err(StreakError::FitFailure(_))));
    }

    #[test]
    fn test_non_finite_model() {
        let result = least_squares(|_, _| f64::NAN, &[0.0, 1.0], &[0.0, 1.0], &FitOptions::new(vec![1.0]));
        assert!(matches!(result, Err(StreakError::FitFailure(_))));
    }

    #[test]
    fn test_non_finite_jacobian() {
        // finite at p0 = 1, undefined for any forward step
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|t| 0.5 * t).collect();
        let result = least_squares(|t, p| (1.0 - p[0]).sqrt() * t, &x, &y, &FitOptions::new(vec![1.0]));
        assert!(matches!(result, Err(StreakError::FitFailure(_))));
    }

    #[test]
    fn test_invalid_options() {
        let model = |t: f64, p: &[f64]| p[0] * t;
        assert!(matches!(
            least_squares(model, &[0.0, 1.0], &[0.0, 1.0], &FitOptions::new(vec![])),
            Err(StreakError::Validation(_))
        ));
        let options = FitOptions::new(vec![1.0]).with_sigma(vec![1.0]);
        assert!(matches!(
            least_squares(model, &[0.0, 1.0], &[0.0, 1.0], &options),
            Err(StreakError::Validation(_))
        ));
    }
}
