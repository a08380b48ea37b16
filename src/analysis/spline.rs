// src/analysis/spline.rs
//! Natural cubic smoothing spline.
//!
//! The spline minimizes `Σ (yᵢ − f(xᵢ))² + λ ∫ f''²` and is computed with the
//! Reinsch algorithm: with `Q` the `n × (n−2)` second-difference matrix and `R`
//! the tridiagonal `(n−2) × (n−2)` matrix of knot spacings, the second
//! derivatives `γ` at the interior knots solve `(R + λ QᵀQ) γ = Qᵀ y` and the
//! fitted values are `g = y − λ Q γ`. `R + λ QᵀQ` is pentadiagonal, so every
//! solve is a banded LDLᵀ factorization in linear time.
//!
//! When no λ is given it is chosen by minimizing the generalized
//! cross-validation score `n · RSS / (n − tr A)²`. The trace of the hat matrix
//! only needs the central band of `(R + λ QᵀQ)⁻¹`, which the Hutchinson–de Hoog
//! recursion produces from the same factorization.

use crate::error::{StreakError, Result};
use crate::utils::linspace;

/// Coarse log10 grid searched for λ, relative to `tr R / tr QᵀQ`
const LOG_LAMBDA_MIN: f64 = -6.0;
const LOG_LAMBDA_MAX: f64 = 6.0;
const LOG_LAMBDA_STEP: f64 = 0.25;
const GOLDEN_ITERATIONS: usize = 40;

/// Symmetric pentadiagonal matrix stored by diagonals
#[derive(Debug, Clone)]
struct Band {
    d0: Vec<f64>,
    d1: Vec<f64>,
    d2: Vec<f64>,
}

impl Band {
    fn zeros(m: usize) -> Self {
        Band {
            d0: vec![0.0; m],
            d1: vec![0.0; m.saturating_sub(1)],
            d2: vec![0.0; m.saturating_sub(2)],
        }
    }

    /// `self + lambda * other`
    fn add_scaled(&self, lambda: f64, other: &Band) -> Band {
        let axpy = |a: &[f64], b: &[f64]| -> Vec<f64> {
            a.iter().zip(b).map(|(x, y)| x + lambda * y).collect()
        };
        Band {
            d0: axpy(&self.d0, &other.d0),
            d1: axpy(&self.d1, &other.d1),
            d2: axpy(&self.d2, &other.d2),
        }
    }

    /// `tr(self · other)` for two symmetric band matrices
    fn trace_product(&self, other: &Band) -> f64 {
        let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
        dot(&self.d0, &other.d0) + 2.0 * dot(&self.d1, &other.d1) + 2.0 * dot(&self.d2, &other.d2)
    }
}

/// `L D Lᵀ` factorization of a positive definite pentadiagonal matrix
struct BandLdl {
    d: Vec<f64>,
    l1: Vec<f64>,
    l2: Vec<f64>,
}

impl BandLdl {
    fn factor(band: &Band) -> Option<Self> {
        let m = band.d0.len();
        let mut d = vec![0.0; m];
        let mut l1 = vec![0.0; m.saturating_sub(1)];
        let mut l2 = vec![0.0; m.saturating_sub(2)];

        for i in 0..m {
            let mut di = band.d0[i];
            if i >= 1 {
                di -= l1[i - 1] * l1[i - 1] * d[i - 1];
            }
            if i >= 2 {
                di -= l2[i - 2] * l2[i - 2] * d[i - 2];
            }
            if !(di > 0.0 && di.is_finite()) {
                return None;
            }
            d[i] = di;

            if i + 1 < m {
                let mut v = band.d1[i];
                if i >= 1 {
                    v -= l2[i - 1] * l1[i - 1] * d[i - 1];
                }
                l1[i] = v / di;
            }
            if i + 2 < m {
                l2[i] = band.d2[i] / di;
            }
        }
        Some(BandLdl { d, l1, l2 })
    }

    fn solve(&self, rhs: &[f64]) -> Vec<f64> {
        let m = self.d.len();
        let mut z = rhs.to_vec();
        for i in 0..m {
            if i >= 1 {
                z[i] -= self.l1[i - 1] * z[i - 1];
            }
            if i >= 2 {
                z[i] -= self.l2[i - 2] * z[i - 2];
            }
        }
        for (zi, di) in z.iter_mut().zip(&self.d) {
            *zi /= di;
        }
        for i in (0..m).rev() {
            if i + 1 < m {
                z[i] -= self.l1[i] * z[i + 1];
            }
            if i + 2 < m {
                z[i] -= self.l2[i] * z[i + 2];
            }
        }
        z
    }

    /// Central five diagonals of the inverse (Hutchinson–de Hoog).
    fn inverse_band(&self) -> Band {
        let m = self.d.len();
        let mut s = Band::zeros(m);
        for i in (0..m).rev() {
            let a = if i + 1 < m { self.l1[i] } else { 0.0 };
            let b = if i + 2 < m { self.l2[i] } else { 0.0 };
            if i + 2 < m {
                s.d2[i] = -a * s.d1[i + 1] - b * s.d0[i + 2];
            }
            if i + 1 < m {
                let below = if i + 2 < m { s.d1[i + 1] } else { 0.0 };
                s.d1[i] = -a * s.d0[i + 1] - b * below;
            }
            let mut v = 1.0 / self.d[i];
            if i + 1 < m {
                v -= a * s.d1[i];
            }
            if i + 2 < m {
                v -= b * s.d2[i];
            }
            s.d0[i] = v;
        }
        s
    }
}

/// Reinsch system for fixed knots and data.
struct Reinsch<'a> {
    y: &'a [f64],
    /// Columns of `Q`: entries at rows `i`, `i + 1`, `i + 2`
    qa: Vec<f64>,
    qb: Vec<f64>,
    qc: Vec<f64>,
    r: Band,
    qtq: Band,
    qty: Vec<f64>,
}

struct Solution {
    gamma: Vec<f64>,
    fitted: Vec<f64>,
    gcv: f64,
}

impl<'a> Reinsch<'a> {
    fn new(x: &[f64], y: &'a [f64]) -> Self {
        let n = x.len();
        let m = n - 2;
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        let qa: Vec<f64> = (0..m).map(|i| 1.0 / h[i]).collect();
        let qb: Vec<f64> = (0..m).map(|i| -1.0 / h[i] - 1.0 / h[i + 1]).collect();
        let qc: Vec<f64> = (0..m).map(|i| 1.0 / h[i + 1]).collect();

        let mut r = Band::zeros(m);
        let mut qtq = Band::zeros(m);
        for i in 0..m {
            r.d0[i] = (h[i] + h[i + 1]) / 3.0;
            qtq.d0[i] = qa[i] * qa[i] + qb[i] * qb[i] + qc[i] * qc[i];
            if i + 1 < m {
                r.d1[i] = h[i + 1] / 6.0;
                qtq.d1[i] = qb[i] * qa[i + 1] + qc[i] * qb[i + 1];
            }
            if i + 2 < m {
                qtq.d2[i] = qc[i] * qa[i + 2];
            }
        }
        let qty = (0..m)
            .map(|i| qa[i] * y[i] + qb[i] * y[i + 1] + qc[i] * y[i + 2])
            .collect();

        Reinsch { y, qa, qb, qc, r, qtq, qty }
    }

    /// `Q γ`, length `n`
    fn q_times(&self, gamma: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.y.len()];
        for (i, &g) in gamma.iter().enumerate() {
            out[i] += self.qa[i] * g;
            out[i + 1] += self.qb[i] * g;
            out[i + 2] += self.qc[i] * g;
        }
        out
    }

    fn lambda_scale(&self) -> f64 {
        let tr_r: f64 = self.r.d0.iter().sum();
        let tr_b: f64 = self.qtq.d0.iter().sum();
        if tr_b > 0.0 && tr_r > 0.0 {
            tr_r / tr_b
        } else {
            1.0
        }
    }

    fn solve(&self, lambda: f64) -> Option<Solution> {
        let system = self.r.add_scaled(lambda, &self.qtq);
        let ldl = BandLdl::factor(&system)?;
        let gamma = ldl.solve(&self.qty);
        let correction = self.q_times(&gamma);

        let n = self.y.len() as f64;
        let rss: f64 = correction.iter().map(|c| lambda * lambda * c * c).sum();
        // n - tr A = λ tr((R + λQᵀQ)⁻¹ QᵀQ)
        let dof = lambda * ldl.inverse_band().trace_product(&self.qtq);
        let gcv = if dof > f64::EPSILON {
            n * rss / (dof * dof)
        } else {
            f64::INFINITY
        };

        let fitted = self
            .y
            .iter()
            .zip(&correction)
            .map(|(yi, c)| yi - lambda * c)
            .collect();
        Some(Solution { gamma, fitted, gcv })
    }

    fn gcv_at(&self, log_lambda: f64, scale: f64) -> f64 {
        match self.solve(scale * 10f64.powf(log_lambda)) {
            Some(s) if s.gcv.is_finite() => s.gcv,
            _ => f64::INFINITY,
        }
    }

    /// λ minimizing GCV: coarse log grid, then golden section around the best point.
    fn select_lambda(&self) -> f64 {
        let scale = self.lambda_scale();
        let steps = ((LOG_LAMBDA_MAX - LOG_LAMBDA_MIN) / LOG_LAMBDA_STEP).round() as usize;

        let mut best = (LOG_LAMBDA_MIN, f64::INFINITY);
        for k in 0..=steps {
            let p = LOG_LAMBDA_MIN + LOG_LAMBDA_STEP * k as f64;
            let score = self.gcv_at(p, scale);
            if score < best.1 {
                best = (p, score);
            }
        }

        let ratio = (5f64.sqrt() - 1.0) / 2.0;
        let (mut lo, mut hi) = (best.0 - LOG_LAMBDA_STEP, best.0 + LOG_LAMBDA_STEP);
        let mut c = hi - ratio * (hi - lo);
        let mut d = lo + ratio * (hi - lo);
        let mut fc = self.gcv_at(c, scale);
        let mut fd = self.gcv_at(d, scale);
        for _ in 0..GOLDEN_ITERATIONS {
            if fc < fd {
                hi = d;
                d = c;
                fd = fc;
                c = hi - ratio * (hi - lo);
                fc = self.gcv_at(c, scale);
            } else {
                lo = c;
                c = d;
                fc = fd;
                d = lo + ratio * (hi - lo);
                fd = self.gcv_at(d, scale);
            }
        }

        let (p, score) = if fc < fd { (c, fc) } else { (d, fd) };
        let p = if score <= best.1 { p } else { best.0 };
        scale * 10f64.powf(p)
    }
}

/// Natural cubic smoothing spline through `(x, y)`.
///
/// # Example
///
/// ```
/// use streak_rs::analysis::SmoothingSpline;
///
/// let x = [0.0, 1.0, 2.0, 3.0];
/// let y = [1.0, 3.0, 5.0, 7.0];
/// let spline = SmoothingSpline::fit(&x, &y).unwrap();
/// assert!((spline.evaluate(1.5) - 4.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivatives at every knot, zero at both ends
    second: Vec<f64>,
    lambda: f64,
}

impl SmoothingSpline {
    /// Fit with λ chosen by generalized cross-validation.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        Self::build(x, y, None)
    }

    /// Fit with an explicit smoothing parameter; `0` interpolates.
    pub fn with_lambda(x: &[f64], y: &[f64], lambda: f64) -> Result<Self> {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(StreakError::Validation(format!(
                "smoothing parameter must be non-negative: {}",
                lambda
            )));
        }
        Self::build(x, y, Some(lambda))
    }

    fn build(x: &[f64], y: &[f64], lambda: Option<f64>) -> Result<Self> {
        super::validate_xy(x, y)?;
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(StreakError::Validation(
                "spline input must not contain NaN or infinite values".into(),
            ));
        }

        let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(StreakError::Validation(format!(
                "spline knots must be distinct, found duplicate x = {}",
                w[0].0
            )));
        }
        let (knots, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let n = knots.len();

        if n <= 2 {
            return Ok(SmoothingSpline {
                knots,
                values: ys,
                second: vec![0.0; n],
                lambda: lambda.unwrap_or(0.0),
            });
        }

        let system = Reinsch::new(&knots, &ys);
        let lambda = match lambda {
            Some(l) => l,
            None => {
                let l = system.select_lambda();
                log::debug!("smoothing spline over {} knots: selected lambda {:e}", n, l);
                l
            }
        };
        let solution = system.solve(lambda).ok_or_else(|| {
            StreakError::Validation(format!("smoothing system is singular for lambda {:e}", lambda))
        })?;

        let mut second = Vec::with_capacity(n);
        second.push(0.0);
        second.extend_from_slice(&solution.gamma);
        second.push(0.0);

        Ok(SmoothingSpline {
            knots,
            values: solution.fitted,
            second,
            lambda,
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Sorted, distinct knots
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Smoothed values at the knots
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(min x, max x)`
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Value at `x`, extrapolating linearly outside the knots.
    pub fn evaluate(&self, x: f64) -> f64 {
        let (t, g, c) = (&self.knots, &self.values, &self.second);
        let n = t.len();
        if n == 1 {
            return g[0];
        }

        if x < t[0] {
            let h = t[1] - t[0];
            let slope = (g[1] - g[0]) / h - h * (2.0 * c[0] + c[1]) / 6.0;
            return g[0] + slope * (x - t[0]);
        }
        if x > t[n - 1] {
            let h = t[n - 1] - t[n - 2];
            let slope = (g[n - 1] - g[n - 2]) / h + h * (c[n - 2] + 2.0 * c[n - 1]) / 6.0;
            return g[n - 1] + slope * (x - t[n - 1]);
        }

        let i = t.partition_point(|&k| k <= x).saturating_sub(1).min(n - 2);
        let h = t[i + 1] - t[i];
        let a = x - t[i];
        let b = t[i + 1] - x;
        (a * g[i + 1] + b * g[i]) / h
            - a * b / 6.0 * ((1.0 + a / h) * c[i + 1] + (1.0 + b / h) * c[i])
    }

    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Evaluate on `size` evenly spaced points spanning the knots.
    pub fn resample(&self, size: usize) -> (Vec<f64>, Vec<f64>) {
        let (lo, hi) = self.domain();
        let xs = linspace(lo, hi, size);
        let ys = self.evaluate_many(&xs);
        (xs, ys)
    }

    /// Solutions of `f(x) = level`, bracketed by sign changes on `grid`.
    ///
    /// `grid` must be sorted; roots come out in increasing order.
    pub fn roots(&self, level: f64, grid: &[f64]) -> Vec<f64> {
        let values: Vec<f64> = grid.iter().map(|&x| self.evaluate(x) - level).collect();
        let mut roots = Vec::new();
        for i in 0..grid.len() {
            if values[i] == 0.0 {
                roots.push(grid[i]);
            } else if i + 1 < grid.len() && values[i] * values[i + 1] < 0.0 {
                roots.push(self.bisect(level, grid[i], grid[i + 1], values[i]));
            }
        }
        roots
    }

    fn bisect(&self, level: f64, mut lo: f64, mut hi: f64, mut f_lo: f64) -> f64 {
        for _ in 0..100 {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            let f_mid = self.evaluate(mid) - level;
            if f_mid == 0.0 {
                return mid;
            }
            if (f_mid < 0.0) == (f_lo < 0.0) {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}
