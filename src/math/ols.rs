//! Ordinary least squares.
//!
//! Training solves one regression of the form:
//!
//! ```text
//! minimize Σ (y_i - b - x_i^T β)^2
//! ```
//!
//! One-hot encoded families are collinear with the intercept (each row has
//! exactly one indicator set), so the design matrix is rank deficient by
//! construction. SVD returns the minimum-norm solution in that case, which
//! predicts identically to any other solution.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fitted intercept + coefficients.
#[derive(Debug, Clone)]
pub struct LinearFit {
    pub intercept: f64,
    pub coefficients: DVector<f64>,
}

impl LinearFit {
    #[cfg(test)]
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + self.coefficients.dot(&DVector::from_column_slice(row))
    }
}

/// Fit `y ≈ b + Xβ`. Columns are standardised before solving so that features
/// on very different scales (years vs. indicators) do not swamp the SVD
/// tolerance; the result is mapped back to original units.
pub fn fit_with_intercept(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LinearFit> {
    let (n, p) = x.shape();
    if n == 0 || n != y.len() {
        return None;
    }

    let mut means = vec![0.0; p];
    let mut scales = vec![1.0; p];
    for j in 0..p {
        let col = x.column(j);
        let mean = col.mean();
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        means[j] = mean;
        scales[j] = if var > 1e-24 { var.sqrt() } else { 1.0 };
    }

    let design = DMatrix::from_fn(n, p + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            (x[(i, j - 1)] - means[j - 1]) / scales[j - 1]
        }
    });

    let beta = solve_least_squares(&design, y)?;

    let coefficients = DVector::from_fn(p, |j, _| beta[j + 1] / scales[j]);
    let intercept = beta[0] - (0..p).map(|j| coefficients[j] * means[j]).sum::<f64>();

    if !intercept.is_finite() {
        return None;
    }
    Some(LinearFit { intercept, coefficients })
}

/// Root mean squared error and coefficient of determination.
pub fn fit_quality(y: &[f64], y_hat: &[f64]) -> (f64, f64) {
    let n = y.len().min(y_hat.len());
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = y[..n].iter().sum::<f64>() / n as f64;
    let sse: f64 = y.iter().zip(y_hat).map(|(a, b)| (a - b).powi(2)).sum();
    let sst: f64 = y[..n].iter().map(|a| (a - mean).powi(2)).sum();
    let rmse = (sse / n as f64).sqrt();
    let r2 = if sst > 0.0 { 1.0 - sse / sst } else { f64::NAN };
    (rmse, r2)
}
