//! Ordinary least squares with intercept, plus seeded sampling helpers.
//!
//! Fits `y = intercept + Σ coefficients[i] * x[i]` for a fixed number of
//! predictors `N`. Features and target are centered first, so the normal
//! equations only involve the `N x N` covariance block and the intercept
//! falls out as `mean(y) - coefficients · mean(x)`.
//!
//! Rank-deficient systems (a constant column, or two columns that are exact
//! multiples) are handled by Gauss-Jordan elimination with partial
//! pivoting: a column whose pivot vanishes is a free variable and gets a
//! zero coefficient. For constant columns this matches the minimum-norm
//! least-squares solution.

/// Relative pivot tolerance, scaled by the largest diagonal entry.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Fitted linear model with intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit<const N: usize> {
    /// One coefficient per predictor, in input order.
    pub coefficients: [f64; N],
    /// Constant term.
    pub intercept: f64,
}

impl<const N: usize> LinearFit<N> {
    #[inline]
    pub fn predict(&self, x: &[f64; N]) -> f64 {
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(x)
            .map(|(coeff, value)| coeff * value)
            .sum();
        dot + self.intercept
    }
}

/// Fits an OLS model with intercept to `(features, target)` samples.
///
/// Returns `None` for empty input, when any value is non-finite, or when
/// the values are too large for their squares to be represented.
#[must_use]
pub fn fit_ols<const N: usize>(
    data: &[([f64; N], f64)],
) -> Option<LinearFit<N>> {
    if data.is_empty() {
        return None;
    }
    if data
        .iter()
        .any(|(x, y)| !y.is_finite() || x.iter().any(|v| !v.is_finite()))
    {
        return None;
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts are far below 2^52"
    )]
    let n = data.len() as f64;

    let mut x_mean = [0.0; N];
    let mut y_mean = 0.0;
    for (x, y) in data {
        for (mean, value) in x_mean.iter_mut().zip(x) {
            *mean += value;
        }
        y_mean += y;
    }
    for mean in &mut x_mean {
        *mean /= n;
    }
    y_mean /= n;

    // Normal equations on centered data: (XᵀX) β = Xᵀy.
    let mut xtx = [[0.0; N]; N];
    let mut xty = [0.0; N];
    for (x, y) in data {
        let dy = y - y_mean;
        let mut dx = [0.0; N];
        for i in 0..N {
            dx[i] = x[i] - x_mean[i];
        }
        for i in 0..N {
            xty[i] += dx[i] * dy;
            for j in i..N {
                xtx[i][j] += dx[i] * dx[j];
            }
        }
    }
    for i in 0..N {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }
    if xtx.iter().flatten().chain(&xty).any(|v| !v.is_finite()) {
        // Squared deviations overflowed.
        return None;
    }

    let coefficients = solve_normal_equations(xtx, xty)?;
    let dot: f64 = coefficients
        .iter()
        .zip(&x_mean)
        .map(|(coeff, mean)| coeff * mean)
        .sum();

    Some(LinearFit {
        coefficients,
        intercept: y_mean - dot,
    })
}

/// Solves `a · β = b` by Gauss-Jordan elimination with partial pivoting.
///
/// Columns without a usable pivot get a zero coefficient.
fn solve_normal_equations<const N: usize>(
    mut a: [[f64; N]; N],
    mut b: [f64; N],
) -> Option<[f64; N]> {
    let scale = (0..N).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let mut coefficients = [0.0; N];
    if scale == 0.0 {
        // Every column is constant: only the intercept carries signal.
        return Some(coefficients);
    }
    let tolerance = PIVOT_TOLERANCE * scale;

    let mut pivot_rows: [Option<usize>; N] = [None; N];
    let mut row = 0;
    for col in 0..N {
        if row == N {
            break;
        }
        let (best, best_abs) = (row..N)
            .map(|r| (r, a[r][col].abs()))
            .max_by(|lhs, rhs| lhs.1.total_cmp(&rhs.1))?;
        if best_abs <= tolerance {
            continue;
        }
        a.swap(row, best);
        b.swap(row, best);

        let pivot = a[row][col];
        for r in 0..N {
            if r == row {
                continue;
            }
            let factor = a[r][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..N {
                a[r][c] -= factor * a[row][c];
            }
            b[r] -= factor * b[row];
        }
        pivot_rows[col] = Some(row);
        row += 1;
    }

    for (col, pivot_row) in pivot_rows.iter().enumerate() {
        if let Some(r) = *pivot_row {
            coefficients[col] = b[r] / a[r][col];
        }
    }

    coefficients
        .iter()
        .all(|c| c.is_finite())
        .then_some(coefficients)
}

/// Coefficient of determination for a model with intercept.
///
/// A constant target gives 1.0 for a perfect fit and 0.0 otherwise.
#[must_use]
pub fn r_squared<const N: usize>(
    data: &[([f64; N], f64)],
    model: &LinearFit<N>,
) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts are far below 2^52"
    )]
    let y_mean = data.iter().map(|(_, y)| y).sum::<f64>() / data.len() as f64;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in data {
        ss_res += (y - model.predict(x)).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }
    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Root mean squared error of `model` over `data`.
#[must_use]
pub fn rmse<const N: usize>(
    data: &[([f64; N], f64)],
    model: &LinearFit<N>,
) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts are far below 2^52"
    )]
    let n = data.len() as f64;
    let sse: f64 = data
        .iter()
        .map(|(x, y)| (y - model.predict(x)).powi(2))
        .sum();
    (sse / n).sqrt()
}

/// Mean absolute error of `model` over `data`.
#[must_use]
pub fn mae<const N: usize>(
    data: &[([f64; N], f64)],
    model: &LinearFit<N>,
) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts are far below 2^52"
    )]
    let n = data.len() as f64;
    data.iter()
        .map(|(x, y)| (y - model.predict(x)).abs())
        .sum::<f64>()
        / n
}

/// Returns `0..len` in an order determined only by `seed`.
///
/// Fisher-Yates driven by [`XorShift64`]; the same `(len, seed)` pair always
/// produces the same permutation.
#[must_use]
pub fn shuffled_indices(len: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = XorShift64::new(seed);
    for i in (1..len).rev() {
        let j = rng.next_usize(i + 1);
        indices.swap(i, j);
    }
    indices
}

/// Small deterministic PRNG for reproducible sampling.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 {
                0xdead_beef_cafe_f00d
            } else {
                seed
            },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform-ish value in `0..upper` (0 when `upper <= 1`).
    pub fn next_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        let upper_u64 = u64::try_from(upper).unwrap_or(u64::MAX);
        let value = self.next_u64() % upper_u64;
        usize::try_from(value).unwrap_or(0)
    }
}
