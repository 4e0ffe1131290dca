//! Gradient checking utilities
//!
//! Verifies analytical VJP rules against finite differences of the forward
//! function:
//! - **Central difference**: `f'(x) ≈ [f(x+h) - f(x-h)] / (2h)` (more accurate)
//! - **Forward difference**: `f'(x) ≈ [f(x+h) - f(x)] / h` (faster)
//!
//! Each perturbed output is contracted with the upstream gradient, so the
//! numerical result is directly comparable to a VJP.
//!
//! # Example
//!
//! ```
//! use vjpreg_ad::gradcheck::{check_gradient, GradCheckConfig};
//! use vjpreg_ad::{GradResult, OpId, Registry};
//! use vjpreg_core::Operand;
//!
//! let y = Operand::from_vec(vec![2.0, -1.0, 0.5], &[3]).unwrap();
//! let x = Operand::from_vec(vec![0.3], &[1]).unwrap();
//! let g = Operand::ones(&[3]);
//!
//! let f = |x: &Operand| -> GradResult<Operand> { Ok(x.mul(&y)?) };
//! let df = |x: &Operand, g: &Operand| -> GradResult<Operand> {
//!     let ans = x.mul(&y)?;
//!     Registry::global().vjp(OpId::Multiply, 0, g, &ans, &[x.clone(), y.clone()])
//! };
//!
//! let result = check_gradient(f, df, &x, &g, &GradCheckConfig::default()).unwrap();
//! assert!(result.passed);
//! ```

use anyhow::anyhow;
use tracing::{debug, info, warn};
use vjpreg_core::Operand;

use crate::error::{GradError, GradResult};

/// Gradient checking configuration
#[derive(Debug, Clone)]
pub struct GradCheckConfig {
    /// Step size for finite differences (default: 1e-5)
    pub epsilon: f64,

    /// Relative tolerance for gradient comparison (default: 1e-3)
    pub rtol: f64,

    /// Absolute tolerance for gradient comparison (default: 1e-5)
    pub atol: f64,

    /// Use central difference (more accurate but 2x slower)
    pub use_central_diff: bool,

    /// Log every mismatching element
    pub verbose: bool,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-5,
            rtol: 1e-3,
            atol: 1e-5,
            use_central_diff: true,
            verbose: false,
        }
    }
}

/// Result of gradient checking
#[derive(Debug)]
pub struct GradCheckResult {
    /// Maximum absolute difference between analytical and numerical gradients
    pub max_abs_diff: f64,

    /// Maximum relative difference
    pub max_rel_diff: f64,

    /// Whether the gradient check passed
    pub passed: bool,

    /// Number of elements checked
    pub num_elements: usize,

    /// Number of elements that failed the check
    pub num_failures: usize,
}

/// Check an analytical gradient against finite differences.
///
/// # Arguments
///
/// * `f` - Forward function: x -> y
/// * `df` - Gradient function: (x, grad_y) -> grad_x
/// * `x` - Real input to check gradients at
/// * `grad_y` - Upstream gradient, shaped like `f(x)`
/// * `config` - Gradient checking configuration
///
/// # Errors
///
/// Fails if `x` or the forward outputs are complex, if the analytical
/// gradient's shape differs from `x`, or if either function fails.
pub fn check_gradient<F, G>(
    f: F,
    df: G,
    x: &Operand,
    grad_y: &Operand,
    config: &GradCheckConfig,
) -> GradResult<GradCheckResult>
where
    F: Fn(&Operand) -> GradResult<Operand>,
    G: Fn(&Operand, &Operand) -> GradResult<Operand>,
{
    let analytical = df(x, grad_y)?;
    if analytical.shape() != x.shape() {
        return Err(GradError::shape_mismatch(x.shape(), analytical.shape()));
    }

    let numerical = numerical_gradient(f, x, grad_y, config)?;
    compare_gradients(&analytical.to_real_vec()?, &numerical, config)
}

/// Finite-difference VJP of `f` at `x`, flattened in row-major order
fn numerical_gradient<F>(
    f: F,
    x: &Operand,
    grad_y: &Operand,
    config: &GradCheckConfig,
) -> GradResult<Vec<f64>>
where
    F: Fn(&Operand) -> GradResult<Operand>,
{
    let shape = x.shape();
    let base = x.to_real_vec()?;
    let eps = config.epsilon;

    let perturbed = |idx: usize, delta: f64| -> GradResult<Operand> {
        let mut values = base.clone();
        values[idx] += delta;
        f(&Operand::from_vec(values, shape)?)
    };

    let y = if config.use_central_diff {
        None
    } else {
        Some(f(x)?)
    };

    let mut grad = Vec::with_capacity(base.len());
    for idx in 0..base.len() {
        let y_plus = perturbed(idx, eps)?;
        let contribution = match &y {
            None => {
                let y_minus = perturbed(idx, -eps)?;
                contract(grad_y, &y_plus.sub(&y_minus)?)? / (2.0 * eps)
            }
            Some(y) => contract(grad_y, &y_plus.sub(y)?)? / eps,
        };
        grad.push(contribution);
    }
    Ok(grad)
}

/// `sum(a * b)` over real operands of matching shape
fn contract(a: &Operand, b: &Operand) -> GradResult<f64> {
    if a.shape() != b.shape() {
        return Err(GradError::shape_mismatch(b.shape(), a.shape()));
    }
    a.mul(b)?
        .sum_all()
        .get_real(&[])
        .ok_or_else(|| GradError::Substrate(anyhow!("gradient check requires real outputs")))
}

fn compare_gradients(
    analytical: &[f64],
    numerical: &[f64],
    config: &GradCheckConfig,
) -> GradResult<GradCheckResult> {
    let mut max_abs_diff = 0.0_f64;
    let mut max_rel_diff = 0.0_f64;
    let mut num_failures = 0;

    for (idx, (&a_val, &n_val)) in analytical.iter().zip(numerical).enumerate() {
        let abs_diff = (a_val - n_val).abs();
        let rel_diff = if n_val.abs() > f64::EPSILON {
            abs_diff / n_val.abs()
        } else {
            abs_diff
        };

        max_abs_diff = max_abs_diff.max(abs_diff);
        max_rel_diff = max_rel_diff.max(rel_diff);

        // NaN differences fail both comparisons and so count as failures
        if !(abs_diff <= config.atol || rel_diff <= config.rtol) {
            num_failures += 1;
            if config.verbose {
                warn!(
                    index = idx,
                    analytical = a_val,
                    numerical = n_val,
                    abs_diff,
                    rel_diff,
                    "gradient mismatch"
                );
            }
        }
    }

    let passed = num_failures == 0;
    if config.verbose {
        if passed {
            info!(max_abs_diff, max_rel_diff, "gradient check passed");
        } else {
            info!(
                num_failures,
                num_elements = analytical.len(),
                max_abs_diff,
                max_rel_diff,
                "gradient check failed"
            );
        }
    } else {
        debug!(passed, max_abs_diff, max_rel_diff, "gradient check");
    }

    Ok(GradCheckResult {
        max_abs_diff,
        max_rel_diff,
        passed,
        num_elements: analytical.len(),
        num_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradcheck_identity() {
        // f(x) = x, df/dx = 1
        let f = |x: &Operand| -> GradResult<Operand> { Ok(x.clone()) };
        let df = |_x: &Operand, grad_y: &Operand| Ok(grad_y.clone());

        let x = Operand::ones(&[2, 3]);
        let grad_y = Operand::ones(&[2, 3]);

        let result = check_gradient(f, df, &x, &grad_y, &GradCheckConfig::default()).unwrap();
        assert!(result.passed, "Gradient check should pass for identity");
        assert!(result.max_abs_diff < 1e-6);
        assert_eq!(result.num_elements, 6);
    }

    #[test]
    fn test_gradcheck_square() {
        // f(x) = x^2, df/dx = 2x
        let f = |x: &Operand| -> GradResult<Operand> { Ok(x.square()) };
        let df = |x: &Operand, g: &Operand| -> GradResult<Operand> {
            Ok(x.mul(g)?.mul(&Operand::scalar(2.0))?)
        };

        let x = Operand::from_vec(vec![1.0, -2.0, 0.5, 3.0], &[4]).unwrap();
        let g = Operand::ones(&[4]);

        let result = check_gradient(f, df, &x, &g, &GradCheckConfig::default()).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_gradcheck_forward_difference() {
        let f = |x: &Operand| -> GradResult<Operand> { Ok(x.exp()) };
        let df = |x: &Operand, g: &Operand| -> GradResult<Operand> { Ok(x.exp().mul(g)?) };

        let x = Operand::from_vec(vec![0.1, 0.2], &[2]).unwrap();
        let config = GradCheckConfig {
            use_central_diff: false,
            ..Default::default()
        };
        let result = check_gradient(f, df, &x, &Operand::ones(&[2]), &config).unwrap();
        assert!(result.passed);
    }

    #[test]
    fn test_gradcheck_detects_wrong_gradient() {
        let f = |x: &Operand| -> GradResult<Operand> { Ok(x.square()) };
        let df = |_x: &Operand, g: &Operand| Ok(g.clone());

        let x = Operand::from_vec(vec![2.0, 3.0], &[2]).unwrap();
        let config = GradCheckConfig {
            verbose: true,
            ..Default::default()
        };
        let result = check_gradient(f, df, &x, &Operand::ones(&[2]), &config).unwrap();
        assert!(!result.passed);
        assert_eq!(result.num_failures, 2);
    }

    #[test]
    fn test_gradcheck_shape_mismatch() {
        let f = |x: &Operand| -> GradResult<Operand> { Ok(x.clone()) };
        let df = |_x: &Operand, _g: &Operand| Ok(Operand::ones(&[3]));

        let x = Operand::ones(&[2]);
        let err = check_gradient(f, df, &x, &Operand::ones(&[2]), &GradCheckConfig::default())
            .unwrap_err();
        assert!(matches!(err, GradError::ShapeMismatch { .. }));
    }
}
