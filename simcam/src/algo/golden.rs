//! Golden-section search for the minimum of a unimodal function on an interval.
//!
//! Each iteration shrinks the bracket `[a, b]` by the inverse golden ratio
//! while reusing one of the two interior points, so every step costs a single
//! objective evaluation. The result is only guaranteed to be the minimum when
//! the objective is unimodal on the starting interval; otherwise it converges
//! to some local minimum inside the bracket.

use thiserror::Error;

/// Golden ratio φ = (1 + √5) / 2
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Search interval [{0}, {1}] is empty or not finite")]
    InvalidInterval(f64, f64),
    #[error("Tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
}

/// Minimize `f` over `[a, b]`, stopping once the bracket is no wider than
/// `tol`. Returns the midpoint of the final bracket.
pub fn golden_section_search<F>(mut f: F, a: f64, b: f64, tol: f64) -> Result<f64, SearchError>
where
    F: FnMut(f64) -> f64,
{
    if !(a.is_finite() && b.is_finite()) || a > b {
        return Err(SearchError::InvalidInterval(a, b));
    }
    if !(tol.is_finite() && tol > 0.0) {
        return Err(SearchError::InvalidTolerance(tol));
    }

    let (mut a, mut b) = (a, b);
    let mut c = b - (b - a) / GOLDEN_RATIO;
    let mut d = a + (b - a) / GOLDEN_RATIO;
    let mut fc = f(c);
    let mut fd = f(d);

    while (b - a).abs() > tol {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - (b - a) / GOLDEN_RATIO;
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + (b - a) / GOLDEN_RATIO;
            fd = f(d);
        }
    }

    Ok((a + b) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_golden_ratio_constant() {
        assert_abs_diff_eq!(GOLDEN_RATIO, (1.0 + 5f64.sqrt()) / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_parabola_converges() {
        for k in [-350.0, -12.5, 0.0, 3.3, 180.0] {
            let x = golden_section_search(|x| (x - k).powi(2), -400.0, 200.0, 1.0).unwrap();
            assert_abs_diff_eq!(x, k, epsilon = 1.0);
        }
    }

    #[test]
    fn test_tight_tolerance() {
        let x = golden_section_search(|x| (x - 1.234).powi(2), 0.0, 10.0, 1e-6).unwrap();
        assert_abs_diff_eq!(x, 1.234, epsilon = 1e-6);
    }

    #[test]
    fn test_minimum_at_boundary() {
        let x = golden_section_search(|x| x, -400.0, 200.0, 1.0).unwrap();
        assert_abs_diff_eq!(x, -400.0, epsilon = 1.0);
    }

    #[test]
    fn test_abs_objective() {
        let x = golden_section_search(|x| (x + 42.0).abs(), -400.0, 200.0, 0.5).unwrap();
        assert_abs_diff_eq!(x, -42.0, epsilon = 0.5);
    }

    #[test]
    fn test_degenerate_interval() {
        let mut calls = 0;
        let x = golden_section_search(
            |x| {
                calls += 1;
                x * x
            },
            5.0,
            5.0,
            1.0,
        )
        .unwrap();
        assert_eq!(x, 5.0);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            golden_section_search(|x| x, 3.0, 1.0, 1.0),
            Err(SearchError::InvalidInterval(3.0, 1.0))
        );
        assert_eq!(
            golden_section_search(|x| x, 0.0, f64::INFINITY, 1.0),
            Err(SearchError::InvalidInterval(0.0, f64::INFINITY))
        );
        assert_eq!(
            golden_section_search(|x| x, 0.0, 1.0, 0.0),
            Err(SearchError::InvalidTolerance(0.0))
        );
    }
}
