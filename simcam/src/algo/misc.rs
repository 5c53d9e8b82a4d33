//! Miscellaneous numeric helpers shared by the optimizers.

/// Returns the value in `values` closest to `target`.
///
/// Ties resolve to the earliest element. Returns `None` for an empty slice.
///
/// # Example
///
/// ```
/// use simcam::algo::misc::find_nearest;
///
/// assert_eq!(find_nearest(&[4.0, 6.0, 8.0], 6.9), Some(6.0));
/// assert_eq!(find_nearest(&[], 1.0), None);
/// ```
pub fn find_nearest(values: &[f64], target: f64) -> Option<f64> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold(first, |best, v| {
        if (v - target).abs() < (best - target).abs() {
            v
        } else {
            best
        }
    }))
}

/// Truncates toward zero, the way slider positions are committed to whole millimeters
pub fn whole_mm(value: f64) -> f64 {
    value.trunc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nearest() {
        let focals = [2.8, 4.0, 6.0, 8.0, 12.0];
        assert_eq!(find_nearest(&focals, 7.1), Some(8.0));
        assert_eq!(find_nearest(&focals, 100.0), Some(12.0));
        assert_eq!(find_nearest(&focals, -3.0), Some(2.8));
    }

    #[test]
    fn test_find_nearest_tie_keeps_first() {
        assert_eq!(find_nearest(&[4.0, 6.0], 5.0), Some(4.0));
    }

    #[test]
    fn test_whole_mm() {
        assert_eq!(whole_mm(431.9), 431.0);
        assert_eq!(whole_mm(-12.7), -12.0);
    }
}
