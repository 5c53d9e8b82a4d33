//! Type-safe lengths for rig geometry
//!
//! The engine computes in plain `f64` millimeters; this module wraps the
//! `uom` length type for the inch display at the edges.

use uom::si::length::{inch, millimeter};

/// Type alias for length measurements with convenient methods
pub type Length = uom::si::f64::Length;

/// Extension trait for the length units used in rig reports
pub trait LengthExt {
    fn from_millimeters(mm: f64) -> Self;

    fn as_inches(&self) -> f64;
}

impl LengthExt for Length {
    fn from_millimeters(mm: f64) -> Self {
        Length::new::<millimeter>(mm)
    }

    fn as_inches(&self) -> f64 {
        self.get::<inch>()
    }
}

/// Millimeters converted to inches
pub fn mm_to_inches(mm: f64) -> f64 {
    Length::from_millimeters(mm).as_inches()
}

/// `"123.4 mm (4.9")"`
pub fn format_mm(mm: f64) -> String {
    format!("{:.1} mm ({:.1}\")", mm, mm_to_inches(mm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mm_to_inches() {
        assert_relative_eq!(mm_to_inches(152.4), 6.0, epsilon = 1e-12);
        assert_relative_eq!(mm_to_inches(25.4), 1.0, epsilon = 1e-12);
        assert_eq!(mm_to_inches(0.0), 0.0);
    }

    #[test]
    fn test_format_mm() {
        assert_eq!(format_mm(254.0), "254.0 mm (10.0\")");
        assert_eq!(format_mm(42.67), "42.7 mm (1.7\")");
    }
}
