//! Confidence score module

/// Confidence score in [0.0, 1.0] estimating how strongly the supporting
/// evidence justifies a theme cluster's existence.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    /// Create a new confidence score.
    ///
    /// # Panics
    /// Panics if the value is outside [0, 1] or not finite.
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite(), "Confidence must be finite");
        assert!(
            (0.0..=1.0).contains(&value),
            "Confidence must be in [0, 1]"
        );
        Self(value)
    }

    /// Create a confidence score by clipping an untrusted value into
    /// [0, 1].
    ///
    /// Returns the score and whether clipping was required, so callers can
    /// flag the repair instead of absorbing it silently. Non-finite input
    /// clips to 0.
    pub fn clamped(value: f64) -> (Self, bool) {
        if !value.is_finite() {
            return (Self(0.0), true);
        }
        let clipped = value.clamp(0.0, 1.0);
        (Self(clipped), clipped != value)
    }

    /// The raw score.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Scale the score by a factor, saturating at the valid bounds.
    pub fn scaled(&self, factor: f64) -> Self {
        Self((self.0 * factor).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_creation() {
        let c = Confidence::new(0.85);
        assert_eq!(c.value(), 0.85);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        Confidence::new(1.2);
    }

    #[test]
    fn test_clamped_in_range() {
        let (c, clipped) = Confidence::clamped(0.4);
        assert_eq!(c.value(), 0.4);
        assert!(!clipped);
    }

    #[test]
    fn test_clamped_out_of_range() {
        let (c, clipped) = Confidence::clamped(1.7);
        assert_eq!(c.value(), 1.0);
        assert!(clipped);

        let (c, clipped) = Confidence::clamped(-0.3);
        assert_eq!(c.value(), 0.0);
        assert!(clipped);
    }

    #[test]
    fn test_clamped_non_finite() {
        let (c, clipped) = Confidence::clamped(f64::NAN);
        assert_eq!(c.value(), 0.0);
        assert!(clipped);
    }

    #[test]
    fn test_scaled_saturates() {
        let c = Confidence::new(0.8);
        assert!((c.scaled(0.5).value() - 0.4).abs() < 1e-9);
        assert_eq!(c.scaled(2.0).value(), 1.0);
    }
}
