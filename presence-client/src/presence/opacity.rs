use std::fmt;

/// Presence opacity in whole tenths, from fully visible (1.0) to fully transparent (0.0).
///
/// Decay subtracts one tenth and stops at zero, so `N` ticks from full always land exactly on
/// `max(1.0 - 0.1 * N, 0.0)` without floating point drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opacity(u8);

impl Opacity {
    pub const FULL: Opacity = Opacity(10);
    pub const TRANSPARENT: Opacity = Opacity(0);

    /// Builds an opacity from a number of tenths, clamped to `0..=10`.
    pub fn from_tenths(tenths: u8) -> Self {
        Opacity(tenths.min(Self::FULL.0))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    pub fn decayed(self) -> Self {
        Opacity(self.0.saturating_sub(1))
    }

    pub fn is_transparent(self) -> bool {
        self.0 == 0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Opacity::FULL
    }
}

// Formatted for the CSS `opacity` property.
impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_from_full_is_exact_and_floors_at_zero() {
        let mut opacity = Opacity::FULL;
        for n in 1..=15u8 {
            opacity = opacity.decayed();
            let expected = (1.0 - 0.1 * f64::from(n)).max(0.0);
            assert!(
                (opacity.value() - expected).abs() < 1e-9,
                "tick {n}: {} != {expected}",
                opacity.value()
            );
        }
        assert_eq!(opacity, Opacity::TRANSPARENT);
        assert!(opacity.is_transparent());
    }

    #[test]
    fn css_text_has_one_decimal() {
        assert_eq!(Opacity::FULL.to_string(), "1.0");
        assert_eq!(Opacity::from_tenths(3).to_string(), "0.3");
        assert_eq!(Opacity::TRANSPARENT.to_string(), "0.0");
    }

    #[test]
    fn from_tenths_clamps() {
        assert_eq!(Opacity::from_tenths(42), Opacity::FULL);
    }
}
