//! Feature analyzers
//!
//! Each submodule computes one independent feature group from a
//! [`ScoreView`](crate::view::ScoreView) and returns a struct implementing
//! [`FeatureGroup`](crate::analysis::record::FeatureGroup). Analyzers never
//! touch the output record directly on failure, so a feature-local error
//! leaves no partial fields behind.

pub mod chromatic;
pub mod difficulty;
pub mod harmony;
pub mod instrumentation;
pub mod key;
pub mod melody;
pub mod movement;
pub mod notation;
pub mod range;
pub mod rhythm;
pub mod temporal;
pub mod texture;

/// Round to a fixed number of decimal places (half away from zero, which
/// is what the output contract expects for feature values).
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(1.235, 2), 1.24);
        assert_eq!(round_to(0.6666666, 3), 0.667);
        assert_eq!(round_to(10.0, 1), 10.0);
    }
}
