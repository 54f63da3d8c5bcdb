//! Krumhansl-Kessler key profiles
//!
//! Tonal profiles for the 24 keys (12 major + 12 minor), matched against a
//! duration-weighted pitch-class histogram by Pearson correlation.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in
//! Perceived Tonal Organization in a Spatial Representation of Musical Keys.
//! *Psychological Review*, 89(4), 334-368.

/// C major profile (probe-tone ratings).
pub const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// C minor profile (probe-tone ratings).
pub const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Profile for a given tonic, rotated so index 0 is pitch class 0 (C).
///
/// `profile[pc]` is the expected weight of pitch class `pc` in the key with
/// the given tonic.
pub fn rotated(profile: &[f64; 12], tonic_pc: u8) -> [f64; 12] {
    let mut out = [0.0; 12];
    for (degree, &value) in profile.iter().enumerate() {
        out[(degree + tonic_pc as usize) % 12] = value;
    }
    out
}

/// Pearson correlation coefficient between two 12-element vectors.
///
/// Returns 0.0 when either vector has zero variance.
pub fn pearson(a: &[f64; 12], b: &[f64; 12]) -> f64 {
    let n = 12.0;
    let mean_a: f64 = a.iter().sum::<f64>() / n;
    let mean_b: f64 = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..12 {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < 1e-12 {
        0.0
    } else {
        cov / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_moves_tonic() {
        let g_major = rotated(&MAJOR_PROFILE, 7);
        // Tonic weight lands on G (pc 7), dominant weight on D (pc 2).
        assert_eq!(g_major[7], MAJOR_PROFILE[0]);
        assert_eq!(g_major[2], MAJOR_PROFILE[7]);
    }

    #[test]
    fn test_pearson_self_correlation_is_one() {
        let r = pearson(&MAJOR_PROFILE, &MAJOR_PROFILE);
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_zero_variance() {
        let flat = [1.0; 12];
        assert_eq!(pearson(&flat, &MAJOR_PROFILE), 0.0);
    }

    #[test]
    fn test_pearson_symmetry() {
        let r1 = pearson(&MAJOR_PROFILE, &MINOR_PROFILE);
        let r2 = pearson(&MINOR_PROFILE, &MAJOR_PROFILE);
        assert!((r1 - r2).abs() < 1e-12);
    }
}
