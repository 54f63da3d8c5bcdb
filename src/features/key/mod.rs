//! Key estimation
//!
//! Krumhansl-Schmuckler class algorithm for symbolic scores: correlate the
//! duration-weighted pitch-class histogram against major/minor templates
//! for every tonic, return the globally best key and the ranked alternates.

pub mod profiles;

use profiles::{pearson, rotated, MAJOR_PROFILE, MINOR_PROFILE};

use crate::view::GeneralNote;

/// Conventional tonic spellings for major keys.
const MAJOR_TONIC_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Conventional tonic spellings for minor keys.
const MINOR_TONIC_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// Major-scale degrees as semitone offsets from the tonic.
const MAJOR_SCALE_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Natural-minor-scale degrees as semitone offsets from the tonic.
const MINOR_SCALE_STEPS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Key mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Major mode.
    Major,
    /// Minor mode.
    Minor,
}

impl Mode {
    /// Lowercase mode label ("major"/"minor").
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

/// One ranked key solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySolution {
    /// Tonic pitch class (0 = C).
    pub tonic_pc: u8,
    /// Major or minor.
    pub mode: Mode,
    /// Pearson correlation against the key's profile (-1.0 to 1.0).
    pub correlation: f64,
}

impl KeySolution {
    /// Conventional tonic spelling ("Eb", "F#").
    pub fn tonic_name(&self) -> &'static str {
        match self.mode {
            Mode::Major => MAJOR_TONIC_NAMES[self.tonic_pc as usize % 12],
            Mode::Minor => MINOR_TONIC_NAMES[self.tonic_pc as usize % 12],
        }
    }

    /// "{tonic} {mode}" label ("C major", "A minor").
    pub fn label(&self) -> String {
        format!("{} {}", self.tonic_name(), self.mode.as_str())
    }
}

/// Estimated key of a passage: best solution plus the full ranked table.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// Best-matching solution.
    pub best: KeySolution,
    /// All 24 solutions ranked by correlation, highest first
    /// (`ranked[0] == best`).
    pub ranked: Vec<KeySolution>,
}

impl KeyEstimate {
    /// "{tonic} {mode}" label of the best solution.
    pub fn label(&self) -> String {
        self.best.label()
    }

    /// Correlation of the best solution clamped to [0, 1], usable as a
    /// confidence score.
    pub fn confidence(&self) -> f64 {
        self.best.correlation.clamp(0.0, 1.0)
    }

    /// Alternate solutions ranked by correlation (the best one excluded).
    pub fn alternates(&self, count: usize) -> &[KeySolution] {
        let end = (1 + count).min(self.ranked.len());
        &self.ranked[1..end]
    }

    /// Diatonic pitch classes of the key's scale (natural minor for minor
    /// keys), as a 12-slot membership table.
    pub fn diatonic_pitch_classes(&self) -> [bool; 12] {
        let steps = match self.best.mode {
            Mode::Major => MAJOR_SCALE_STEPS,
            Mode::Minor => MINOR_SCALE_STEPS,
        };
        let mut member = [false; 12];
        for step in steps {
            member[(self.best.tonic_pc + step) as usize % 12] = true;
        }
        member
    }
}

/// Duration-weighted pitch-class histogram over a note stream.
///
/// Grace notes carry no metric duration and are weighted by a nominal
/// epsilon so purely ornamental passages still produce a histogram.
pub fn histogram_from_notes(notes: &[GeneralNote<'_>]) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for note in notes {
        let weight = if note.quarter_length() > 0.0 {
            note.quarter_length()
        } else {
            0.0625
        };
        for pitch in note.pitches() {
            histogram[pitch.pitch_class() as usize] += weight;
        }
    }
    histogram
}

/// Estimate the key of a note stream.
///
/// Returns `None` when the stream contains no pitched material.
pub fn estimate_key(notes: &[GeneralNote<'_>]) -> Option<KeyEstimate> {
    estimate_key_from_histogram(&histogram_from_notes(notes))
}

/// Estimate the key from a pitch-class histogram.
///
/// Correlates the histogram against all 24 rotated profiles and ranks the
/// solutions by correlation. Returns `None` for an empty histogram.
pub fn estimate_key_from_histogram(histogram: &[f64; 12]) -> Option<KeyEstimate> {
    if histogram.iter().sum::<f64>() <= 0.0 {
        return None;
    }

    let mut ranked = Vec::with_capacity(24);
    for tonic_pc in 0u8..12 {
        ranked.push(KeySolution {
            tonic_pc,
            mode: Mode::Major,
            correlation: pearson(histogram, &rotated(&MAJOR_PROFILE, tonic_pc)),
        });
        ranked.push(KeySolution {
            tonic_pc,
            mode: Mode::Minor,
            correlation: pearson(histogram, &rotated(&MINOR_PROFILE, tonic_pc)),
        });
    }

    // Deterministic ordering: correlation desc, ties broken by tonic then
    // mode, so repeated runs rank identically.
    ranked.sort_by(|a, b| {
        b.correlation
            .partial_cmp(&a.correlation)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.tonic_pc.cmp(&b.tonic_pc))
            .then((a.mode == Mode::Minor).cmp(&(b.mode == Mode::Minor)))
    });

    let best = ranked[0];
    log::debug!(
        "Estimated key: {} (r = {:.4})",
        best.label(),
        best.correlation
    );
    Some(KeyEstimate { best, ranked })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_histogram(tonic_pc: u8, steps: &[u8; 7]) -> [f64; 12] {
        let mut h = [0.0; 12];
        for &s in steps {
            h[(tonic_pc + s) as usize % 12] += 1.0;
        }
        // Extra weight on the tonic, as real pieces have.
        h[tonic_pc as usize] += 2.0;
        h
    }

    #[test]
    fn test_c_major_scale_detected() {
        let h = scale_histogram(0, &MAJOR_SCALE_STEPS);
        let est = estimate_key_from_histogram(&h).unwrap();
        assert_eq!(est.best.mode, Mode::Major);
        assert_eq!(est.best.tonic_pc, 0);
        assert_eq!(est.label(), "C major");
        assert!(est.confidence() > 0.5);
    }

    #[test]
    fn test_a_minor_scale_detected() {
        let h = scale_histogram(9, &MINOR_SCALE_STEPS);
        let est = estimate_key_from_histogram(&h).unwrap();
        assert_eq!(est.best.mode, Mode::Minor);
        assert_eq!(est.best.tonic_pc, 9);
        assert_eq!(est.label(), "A minor");
    }

    #[test]
    fn test_empty_histogram_is_none() {
        assert!(estimate_key_from_histogram(&[0.0; 12]).is_none());
    }

    #[test]
    fn test_ranked_table_has_24_solutions() {
        let h = scale_histogram(7, &MAJOR_SCALE_STEPS);
        let est = estimate_key_from_histogram(&h).unwrap();
        assert_eq!(est.ranked.len(), 24);
        assert_eq!(est.ranked[0], est.best);
        assert_eq!(est.alternates(5).len(), 5);
        // Ranked table is monotonically non-increasing.
        for pair in est.ranked.windows(2) {
            assert!(pair[0].correlation >= pair[1].correlation);
        }
    }

    #[test]
    fn test_diatonic_pitch_classes() {
        let h = scale_histogram(0, &MAJOR_SCALE_STEPS);
        let est = estimate_key_from_histogram(&h).unwrap();
        let member = est.diatonic_pitch_classes();
        assert!(member[0] && member[2] && member[4]); // C D E
        assert!(!member[1] && !member[6]); // C# F#
        assert_eq!(member.iter().filter(|&&m| m).count(), 7);
    }

    #[test]
    fn test_transposition_consistency() {
        // Same scale shape transposed must move the tonic with it.
        for tonic in 0u8..12 {
            let h = scale_histogram(tonic, &MAJOR_SCALE_STEPS);
            let est = estimate_key_from_histogram(&h).unwrap();
            assert_eq!(est.best.tonic_pc, tonic, "tonic {}", tonic);
            assert_eq!(est.best.mode, Mode::Major);
        }
    }
}
