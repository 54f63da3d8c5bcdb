//! Melodic interval features
//!
//! Consecutive-note intervals of the first part (the melodic voice by
//! convention). Chords are excluded: an interval into or out of a chord
//! has no single melodic meaning.

use indexmap::IndexMap;

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::error::ExtractError;
use crate::score::Score;

/// Melodic feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MelodyFeatures {
    /// Interval-name histogram, most common first.
    pub interval_distribution: Option<IndexMap<String, usize>>,
    /// Number of measured intervals.
    pub interval_count: Option<usize>,
    /// Largest absolute interval in semitones.
    pub largest_interval: Option<i64>,
    /// Intervals of at most two semitones.
    pub stepwise_count: Option<usize>,
}

impl FeatureGroup for MelodyFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.interval_distribution = self.interval_distribution;
        record.interval_count = self.interval_count;
        record.largest_interval = self.largest_interval;
        record.stepwise_count = self.stepwise_count;
    }
}

/// Conventional interval name for an absolute semitone count.
///
/// Compound intervals larger than an octave reduce to their simple form;
/// the exact octave keeps its own name.
fn interval_name(semitones: i64) -> &'static str {
    let simple = if semitones == 12 {
        12
    } else {
        semitones.rem_euclid(12)
    };
    match simple {
        0 => "perfect unison",
        1 => "minor second",
        2 => "major second",
        3 => "minor third",
        4 => "major third",
        5 => "perfect fourth",
        6 => "tritone",
        7 => "perfect fifth",
        8 => "minor sixth",
        9 => "major sixth",
        10 => "minor seventh",
        11 => "major seventh",
        _ => "perfect octave",
    }
}

/// Extract melodic features from the first part.
///
/// At least two plain notes are required; otherwise no fields are
/// reported.
pub fn analyze(score: &Score) -> Result<MelodyFeatures, ExtractError> {
    let mut features = MelodyFeatures::default();

    let notes = match score.parts.first() {
        Some(part) => part.plain_notes(),
        None => return Ok(features),
    };
    if notes.len() < 2 {
        return Ok(features);
    }

    let mut histogram: IndexMap<String, usize> = IndexMap::new();
    let mut largest: i64 = 0;
    let mut stepwise = 0usize;
    let mut count = 0usize;

    for pair in notes.windows(2) {
        let semitones = (pair[1].pitch.ps() - pair[0].pitch.ps()).abs().round() as i64;
        *histogram
            .entry(interval_name(semitones).to_string())
            .or_insert(0) += 1;
        largest = largest.max(semitones);
        if semitones <= 2 {
            stepwise += 1;
        }
        count += 1;
    }

    histogram.sort_by(|_, a, _, b| b.cmp(a));
    features.interval_distribution = Some(histogram);
    features.interval_count = Some(count);
    features.largest_interval = Some(largest);
    features.stepwise_count = Some(stepwise);

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Measure, Note, Part};

    fn melody(names: &[&str]) -> Score {
        let mut part = Part::new();
        let mut m = Measure::new(1);
        for name in names {
            m.push(Note::parse(name, 1.0).unwrap());
        }
        part.push_measure(m);
        let mut score = Score::new();
        score.push_part(part);
        score
    }

    #[test]
    fn test_interval_names() {
        assert_eq!(interval_name(0), "perfect unison");
        assert_eq!(interval_name(2), "major second");
        assert_eq!(interval_name(7), "perfect fifth");
        assert_eq!(interval_name(12), "perfect octave");
        // Compound intervals reduce.
        assert_eq!(interval_name(13), "minor second");
        assert_eq!(interval_name(24), "perfect unison");
    }

    #[test]
    fn test_scale_is_stepwise() {
        let score = melody(&["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"]);
        let f = analyze(&score).unwrap();
        assert_eq!(f.interval_count, Some(7));
        assert_eq!(f.stepwise_count, Some(7));
        assert_eq!(f.largest_interval, Some(2));
        let dist = f.interval_distribution.unwrap();
        assert_eq!(dist["major second"], 5);
        assert_eq!(dist["minor second"], 2);
        // Most common first.
        assert_eq!(dist.keys().next().unwrap(), "major second");
    }

    #[test]
    fn test_leaps_register() {
        let score = melody(&["C4", "G4", "C4", "C5"]);
        let f = analyze(&score).unwrap();
        assert_eq!(f.largest_interval, Some(12));
        assert_eq!(f.stepwise_count, Some(0));
        let dist = f.interval_distribution.unwrap();
        assert_eq!(dist["perfect fifth"], 2);
        assert_eq!(dist["perfect octave"], 1);
    }

    #[test]
    fn test_single_note_reports_nothing() {
        let score = melody(&["C4"]);
        let f = analyze(&score).unwrap();
        assert!(f.interval_count.is_none());
        assert!(f.interval_distribution.is_none());
    }
}
