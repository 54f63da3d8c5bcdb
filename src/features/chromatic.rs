//! Chromaticism features
//!
//! Counts pitches outside the estimated key's diatonic scale and builds
//! the spelled pitch-class histogram. The histogram keeps spellings, so
//! enharmonic pairs (C#/Db) remain separate entries.

use indexmap::IndexMap;

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::error::ExtractError;
use crate::features::round_to;
use crate::view::ScoreView;

/// Chromaticism feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChromaticFeatures {
    /// Pitches outside the key's diatonic pitch-class set.
    pub chromatic_note_count: Option<usize>,
    /// Chromatic share of all pitches, 3 decimals.
    pub chromatic_ratio: Option<f64>,
    /// Spelled pitch-class histogram, most common first.
    pub pitch_class_distribution: Option<IndexMap<String, usize>>,
}

impl FeatureGroup for ChromaticFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.chromatic_note_count = self.chromatic_note_count;
        record.chromatic_ratio = self.chromatic_ratio;
        record.pitch_class_distribution = self.pitch_class_distribution;
    }
}

/// Extract chromaticism features.
///
/// The chromatic count and ratio require a key estimate; the pitch-class
/// histogram is reported whenever any pitch exists.
pub fn analyze(view: &ScoreView<'_>) -> Result<ChromaticFeatures, ExtractError> {
    let mut features = ChromaticFeatures::default();

    let mut histogram: IndexMap<String, usize> = IndexMap::new();
    let mut pitch_count = 0usize;
    for note in view.notes() {
        for pitch in note.pitches() {
            *histogram.entry(pitch.name()).or_insert(0) += 1;
            pitch_count += 1;
        }
    }
    if !histogram.is_empty() {
        histogram.sort_by(|_, a, _, b| b.cmp(a));
        features.pitch_class_distribution = Some(histogram);
    }

    if let Some(key) = view.analyzed_key() {
        let diatonic = key.diatonic_pitch_classes();
        let mut chromatic = 0usize;
        for note in view.notes() {
            for pitch in note.pitches() {
                if !diatonic[pitch.pitch_class() as usize] {
                    chromatic += 1;
                }
            }
        }
        features.chromatic_note_count = Some(chromatic);
        if pitch_count > 0 {
            features.chromatic_ratio = Some(round_to(chromatic as f64 / pitch_count as f64, 3));
        }
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Measure, Note, Part, Score};

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
    fn test_diatonic_melody_has_no_chromaticism() {
        let score = melody(&["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"]);
        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();
        assert_eq!(f.chromatic_note_count, Some(0));
        assert_eq!(f.chromatic_ratio, Some(0.0));
    }

    #[test]
    fn test_chromatic_notes_counted() {
        // A full C major scale plus two chromatic C#s.
        let score = melody(&[
            "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "C#4", "C#4", "C4", "E4",
        ]);
        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();
        assert_eq!(f.chromatic_note_count, Some(2));
        assert_eq!(f.chromatic_ratio, Some(0.167));
    }

    #[test]
    fn test_spelled_distribution_keeps_enharmonics_apart() {
        let score = melody(&["C#4", "Db4", "C#4"]);
        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();
        let dist = f.pitch_class_distribution.unwrap();
        assert_eq!(dist["C#"], 2);
        assert_eq!(dist["Db"], 1);
        assert_eq!(dist.keys().next().unwrap(), "C#");
    }

    #[test]
    fn test_empty_score() {
        let score = Score::new();
        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();
        assert!(f.chromatic_note_count.is_none());
        assert!(f.pitch_class_distribution.is_none());
    }
}
