//! Texture and voice-leading features
//!
//! Density statistics over the chordified stream, outer-voice motion
//! classification, hand-span estimation for keyboard-like scores, per-part
//! tessitura, and leap counting across all parts.

use indexmap::IndexMap;

use crate::analysis::record::{FeatureGroup, FeatureRecord, Tessitura};
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::features::round_to;
use crate::score::{Element, Pitch};
use crate::view::ScoreView;

/// Texture feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureFeatures {
    /// Mean simultaneous note count.
    pub simultaneous_note_avg: Option<f64>,
    /// Population standard deviation of simultaneous note counts.
    pub texture_variation: Option<f64>,
    /// Mean outer-voice span over multi-note slices.
    pub avg_chord_span: Option<f64>,
    /// Contrary-motion share of qualifying transitions.
    pub contrary_motion_ratio: Option<f64>,
    /// Parallel-motion share.
    pub parallel_motion_ratio: Option<f64>,
    /// Oblique-motion share.
    pub oblique_motion_ratio: Option<f64>,
    /// Distinct pitch-class sets of size 3-4.
    pub unique_chord_count: Option<usize>,
    /// Largest single-part chord span in semitones (keyboard-like scores).
    pub max_chord_span: Option<i64>,
    /// Per-part pitch centers.
    pub tessitura: Option<IndexMap<String, Tessitura>>,
    /// Jumps larger than the leap threshold, all parts.
    pub leap_count: Option<usize>,
}

impl FeatureGroup for TextureFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.simultaneous_note_avg = self.simultaneous_note_avg;
        record.texture_variation = self.texture_variation;
        record.avg_chord_span = self.avg_chord_span;
        record.contrary_motion_ratio = self.contrary_motion_ratio;
        record.parallel_motion_ratio = self.parallel_motion_ratio;
        record.oblique_motion_ratio = self.oblique_motion_ratio;
        record.unique_chord_count = self.unique_chord_count;
        record.max_chord_span = self.max_chord_span;
        record.tessitura = self.tessitura;
        record.leap_count = self.leap_count;
    }
}

/// Extract texture features.
pub fn analyze(
    view: &ScoreView<'_>,
    config: &ExtractConfig,
) -> Result<TextureFeatures, ExtractError> {
    let mut features = TextureFeatures::default();
    let slices = view.chordified();

    if !slices.is_empty() {
        let counts: Vec<f64> = slices.iter().map(|s| s.pitches.len() as f64).collect();
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        features.simultaneous_note_avg = Some(round_to(mean, 2));

        if counts.len() > 1 {
            let variance =
                counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
            features.texture_variation = Some(round_to(variance.sqrt(), 2));
        }

        let spans: Vec<f64> = slices.iter().filter_map(|s| s.span()).collect();
        if !spans.is_empty() {
            let avg = spans.iter().sum::<f64>() / spans.len() as f64;
            features.avg_chord_span = Some(round_to(avg, 2));
        }

        features.unique_chord_count = Some(unique_chord_count(slices));
        motion_ratios(slices, &mut features);
    }

    let score = view.score();

    if score.parts.len() <= config.hand_span_max_parts {
        let mut max_span: i64 = 0;
        for part in &score.parts {
            for measure in &part.measures {
                for positioned in &measure.elements {
                    if let Element::Chord(chord) = &positioned.element {
                        if let Some((low, high)) = span_of(&chord.pitches) {
                            max_span = max_span.max((high - low) as i64);
                        }
                    }
                }
            }
        }
        if max_span > 0 {
            features.max_chord_span = Some(max_span);
        }
    }

    let mut tessitura: IndexMap<String, Tessitura> = IndexMap::new();
    let mut leap_count = 0usize;
    for part in &score.parts {
        let notes = part.plain_notes();
        if !notes.is_empty() {
            let mean = notes.iter().map(|n| n.pitch.ps()).sum::<f64>() / notes.len() as f64;
            tessitura.insert(
                part.display_name(),
                Tessitura {
                    average_pitch: Pitch::from_ps(mean).name_with_octave(),
                    average_midi: round_to(mean, 1),
                },
            );
        }
        for pair in notes.windows(2) {
            let jump = (pair[1].pitch.ps() - pair[0].pitch.ps()).abs();
            if jump > config.leap_threshold_semitones {
                leap_count += 1;
            }
        }
    }
    if !tessitura.is_empty() {
        features.tessitura = Some(tessitura);
    }
    features.leap_count = Some(leap_count);

    Ok(features)
}

/// Min/max pitch space of a pitch list with at least two entries.
fn span_of(pitches: &[Pitch]) -> Option<(f64, f64)> {
    if pitches.len() < 2 {
        return None;
    }
    let mut low = f64::MAX;
    let mut high = f64::MIN;
    for p in pitches {
        low = low.min(p.ps());
        high = high.max(p.ps());
    }
    Some((low, high))
}

/// Distinct pitch-class sets of size three or four. Inversions and octave
/// doublings collapse to the same set.
fn unique_chord_count(slices: &[crate::view::ChordSlice]) -> usize {
    let mut sets: Vec<u16> = Vec::new();
    for slice in slices {
        let mut mask: u16 = 0;
        for pitch in &slice.pitches {
            mask |= 1 << pitch.pitch_class();
        }
        let size = mask.count_ones();
        if (3..=4).contains(&size) {
            sets.push(mask);
        }
    }
    sets.sort_unstable();
    sets.dedup();
    sets.len()
}

/// Classify outer-voice motion between consecutive multi-note slices.
///
/// A single-note slice breaks the outer-voice pairing rather than
/// supplying a degenerate bass==soprano transition. Static pairs (neither
/// voice moves) do not count as transitions, so the three ratios sum to
/// one whenever any transition exists.
fn motion_ratios(slices: &[crate::view::ChordSlice], features: &mut TextureFeatures) {
    let mut prev: Option<(f64, f64)> = None;
    let mut parallel = 0usize;
    let mut contrary = 0usize;
    let mut oblique = 0usize;

    for slice in slices {
        if slice.pitches.len() < 2 {
            prev = None;
            continue;
        }
        let bass = slice.pitches.first().map(|p| p.ps()).unwrap_or(0.0);
        let soprano = slice.pitches.last().map(|p| p.ps()).unwrap_or(0.0);
        if let Some((prev_bass, prev_soprano)) = prev {
            let bass_motion = bass - prev_bass;
            let soprano_motion = soprano - prev_soprano;
            if bass_motion != 0.0 && soprano_motion != 0.0 {
                if (bass_motion > 0.0) == (soprano_motion > 0.0) {
                    parallel += 1;
                } else {
                    contrary += 1;
                }
            } else if bass_motion != 0.0 || soprano_motion != 0.0 {
                oblique += 1;
            }
        }
        prev = Some((bass, soprano));
    }

    let total = parallel + contrary + oblique;
    if total > 0 {
        features.parallel_motion_ratio = Some(round_to(parallel as f64 / total as f64, 3));
        features.contrary_motion_ratio = Some(round_to(contrary as f64 / total as f64, 3));
        features.oblique_motion_ratio = Some(round_to(oblique as f64 / total as f64, 3));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Chord, Measure, Note, Part, Score};

    fn chord_score(chords: &[&[&str]]) -> Score {
        let mut part = Part::new();
        let mut m = Measure::new(1);
        for names in chords {
            m.push(Chord::parse(names, 1.0).unwrap());
        }
        part.push_measure(m);
        let mut score = Score::new();
        score.push_part(part);
        score
    }

    #[test]
    fn test_density_statistics() {
        let score = chord_score(&[&["C4", "E4", "G4"], &["D4", "F4", "A4", "D5"]]);
        let view = ScoreView::new(&score);
        let f = analyze(&view, &ExtractConfig::default()).unwrap();
        assert_eq!(f.simultaneous_note_avg, Some(3.5));
        assert_eq!(f.texture_variation, Some(0.5));
        // Slice spans 7 and 12 semitones.
        assert_eq!(f.avg_chord_span, Some(9.5));
    }

    #[test]
    fn test_motion_classification() {
        // Parallel (both up), contrary (bass up, soprano down), oblique
        // (bass holds, soprano up).
        let score = chord_score(&[
            &["C3", "C5"],
            &["D3", "D5"],
            &["E3", "C5"],
            &["E3", "E5"],
        ]);
        let view = ScoreView::new(&score);
        let f = analyze(&view, &ExtractConfig::default()).unwrap();
        assert_eq!(f.parallel_motion_ratio, Some(0.333));
        assert_eq!(f.contrary_motion_ratio, Some(0.333));
        assert_eq!(f.oblique_motion_ratio, Some(0.333));
    }

    #[test]
    fn test_unique_chords_collapse_inversions() {
        let score = chord_score(&[
            &["C4", "E4", "G4"],
            &["E3", "G3", "C4"], // same set, inverted
            &["G3", "B3", "D4"],
            &["C4", "G4"], // dyad, not counted
        ]);
        let view = ScoreView::new(&score);
        let f = analyze(&view, &ExtractConfig::default()).unwrap();
        assert_eq!(f.unique_chord_count, Some(2));
    }

    #[test]
    fn test_hand_span_for_keyboard_scores() {
        let score = chord_score(&[&["C4", "E4", "C5"], &["D4", "F4"]]);
        let view = ScoreView::new(&score);
        let f = analyze(&view, &ExtractConfig::default()).unwrap();
        assert_eq!(f.max_chord_span, Some(12));
    }

    #[test]
    fn test_hand_span_suppressed_for_large_ensembles() {
        let mut score = Score::new();
        for i in 0..3 {
            let mut part = Part::named(&format!("Voice {}", i + 1));
            let mut m = Measure::new(1);
            m.push(Chord::parse(&["C4", "E4", "G5"], 1.0).unwrap());
            part.push_measure(m);
            score.push_part(part);
        }
        let view = ScoreView::new(&score);
        let f = analyze(&view, &ExtractConfig::default()).unwrap();
        assert!(f.max_chord_span.is_none());
    }

    #[test]
    fn test_tessitura_and_leaps() {
        let mut part = Part::named("Flute");
        let mut m = Measure::new(1);
        m.push(Note::parse("C4", 1.0).unwrap());
        m.push(Note::parse("C5", 1.0).unwrap()); // octave leap
        m.push(Note::parse("D5", 1.0).unwrap()); // step
        part.push_measure(m);
        let mut score = Score::new();
        score.push_part(part);

        let view = ScoreView::new(&score);
        let f = analyze(&view, &ExtractConfig::default()).unwrap();
        assert_eq!(f.leap_count, Some(1));
        let tess = f.tessitura.unwrap();
        // Mean of 60, 72, 74 = 68.67 -> A4 region.
        assert_eq!(tess["Flute"].average_midi, 68.7);
        assert_eq!(tess["Flute"].average_pitch, "A4");
    }

    #[test]
    fn test_empty_score() {
        let score = Score::new();
        let view = ScoreView::new(&score);
        let f = analyze(&view, &ExtractConfig::default()).unwrap();
        assert!(f.simultaneous_note_avg.is_none());
        assert_eq!(f.leap_count, Some(0));
    }
}
