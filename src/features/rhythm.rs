//! Rhythm, meter, and surface-complexity features
//!
//! Event/pitch/accidental tallies, the duration-name histogram, off-beat
//! counting against the active time signature, and the meter
//! classification of the first time signature.

use indexmap::IndexMap;

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::score::{Element, TimeSignature};
use crate::view::ScoreView;

/// Rhythm and complexity feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RhythmFeatures {
    /// Note/chord onset count.
    pub event_count: Option<usize>,
    /// Individual pitched sounds.
    pub pitch_count: Option<usize>,
    /// Pitches carrying an accidental.
    pub accidental_count: Option<usize>,
    /// Duration-name histogram, most common first.
    pub rhythm_distribution: Option<IndexMap<String, usize>>,
    /// Most common duration name.
    pub predominant_rhythm: Option<String>,
    /// Distinct duration values.
    pub unique_duration_count: Option<usize>,
    /// Notes sounding off the beat.
    pub off_beat_count: Option<usize>,
    /// Conducted beats per measure of the first time signature.
    pub beat_count: Option<u32>,
    /// Meter classification of the first time signature.
    pub meter_classification: Option<String>,
}

impl FeatureGroup for RhythmFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.event_count = self.event_count;
        record.pitch_count = self.pitch_count;
        record.accidental_count = self.accidental_count;
        record.rhythm_distribution = self.rhythm_distribution;
        record.predominant_rhythm = self.predominant_rhythm;
        record.unique_duration_count = self.unique_duration_count;
        record.off_beat_count = self.off_beat_count;
        record.beat_count = self.beat_count;
        record.meter_classification = self.meter_classification;
    }
}

/// Human-readable duration name for a quarter-note length.
fn duration_name(quarter_length: f64) -> String {
    const NAMED: [(f64, &str); 8] = [
        (0.25, "sixteenth"),
        (0.5, "eighth"),
        (0.75, "dotted_eighth"),
        (1.0, "quarter"),
        (1.5, "dotted_quarter"),
        (2.0, "half"),
        (3.0, "dotted_half"),
        (4.0, "whole"),
    ];
    for (ql, name) in NAMED {
        if (quarter_length - ql).abs() < 1e-9 {
            return name.to_string();
        }
    }
    format!("other_{}", quarter_length)
}

/// Extract rhythm, meter, and complexity features.
pub fn analyze(view: &ScoreView<'_>, config: &ExtractConfig) -> Result<RhythmFeatures, ExtractError> {
    let mut features = RhythmFeatures::default();

    let notes = view.notes();
    features.event_count = Some(notes.len());

    let mut pitch_count = 0usize;
    let mut accidental_count = 0usize;
    for note in notes {
        for pitch in note.pitches() {
            pitch_count += 1;
            if pitch.has_accidental() {
                accidental_count += 1;
            }
        }
    }
    features.pitch_count = Some(pitch_count);
    features.accidental_count = Some(accidental_count);

    // Duration histogram over metered events only; a grace note has no
    // rhythmic value of its own.
    let mut histogram: IndexMap<String, usize> = IndexMap::new();
    let mut distinct_ticks: Vec<i64> = Vec::new();
    for note in notes {
        if note.is_grace() {
            continue;
        }
        let ql = note.quarter_length();
        *histogram.entry(duration_name(ql)).or_insert(0) += 1;
        distinct_ticks.push((ql * 480.0).round() as i64);
    }
    distinct_ticks.sort_unstable();
    distinct_ticks.dedup();

    if !histogram.is_empty() {
        // Most common first; stable sort keeps first-seen order on ties.
        histogram.sort_by(|_, a, _, b| b.cmp(a));
        features.predominant_rhythm = histogram.keys().next().cloned();
        features.rhythm_distribution = Some(histogram);
        features.unique_duration_count = Some(distinct_ticks.len());
    }

    features.off_beat_count = Some(off_beat_count(view, config.off_beat_tolerance));

    if let Some(ts) = first_time_signature(view) {
        features.beat_count = Some(ts.beat_count());
        features.meter_classification = Some(ts.classification().as_str().to_string());
    }

    Ok(features)
}

/// First time signature of the flattened stream.
pub(crate) fn first_time_signature(view: &ScoreView<'_>) -> Option<TimeSignature> {
    view.flattened().iter().find_map(|item| match item.element {
        Element::TimeSignature(ts) => Some(*ts),
        _ => None,
    })
}

/// Count notes whose beat position is off the grid of conducted beats.
///
/// Each part tracks its own active time signature; a part with no time
/// signature falls back to quarter-note beats.
fn off_beat_count(view: &ScoreView<'_>, tolerance: f64) -> usize {
    let score = view.score();
    let mut count = 0usize;
    for part in &score.parts {
        let mut beat_ql = 1.0;
        for measure in &part.measures {
            for positioned in &measure.elements {
                match &positioned.element {
                    Element::TimeSignature(ts) => beat_ql = ts.beat_quarter_length(),
                    Element::Note(n) if !n.is_grace => {
                        if is_off_beat(positioned.offset, beat_ql, tolerance) {
                            count += 1;
                        }
                    }
                    Element::Chord(c) if !c.is_grace => {
                        if is_off_beat(positioned.offset, beat_ql, tolerance) {
                            count += 1;
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    count
}

/// Beat positions are measure-relative, so only the in-measure offset
/// matters.
fn is_off_beat(offset: f64, beat_ql: f64, tolerance: f64) -> bool {
    if beat_ql <= 0.0 {
        return false;
    }
    let position = offset / beat_ql;
    let fraction = position - position.floor();
    fraction > tolerance
}
