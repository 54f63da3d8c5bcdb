//! Tempo and duration features
//!
//! Measure count and total length are always reported. Tempo fields and
//! the computed duration are gated on the score being a single movement:
//! one metronome mark cannot speak for a whole suite, and a duration
//! derived from it would be wrong for every movement but the first.

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::error::ExtractError;
use crate::features::round_to;
use crate::score::Element;
use crate::view::ScoreView;

/// Tempo and duration feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemporalFeatures {
    /// Measure count of the first part.
    pub measure_count: Option<usize>,
    /// Total score length in quarter notes, 2 decimals.
    pub total_quarter_length: Option<f64>,
    /// First metronome mark's BPM, integer-truncated.
    pub tempo_bpm: Option<i64>,
    /// Tempo text label.
    pub tempo_marking: Option<String>,
    /// Beat-unit referent of the metronome mark in quarter notes.
    pub tempo_referent: Option<f64>,
    /// Computed performance duration in seconds, 1 decimal.
    pub duration_seconds: Option<f64>,
}

impl FeatureGroup for TemporalFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.measure_count = self.measure_count;
        record.total_quarter_length = self.total_quarter_length;
        record.tempo_bpm = self.tempo_bpm;
        record.tempo_marking = self.tempo_marking;
        record.tempo_referent = self.tempo_referent;
        record.duration_seconds = self.duration_seconds;
    }
}

/// Extract tempo and duration features.
///
/// `multi_movement` suppresses the tempo-dependent fields; measure count
/// and total quarter length are reported regardless.
pub fn analyze(
    view: &ScoreView<'_>,
    multi_movement: bool,
) -> Result<TemporalFeatures, ExtractError> {
    let score = view.score();
    let mut features = TemporalFeatures::default();

    if let Some(first) = score.parts.first() {
        features.measure_count = Some(first.measures.len());
    }

    let total_ql = score.total_quarter_length();
    features.total_quarter_length = Some(round_to(total_ql, 2));

    if multi_movement {
        return Ok(features);
    }

    // First metronome mark wins. The first bare TempoText anywhere in the
    // stream supplies the label when no metronome mark carried one, so
    // the scan keeps going past the mark.
    let mut tempo_text_fallback: Option<&str> = None;
    let mut mark_seen = false;
    for item in view.flattened() {
        match item.element {
            Element::MetronomeMark(mark) if !mark_seen => {
                mark_seen = true;
                if let Some(bpm) = mark.bpm {
                    features.tempo_bpm = Some(bpm as i64);
                }
                if let Some(text) = &mark.text {
                    features.tempo_marking = Some(text.clone());
                }
                let referent = mark.referent_quarter_length.unwrap_or(1.0);
                features.tempo_referent = Some(round_to(referent, 3));
            }
            Element::TempoText(text) if tempo_text_fallback.is_none() => {
                tempo_text_fallback = Some(text.as_str());
            }
            _ => {}
        }
    }
    if features.tempo_marking.is_none() {
        features.tempo_marking = tempo_text_fallback.map(String::from);
    }

    if let (Some(bpm), Some(referent)) = (features.tempo_bpm, features.tempo_referent) {
        if bpm > 0 && total_ql > 0.0 {
            let seconds = total_ql / (bpm as f64 * referent) * 60.0;
            features.duration_seconds = Some(round_to(seconds, 1));
        }
    }

    Ok(features)
}
