//! Pitch-range features
//!
//! Overall and per-part extremes over every sounding pitch (chords
//! contribute all of their pitches, grace notes included since they still
//! have to be played).

use indexmap::IndexMap;

use crate::analysis::record::{FeatureGroup, FeatureRecord, PitchSpan};
use crate::error::ExtractError;
use crate::score::{Pitch, Score};

/// Pitch-range feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeFeatures {
    /// Lowest sounding pitch of the score.
    pub lowest_pitch: Option<String>,
    /// Highest sounding pitch of the score.
    pub highest_pitch: Option<String>,
    /// Range between the extremes in semitones.
    pub ambitus_semitones: Option<i64>,
    /// Distinct spelled pitches (with octave).
    pub unique_pitches: Option<usize>,
    /// Per-part low/high pitches, keyed by display name.
    pub pitch_range_per_part: Option<IndexMap<String, PitchSpan>>,
    /// Per-part range in semitones, keyed by display name.
    pub voice_ranges: Option<IndexMap<String, i64>>,
}

impl FeatureGroup for RangeFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.lowest_pitch = self.lowest_pitch;
        record.highest_pitch = self.highest_pitch;
        record.ambitus_semitones = self.ambitus_semitones;
        record.unique_pitches = self.unique_pitches;
        record.pitch_range_per_part = self.pitch_range_per_part;
        record.voice_ranges = self.voice_ranges;
    }
}

/// Lowest and highest pitch of a slice, by pitch space.
fn extremes(pitches: &[Pitch]) -> Option<(Pitch, Pitch)> {
    let mut iter = pitches.iter();
    let first = *iter.next()?;
    let mut low = first;
    let mut high = first;
    for &p in iter {
        if p.ps() < low.ps() {
            low = p;
        }
        if p.ps() > high.ps() {
            high = p;
        }
    }
    Some((low, high))
}

/// Extract pitch-range features.
pub fn analyze(score: &Score) -> Result<RangeFeatures, ExtractError> {
    let mut features = RangeFeatures::default();

    let mut all_pitches: Vec<Pitch> = Vec::new();
    let mut per_part: IndexMap<String, PitchSpan> = IndexMap::new();
    let mut voice_ranges: IndexMap<String, i64> = IndexMap::new();

    for part in &score.parts {
        let pitches = part.pitches();
        if let Some((low, high)) = extremes(&pitches) {
            let name = part.display_name();
            let span = (high.ps() - low.ps()) as i64;
            per_part.insert(
                name.clone(),
                PitchSpan {
                    low: low.name_with_octave(),
                    high: high.name_with_octave(),
                },
            );
            voice_ranges.insert(name, span);
        }
        all_pitches.extend(pitches);
    }

    if let Some((low, high)) = extremes(&all_pitches) {
        features.lowest_pitch = Some(low.name_with_octave());
        features.highest_pitch = Some(high.name_with_octave());
        features.ambitus_semitones = Some((high.ps() - low.ps()) as i64);

        let mut names: Vec<String> = all_pitches.iter().map(Pitch::name_with_octave).collect();
        names.sort();
        names.dedup();
        features.unique_pitches = Some(names.len());
    }

    if !per_part.is_empty() {
        features.pitch_range_per_part = Some(per_part);
        features.voice_ranges = Some(voice_ranges);
    }

    Ok(features)
}
