//! Heuristic difficulty scoring
//!
//! Aggregates already-extracted features into a coarse performance
//! difficulty estimate: nine independent buckets each contribute 0-2
//! points, and the 0-18 total maps onto five ordinal levels. A missing
//! feature contributes nothing, so sparse scores are never penalized for
//! what could not be measured.

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::error::ExtractError;

/// Difficulty feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DifficultyFeatures {
    /// Point total over the nine buckets (0-18).
    pub difficulty_points: Option<u32>,
    /// Ordinal level derived from the points.
    pub difficulty_level: Option<String>,
}

impl FeatureGroup for DifficultyFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.difficulty_points = self.difficulty_points;
        record.difficulty_level = self.difficulty_level;
    }
}

/// Score difficulty from previously extracted features.
///
/// Runs last in the pipeline since it reads the merged record.
pub fn analyze(record: &FeatureRecord) -> Result<DifficultyFeatures, ExtractError> {
    let mut points = 0u32;

    if let Some(density) = record.simultaneous_note_avg {
        points += if density < 2.0 {
            0
        } else if density < 3.0 {
            1
        } else {
            2
        };
    }

    if let Some(ratio) = record.chromatic_ratio {
        points += if ratio < 0.05 {
            0
        } else if ratio < 0.15 {
            1
        } else {
            2
        };
    }

    if let (Some(off_beat), Some(events)) = (record.off_beat_count, record.event_count) {
        if events > 0 {
            let syncopation = off_beat as f64 / events as f64;
            points += if syncopation < 0.1 {
                0
            } else if syncopation < 0.3 {
                1
            } else {
                2
            };
        }
    }

    if let Some(interval) = record.largest_interval {
        points += if interval <= 7 {
            0
        } else if interval <= 12 {
            1
        } else {
            2
        };
    }

    if let Some(bpm) = record.tempo_bpm {
        points += if bpm >= 144 {
            2
        } else if bpm >= 108 {
            1
        } else {
            0
        };
    }

    if let Some(modulations) = record.modulation_count {
        points += modulations.min(2) as u32;
    }

    if let Some(contrary) = record.contrary_motion_ratio {
        points += if contrary >= 0.4 {
            2
        } else if contrary >= 0.2 {
            1
        } else {
            0
        };
    }

    if let Some(span) = record.max_chord_span {
        points += if span > 12 {
            2
        } else if span > 9 {
            1
        } else {
            0
        };
    }

    if let (Some(leaps), Some(events)) = (record.leap_count, record.event_count) {
        if events > 0 {
            let rate = leaps as f64 / events as f64;
            points += if rate >= 0.2 {
                2
            } else if rate >= 0.1 {
                1
            } else {
                0
            };
        }
    }

    let level = match points {
        0..=3 => "beginner",
        4..=7 => "easy",
        8..=11 => "intermediate",
        12..=14 => "advanced",
        _ => "expert",
    };

    Ok(DifficultyFeatures {
        difficulty_points: Some(points),
        difficulty_level: Some(level.to_string()),
    })
}
