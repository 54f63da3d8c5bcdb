//! Extraction result record
//!
//! One flat, JSON-serializable record per score. Every feature field is
//! optional and skipped when absent, so "not applicable" never serializes
//! as zero or null. Analyzers append whole feature groups; existing fields
//! are never overwritten with conflicting values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Terminal status of one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Record is still being assembled (never serialized by the engine).
    Pending,
    /// All analyzers were attempted; warnings may be present.
    Extracted,
    /// Setup failed before any analyzer ran.
    Failed,
}

/// Lowest/highest spelled pitch of one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchSpan {
    /// Lowest pitch ("C3").
    pub low: String,
    /// Highest pitch ("G5").
    pub high: String,
}

/// Average pitch center of one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tessitura {
    /// Spelled pitch closest to the average ("A4").
    pub average_pitch: String,
    /// Raw fractional MIDI-valued mean, rounded to 1 decimal.
    pub average_midi: f64,
}

/// Complete feature record for one score.
///
/// Field names match the line-delimited JSON output contract; consumers
/// sort batch output by `file_path` when they need a stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeatureRecord {
    /// Input path, set by the batch and file entry points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Terminal extraction status.
    pub extraction_status: ExtractionStatus,

    /// Setup-fatal error message, only on failed records (length-bounded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,

    // Pitch range
    /// Lowest sounding pitch of the whole score ("C3").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_pitch: Option<String>,
    /// Highest sounding pitch of the whole score ("A5").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_pitch: Option<String>,
    /// Total pitch range in semitones (highest − lowest, non-negative).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambitus_semitones: Option<i64>,
    /// Number of distinct spelled pitches (with octave).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_pitches: Option<usize>,
    /// Per-part low/high spelled pitches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_range_per_part: Option<IndexMap<String, PitchSpan>>,
    /// Per-part range in semitones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_ranges: Option<IndexMap<String, i64>>,

    // Tempo / duration
    /// Number of measures of the first part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_count: Option<usize>,
    /// Score length in quarter-note units, rounded to 2 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_quarter_length: Option<f64>,
    /// True when the score looks like a multi-movement work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_multi_movement: Option<bool>,
    /// First metronome mark's BPM, integer-truncated. Absent for
    /// multi-movement works.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_bpm: Option<i64>,
    /// Tempo text ("Allegro"). Absent for multi-movement works.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_marking: Option<String>,
    /// Beat-unit length of the metronome mark in quarter notes. Absent for
    /// multi-movement works.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_referent: Option<f64>,
    /// Computed duration in seconds, rounded to 1 decimal. Absent for
    /// multi-movement works.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    // Complexity / rhythm
    /// Rhythmic events (note or chord onsets).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_count: Option<usize>,
    /// Individual pitched sounds (a 4-note chord counts 4).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_count: Option<usize>,
    /// Pitches carrying a non-natural accidental.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accidental_count: Option<usize>,
    /// Duration-name histogram, most common first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhythm_distribution: Option<IndexMap<String, usize>>,
    /// Most common duration name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predominant_rhythm: Option<String>,
    /// Number of distinct duration values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_duration_count: Option<usize>,
    /// Notes sounding off the beat (beat fraction above tolerance).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_beat_count: Option<usize>,
    /// Conducted beats per measure from the first time signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beat_count: Option<u32>,
    /// simple / compound / complex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_classification: Option<String>,

    // Harmony
    /// "{tonic} {mode}" of the estimated key ("C major").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_signature: Option<String>,
    /// Correlation confidence of the key estimate, in [0, 1], 3 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_confidence: Option<f64>,
    /// Top alternate key solutions (label → correlation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_correlations: Option<IndexMap<String, f64>>,
    /// Arrow-joined modulation trace starting from the whole-piece key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulations: Option<String>,
    /// Number of detected key transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulation_count: Option<usize>,
    /// Key labels entered by each transition, in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulation_targets: Option<Vec<String>>,
    /// Number of simultaneities in the chordified stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chord_count: Option<usize>,
    /// Final cadence class: "PAC", "plagal", "HC", "IAC", or a literal
    /// "{figure}-{figure}" fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_cadence: Option<String>,

    // Melody
    /// Interval-name histogram over the first part, most common first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_distribution: Option<IndexMap<String, usize>>,
    /// Number of measured melodic intervals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_count: Option<usize>,
    /// Largest absolute melodic interval in semitones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_interval: Option<i64>,
    /// Intervals of at most 2 semitones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stepwise_count: Option<usize>,

    // Structure
    /// First time signature as "4/4".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
    /// Number of repeat barlines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeats_count: Option<usize>,
    /// Double barlines + 1, when any double barline exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections_count: Option<usize>,

    // Notation
    /// Sorted, comma-joined clef signs ("f, g").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clefs_used: Option<String>,
    /// True when any dynamic marking is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_dynamics: Option<bool>,
    /// Softest–loudest named dynamics ("p-ff").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_range: Option<String>,
    /// True when any note carries an articulation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_articulations: Option<bool>,
    /// True when any trill, mordent, or turn is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_ornaments: Option<bool>,
    /// True when any fermata is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_fermatas: Option<bool>,
    /// True when more than one tempo indication is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_tempo_changes: Option<bool>,
    /// First 10 text expressions, comma-joined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_markings: Option<String>,
    /// Number of slur spanners.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slur_count: Option<usize>,
    /// True when any ottava line is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_ottava: Option<bool>,
    /// Trill count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trill_count: Option<usize>,
    /// Mordent count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mordent_count: Option<usize>,
    /// Turn count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<usize>,
    /// Tremolo count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tremolo_count: Option<usize>,
    /// Arpeggio-mark count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arpeggio_mark_count: Option<usize>,
    /// Grace-note count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_note_count: Option<usize>,
    /// True when any pedal marking is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_pedal_marks: Option<bool>,

    // Lyrics
    /// True when any note carries lyrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_extracted_lyrics: Option<bool>,
    /// All syllables joined with spaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_lyrics: Option<String>,
    /// Number of lyric syllables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syllable_count: Option<usize>,
    /// Guessed lyric language code ("la", "en", "de").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics_language: Option<String>,

    // Instrumentation
    /// Number of parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_parts: Option<usize>,
    /// Comma-joined part display names, in score order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_names: Option<String>,
    /// Sorted distinct instrument names, comma-joined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_instruments: Option<String>,
    /// Sorted distinct instrument families, comma-joined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_families: Option<String>,

    // Texture
    /// Mean simultaneous note count (texture density).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simultaneous_note_avg: Option<f64>,
    /// Population standard deviation of simultaneous note counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_variation: Option<f64>,
    /// Mean outer-voice span in semitones over multi-note slices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_chord_span: Option<f64>,
    /// Outer voices moving in opposite directions ÷ qualifying transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrary_motion_ratio: Option<f64>,
    /// Outer voices moving in the same direction ÷ qualifying transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_motion_ratio: Option<f64>,
    /// Exactly one outer voice moving ÷ qualifying transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oblique_motion_ratio: Option<f64>,
    /// Distinct pitch-class sets of size 3–4 (inversions collapse).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_chord_count: Option<usize>,
    /// Largest simultaneous chord span in semitones (≤2-part scores only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chord_span: Option<i64>,
    /// Per-part average pitch center.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tessitura: Option<IndexMap<String, Tessitura>>,
    /// Consecutive-note jumps larger than a perfect fourth, all parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leap_count: Option<usize>,

    // Chromaticism
    /// Notes outside the estimated key's diatonic pitch-class set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chromatic_note_count: Option<usize>,
    /// chromatic_note_count ÷ pitch_count, in [0, 1], 3 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chromatic_ratio: Option<f64>,
    /// Spelled pitch-class histogram ("C#" and "Db" stay distinct).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_class_distribution: Option<IndexMap<String, usize>>,

    // Difficulty (heuristic aggregate, not a measured quantity)
    /// Heuristic difficulty point total over fixed buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_points: Option<u32>,
    /// Five-level ordinal difficulty derived from the point total
    /// (beginner / easy / intermediate / advanced / expert).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,

    /// Per-analyzer diagnostic strings ("{analyzer}: {message}").
    #[serde(
        rename = "_extraction_warnings",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub warnings: Vec<String>,
}

impl Default for ExtractionStatus {
    fn default() -> Self {
        ExtractionStatus::Pending
    }
}

impl FeatureRecord {
    /// Fresh pending record.
    pub fn new() -> Self {
        FeatureRecord::default()
    }

    /// Failed record carrying only an error message.
    pub fn failed(message: String) -> Self {
        FeatureRecord {
            extraction_status: ExtractionStatus::Failed,
            extraction_error: Some(message),
            ..Default::default()
        }
    }

    /// Record a feature-local failure as a warning.
    pub fn warn(&mut self, analyzer: &str, error: &ExtractError) {
        log::warn!("analyzer {} failed: {}", analyzer, error);
        self.warnings.push(format!("{}: {}", analyzer, error));
    }
}

/// A feature group produced by one analyzer, merged into the record as a
/// whole so a failed analyzer leaves no partial fields behind.
pub trait FeatureGroup {
    /// Write every field of the group into the record.
    fn write_into(self, record: &mut FeatureRecord);
}
