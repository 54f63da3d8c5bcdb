//! Configuration parameters for feature extraction

/// Extraction configuration parameters
///
/// Defaults match the reference behavior of the extraction pipeline; they
/// exist as knobs so callers can tighten or relax individual heuristics
/// without forking the algorithms.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    // Movement segmentation
    /// Minimum number of distinct movement-name dictionary hits required to
    /// call a score multi-movement (default: 2). A single movement title is
    /// not sufficient: many single-movement pieces carry one descriptive
    /// name.
    pub movement_name_min_matches: usize,

    // Harmony
    /// Window size in measures for modulation detection (default: 8)
    pub modulation_window_measures: usize,

    /// Number of alternate key solutions reported alongside the best key
    /// (default: 5)
    pub max_key_alternates: usize,

    /// Number of final chordified slices inspected for cadence
    /// classification (default: 4)
    pub cadence_window_chords: usize,

    // Rhythm
    /// A note whose beat position has a fractional part above this
    /// tolerance counts as off-beat (default: 0.1)
    pub off_beat_tolerance: f64,

    // Texture
    /// Melodic jumps strictly larger than this many semitones count as
    /// leaps, i.e. larger than a perfect fourth (default: 5.0)
    pub leap_threshold_semitones: f64,

    /// Hand span is only reported for scores with at most this many parts,
    /// where a single performer plausibly spans all chords (default: 2)
    pub hand_span_max_parts: usize,

    // Error reporting
    /// Maximum length of a setup-fatal error message stored on a record
    /// (default: 1000)
    pub max_error_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            movement_name_min_matches: 2,
            modulation_window_measures: 8,
            max_key_alternates: 5,
            cadence_window_chords: 4,
            off_beat_tolerance: 0.1,
            leap_threshold_semitones: 5.0,
            hand_span_max_parts: 2,
            max_error_chars: 1000,
        }
    }
}
