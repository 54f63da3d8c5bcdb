//! Harmonic features
//!
//! Whole-piece key estimation (with ranked alternates), windowed
//! modulation detection, chord counting over the chordified stream, and
//! final-cadence classification via roman-numeral analysis of the closing
//! simultaneities.

use indexmap::IndexMap;

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::features::key::{estimate_key_from_histogram, KeyEstimate};
use crate::features::round_to;
use crate::score::{Element, Score};
use crate::view::{ChordSlice, ScoreView};

/// Harmonic feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarmonyFeatures {
    /// "{tonic} {mode}" of the estimated key.
    pub key_signature: Option<String>,
    /// Correlation confidence of the key estimate, 3 decimals.
    pub key_confidence: Option<f64>,
    /// Alternate key labels with their correlations.
    pub key_correlations: Option<IndexMap<String, f64>>,
    /// Arrow-joined modulation trace.
    pub modulations: Option<String>,
    /// Number of detected key transitions.
    pub modulation_count: Option<usize>,
    /// Key labels entered by each transition.
    pub modulation_targets: Option<Vec<String>>,
    /// Simultaneities in the chordified stream.
    pub chord_count: Option<usize>,
    /// Final cadence class.
    pub final_cadence: Option<String>,
}

impl FeatureGroup for HarmonyFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.key_signature = self.key_signature;
        record.key_confidence = self.key_confidence;
        record.key_correlations = self.key_correlations;
        record.modulations = self.modulations;
        record.modulation_count = self.modulation_count;
        record.modulation_targets = self.modulation_targets;
        record.chord_count = self.chord_count;
        record.final_cadence = self.final_cadence;
    }
}

/// Extract harmonic features.
pub fn analyze(
    view: &ScoreView<'_>,
    config: &ExtractConfig,
) -> Result<HarmonyFeatures, ExtractError> {
    let mut features = HarmonyFeatures::default();

    // Chord counting needs no key and is reported even for scores where
    // key analysis finds nothing.
    let slices = view.chordified();
    features.chord_count = Some(slices.len());

    let key = match view.analyzed_key() {
        Some(key) => key,
        None => return Ok(features),
    };

    features.key_signature = Some(key.label());
    features.key_confidence = Some(round_to(key.confidence(), 3));

    let mut alternates = IndexMap::new();
    for solution in key.alternates(config.max_key_alternates) {
        alternates.insert(solution.label(), round_to(solution.correlation, 3));
    }
    if !alternates.is_empty() {
        features.key_correlations = Some(alternates);
    }

    let (trace, targets) = modulation_trace(view.score(), key, config.modulation_window_measures);
    features.modulation_count = Some(targets.len());
    if !targets.is_empty() {
        features.modulations = Some(trace);
        features.modulation_targets = Some(targets);
    }

    features.final_cadence = final_cadence(slices, key, config.cadence_window_chords);

    Ok(features)
}

/// Track local keys over fixed-size measure windows and record every label
/// change relative to the previous non-empty window's key. The first
/// window only seeds the comparison, so it can never count as a
/// modulation even when its local key differs from the whole-piece key.
///
/// Windows follow the first part's measure count; the histogram of a
/// window covers those measure indices across all parts. Windows with no
/// pitched material are skipped rather than breaking the trace. The
/// arrow-joined trace starts from the whole-piece key label.
fn modulation_trace(
    score: &Score,
    overall: &KeyEstimate,
    window_measures: usize,
) -> (String, Vec<String>) {
    let mut trace = vec![overall.label()];
    let mut targets = Vec::new();

    let measure_count = score.parts.first().map(|p| p.measures.len()).unwrap_or(0);
    if window_measures == 0 || measure_count == 0 {
        return (trace.join(" -> "), targets);
    }

    let mut current: Option<String> = None;
    let mut start = 0;
    while start < measure_count {
        let end = (start + window_measures).min(measure_count);
        let histogram = window_histogram(score, start, end);
        if let Some(local) = estimate_key_from_histogram(&histogram) {
            let label = local.label();
            match &current {
                Some(previous) if *previous != label => {
                    log::debug!(
                        "modulation at measure {}: {} -> {}",
                        start + 1,
                        previous,
                        label
                    );
                    trace.push(label.clone());
                    targets.push(label.clone());
                    current = Some(label);
                }
                Some(_) => {}
                None => current = Some(label),
            }
        }
        start = end;
    }

    (trace.join(" -> "), targets)
}

/// Duration-weighted pitch-class histogram over a measure-index range,
/// across all parts.
fn window_histogram(score: &Score, start: usize, end: usize) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for part in &score.parts {
        for measure in part.measures.iter().take(end).skip(start) {
            for positioned in &measure.elements {
                let (pitches, ql, grace): (Vec<_>, f64, bool) = match &positioned.element {
                    Element::Note(n) => (vec![n.pitch], n.quarter_length, n.is_grace),
                    Element::Chord(c) => (c.pitches.clone(), c.quarter_length, c.is_grace),
                    _ => continue,
                };
                let weight = if grace || ql <= 0.0 { 0.0625 } else { ql };
                for pitch in pitches {
                    histogram[pitch.pitch_class() as usize] += weight;
                }
            }
        }
    }
    histogram
}

/// Classify the final cadence from the last chordified slices.
///
/// Needs at least two slices inside the cadence window. Classification
/// compares the roman figures of the last two simultaneities; anything
/// outside the four textbook patterns reports the literal progression.
fn final_cadence(slices: &[ChordSlice], key: &KeyEstimate, window: usize) -> Option<String> {
    if slices.len() < 2 || window < 2 {
        return None;
    }
    let tail = &slices[slices.len().saturating_sub(window)..];
    if tail.len() < 2 {
        return None;
    }

    let tonic_pc = key.best.tonic_pc;
    let last = roman_figure(&tail[tail.len() - 1], tonic_pc)?;
    let second = roman_figure(&tail[tail.len() - 2], tonic_pc)?;

    let cadence = if last == "I" && (second == "V" || second == "V7") {
        "PAC".to_string()
    } else if last == "I" && second == "IV" {
        "plagal".to_string()
    } else if last == "V" {
        "HC".to_string()
    } else if last == "I" {
        "IAC".to_string()
    } else {
        format!("{}-{}", second, last)
    };
    Some(cadence)
}

/// Chord quality inferred from the third above the detected root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quality {
    Major,
    Minor,
    Diminished,
}

/// Roman figure of a simultaneity relative to a tonic ("V7", "ii", "bVII").
///
/// The root is the pitch class best supported by a third, fifth, and
/// seventh above it (bass-upward order breaks ties, favoring root
/// position). Four distinct pitch classes make a seventh chord.
fn roman_figure(slice: &ChordSlice, tonic_pc: u8) -> Option<String> {
    // Distinct pitch classes in bass-upward order of first appearance.
    let mut pcs: Vec<u8> = Vec::new();
    for pitch in &slice.pitches {
        let pc = pitch.pitch_class();
        if !pcs.contains(&pc) {
            pcs.push(pc);
        }
    }
    if pcs.is_empty() {
        return None;
    }

    let has = |pc: u8| pcs.contains(&(pc % 12));

    let mut root = pcs[0];
    let mut best_score = f64::MIN;
    for &candidate in &pcs {
        let mut score = 0.0;
        if has(candidate + 3) || has(candidate + 4) {
            score += 2.0;
        }
        if has(candidate + 7) {
            score += 1.0;
        }
        if has(candidate + 10) || has(candidate + 11) {
            score += 0.5;
        }
        if score > best_score {
            best_score = score;
            root = candidate;
        }
    }

    let quality = if has(root + 4) {
        Quality::Major
    } else if has(root + 3) {
        if has(root + 6) && !has(root + 7) {
            Quality::Diminished
        } else {
            Quality::Minor
        }
    } else {
        // Bare fifths and open intervals read as major.
        Quality::Major
    };

    const DEGREES: [&str; 12] = [
        "I", "bII", "II", "bIII", "III", "IV", "#IV", "V", "bVI", "VI", "bVII", "VII",
    ];
    let degree = ((root as i32 - tonic_pc as i32).rem_euclid(12)) as usize;
    let mut figure = match quality {
        Quality::Major => DEGREES[degree].to_string(),
        Quality::Minor | Quality::Diminished => DEGREES[degree].to_lowercase(),
    };
    if pcs.len() >= 4 {
        figure.push('7');
    }
    Some(figure)
}
