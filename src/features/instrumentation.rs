//! Instrumentation and lyric features
//!
//! Part and instrument inventory, plus lyric extraction with a small
//! keyword heuristic for the language. Instrument and family sets are
//! sorted before joining so the same score always serializes the same
//! strings.

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::error::ExtractError;
use crate::score::Score;
use crate::view::ScoreView;

/// Instrumentation and lyric feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstrumentationFeatures {
    /// Number of parts.
    pub num_parts: Option<usize>,
    /// Comma-joined part display names in score order.
    pub part_names: Option<String>,
    /// Sorted distinct instrument names.
    pub detected_instruments: Option<String>,
    /// Sorted distinct instrument families.
    pub instrument_families: Option<String>,
    /// Any lyrics present.
    pub has_extracted_lyrics: Option<bool>,
    /// All syllables joined with spaces.
    pub extracted_lyrics: Option<String>,
    /// Syllable count.
    pub syllable_count: Option<usize>,
    /// Guessed language code.
    pub lyrics_language: Option<String>,
}

impl FeatureGroup for InstrumentationFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.num_parts = self.num_parts;
        record.part_names = self.part_names;
        record.detected_instruments = self.detected_instruments;
        record.instrument_families = self.instrument_families;
        record.has_extracted_lyrics = self.has_extracted_lyrics;
        record.extracted_lyrics = self.extracted_lyrics;
        record.syllable_count = self.syllable_count;
        record.lyrics_language = self.lyrics_language;
    }
}

/// Extract instrumentation and lyric features.
pub fn analyze(view: &ScoreView<'_>) -> Result<InstrumentationFeatures, ExtractError> {
    let mut features = InstrumentationFeatures::default();
    let score = view.score();

    if score.parts.is_empty() {
        return Ok(features);
    }

    features.num_parts = Some(score.parts.len());

    let names: Vec<String> = score.parts.iter().map(|p| p.display_name()).collect();
    features.part_names = Some(names.join(", "));

    features.detected_instruments = joined_sorted_set(score, |i| i.name.as_deref());
    features.instrument_families = joined_sorted_set(score, |i| i.family.as_deref());

    let mut syllables: Vec<&str> = Vec::new();
    for note in view.notes() {
        for syllable in note.lyrics() {
            syllables.push(syllable);
        }
    }
    features.has_extracted_lyrics = Some(!syllables.is_empty());
    if !syllables.is_empty() {
        let text = syllables.join(" ");
        features.lyrics_language = guess_language(&text).map(String::from);
        features.extracted_lyrics = Some(text);
        features.syllable_count = Some(syllables.len());
    }

    Ok(features)
}

/// Sorted distinct values of one instrument attribute, comma-joined.
fn joined_sorted_set(
    score: &Score,
    attribute: impl Fn(&crate::score::Instrument) -> Option<&str>,
) -> Option<String> {
    let mut values: Vec<&str> = score
        .parts
        .iter()
        .filter_map(|p| p.instrument.as_ref().and_then(&attribute))
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    values.dedup();
    Some(values.join(", "))
}

/// Keyword heuristic over lowercased lyric text. Latin mass ordinary
/// terms, then common English and German function words.
fn guess_language(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let hit = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if hit(&["kyrie", "sanctus", "agnus", "gloria", "amen"]) {
        Some("la")
    } else if hit(&[" the ", " and ", " of ", " to ", " lord "]) {
        Some("en")
    } else if hit(&[" und ", " der ", " die ", " das "]) {
        Some("de")
    } else {
        None
    }
}
