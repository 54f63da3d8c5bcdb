//! Extraction pipeline
//!
//! Runs every analyzer over one score and merges their feature groups
//! into a single record. Analyzers are independent: one failing analyzer
//! downgrades to a warning on the record and the rest still run. Only
//! setup failures (before any analyzer starts) produce a `failed` record,
//! and those happen at the file entry points, not here.

pub mod record;

pub use record::{ExtractionStatus, FeatureRecord, PitchSpan, Tessitura};

use record::FeatureGroup;

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::features;
use crate::score::Score;
use crate::view::ScoreView;

/// Merge one analyzer's outcome into the record. A failed analyzer
/// contributes a warning and nothing else.
fn merge<G: FeatureGroup>(
    record: &mut FeatureRecord,
    analyzer: &str,
    outcome: Result<G, ExtractError>,
) {
    match outcome {
        Ok(group) => group.write_into(record),
        Err(error) => record.warn(analyzer, &error),
    }
}

/// Extract every feature group from a parsed score.
///
/// Always returns an `extracted` record; analyzer failures surface as
/// warnings on it. Difficulty scoring runs last because it reads the
/// merged record.
pub fn extract_score(score: &Score, config: &ExtractConfig) -> FeatureRecord {
    let view = ScoreView::new(score);
    let mut record = FeatureRecord::new();

    // Movement structure first: temporal gating depends on it.
    let movement = features::movement::analyze(score, config);
    let multi_movement = movement
        .as_ref()
        .map(|m| m.is_multi_movement)
        .unwrap_or(false);
    merge(&mut record, "movement", movement);

    merge(
        &mut record,
        "temporal",
        features::temporal::analyze(&view, multi_movement),
    );
    merge(&mut record, "range", features::range::analyze(score));
    merge(
        &mut record,
        "rhythm",
        features::rhythm::analyze(&view, config),
    );
    merge(
        &mut record,
        "harmony",
        features::harmony::analyze(&view, config),
    );
    merge(&mut record, "melody", features::melody::analyze(score));
    merge(&mut record, "notation", features::notation::analyze(&view));
    merge(
        &mut record,
        "instrumentation",
        features::instrumentation::analyze(&view),
    );
    merge(
        &mut record,
        "texture",
        features::texture::analyze(&view, config),
    );
    merge(
        &mut record,
        "chromatic",
        features::chromatic::analyze(&view),
    );

    let difficulty = features::difficulty::analyze(&record);
    merge(&mut record, "difficulty", difficulty);

    record.extraction_status = ExtractionStatus::Extracted;
    record
}
