//! Multi-movement detection
//!
//! Suites, sonatas, and partitas encoded as one file need different tempo
//! handling than single movements: a single metronome mark cannot describe
//! the whole work. Two independent predicates vote for multi-movement; a
//! score is multi-movement when either fires. Tempo-mark counting was
//! evaluated as a third predicate and rejected: almost every expressive
//! single movement carries several tempo indications.

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::score::{Element, Score};

/// Movement-name vocabulary (baroque dances, suite movements, common
/// movement titles). Matched as substrings of lowercased text expressions.
const MOVEMENT_NAMES: [&str; 36] = [
    "allemande",
    "courante",
    "sarabande",
    "gigue",
    "menuet",
    "menuetto",
    "minuet",
    "gavotte",
    "bourree",
    "bourrée",
    "prelude",
    "fugue",
    "praeludium",
    "fuga",
    "air",
    "trio",
    "rondo",
    "scherzo",
    "finale",
    "toccata",
    "passepied",
    "loure",
    "anglaise",
    "polonaise",
    "badinerie",
    "overture",
    "ouverture",
    "intermezzo",
    "siciliano",
    "sicilienne",
    "passacaglia",
    "chaconne",
    "fantasia",
    "ricercar",
    "invention",
    "sinfonia",
];

/// Movement-structure result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementFeatures {
    /// True when the score looks like several movements in one file.
    pub is_multi_movement: bool,
}

impl FeatureGroup for MovementFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.is_multi_movement = Some(self.is_multi_movement);
    }
}

/// Decide whether a score contains multiple movements.
///
/// Predicate 1: at least `movement_name_min_matches` distinct movement
/// names appear among the score's text expressions. Predicate 2: any
/// non-last measure of the first part closes with a final-class barline
/// (works only for scores longer than two measures, so short fragments
/// with decorative barlines do not trip it).
pub fn analyze(score: &Score, config: &ExtractConfig) -> Result<MovementFeatures, ExtractError> {
    let by_names = distinct_name_matches(score) >= config.movement_name_min_matches;
    let by_barlines = has_internal_final_barline(score);

    let is_multi_movement = by_names || by_barlines;
    if is_multi_movement {
        log::debug!(
            "multi-movement score (names: {}, internal final barline: {})",
            by_names,
            by_barlines
        );
    }
    Ok(MovementFeatures { is_multi_movement })
}

/// Count distinct movement-name hits across all text expressions.
fn distinct_name_matches(score: &Score) -> usize {
    let mut text = String::new();
    for part in &score.parts {
        for measure in &part.measures {
            for positioned in &measure.elements {
                if let Element::TextExpression(t) = &positioned.element {
                    text.push_str(&t.to_lowercase());
                    text.push(' ');
                }
            }
        }
    }
    if text.is_empty() {
        return 0;
    }
    MOVEMENT_NAMES
        .iter()
        .filter(|name| text.contains(*name))
        .count()
}

/// True when a final-class barline closes a non-last measure of the first
/// part.
fn has_internal_final_barline(score: &Score) -> bool {
    let first = match score.parts.first() {
        Some(p) => p,
        None => return false,
    };
    if first.measures.len() <= 2 {
        return false;
    }
    let last_index = first.measures.len() - 1;
    first.measures[..last_index]
        .iter()
        .any(|m| m.right_barline.map(|b| b.is_final()).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Barline, Measure, Note, Part};

    fn part_with_measures(count: usize) -> Part {
        let mut part = Part::new();
        for i in 0..count {
            let mut m = Measure::new(i as u32 + 1);
            m.push(Note::parse("C4", 4.0).unwrap());
            part.push_measure(m);
        }
        part
    }

    #[test]
    fn test_two_movement_names_trigger() {
        let mut part = part_with_measures(4);
        part.measures[0].push(Element::TextExpression("Allemande".to_string()));
        part.measures[2].push(Element::TextExpression("Courante".to_string()));
        let mut score = Score::new();
        score.push_part(part);

        let f = analyze(&score, &ExtractConfig::default()).unwrap();
        assert!(f.is_multi_movement);
    }

    #[test]
    fn test_single_movement_name_does_not_trigger() {
        let mut part = part_with_measures(4);
        part.measures[0].push(Element::TextExpression("Prelude".to_string()));
        let mut score = Score::new();
        score.push_part(part);

        let f = analyze(&score, &ExtractConfig::default()).unwrap();
        assert!(!f.is_multi_movement);
    }

    #[test]
    fn test_internal_final_barline_triggers() {
        let mut part = part_with_measures(6);
        part.measures[2].set_right_barline(Barline::Final);
        let mut score = Score::new();
        score.push_part(part);

        let f = analyze(&score, &ExtractConfig::default()).unwrap();
        assert!(f.is_multi_movement);
    }

    #[test]
    fn test_closing_final_barline_is_normal() {
        let mut part = part_with_measures(6);
        part.measures[5].set_right_barline(Barline::Final);
        let mut score = Score::new();
        score.push_part(part);

        let f = analyze(&score, &ExtractConfig::default()).unwrap();
        assert!(!f.is_multi_movement);
    }

    #[test]
    fn test_short_score_ignores_internal_barlines() {
        let mut part = part_with_measures(2);
        part.measures[0].set_right_barline(Barline::LightHeavy);
        let mut score = Score::new();
        score.push_part(part);

        let f = analyze(&score, &ExtractConfig::default()).unwrap();
        assert!(!f.is_multi_movement);
    }

    #[test]
    fn test_tempo_indications_alone_do_not_trigger() {
        use crate::score::MetronomeMark;

        let mut part = part_with_measures(6);
        part.measures[0].push(MetronomeMark::with_text("Allegro", 132.0));
        part.measures[2].push(Element::TempoText("Adagio".to_string()));
        part.measures[4].push(MetronomeMark::bpm(120.0));
        let mut score = Score::new();
        score.push_part(part);

        let f = analyze(&score, &ExtractConfig::default()).unwrap();
        assert!(!f.is_multi_movement);
    }

    #[test]
    fn test_empty_score() {
        let f = analyze(&Score::new(), &ExtractConfig::default()).unwrap();
        assert!(!f.is_multi_movement);
    }
}
