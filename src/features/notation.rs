//! Notation and structure features
//!
//! One pass over the flattened stream tallies everything that is written
//! on the page rather than derived from it: clefs, dynamics,
//! articulations, ornaments, fermatas, tempo indications, text
//! expressions, barline structure, spanners, and grace notes.

use crate::analysis::record::{FeatureGroup, FeatureRecord};
use crate::error::ExtractError;
use crate::features::rhythm::first_time_signature;
use crate::score::{ClefSign, Dynamic, Element, Ornament, Spanner};
use crate::view::ScoreView;

/// Notation feature group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotationFeatures {
    /// Sorted comma-joined clef signs.
    pub clefs_used: Option<String>,
    /// Any dynamic present.
    pub has_dynamics: Option<bool>,
    /// Softest-loudest dynamic pair.
    pub dynamic_range: Option<String>,
    /// Any articulation present.
    pub has_articulations: Option<bool>,
    /// Any trill, mordent, or turn present.
    pub has_ornaments: Option<bool>,
    /// Any fermata present.
    pub has_fermatas: Option<bool>,
    /// More than one tempo indication.
    pub has_tempo_changes: Option<bool>,
    /// First ten text expressions, comma-joined.
    pub expression_markings: Option<String>,
    /// First time signature ("4/4").
    pub time_signature: Option<String>,
    /// Repeat barline count.
    pub repeats_count: Option<usize>,
    /// Section count from double barlines.
    pub sections_count: Option<usize>,
    /// Slur count.
    pub slur_count: Option<usize>,
    /// Any ottava line present.
    pub has_ottava: Option<bool>,
    /// Trill count.
    pub trill_count: Option<usize>,
    /// Mordent count.
    pub mordent_count: Option<usize>,
    /// Turn count.
    pub turn_count: Option<usize>,
    /// Tremolo count.
    pub tremolo_count: Option<usize>,
    /// Arpeggio-mark count.
    pub arpeggio_mark_count: Option<usize>,
    /// Grace-note count.
    pub grace_note_count: Option<usize>,
    /// Any pedal marking present.
    pub has_pedal_marks: Option<bool>,
}

impl FeatureGroup for NotationFeatures {
    fn write_into(self, record: &mut FeatureRecord) {
        record.clefs_used = self.clefs_used;
        record.has_dynamics = self.has_dynamics;
        record.dynamic_range = self.dynamic_range;
        record.has_articulations = self.has_articulations;
        record.has_ornaments = self.has_ornaments;
        record.has_fermatas = self.has_fermatas;
        record.has_tempo_changes = self.has_tempo_changes;
        record.expression_markings = self.expression_markings;
        record.time_signature = self.time_signature;
        record.repeats_count = self.repeats_count;
        record.sections_count = self.sections_count;
        record.slur_count = self.slur_count;
        record.has_ottava = self.has_ottava;
        record.trill_count = self.trill_count;
        record.mordent_count = self.mordent_count;
        record.turn_count = self.turn_count;
        record.tremolo_count = self.tremolo_count;
        record.arpeggio_mark_count = self.arpeggio_mark_count;
        record.grace_note_count = self.grace_note_count;
        record.has_pedal_marks = self.has_pedal_marks;
    }
}

/// Extract notation and structure features.
pub fn analyze(view: &ScoreView<'_>) -> Result<NotationFeatures, ExtractError> {
    let mut features = NotationFeatures::default();

    let mut clefs: Vec<ClefSign> = Vec::new();
    let mut dynamic_scalars: Vec<f64> = Vec::new();
    let mut has_dynamics = false;
    let mut has_articulations = false;
    let mut has_fermatas = false;
    let mut tempo_indications = 0usize;
    let mut expressions: Vec<String> = Vec::new();
    let mut repeats = 0usize;
    let mut doubles = 0usize;
    let mut slurs = 0usize;
    let mut has_ottava = false;
    let mut has_pedal = false;
    let mut trills = 0usize;
    let mut mordents = 0usize;
    let mut turns = 0usize;
    let mut tremolos = 0usize;
    let mut arpeggios = 0usize;
    let mut grace_notes = 0usize;

    let mut tally_ornaments = |ornaments: &[Ornament]| {
        for ornament in ornaments {
            match ornament {
                Ornament::Trill => trills += 1,
                Ornament::Mordent => mordents += 1,
                Ornament::Turn => turns += 1,
                Ornament::Tremolo => tremolos += 1,
                Ornament::ArpeggioMark => arpeggios += 1,
            }
        }
    };

    for item in view.flattened() {
        match item.element {
            Element::Note(n) => {
                if n.is_grace {
                    grace_notes += 1;
                }
                if !n.articulations.is_empty() {
                    has_articulations = true;
                }
                if n.fermata {
                    has_fermatas = true;
                }
                tally_ornaments(&n.ornaments);
            }
            Element::Chord(c) => {
                if c.is_grace {
                    grace_notes += 1;
                }
                if !c.articulations.is_empty() {
                    has_articulations = true;
                }
                if c.fermata {
                    has_fermatas = true;
                }
                tally_ornaments(&c.ornaments);
            }
            Element::Dynamic(d) => {
                has_dynamics = true;
                if let Some(scalar) = d.volume_scalar() {
                    dynamic_scalars.push(scalar);
                }
            }
            Element::Clef(sign) => clefs.push(*sign),
            Element::MetronomeMark(_) | Element::TempoText(_) => tempo_indications += 1,
            Element::TextExpression(text) => expressions.push(text.clone()),
            Element::Barline(barline) => {
                if barline.is_repeat() {
                    repeats += 1;
                }
                if barline.is_section_marker() {
                    doubles += 1;
                }
            }
            Element::Spanner(spanner) => match spanner {
                Spanner::Slur => slurs += 1,
                Spanner::Ottava => has_ottava = true,
                Spanner::Pedal => has_pedal = true,
            },
            _ => {}
        }
    }

    // Explicit closing barlines count toward structure too.
    for part in &view.score().parts {
        for measure in &part.measures {
            if let Some(barline) = measure.right_barline {
                if barline.is_repeat() {
                    repeats += 1;
                }
                if barline.is_section_marker() {
                    doubles += 1;
                }
            }
        }
    }

    if !clefs.is_empty() {
        let mut names: Vec<&str> = clefs.iter().map(|c| c.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        features.clefs_used = Some(names.join(", "));
    }

    features.has_dynamics = Some(has_dynamics);
    if let (Some(min), Some(max)) = (
        dynamic_scalars.iter().cloned().reduce(f64::min),
        dynamic_scalars.iter().cloned().reduce(f64::max),
    ) {
        features.dynamic_range = Some(format!(
            "{}-{}",
            Dynamic::closest_name(min),
            Dynamic::closest_name(max)
        ));
    }

    features.has_articulations = Some(has_articulations);
    features.has_ornaments = Some(trills + mordents + turns > 0);
    features.has_fermatas = Some(has_fermatas);
    features.has_tempo_changes = Some(tempo_indications > 1);

    if !expressions.is_empty() {
        expressions.truncate(10);
        features.expression_markings = Some(expressions.join(", "));
    }

    features.time_signature = first_time_signature(view).map(|ts| ts.ratio_string());
    features.repeats_count = Some(repeats);
    if doubles > 0 {
        features.sections_count = Some(doubles + 1);
    }
    features.slur_count = Some(slurs);
    features.has_ottava = Some(has_ottava);
    features.trill_count = Some(trills);
    features.mordent_count = Some(mordents);
    features.turn_count = Some(turns);
    features.tremolo_count = Some(tremolos);
    features.arpeggio_mark_count = Some(arpeggios);
    features.grace_note_count = Some(grace_notes);
    features.has_pedal_marks = Some(has_pedal);

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{
        Articulation, Barline, Measure, MetronomeMark, Note, Part, Score, TimeSignature,
    };

    fn marked_score() -> Score {
        let mut part = Part::new();
        let mut m = Measure::new(1);
        m.push(TimeSignature::new(3, 4));
        m.push(Element::Clef(ClefSign::G));
        m.push(Dynamic::new("p"));
        m.push(
            Note::parse("C4", 1.0)
                .unwrap()
                .ornament(Ornament::Trill)
                .articulation(Articulation::Staccato),
        );
        m.push(Note::parse("D4", 0.5).unwrap().grace());
        m.push(Note::parse("E4", 1.0).unwrap().with_fermata());
        m.push(Dynamic::new("ff"));
        m.push(Element::Spanner(Spanner::Slur));
        part.push_measure(m);

        let mut m = Measure::new(2);
        m.push(Element::Clef(ClefSign::F));
        m.push(Note::parse("G3", 3.0).unwrap());
        m.set_right_barline(Barline::RepeatEnd);
        part.push_measure(m);

        let mut score = Score::new();
        score.push_part(part);
        score
    }

    #[test]
    fn test_notation_tallies() {
        let score = marked_score();
        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();

        assert_eq!(f.clefs_used.as_deref(), Some("f, g"));
        assert_eq!(f.has_dynamics, Some(true));
        assert_eq!(f.dynamic_range.as_deref(), Some("p-ff"));
        assert_eq!(f.has_articulations, Some(true));
        assert_eq!(f.has_ornaments, Some(true));
        assert_eq!(f.has_fermatas, Some(true));
        assert_eq!(f.trill_count, Some(1));
        assert_eq!(f.grace_note_count, Some(1));
        assert_eq!(f.slur_count, Some(1));
        assert_eq!(f.repeats_count, Some(1));
        assert_eq!(f.time_signature.as_deref(), Some("3/4"));
        assert_eq!(f.has_tempo_changes, Some(false));
    }

    #[test]
    fn test_tremolo_is_not_an_ornament_for_has_ornaments() {
        let mut part = Part::new();
        let mut m = Measure::new(1);
        m.push(Note::parse("C4", 1.0).unwrap().ornament(Ornament::Tremolo));
        part.push_measure(m);
        let mut score = Score::new();
        score.push_part(part);

        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();
        assert_eq!(f.has_ornaments, Some(false));
        assert_eq!(f.tremolo_count, Some(1));
    }

    #[test]
    fn test_tempo_changes_need_two_indications() {
        let mut part = Part::new();
        let mut m = Measure::new(1);
        m.push(MetronomeMark::bpm(120.0));
        m.push(Note::parse("C4", 2.0).unwrap());
        m.push(Element::TempoText("rit.".to_string()));
        part.push_measure(m);
        let mut score = Score::new();
        score.push_part(part);

        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();
        assert_eq!(f.has_tempo_changes, Some(true));
    }

    #[test]
    fn test_sections_from_double_barlines() {
        let mut part = Part::new();
        for i in 0..3 {
            let mut m = Measure::new(i + 1);
            m.push(Note::parse("C4", 4.0).unwrap());
            part.push_measure(m);
        }
        part.measures[0].set_right_barline(Barline::Double);
        part.measures[1].set_right_barline(Barline::Double);
        let mut score = Score::new();
        score.push_part(part);

        let view = ScoreView::new(&score);
        let f = analyze(&view).unwrap();
        assert_eq!(f.sections_count, Some(3));
    }
}
