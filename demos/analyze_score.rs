//! Extract features from a small built-in score and print the record.
//!
//! Run with: cargo run --example analyze_score

use ambitus::score::{Chord, Dynamic, Measure, MetronomeMark, Note, Part, Score, TimeSignature};
use ambitus::{extract_score, ExtractConfig};

fn build_score() -> Score {
    let mut melody = Part::named("Melody");
    let mut m = Measure::new(1);
    m.push(TimeSignature::new(4, 4));
    m.push(MetronomeMark::with_text("Allegro", 120.0));
    m.push(Dynamic::new("mf"));
    for name in ["C4", "D4", "E4", "F4"] {
        m.push(Note::parse(name, 1.0).unwrap());
    }
    melody.push_measure(m);
    let mut m = Measure::new(2);
    for name in ["G4", "E4", "D4", "C4"] {
        m.push(Note::parse(name, 1.0).unwrap());
    }
    melody.push_measure(m);

    let mut accompaniment = Part::named("Accompaniment");
    let mut m = Measure::new(1);
    m.push(Chord::parse(&["C3", "E3", "G3"], 4.0).unwrap());
    accompaniment.push_measure(m);
    let mut m = Measure::new(2);
    m.push(Chord::parse(&["G2", "B2", "D3"], 2.0).unwrap());
    m.push(Chord::parse(&["C3", "E3", "G3"], 2.0).unwrap());
    accompaniment.push_measure(m);

    let mut score = Score::new();
    score.push_part(melody);
    score.push_part(accompaniment);
    score
}

fn main() {
    env_logger::init();

    let score = build_score();
    let record = extract_score(&score, &ExtractConfig::default());

    println!("{}", serde_json::to_string_pretty(&record).unwrap());
}
