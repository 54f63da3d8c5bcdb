//! Score object model
//!
//! Read-only tree of Parts → Measures → elements, as handed over by an
//! external notation parser. The extraction engine never mutates a score;
//! it only derives features from it. Optional attributes that a parser may
//! or may not supply (instrument names, beat positions, lyrics) are explicit
//! `Option`/empty-collection fields rather than probed dynamically.
//!
//! Measures position their elements cursor-style: pushing a note advances
//! the cursor by the note's duration, pushing a non-sounding element (clef,
//! dynamic, time signature) keeps the cursor in place. This matches how
//! notation parsers append elements in reading order.

pub mod marks;
pub mod pitch;

pub use marks::{
    Articulation, Barline, ClefSign, Dynamic, MeterClass, MetronomeMark, Ornament, Spanner,
    TimeSignature,
};
pub use pitch::{Pitch, Step};

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// A single note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// The note's pitch.
    pub pitch: Pitch,
    /// Duration in quarter-note units.
    pub quarter_length: f64,
    /// True for grace notes (no metric duration).
    pub is_grace: bool,
    /// Articulations attached to the note.
    pub articulations: Vec<Articulation>,
    /// Ornaments attached to the note.
    pub ornaments: Vec<Ornament>,
    /// True if the note carries a fermata.
    pub fermata: bool,
    /// Lyric syllables attached to the note.
    pub lyrics: Vec<String>,
}

impl Note {
    /// Create a note from a spelled pitch name and a quarter-note duration.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidScore` if the pitch name is invalid.
    pub fn parse(name: &str, quarter_length: f64) -> Result<Self, ExtractError> {
        Ok(Note::new(Pitch::parse(name)?, quarter_length))
    }

    /// Create a note from a pitch and a quarter-note duration.
    pub fn new(pitch: Pitch, quarter_length: f64) -> Self {
        Note {
            pitch,
            quarter_length,
            is_grace: false,
            articulations: Vec::new(),
            ornaments: Vec::new(),
            fermata: false,
            lyrics: Vec::new(),
        }
    }

    /// Mark the note as a grace note.
    pub fn grace(mut self) -> Self {
        self.is_grace = true;
        self
    }

    /// Attach an ornament.
    pub fn ornament(mut self, ornament: Ornament) -> Self {
        self.ornaments.push(ornament);
        self
    }

    /// Attach an articulation.
    pub fn articulation(mut self, articulation: Articulation) -> Self {
        self.articulations.push(articulation);
        self
    }

    /// Attach a fermata.
    pub fn with_fermata(mut self) -> Self {
        self.fermata = true;
        self
    }

    /// Attach a lyric syllable.
    pub fn lyric(mut self, text: &str) -> Self {
        self.lyrics.push(text.to_string());
        self
    }
}

/// A chord: several pitches sounding with one shared duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// The chord's pitches (any order; analyzers sort by pitch space).
    pub pitches: Vec<Pitch>,
    /// Duration in quarter-note units.
    pub quarter_length: f64,
    /// True for grace chords.
    pub is_grace: bool,
    /// Articulations attached to the chord.
    pub articulations: Vec<Articulation>,
    /// Ornaments attached to the chord.
    pub ornaments: Vec<Ornament>,
    /// True if the chord carries a fermata.
    pub fermata: bool,
    /// Lyric syllables attached to the chord.
    pub lyrics: Vec<String>,
}

impl Chord {
    /// Create a chord from spelled pitch names and a shared duration.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidScore` if any pitch name is invalid.
    pub fn parse(names: &[&str], quarter_length: f64) -> Result<Self, ExtractError> {
        let pitches = names
            .iter()
            .map(|n| Pitch::parse(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Chord::new(pitches, quarter_length))
    }

    /// Create a chord from pitches and a shared duration.
    pub fn new(pitches: Vec<Pitch>, quarter_length: f64) -> Self {
        Chord {
            pitches,
            quarter_length,
            is_grace: false,
            articulations: Vec::new(),
            ornaments: Vec::new(),
            fermata: false,
            lyrics: Vec::new(),
        }
    }

    /// Attach an ornament.
    pub fn ornament(mut self, ornament: Ornament) -> Self {
        self.ornaments.push(ornament);
        self
    }
}

/// One element inside a measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    /// A single note.
    Note(Note),
    /// A chord.
    Chord(Chord),
    /// A rest (advances the cursor, carries no pitch).
    Rest {
        /// Duration in quarter-note units.
        quarter_length: f64,
    },
    /// A time signature.
    TimeSignature(TimeSignature),
    /// A metronome marking.
    MetronomeMark(MetronomeMark),
    /// A standalone tempo text without a metronome number ("Andante").
    TempoText(String),
    /// A free text expression ("dolce", movement titles).
    TextExpression(String),
    /// A dynamic marking.
    Dynamic(Dynamic),
    /// A clef.
    Clef(ClefSign),
    /// A barline placed mid-stream (section markers, repeats).
    Barline(Barline),
    /// A spanner (slur, ottava, pedal).
    Spanner(Spanner),
}

impl Element {
    /// Sounding duration in quarter notes (zero for marks and grace notes).
    pub fn quarter_length(&self) -> f64 {
        match self {
            Element::Note(n) if !n.is_grace => n.quarter_length,
            Element::Chord(c) if !c.is_grace => c.quarter_length,
            Element::Rest { quarter_length } => *quarter_length,
            _ => 0.0,
        }
    }
}

impl From<Note> for Element {
    fn from(n: Note) -> Self {
        Element::Note(n)
    }
}

impl From<Chord> for Element {
    fn from(c: Chord) -> Self {
        Element::Chord(c)
    }
}

impl From<TimeSignature> for Element {
    fn from(ts: TimeSignature) -> Self {
        Element::TimeSignature(ts)
    }
}

impl From<MetronomeMark> for Element {
    fn from(m: MetronomeMark) -> Self {
        Element::MetronomeMark(m)
    }
}

impl From<Dynamic> for Element {
    fn from(d: Dynamic) -> Self {
        Element::Dynamic(d)
    }
}

impl From<ClefSign> for Element {
    fn from(c: ClefSign) -> Self {
        Element::Clef(c)
    }
}

impl From<Barline> for Element {
    fn from(b: Barline) -> Self {
        Element::Barline(b)
    }
}

impl From<Spanner> for Element {
    fn from(s: Spanner) -> Self {
        Element::Spanner(s)
    }
}

/// An element positioned within its measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Positioned {
    /// Offset from measure start in quarter notes.
    pub offset: f64,
    /// The element itself.
    pub element: Element,
}

/// A measure: positioned elements plus an optional closing barline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number (1-based in most encodings).
    pub number: u32,
    /// Elements in reading order with quarter-note offsets.
    pub elements: Vec<Positioned>,
    /// The barline closing the measure, if explicitly set.
    pub right_barline: Option<Barline>,
    #[serde(skip)]
    cursor: f64,
}

impl Measure {
    /// Create an empty measure.
    pub fn new(number: u32) -> Self {
        Measure {
            number,
            ..Default::default()
        }
    }

    /// Append an element at the current cursor; sounding elements advance
    /// the cursor by their duration.
    pub fn push(&mut self, element: impl Into<Element>) {
        let element = element.into();
        let advance = element.quarter_length();
        self.elements.push(Positioned {
            offset: self.cursor,
            element,
        });
        self.cursor += advance;
    }

    /// Set the closing barline.
    pub fn set_right_barline(&mut self, barline: Barline) {
        self.right_barline = Some(barline);
    }

    /// Measure length in quarter notes (end of the last sounding element).
    pub fn quarter_length(&self) -> f64 {
        self.elements
            .iter()
            .map(|p| p.offset + p.element.quarter_length())
            .fold(0.0, f64::max)
    }
}

/// Instrument assigned to a part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Instrument name ("Piano", "Violin I").
    pub name: Option<String>,
    /// Instrument family ("strings", "keyboard").
    pub family: Option<String>,
}

impl Instrument {
    /// Instrument with a name only.
    pub fn named(name: &str) -> Self {
        Instrument {
            name: Some(name.to_string()),
            family: None,
        }
    }

    /// Instrument with name and family.
    pub fn with_family(name: &str, family: &str) -> Self {
        Instrument {
            name: Some(name.to_string()),
            family: Some(family.to_string()),
        }
    }
}

/// One part (staff/voice) of a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Stable identifier from the source encoding ("P1").
    pub id: Option<String>,
    /// Part name ("Soprano").
    pub name: Option<String>,
    /// Abbreviated name ("S.").
    pub abbreviation: Option<String>,
    /// Assigned instrument, if the encoding provides one.
    pub instrument: Option<Instrument>,
    /// Measures in score order.
    pub measures: Vec<Measure>,
}

impl Part {
    /// Create an empty, unnamed part.
    pub fn new() -> Self {
        Part::default()
    }

    /// Create an empty part with a display name.
    pub fn named(name: &str) -> Self {
        Part {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Append a measure.
    pub fn push_measure(&mut self, measure: Measure) {
        self.measures.push(measure);
    }

    /// Display name: part name, else abbreviation, else instrument name,
    /// else "Part {id}", else "Unknown".
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if let Some(abbr) = &self.abbreviation {
            return abbr.clone();
        }
        if let Some(inst) = &self.instrument {
            if let Some(name) = &inst.name {
                return name.clone();
            }
        }
        match &self.id {
            Some(id) => format!("Part {}", id),
            None => "Unknown".to_string(),
        }
    }

    /// Total part length in quarter notes.
    pub fn quarter_length(&self) -> f64 {
        self.measures.iter().map(Measure::quarter_length).sum()
    }

    /// All pitches of the part in reading order (chords contribute all of
    /// their pitches).
    pub fn pitches(&self) -> Vec<Pitch> {
        let mut out = Vec::new();
        for m in &self.measures {
            for p in &m.elements {
                match &p.element {
                    Element::Note(n) => out.push(n.pitch),
                    Element::Chord(c) => out.extend(c.pitches.iter().copied()),
                    _ => {}
                }
            }
        }
        out
    }

    /// Plain notes of the part in reading order (chords excluded).
    pub fn plain_notes(&self) -> Vec<&Note> {
        let mut out = Vec::new();
        for m in &self.measures {
            for p in &m.elements {
                if let Element::Note(n) = &p.element {
                    out.push(n);
                }
            }
        }
        out
    }
}

/// A full score: an ordered list of parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Parts in score order (first part is treated as the melodic voice).
    pub parts: Vec<Part>,
}

impl Score {
    /// Create an empty score.
    pub fn new() -> Self {
        Score::default()
    }

    /// Append a part.
    pub fn push_part(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Total score length in quarter notes (longest part).
    pub fn total_quarter_length(&self) -> f64 {
        self.parts
            .iter()
            .map(Part::quarter_length)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_cursor_advances_on_notes_only() {
        let mut m = Measure::new(1);
        m.push(TimeSignature::new(4, 4));
        m.push(Note::parse("C4", 1.0).unwrap());
        m.push(Dynamic::new("p"));
        m.push(Note::parse("D4", 0.5).unwrap());

        assert_eq!(m.elements[0].offset, 0.0); // time signature
        assert_eq!(m.elements[1].offset, 0.0); // C4
        assert_eq!(m.elements[2].offset, 1.0); // dynamic after C4
        assert_eq!(m.elements[3].offset, 1.0); // D4
        assert_eq!(m.quarter_length(), 1.5);
    }

    #[test]
    fn test_grace_notes_have_no_duration() {
        let mut m = Measure::new(1);
        m.push(Note::parse("D4", 0.5).unwrap().grace());
        m.push(Note::parse("C4", 1.0).unwrap());
        assert_eq!(m.elements[1].offset, 0.0);
        assert_eq!(m.quarter_length(), 1.0);
    }

    #[test]
    fn test_part_display_name_fallbacks() {
        let mut part = Part::new();
        assert_eq!(part.display_name(), "Unknown");
        part.id = Some("P2".to_string());
        assert_eq!(part.display_name(), "Part P2");
        part.instrument = Some(Instrument::named("Viola"));
        assert_eq!(part.display_name(), "Viola");
        part.abbreviation = Some("Vla.".to_string());
        assert_eq!(part.display_name(), "Vla.");
        part.name = Some("Viola I".to_string());
        assert_eq!(part.display_name(), "Viola I");
    }

    #[test]
    fn test_score_total_quarter_length_is_longest_part() {
        let mut score = Score::new();
        let mut long = Part::new();
        let mut m = Measure::new(1);
        m.push(Note::parse("C4", 4.0).unwrap());
        long.push_measure(m);
        let mut short = Part::new();
        let mut m = Measure::new(1);
        m.push(Note::parse("C3", 2.0).unwrap());
        short.push_measure(m);
        score.push_part(long);
        score.push_part(short);
        assert_eq!(score.total_quarter_length(), 4.0);
    }
}
