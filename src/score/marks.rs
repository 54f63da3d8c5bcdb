//! Notation marks: time signatures, tempo indications, dynamics, clefs,
//! barlines, spanners, ornaments, and articulations.

use serde::{Deserialize, Serialize};

/// Meter classification derived from a time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterClass {
    /// 2, 3 or 4 beats, each dividing in two (4/4, 3/4, 2/2).
    Simple,
    /// 2, 3 or 4 beats, each dividing in three (6/8, 9/8, 12/8).
    Compound,
    /// Everything else (5/4, 7/8, ...).
    Complex,
}

impl MeterClass {
    /// Lowercase label used in the output record.
    pub fn as_str(self) -> &'static str {
        match self {
            MeterClass::Simple => "simple",
            MeterClass::Compound => "compound",
            MeterClass::Complex => "complex",
        }
    }
}

/// A time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Beats-per-measure numeral.
    pub numerator: u32,
    /// Beat-unit denominator (4 = quarter, 8 = eighth).
    pub denominator: u32,
}

impl TimeSignature {
    /// Create a time signature such as `TimeSignature::new(6, 8)`.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        TimeSignature {
            numerator,
            denominator,
        }
    }

    /// "6/8"-style display string.
    pub fn ratio_string(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }

    /// True if the meter groups its subdivision in threes (6/8, 9/8, 12/8).
    pub fn is_compound(&self) -> bool {
        self.numerator >= 6 && self.numerator % 3 == 0
    }

    /// Number of conducted beats (6/8 = 2, 4/4 = 4).
    pub fn beat_count(&self) -> u32 {
        if self.is_compound() {
            self.numerator / 3
        } else {
            self.numerator
        }
    }

    /// Length of one conducted beat in quarter notes (6/8 = 1.5, 4/4 = 1.0).
    pub fn beat_quarter_length(&self) -> f64 {
        let unit = 4.0 / self.denominator as f64;
        if self.is_compound() {
            unit * 3.0
        } else {
            unit
        }
    }

    /// Total measure length in quarter notes.
    pub fn bar_quarter_length(&self) -> f64 {
        self.numerator as f64 * 4.0 / self.denominator as f64
    }

    /// simple / compound / complex classification.
    pub fn classification(&self) -> MeterClass {
        let beats = self.beat_count();
        if !(2..=4).contains(&beats) {
            return MeterClass::Complex;
        }
        if self.is_compound() {
            MeterClass::Compound
        } else {
            MeterClass::Simple
        }
    }
}

/// A metronome marking ("Allegro ♩ = 120").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetronomeMark {
    /// Beats per minute, if the mark carries a number.
    pub bpm: Option<f64>,
    /// Textual label ("Allegro"), if any.
    pub text: Option<String>,
    /// Quarter-note length of the beat unit (dotted quarter = 1.5).
    pub referent_quarter_length: Option<f64>,
}

impl MetronomeMark {
    /// Plain quarter-note mark with a BPM number.
    pub fn bpm(bpm: f64) -> Self {
        MetronomeMark {
            bpm: Some(bpm),
            text: None,
            referent_quarter_length: Some(1.0),
        }
    }

    /// Mark with both a text label and a BPM number.
    pub fn with_text(text: &str, bpm: f64) -> Self {
        MetronomeMark {
            bpm: Some(bpm),
            text: Some(text.to_string()),
            referent_quarter_length: Some(1.0),
        }
    }

    /// Set the beat-unit referent in quarter notes.
    pub fn referent(mut self, quarter_length: f64) -> Self {
        self.referent_quarter_length = Some(quarter_length);
        self
    }
}

/// A dynamic marking (p, mf, ff, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dynamic {
    /// Marking text ("p", "mf", "sfz").
    pub value: String,
}

impl Dynamic {
    /// Create a dynamic from its marking text.
    pub fn new(value: &str) -> Self {
        Dynamic {
            value: value.to_string(),
        }
    }

    /// Nominal loudness scalar for range estimation, `None` for markings
    /// without a stable loudness ordering (sfz, fp).
    pub fn volume_scalar(&self) -> Option<f64> {
        match self.value.as_str() {
            "ppp" => Some(0.1),
            "pp" => Some(0.2),
            "p" => Some(0.3),
            "mp" => Some(0.5),
            "mf" => Some(0.6),
            "f" => Some(0.75),
            "ff" => Some(0.9),
            "fff" => Some(1.0),
            _ => None,
        }
    }

    /// Closest named dynamic for a loudness scalar.
    pub fn closest_name(scalar: f64) -> &'static str {
        const LADDER: [(f64, &str); 8] = [
            (0.1, "ppp"),
            (0.2, "pp"),
            (0.3, "p"),
            (0.5, "mp"),
            (0.6, "mf"),
            (0.75, "f"),
            (0.9, "ff"),
            (1.0, "fff"),
        ];
        let mut best = LADDER[0];
        for entry in LADDER {
            if (entry.0 - scalar).abs() < (best.0 - scalar).abs() {
                best = entry;
            }
        }
        best.1
    }
}

/// Clef sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClefSign {
    /// Treble (G) clef.
    G,
    /// Bass (F) clef.
    F,
    /// Alto/tenor (C) clef.
    C,
    /// Percussion clef.
    Percussion,
}

impl ClefSign {
    /// Lowercase sign label ("g", "f", "c", "percussion").
    pub fn as_str(self) -> &'static str {
        match self {
            ClefSign::G => "g",
            ClefSign::F => "f",
            ClefSign::C => "c",
            ClefSign::Percussion => "percussion",
        }
    }
}

/// Barline style, including repeat barlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Barline {
    /// Ordinary single barline.
    Regular,
    /// Double (light-light) barline, a section boundary.
    Double,
    /// Final barline.
    Final,
    /// Light-heavy barline (equivalent to final in most encodings).
    LightHeavy,
    /// Forward repeat barline.
    RepeatStart,
    /// Backward repeat barline.
    RepeatEnd,
}

impl Barline {
    /// True for "final"-class barlines that mark the end of a movement.
    pub fn is_final(self) -> bool {
        matches!(self, Barline::Final | Barline::LightHeavy)
    }

    /// True for double barlines used as internal section markers.
    pub fn is_section_marker(self) -> bool {
        matches!(self, Barline::Double)
    }

    /// True for repeat barlines.
    pub fn is_repeat(self) -> bool {
        matches!(self, Barline::RepeatStart | Barline::RepeatEnd)
    }
}

/// Spanner notation spread over a range of notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spanner {
    /// Phrase slur.
    Slur,
    /// Octave displacement line (8va, 8vb, 15ma).
    Ottava,
    /// Piano pedal marking.
    Pedal,
}

/// Ornament attached to a note or chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ornament {
    /// Trill.
    Trill,
    /// Mordent (upper or lower).
    Mordent,
    /// Turn.
    Turn,
    /// Tremolo.
    Tremolo,
    /// Arpeggio (rolled chord) mark.
    ArpeggioMark,
}

/// Articulation attached to a note or chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Articulation {
    /// Staccato dot.
    Staccato,
    /// Accent.
    Accent,
    /// Tenuto line.
    Tenuto,
    /// Marcato.
    Marcato,
}
