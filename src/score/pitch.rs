//! Pitch representation
//!
//! A pitch is a spelled note (step + alteration + octave) that also exposes
//! its continuous pitch-space value (MIDI-valued, semitone resolution) and
//! its pitch class (0-11). Spelling is preserved so enharmonic pairs (C#/Db)
//! stay distinguishable by name while sharing a pitch class.

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Diatonic step letter (C, D, E, F, G, A, B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// C (pitch class 0)
    C,
    /// D (pitch class 2)
    D,
    /// E (pitch class 4)
    E,
    /// F (pitch class 5)
    F,
    /// G (pitch class 7)
    G,
    /// A (pitch class 9)
    A,
    /// B (pitch class 11)
    B,
}

impl Step {
    /// Pitch class of the natural step (0-11).
    pub fn pitch_class(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    fn letter(self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }
}

/// A spelled pitch with octave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    /// Diatonic step letter.
    pub step: Step,
    /// Chromatic alteration in semitones (-2..=2; -1 = flat, 1 = sharp).
    pub alter: i8,
    /// Octave in scientific pitch notation (C4 = middle C).
    pub octave: i8,
}

impl Pitch {
    /// Create a pitch from step, alteration, and octave.
    pub fn new(step: Step, alter: i8, octave: i8) -> Self {
        Pitch {
            step,
            alter,
            octave,
        }
    }

    /// Parse a spelled pitch name like "C4", "F#3", "Bb5".
    ///
    /// Accepts `#` for sharp, `b` for flat, doubled for double alterations.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidScore` if the name is not a valid
    /// spelled pitch.
    pub fn parse(name: &str) -> Result<Self, ExtractError> {
        let invalid = || ExtractError::InvalidScore(format!("invalid pitch name: {:?}", name));

        let mut chars = name.chars();
        let step = chars
            .next()
            .and_then(Step::from_letter)
            .ok_or_else(invalid)?;

        let rest: String = chars.collect();
        let accidental_len = rest
            .chars()
            .take_while(|&c| c == '#' || c == 'b' || c == '-')
            .count();
        let (accidentals, octave_str) = rest.split_at(accidental_len);

        let mut alter: i8 = 0;
        for c in accidentals.chars() {
            match c {
                '#' => alter += 1,
                'b' | '-' => alter -= 1,
                _ => unreachable!(),
            }
        }

        let octave: i8 = octave_str.parse().map_err(|_| invalid())?;
        Ok(Pitch::new(step, alter, octave))
    }

    /// Nearest spelled pitch for a pitch-space value, using sharp spellings
    /// for the black keys. Fractional values round to the nearest semitone.
    pub fn from_ps(ps: f64) -> Self {
        let midi = ps.round() as i32;
        let pc = midi.rem_euclid(12);
        let octave = (midi / 12) - 1;
        let (step, alter) = match pc {
            0 => (Step::C, 0),
            1 => (Step::C, 1),
            2 => (Step::D, 0),
            3 => (Step::D, 1),
            4 => (Step::E, 0),
            5 => (Step::F, 0),
            6 => (Step::F, 1),
            7 => (Step::G, 0),
            8 => (Step::G, 1),
            9 => (Step::A, 0),
            10 => (Step::A, 1),
            _ => (Step::B, 0),
        };
        Pitch::new(step, alter, octave as i8)
    }

    /// Continuous pitch-space value (MIDI-valued: C4 = 60.0).
    pub fn ps(&self) -> f64 {
        self.midi_number() as f64
    }

    /// MIDI note number (may be negative for sub-contra spellings).
    pub fn midi_number(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.step.pitch_class() + self.alter as i32
    }

    /// Pitch class (0-11), octave and spelling discarded.
    pub fn pitch_class(&self) -> u8 {
        self.midi_number().rem_euclid(12) as u8
    }

    /// Spelled name without octave ("C", "F#", "Bb").
    pub fn name(&self) -> String {
        let accidental = match self.alter {
            0 => String::new(),
            a if a > 0 => "#".repeat(a as usize),
            a => "b".repeat((-a) as usize),
        };
        format!("{}{}", self.step.letter(), accidental)
    }

    /// Spelled name with octave ("C4", "F#3").
    pub fn name_with_octave(&self) -> String {
        format!("{}{}", self.name(), self.octave)
    }

    /// True if the pitch carries a non-natural accidental.
    pub fn has_accidental(&self) -> bool {
        self.alter != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_naturals() {
        let p = Pitch::parse("C4").unwrap();
        assert_eq!(p.step, Step::C);
        assert_eq!(p.alter, 0);
        assert_eq!(p.octave, 4);
        assert_eq!(p.ps(), 60.0);
    }

    #[test]
    fn test_parse_accidentals() {
        assert_eq!(Pitch::parse("F#3").unwrap().midi_number(), 54);
        assert_eq!(Pitch::parse("Bb5").unwrap().midi_number(), 82);
        assert_eq!(Pitch::parse("E-4").unwrap().midi_number(), 63);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Pitch::parse("H4").is_err());
        assert!(Pitch::parse("C").is_err());
        assert!(Pitch::parse("").is_err());
    }

    #[test]
    fn test_enharmonic_share_pitch_class() {
        let cs = Pitch::parse("C#4").unwrap();
        let db = Pitch::parse("Db4").unwrap();
        assert_eq!(cs.pitch_class(), db.pitch_class());
        assert_ne!(cs.name(), db.name());
    }

    #[test]
    fn test_name_with_octave_roundtrip() {
        for name in ["C4", "F#3", "Bb5", "A0", "G#7"] {
            let p = Pitch::parse(name).unwrap();
            assert_eq!(p.name_with_octave(), name);
        }
    }

    #[test]
    fn test_from_ps() {
        assert_eq!(Pitch::from_ps(60.0).name_with_octave(), "C4");
        assert_eq!(Pitch::from_ps(61.0).name_with_octave(), "C#4");
        assert_eq!(Pitch::from_ps(69.4).name_with_octave(), "A4");
    }
}
