//! Per-extraction score view cache
//!
//! Derived views of a score (flattened element stream, chordified stream,
//! analyzed key) are expensive; every analyzer that needs one requests it
//! through this cache so each view is computed at most once per extraction.
//! A `ScoreView` lives for exactly one extraction call and is discarded
//! afterwards; it is never shared across calls.

use once_cell::unsync::OnceCell;

use crate::features::key::{estimate_key, KeyEstimate};
use crate::score::{Chord, Element, Note, Pitch, Score};

/// Quarter-note resolution used to quantize onsets when grouping
/// simultaneities (480 ticks per quarter, the common MIDI resolution).
const TICKS_PER_QUARTER: f64 = 480.0;

/// An element of the flattened stream with its absolute score offset.
#[derive(Debug, Clone, Copy)]
pub struct FlatItem<'a> {
    /// Absolute offset from score start in quarter notes.
    pub offset: f64,
    /// Index of the part the element came from.
    pub part_index: usize,
    /// The element itself.
    pub element: &'a Element,
}

/// A note or chord from the flattened stream.
#[derive(Debug, Clone, Copy)]
pub enum GeneralNote<'a> {
    /// A single note.
    Note(&'a Note),
    /// A chord.
    Chord(&'a Chord),
}

impl<'a> GeneralNote<'a> {
    /// All pitches of the event (one for a note).
    pub fn pitches(&self) -> Vec<Pitch> {
        match self {
            GeneralNote::Note(n) => vec![n.pitch],
            GeneralNote::Chord(c) => c.pitches.clone(),
        }
    }

    /// Duration in quarter notes.
    pub fn quarter_length(&self) -> f64 {
        match self {
            GeneralNote::Note(n) => n.quarter_length,
            GeneralNote::Chord(c) => c.quarter_length,
        }
    }

    /// True for grace events.
    pub fn is_grace(&self) -> bool {
        match self {
            GeneralNote::Note(n) => n.is_grace,
            GeneralNote::Chord(c) => c.is_grace,
        }
    }

    /// Lyric syllables attached to the event.
    pub fn lyrics(&self) -> &'a [String] {
        match self {
            GeneralNote::Note(n) => &n.lyrics,
            GeneralNote::Chord(c) => &c.lyrics,
        }
    }
}

/// One simultaneity of the chordified stream: every pitch sounding at one
/// onset, across all parts, sorted from bass to soprano.
#[derive(Debug, Clone)]
pub struct ChordSlice {
    /// Absolute onset offset in quarter notes.
    pub offset: f64,
    /// Sounding pitches sorted by pitch space (bass first).
    pub pitches: Vec<Pitch>,
}

impl ChordSlice {
    /// Span between outer voices in semitones; `None` for fewer than two
    /// pitches.
    pub fn span(&self) -> Option<f64> {
        if self.pitches.len() < 2 {
            return None;
        }
        let bass = self.pitches.first()?.ps();
        let soprano = self.pitches.last()?.ps();
        Some(soprano - bass)
    }
}

/// Memoized derived views of one score.
pub struct ScoreView<'a> {
    score: &'a Score,
    flattened: OnceCell<Vec<FlatItem<'a>>>,
    notes: OnceCell<Vec<GeneralNote<'a>>>,
    chordified: OnceCell<Vec<ChordSlice>>,
    // Outer cell: computed or not. Inner option: key found or analysis
    // failed. Keeps "absent" distinct from "not yet computed".
    analyzed_key: OnceCell<Option<KeyEstimate>>,
}

impl<'a> ScoreView<'a> {
    /// Create a view over a score for one extraction call.
    pub fn new(score: &'a Score) -> Self {
        ScoreView {
            score,
            flattened: OnceCell::new(),
            notes: OnceCell::new(),
            chordified: OnceCell::new(),
            analyzed_key: OnceCell::new(),
        }
    }

    /// The underlying score.
    pub fn score(&self) -> &'a Score {
        self.score
    }

    /// Flattened element stream: every element of every part with its
    /// absolute offset, ordered by offset (ties broken by part order).
    pub fn flattened(&self) -> &[FlatItem<'a>] {
        self.flattened.get_or_init(|| {
            let mut items = Vec::new();
            for (part_index, part) in self.score.parts.iter().enumerate() {
                let mut measure_start = 0.0;
                for measure in &part.measures {
                    for positioned in &measure.elements {
                        items.push(FlatItem {
                            offset: measure_start + positioned.offset,
                            part_index,
                            element: &positioned.element,
                        });
                    }
                    measure_start += measure.quarter_length();
                }
            }
            items.sort_by(|a, b| {
                a.offset
                    .partial_cmp(&b.offset)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.part_index.cmp(&b.part_index))
            });
            items
        })
    }

    /// All notes and chords from the flattened stream, in offset order.
    pub fn notes(&self) -> &[GeneralNote<'a>] {
        self.notes.get_or_init(|| {
            self.flattened()
                .iter()
                .filter_map(|item| match item.element {
                    Element::Note(n) => Some(GeneralNote::Note(n)),
                    Element::Chord(c) => Some(GeneralNote::Chord(c)),
                    _ => None,
                })
                .collect()
        })
    }

    /// Chordified stream: all parts collapsed into one chord per distinct
    /// onset. A note sounding through a later onset joins that onset's
    /// slice. Grace notes are skipped.
    pub fn chordified(&self) -> &[ChordSlice] {
        self.chordified.get_or_init(|| {
            // (start_tick, end_tick, pitch) for every sounding pitch
            let mut events: Vec<(i64, i64, Pitch)> = Vec::new();
            for item in self.flattened() {
                let pitches: &[Pitch] = match item.element {
                    Element::Note(n) if !n.is_grace => std::slice::from_ref(&n.pitch),
                    Element::Chord(c) if !c.is_grace => &c.pitches,
                    _ => continue,
                };
                let start = (item.offset * TICKS_PER_QUARTER).round() as i64;
                let duration =
                    (item.element.quarter_length() * TICKS_PER_QUARTER).round() as i64;
                let end = start + duration.max(1);
                for &pitch in pitches {
                    events.push((start, end, pitch));
                }
            }

            let mut onsets: Vec<i64> = events.iter().map(|(s, _, _)| *s).collect();
            onsets.sort_unstable();
            onsets.dedup();

            onsets
                .into_iter()
                .map(|onset| {
                    let mut pitches: Vec<Pitch> = events
                        .iter()
                        .filter(|(s, e, _)| *s <= onset && onset < *e)
                        .map(|(_, _, p)| *p)
                        .collect();
                    pitches.sort_by(|a, b| {
                        a.ps()
                            .partial_cmp(&b.ps())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                    ChordSlice {
                        offset: onset as f64 / TICKS_PER_QUARTER,
                        pitches,
                    }
                })
                .collect()
        })
    }

    /// The score's estimated key, or `None` when key analysis finds no
    /// pitched material. Never fails.
    pub fn analyzed_key(&self) -> Option<&KeyEstimate> {
        self.analyzed_key
            .get_or_init(|| estimate_key(self.notes()))
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Measure, Note, Part, TimeSignature};

    fn two_part_score() -> Score {
        let mut score = Score::new();

        let mut upper = Part::named("Upper");
        let mut m = Measure::new(1);
        m.push(TimeSignature::new(4, 4));
        m.push(Note::parse("E4", 2.0).unwrap());
        m.push(Note::parse("F4", 2.0).unwrap());
        upper.push_measure(m);

        let mut lower = Part::named("Lower");
        let mut m = Measure::new(1);
        m.push(Note::parse("C3", 4.0).unwrap());
        lower.push_measure(m);

        score.push_part(upper);
        score.push_part(lower);
        score
    }

    #[test]
    fn test_flattened_is_offset_ordered() {
        let score = two_part_score();
        let view = ScoreView::new(&score);
        let offsets: Vec<f64> = view.flattened().iter().map(|i| i.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn test_chordify_sustains_held_notes() {
        let score = two_part_score();
        let view = ScoreView::new(&score);
        let slices = view.chordified();

        // Two onsets: 0.0 (E4 + C3) and 2.0 (F4 + sustained C3)
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].pitches.len(), 2);
        assert_eq!(slices[1].pitches.len(), 2);
        assert_eq!(slices[1].pitches[0].name_with_octave(), "C3");
        assert_eq!(slices[1].pitches[1].name_with_octave(), "F4");
    }

    #[test]
    fn test_chordify_memoized_same_instance() {
        let score = two_part_score();
        let view = ScoreView::new(&score);
        let first = view.chordified().as_ptr();
        let second = view.chordified().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_score_has_no_key() {
        let score = Score::new();
        let view = ScoreView::new(&score);
        assert!(view.analyzed_key().is_none());
        assert!(view.chordified().is_empty());
    }

    #[test]
    fn test_slice_span() {
        let slice = ChordSlice {
            offset: 0.0,
            pitches: vec![
                Pitch::parse("C4").unwrap(),
                Pitch::parse("E4").unwrap(),
                Pitch::parse("G4").unwrap(),
            ],
        };
        assert_eq!(slice.span(), Some(7.0));

        let single = ChordSlice {
            offset: 0.0,
            pitches: vec![Pitch::parse("C4").unwrap()],
        };
        assert_eq!(single.span(), None);
    }
}
