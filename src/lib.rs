//! # ambitus
//!
//! Feature extraction for symbolic music scores. Takes a parsed score
//! (parts, measures, notes, and notation marks) and produces a flat,
//! JSON-serializable record of musical features: pitch ranges, tempo and
//! duration, key and modulations, melodic intervals, texture and
//! voice-leading, chromaticism, notation inventory, and a heuristic
//! difficulty estimate.
//!
//! Extraction is resilient by design: each feature group is computed
//! independently, and a failing analyzer downgrades to a warning on the
//! record instead of aborting the run. Only setup failures (missing file,
//! unparseable input) produce a `failed` record.
//!
//! ## Example
//!
//! ```
//! use ambitus::{extract_score, ExtractConfig};
//! use ambitus::score::{Measure, Note, Part, Score, TimeSignature};
//!
//! let mut part = Part::named("Melody");
//! let mut measure = Measure::new(1);
//! measure.push(TimeSignature::new(4, 4));
//! for name in ["C4", "D4", "E4", "F4"] {
//!     measure.push(Note::parse(name, 1.0).unwrap());
//! }
//! part.push_measure(measure);
//! let mut score = Score::new();
//! score.push_part(part);
//!
//! let record = extract_score(&score, &ExtractConfig::default());
//! assert_eq!(record.lowest_pitch.as_deref(), Some("C4"));
//! assert_eq!(record.highest_pitch.as_deref(), Some("F4"));
//! ```
//!
//! Batches run in parallel and stream one JSON record per line; see
//! [`batch::extract_batch`].

#![warn(missing_docs)]

pub mod analysis;
pub mod batch;
pub mod config;
pub mod error;
pub mod features;
pub mod score;
pub mod view;

pub use analysis::{extract_score, ExtractionStatus, FeatureRecord, PitchSpan, Tessitura};
pub use batch::{extract_batch, extract_file, BatchStats};
pub use config::ExtractConfig;
pub use error::ExtractError;
pub use score::Score;
pub use view::ScoreView;
