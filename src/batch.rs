//! Batch extraction
//!
//! Parallel extraction over many files with line-delimited JSON output.
//! Worker threads extract scores and stream finished records over a
//! channel to a single writer, so output arrives in completion order (one
//! valid JSON object per line, no interleaving). Consumers needing a
//! stable order sort by `file_path`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use rayon::prelude::*;

use crate::analysis::{extract_score, ExtractionStatus, FeatureRecord};
use crate::config::ExtractConfig;
use crate::error::{truncate_message, ExtractError};
use crate::score::Score;

/// Batch records keep shorter error messages than single-file runs so a
/// directory of broken files stays a readable report.
const BATCH_ERROR_CHARS: usize = 500;

/// Outcome counts of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    /// Records written.
    pub total: usize,
    /// Successfully extracted records.
    pub extracted: usize,
    /// Failed records.
    pub failed: usize,
}

/// Extract one file into a record, never panicking and never skipping the
/// file: a missing path or a parse failure becomes a `failed` record with
/// the path attached.
pub fn extract_file<P>(path: &Path, parse: P, config: &ExtractConfig) -> FeatureRecord
where
    P: FnOnce(&Path) -> Result<Score, ExtractError>,
{
    let mut record = if !path.exists() {
        let error = ExtractError::FileNotFound(path.display().to_string());
        FeatureRecord::failed(truncate_message(&error.to_string(), config.max_error_chars))
    } else {
        match parse(path) {
            Ok(score) => extract_score(&score, config),
            Err(error) => FeatureRecord::failed(truncate_message(
                &error.to_string(),
                config.max_error_chars,
            )),
        }
    };
    record.file_path = Some(path.display().to_string());
    record
}

/// Extract many files in parallel, writing one JSON record per line.
///
/// `parse` runs on worker threads and must be safe to call concurrently.
/// Records are written as workers finish; the writer is the only thread
/// touching `out`.
///
/// # Errors
///
/// Returns `ExtractError::Io` when writing a record fails. Per-file
/// extraction failures do not abort the batch; they become `failed`
/// records in the output.
pub fn extract_batch<P, W>(
    paths: &[PathBuf],
    parse: P,
    out: &mut W,
    config: &ExtractConfig,
) -> Result<BatchStats, ExtractError>
where
    P: Fn(&Path) -> Result<Score, ExtractError> + Sync,
    W: Write,
{
    let mut batch_config = config.clone();
    batch_config.max_error_chars = config.max_error_chars.min(BATCH_ERROR_CHARS);

    let mut stats = BatchStats::default();
    let (tx, rx) = mpsc::channel::<FeatureRecord>();

    std::thread::scope(|scope| -> Result<(), ExtractError> {
        let parse = &parse;
        let batch_config = &batch_config;
        scope.spawn(move || {
            paths.par_iter().for_each_with(tx, |tx, path| {
                let record = extract_file(path, parse, batch_config);
                // A closed channel means the writer bailed; stop quietly.
                let _ = tx.send(record);
            });
        });

        for record in rx {
            match record.extraction_status {
                ExtractionStatus::Failed => stats.failed += 1,
                _ => stats.extracted += 1,
            }
            stats.total += 1;
            let line = serde_json::to_string(&record)
                .map_err(|e| ExtractError::Io(e.to_string()))?;
            writeln!(out, "{}", line)?;
        }
        Ok(())
    })?;

    log::info!(
        "batch finished: {} records ({} extracted, {} failed)",
        stats.total,
        stats.extracted,
        stats.failed
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Measure, Note, Part};

    fn tiny_score() -> Score {
        let mut part = Part::named("Melody");
        let mut m = Measure::new(1);
        for name in ["C4", "E4", "G4", "C5"] {
            m.push(Note::parse(name, 1.0).unwrap());
        }
        part.push_measure(m);
        let mut score = Score::new();
        score.push_part(part);
        score
    }

    #[test]
    fn test_missing_file_becomes_failed_record() {
        let config = ExtractConfig::default();
        let record = extract_file(
            Path::new("/no/such/score.musicxml"),
            |_| Ok(tiny_score()),
            &config,
        );
        assert_eq!(record.extraction_status, ExtractionStatus::Failed);
        assert_eq!(record.file_path.as_deref(), Some("/no/such/score.musicxml"));
        assert!(record
            .extraction_error
            .as_deref()
            .unwrap()
            .contains("file not found"));
    }

    #[test]
    fn test_batch_writes_one_line_per_input() {
        let dir = std::env::temp_dir();
        let existing = dir.join("ambitus_batch_test_input.txt");
        std::fs::write(&existing, "placeholder").unwrap();

        let paths = vec![existing.clone(), PathBuf::from("/no/such/score.musicxml")];
        let mut out: Vec<u8> = Vec::new();
        let stats = extract_batch(
            &paths,
            |_| Ok(tiny_score()),
            &mut out,
            &ExtractConfig::default(),
        )
        .unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.extracted, 1);
        assert_eq!(stats.failed, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value["file_path"].is_string());
        }

        std::fs::remove_file(&existing).ok();
    }

    #[test]
    fn test_parse_failure_is_truncated() {
        let dir = std::env::temp_dir();
        let existing = dir.join("ambitus_batch_test_broken.txt");
        std::fs::write(&existing, "broken").unwrap();

        let paths = vec![existing.clone()];
        let mut out: Vec<u8> = Vec::new();
        let long = "y".repeat(2000);
        extract_batch(
            &paths,
            |_| Err(ExtractError::ParseError(long.clone())),
            &mut out,
            &ExtractConfig::default(),
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(String::from_utf8(out).unwrap().lines().next().unwrap())
                .unwrap();
        let message = value["extraction_error"].as_str().unwrap();
        assert_eq!(message.len(), 500);
        assert_eq!(value["extraction_status"], "failed");

        std::fs::remove_file(&existing).ok();
    }
}
