//! Batch-extract features from serialized score files.
//!
//! Each input file holds one JSON-serialized `Score`; one feature record
//! per input is written to stdout as line-delimited JSON.
//!
//! Run with: cargo run --example batch_extract -- score1.json score2.json

use std::path::PathBuf;

use ambitus::score::Score;
use ambitus::{extract_batch, ExtractConfig, ExtractError};

fn main() {
    env_logger::init();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: batch_extract <score.json>...");
        std::process::exit(2);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let stats = extract_batch(
        &paths,
        |path| {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ExtractError::ParseError(e.to_string()))?;
            serde_json::from_str::<Score>(&text)
                .map_err(|e| ExtractError::ParseError(e.to_string()))
        },
        &mut out,
        &ExtractConfig::default(),
    )
    .expect("batch output failed");

    eprintln!(
        "{} records ({} extracted, {} failed)",
        stats.total, stats.extracted, stats.failed
    );
}
