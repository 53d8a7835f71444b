// CSV export of a scored batch.
//
// One row per ranked candidate. The column set and ordering are a contract
// with downstream dashboard/export consumers: identical input and weights
// must produce an identical file, so everything here is derived from the
// already-deterministic ranking.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::ScoringOutcome;

/// Fixed column order for the export.
pub const COLUMNS: &[&str] = &[
    "rank",
    "candidate",
    "final_score",
    "semantic_score",
    "must_have_score",
    "nice_to_have_score",
    "consistency_penalty",
    "missing_must_have",
    "flags",
];

/// Write the ranked candidates as CSV to any writer.
pub fn write_csv<W: Write>(writer: W, outcome: &ScoringOutcome) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(COLUMNS)?;

    for (i, candidate) in outcome.ranked.iter().enumerate() {
        let flags: Vec<&str> = candidate.flags.iter().map(|f| f.kind()).collect();
        out.write_record(&[
            (i + 1).to_string(),
            candidate.id.clone(),
            format!("{:.4}", candidate.final_score),
            format!("{:.4}", candidate.semantic_score),
            format!("{:.4}", candidate.coverage.must_have_score),
            format!("{:.4}", candidate.coverage.nice_to_have_score),
            format!("{:.4}", candidate.consistency_penalty),
            candidate.coverage.missing_must_have.join("; "),
            flags.join("; "),
        ])?;
    }

    out.flush()?;
    Ok(())
}

/// Write the export to a file path.
pub fn write_csv_file(path: &Path, outcome: &ScoringOutcome) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating export file {}", path.display()))?;
    write_csv(file, outcome)
}
