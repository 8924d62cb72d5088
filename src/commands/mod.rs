pub mod migrate;
pub mod summary;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::labels::LabelPolicy;
use crate::models::SourceIssue;
use crate::project::{ItemOutcome, ProjectAccumulator};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub added: usize,
    pub skipped: usize,
}

/// Read a JSON array of exported Jira records.
pub fn load_items(path: &Path) -> Result<Vec<SourceIssue>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse Jira records from {}", path.display()))
}

/// Feed every record to the accumulator, stopping at the first fatal one.
pub fn ingest<P: LabelPolicy>(
    accumulator: &mut ProjectAccumulator<P>,
    items: &[SourceIssue],
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    for item in items {
        let outcome = accumulator
            .add_item(item)
            .with_context(|| format!("Failed to convert {}", item.key))?;
        match outcome {
            ItemOutcome::Added => stats.added += 1,
            ItemOutcome::Skipped { .. } => stats.skipped += 1,
        }
    }
    tracing::info!(
        project = accumulator.name(),
        added = stats.added,
        skipped = stats.skipped,
        "ingested records"
    );
    Ok(stats)
}
