use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::{ingest, load_items};
use crate::labels::LabelPolicy;
use crate::models::NormalizedIssue;
use crate::project::{Histogram, ProjectAccumulator};

pub const EXPORT_VERSION: i32 = 1;

#[derive(Serialize, Deserialize)]
pub struct ExportData {
    pub version: i32,
    pub exported_at: String,
    pub project: String,
    pub milestones: Histogram,
    pub components: Histogram,
    pub labels: Histogram,
    pub types: Histogram,
    pub all_labels: Histogram,
    pub issues: Vec<NormalizedIssue>,
}

pub fn export_data<P: LabelPolicy>(accumulator: &ProjectAccumulator<P>) -> ExportData {
    ExportData {
        version: EXPORT_VERSION,
        exported_at: chrono::Utc::now().to_rfc3339(),
        project: accumulator.name().to_string(),
        milestones: accumulator.milestones().clone(),
        components: accumulator.components().clone(),
        labels: accumulator.labels().clone(),
        types: accumulator.types().clone(),
        all_labels: accumulator.all_labels(),
        issues: accumulator.issues().to_vec(),
    }
}

pub fn run<P: LabelPolicy>(
    accumulator: &mut ProjectAccumulator<P>,
    input: &Path,
    output_path: Option<&Path>,
    summary: bool,
) -> Result<()> {
    let items = load_items(input)?;
    ingest(accumulator, &items)?;

    let data = export_data(accumulator);
    let json = serde_json::to_string_pretty(&data)?;

    match output_path {
        Some(path) => {
            fs::write(path, json).context("Failed to write export file")?;
            eprintln!("Exported {} issues to {}", data.issues.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    if summary {
        accumulator.prettify(&mut io::stderr().lock())?;
    }
    Ok(())
}
