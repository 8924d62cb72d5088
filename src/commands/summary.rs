use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;

use super::{ingest, load_items};
use crate::labels::LabelPolicy;
use crate::project::ProjectAccumulator;

/// Dry run: ingest the records and print the histograms only.
pub fn run<P: LabelPolicy>(accumulator: &mut ProjectAccumulator<P>, input: &Path) -> Result<()> {
    let items = load_items(input)?;
    let stats = ingest(accumulator, &items)?;

    let mut stdout = io::stdout().lock();
    accumulator.prettify(&mut stdout)?;
    if stats.skipped > 0 {
        writeln!(stdout, "Skipped {} records from other projects", stats.skipped)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::IngestStats;
    use crate::labels::MappedLabelPolicy;
    use std::fs;
    use tempfile::tempdir;

    fn accumulator() -> ProjectAccumulator {
        ProjectAccumulator::new(
            "PROJ",
            "3",
            "https://issues.example.org",
            MappedLabelPolicy::default(),
        )
    }

    #[test]
    fn test_summary_counts_skipped() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("items.json");
        fs::write(
            &input,
            r#"[
                {"key": "PROJ-1", "created": "2024-01-01", "updated": "2024-01-02", "type": "Task"},
                {"key": "OTHER-1", "created": "2024-01-01", "updated": "2024-01-02"}
            ]"#,
        )
        .unwrap();

        let mut acc = accumulator();
        run(&mut acc, &input).unwrap();
        assert_eq!(acc.issues().len(), 1);
        assert_eq!(acc.types().get("Task"), Some(&1));
    }

    #[test]
    fn test_ingest_stats() {
        let items = vec![
            crate::models::SourceIssue {
                key: "PROJ-1".to_string(),
                created: Some("2024-01-01".to_string()),
                updated: Some("2024-01-01".to_string()),
                ..Default::default()
            },
            crate::models::SourceIssue {
                key: "ELSE-1".to_string(),
                ..Default::default()
            },
        ];
        let stats = ingest(&mut accumulator(), &items).unwrap();
        assert_eq!(stats, IngestStats { added: 1, skipped: 1 });
    }

    #[test]
    fn test_summary_missing_input() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = run(&mut accumulator(), &missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
