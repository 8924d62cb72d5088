use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Marker label attached to every migrated issue.
pub const IMPORT_MARKER: &str = "imported-jira-issue";

/// Issue types carried over as labels, unchanged.
const KNOWN_TYPES: &[&str] = &[
    "Epic",
    "Bug",
    "Defect",
    "Enhancement",
    "Story",
    "Task",
    "Sub-task",
];

/// Decides the destination name of a raw Jira label, or drops it.
pub trait LabelPolicy {
    fn convert(&self, raw: &str) -> Option<String>;
}

/// Normalize `raw`, translate it through `mapping`, and keep it only if the
/// mapping produced it or it is listed in `approved`.
pub fn convert_label(
    raw: &str,
    mapping: &HashMap<String, String>,
    approved: &HashSet<String>,
) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(mapped) = mapping.get(&normalized) {
        let mapped = mapped.trim();
        return (!mapped.is_empty()).then(|| mapped.to_string());
    }

    approved.contains(&normalized).then_some(normalized)
}

/// Map a Jira issue type onto a label. Unknown types produce nothing.
pub fn type_label(issue_type: &str) -> Option<&'static str> {
    KNOWN_TYPES
        .iter()
        .copied()
        .find(|known| *known == issue_type.trim())
}

/// Trim a label and fold the capitalized "Bug" onto the conventional "bug".
pub fn fold_label(raw: &str) -> String {
    match raw.trim() {
        "Bug" => "bug".to_string(),
        other => other.to_string(),
    }
}

/// Policy backed by a mapping table and an allow list.
#[derive(Debug, Clone, Default)]
pub struct MappedLabelPolicy {
    mapping: HashMap<String, String>,
    approved: HashSet<String>,
}

impl MappedLabelPolicy {
    pub fn new(mapping: HashMap<String, String>, approved: HashSet<String>) -> Self {
        MappedLabelPolicy { mapping, approved }
    }

    /// Load the policy from optional mapping and allow-list files.
    ///
    /// Mapping files hold `raw=canonical` lines; allow lists hold one label
    /// per line. Blank lines and `#` comments are ignored in both.
    pub fn load(mapping_path: Option<&Path>, allowed_path: Option<&Path>) -> Result<Self> {
        let mapping = match mapping_path {
            Some(path) => {
                let contents = fs::read_to_string(path).with_context(|| {
                    format!("Failed to read labels mapping from {}", path.display())
                })?;
                parse_mapping(&contents)
                    .with_context(|| format!("Invalid labels mapping in {}", path.display()))?
            }
            None => HashMap::new(),
        };

        let approved = match allowed_path {
            Some(path) => {
                let contents = fs::read_to_string(path).with_context(|| {
                    format!("Failed to read allowed labels from {}", path.display())
                })?;
                parse_allowed(&contents)
            }
            None => HashSet::new(),
        };

        tracing::debug!(
            mapped = mapping.len(),
            approved = approved.len(),
            "loaded label policy"
        );
        Ok(MappedLabelPolicy { mapping, approved })
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.mapping
    }

    pub fn approved(&self) -> &HashSet<String> {
        &self.approved
    }
}

impl LabelPolicy for MappedLabelPolicy {
    fn convert(&self, raw: &str) -> Option<String> {
        convert_label(raw, &self.mapping, &self.approved)
    }
}

fn meaningful_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_mapping(contents: &str) -> Result<HashMap<String, String>> {
    let mut mapping = HashMap::new();
    for (line_no, line) in meaningful_lines(contents) {
        let (raw, canonical) = line
            .split_once('=')
            .with_context(|| format!("line {}: expected 'raw=canonical'", line_no))?;
        mapping.insert(raw.trim().to_lowercase(), canonical.trim().to_string());
    }
    Ok(mapping)
}

fn parse_allowed(contents: &str) -> HashSet<String> {
    meaningful_lines(contents)
        .map(|(_, line)| line.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn policy() -> MappedLabelPolicy {
        let mapping = HashMap::from([
            ("ui".to_string(), "frontend".to_string()),
            ("needs-triage".to_string(), "triage".to_string()),
        ]);
        let approved = HashSet::from(["security".to_string(), "docs".to_string()]);
        MappedLabelPolicy::new(mapping, approved)
    }

    #[test]
    fn test_convert_mapped_label() {
        assert_eq!(policy().convert("  UI "), Some("frontend".to_string()));
    }

    #[test]
    fn test_convert_approved_label() {
        assert_eq!(policy().convert("Security"), Some("security".to_string()));
    }

    #[test]
    fn test_convert_drops_unknown_label() {
        assert_eq!(policy().convert("random-tag"), None);
        assert_eq!(policy().convert("   "), None);
    }

    #[test]
    fn test_type_label_known_types() {
        for known in KNOWN_TYPES {
            assert_eq!(type_label(known), Some(*known));
        }
        assert_eq!(type_label("Improvement"), None);
        assert_eq!(type_label("bug"), None);
    }

    #[test]
    fn test_fold_label() {
        assert_eq!(fold_label(" Bug "), "bug");
        assert_eq!(fold_label("Story"), "Story");
        assert_eq!(fold_label("BUG"), "BUG");
    }

    #[test]
    fn test_load_from_files() {
        let mut mapping = NamedTempFile::new().unwrap();
        writeln!(mapping, "# label mapping").unwrap();
        writeln!(mapping, "UI = frontend").unwrap();
        writeln!(mapping).unwrap();
        let mut allowed = NamedTempFile::new().unwrap();
        writeln!(allowed, "Security\ndocs").unwrap();

        let policy = MappedLabelPolicy::load(Some(mapping.path()), Some(allowed.path())).unwrap();
        assert_eq!(policy.mapping().get("ui"), Some(&"frontend".to_string()));
        assert!(policy.approved().contains("security"));
        assert!(policy.approved().contains("docs"));
    }

    #[test]
    fn test_load_without_files_is_empty() {
        let policy = MappedLabelPolicy::load(None, None).unwrap();
        assert!(policy.mapping().is_empty());
        assert_eq!(policy.convert("anything"), None);
    }

    #[test]
    fn test_load_rejects_malformed_mapping() {
        let mut mapping = NamedTempFile::new().unwrap();
        writeln!(mapping, "ui frontend").unwrap();
        let err = MappedLabelPolicy::load(Some(mapping.path()), None).unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(MappedLabelPolicy::load(None, Some(&missing)).is_err());
    }

    proptest! {
        #[test]
        fn prop_unlisted_labels_never_survive(raw in "[a-z]{1,12}") {
            let policy = policy();
            prop_assume!(!policy.mapping().contains_key(&raw));
            prop_assume!(!policy.approved().contains(&raw));
            prop_assert_eq!(policy.convert(&raw), None);
        }
    }
}
