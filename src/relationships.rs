use std::fmt;
use thiserror::Error;

use crate::models::{IssueLinkType, LinkGroup, NormalizedIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Duplicates,
    IsDuplicatedBy,
    IsRelatedTo,
    DependsOn,
    Blocks,
}

impl Relationship {
    pub const ALL: [Relationship; 5] = [
        Relationship::Duplicates,
        Relationship::IsDuplicatedBy,
        Relationship::IsRelatedTo,
        Relationship::DependsOn,
        Relationship::Blocks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Duplicates => "duplicates",
            Relationship::IsDuplicatedBy => "is-duplicated-by",
            Relationship::IsRelatedTo => "is-related-to",
            Relationship::DependsOn => "depends-on",
            Relationship::Blocks => "blocks",
        }
    }

    /// Resolve a link description such as "is duplicated by".
    pub fn from_description(description: &str) -> Option<Self> {
        let key = description.replace(' ', "-");
        Self::ALL.into_iter().find(|rel| rel.as_str() == key)
    }

    fn targets_mut(self, issue: &mut NormalizedIssue) -> &mut Vec<String> {
        match self {
            Relationship::Duplicates => &mut issue.duplicates,
            Relationship::IsDuplicatedBy => &mut issue.is_duplicated_by,
            Relationship::IsRelatedTo => &mut issue.is_related_to,
            Relationship::DependsOn => &mut issue.depends_on,
            Relationship::Blocks => &mut issue.blocks,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    Outward,
    Inward,
}

impl LinkDirection {
    fn group(self, link_type: &IssueLinkType) -> Option<&LinkGroup> {
        match self {
            LinkDirection::Outward => link_type.outward.as_ref(),
            LinkDirection::Inward => link_type.inward.as_ref(),
        }
    }
}

impl fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkDirection::Outward => f.write_str("outward"),
            LinkDirection::Inward => f.write_str("inward"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("{direction} links of type '{link_type}' have no description")]
    MissingDescription {
        direction: LinkDirection,
        link_type: String,
    },
    #[error("{direction} link of type '{link_type}' has an empty issue key")]
    EmptyIssueKey {
        direction: LinkDirection,
        link_type: String,
    },
}

/// Append the linked keys of one direction to `issue`.
///
/// Returns the number of keys recorded. On a malformed link group the pass
/// stops and the keys appended before it stay in place.
pub fn extract_links(
    issue: &mut NormalizedIssue,
    link_types: &[IssueLinkType],
    direction: LinkDirection,
) -> Result<usize, LinkError> {
    let mut recorded = 0;

    for link_type in link_types {
        let Some(group) = direction.group(link_type) else {
            continue;
        };
        if group.issue_keys.is_empty() {
            continue;
        }

        let link_type_name = || link_type.name.clone().unwrap_or_default();
        let description = group
            .description
            .as_deref()
            .ok_or_else(|| LinkError::MissingDescription {
                direction,
                link_type: link_type_name(),
            })?;

        let Some(relationship) = Relationship::from_description(description) else {
            continue;
        };

        for key in &group.issue_keys {
            if key.trim().is_empty() {
                return Err(LinkError::EmptyIssueKey {
                    direction,
                    link_type: link_type_name(),
                });
            }
            relationship.targets_mut(issue).push(key.clone());
            recorded += 1;
        }
    }

    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_issue() -> NormalizedIssue {
        NormalizedIssue {
            title: "t".to_string(),
            key: "KEY-1".to_string(),
            body: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
            closed: false,
            closed_at: None,
            labels: vec![],
            comments: vec![],
            duplicates: vec![],
            is_duplicated_by: vec![],
            is_related_to: vec![],
            depends_on: vec![],
            blocks: vec![],
            milestone_name: None,
        }
    }

    fn group(description: Option<&str>, keys: &[&str]) -> Option<LinkGroup> {
        Some(LinkGroup {
            description: description.map(String::from),
            issue_keys: keys.iter().map(|k| k.to_string()).collect(),
        })
    }

    #[test]
    fn test_from_description() {
        assert_eq!(
            Relationship::from_description("depends on"),
            Some(Relationship::DependsOn)
        );
        assert_eq!(
            Relationship::from_description("is duplicated by"),
            Some(Relationship::IsDuplicatedBy)
        );
        assert_eq!(Relationship::from_description("blocks"), Some(Relationship::Blocks));
        assert_eq!(Relationship::from_description("is blocked by"), None);
        assert_eq!(Relationship::from_description("Depends on"), None);
    }

    #[test]
    fn test_outward_depends_on() {
        let mut issue = blank_issue();
        let links = vec![IssueLinkType {
            name: Some("Dependency".to_string()),
            outward: group(Some("depends on"), &["KEY-5"]),
            inward: group(Some("is depended on by"), &["KEY-9"]),
        }];

        let count = extract_links(&mut issue, &links, LinkDirection::Outward).unwrap();
        assert_eq!(count, 1);
        assert_eq!(issue.depends_on, vec!["KEY-5"]);
    }

    #[test]
    fn test_inward_unknown_description_ignored() {
        let mut issue = blank_issue();
        let links = vec![IssueLinkType {
            name: Some("Dependency".to_string()),
            outward: group(Some("depends on"), &["KEY-5"]),
            inward: group(Some("is depended on by"), &["KEY-9"]),
        }];

        let count = extract_links(&mut issue, &links, LinkDirection::Inward).unwrap();
        assert_eq!(count, 0);
        assert!(issue.depends_on.is_empty());
    }

    #[test]
    fn test_multiple_types_and_keys() {
        let mut issue = blank_issue();
        let links = vec![
            IssueLinkType {
                name: Some("Duplicate".to_string()),
                outward: group(Some("duplicates"), &["KEY-2", "KEY-3"]),
                inward: None,
            },
            IssueLinkType {
                name: Some("Relates".to_string()),
                outward: group(Some("is related to"), &["KEY-4"]),
                inward: None,
            },
        ];

        extract_links(&mut issue, &links, LinkDirection::Outward).unwrap();
        assert_eq!(issue.duplicates, vec!["KEY-2", "KEY-3"]);
        assert_eq!(issue.is_related_to, vec!["KEY-4"]);
    }

    #[test]
    fn test_missing_description_keeps_earlier_links() {
        let mut issue = blank_issue();
        let links = vec![
            IssueLinkType {
                name: Some("Blocks".to_string()),
                outward: group(Some("blocks"), &["KEY-7"]),
                inward: None,
            },
            IssueLinkType {
                name: Some("Broken".to_string()),
                outward: group(None, &["KEY-8"]),
                inward: None,
            },
            IssueLinkType {
                name: Some("Relates".to_string()),
                outward: group(Some("is related to"), &["KEY-4"]),
                inward: None,
            },
        ];

        let err = extract_links(&mut issue, &links, LinkDirection::Outward).unwrap_err();
        assert_eq!(
            err,
            LinkError::MissingDescription {
                direction: LinkDirection::Outward,
                link_type: "Broken".to_string(),
            }
        );
        assert_eq!(issue.blocks, vec!["KEY-7"]);
        assert!(issue.is_related_to.is_empty());
    }

    #[test]
    fn test_empty_key_is_an_error() {
        let mut issue = blank_issue();
        let links = vec![IssueLinkType {
            name: Some("Blocks".to_string()),
            outward: group(Some("blocks"), &["KEY-7", " "]),
            inward: None,
        }];

        let err = extract_links(&mut issue, &links, LinkDirection::Outward).unwrap_err();
        assert!(err.to_string().contains("empty issue key"));
        assert_eq!(issue.blocks, vec!["KEY-7"]);
    }

    #[test]
    fn test_empty_group_without_description_is_fine() {
        let mut issue = blank_issue();
        let links = vec![IssueLinkType {
            name: None,
            outward: group(None, &[]),
            inward: None,
        }];
        assert_eq!(extract_links(&mut issue, &links, LinkDirection::Outward), Ok(0));
    }
}
