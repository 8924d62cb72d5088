use serde::{Deserialize, Serialize};

/// One exported Jira issue as handed over by the XML reader.
///
/// Every field besides `key` may be missing from an export; absence is never
/// an error on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceIssue {
    pub key: String,
    pub title: Option<String>,
    /// Explicit project key; falls back to the key prefix when absent.
    pub project: Option<String>,
    pub status: Option<String>,
    pub status_category_id: Option<String>,
    pub description: Option<String>,
    pub reporter: Option<String>,
    pub assignee: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub resolution: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolved: Option<String>,
    pub fix_version: Option<String>,
    pub component: Option<String>,
    pub labels: Vec<String>,
    pub custom_fields: Vec<CustomField>,
    pub subtasks: Vec<String>,
    pub parent: Option<String>,
    pub comments: Vec<SourceComment>,
    pub issue_links: Vec<IssueLinkType>,
}

impl SourceIssue {
    /// First value of the custom field with the given id, if it has a
    /// non-empty one.
    pub fn custom_field(&self, id: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|field| field.id == id)
            .and_then(|field| field.values.first())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomField {
    pub id: String,
    pub name: Option<String>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceComment {
    pub author: Option<String>,
    pub created: Option<String>,
    pub body: Option<String>,
}

/// Links of one link type (e.g. "Blocks"), split by direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueLinkType {
    pub name: Option<String>,
    pub outward: Option<LinkGroup>,
    pub inward: Option<LinkGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkGroup {
    /// Human readable relation, e.g. "depends on" or "is duplicated by".
    pub description: Option<String>,
    pub issue_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedComment {
    pub created_at: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedIssue {
    pub title: String,
    pub key: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    pub labels: Vec<String>,
    pub comments: Vec<NormalizedComment>,
    pub duplicates: Vec<String>,
    #[serde(rename = "is-duplicated-by")]
    pub is_duplicated_by: Vec<String>,
    #[serde(rename = "is-related-to")]
    pub is_related_to: Vec<String>,
    #[serde(rename = "depends-on")]
    pub depends_on: Vec<String>,
    pub blocks: Vec<String>,
    /// Trimmed fixVersion, for the uploader to attach milestones. Never serialized.
    #[serde(skip)]
    pub milestone_name: Option<String>,
}
