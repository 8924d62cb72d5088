use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::body::{self, JiraLinks};
use crate::dates;
use crate::html::decode_entities;
use crate::labels::{fold_label, type_label, LabelPolicy, MappedLabelPolicy, IMPORT_MARKER};
use crate::models::{NormalizedComment, NormalizedIssue, SourceIssue};
use crate::relationships::{extract_links, LinkDirection};

/// Label text to number of source fields it was seen in.
pub type Histogram = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Added,
    Skipped { item_project: String },
}

pub struct ProjectAccumulator<P = MappedLabelPolicy> {
    name: String,
    done_status_category_id: String,
    base_url: String,
    imported_on: NaiveDate,
    policy: P,
    milestones: Histogram,
    components: Histogram,
    labels: Histogram,
    types: Histogram,
    issues: Vec<NormalizedIssue>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Project key of `item`: the explicit project, else the key prefix.
pub fn project_for(item: &SourceIssue) -> &str {
    match present(&item.project) {
        Some(project) => project,
        None => item
            .key
            .split_once('-')
            .map(|(prefix, _)| prefix)
            .unwrap_or(item.key.as_str()),
    }
}

impl<P: LabelPolicy> ProjectAccumulator<P> {
    pub fn new(
        name: impl Into<String>,
        done_status_category_id: impl Into<String>,
        base_url: impl Into<String>,
        policy: P,
    ) -> Self {
        let base_url: String = base_url.into();
        ProjectAccumulator {
            name: name.into(),
            done_status_category_id: done_status_category_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            imported_on: Local::now().date_naive(),
            policy,
            milestones: Histogram::new(),
            components: Histogram::new(),
            labels: Histogram::new(),
            types: Histogram::new(),
            issues: Vec::new(),
        }
    }

    /// Pin the date written into each body's "imported" row.
    pub fn with_import_date(mut self, imported_on: NaiveDate) -> Self {
        self.imported_on = imported_on;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn milestones(&self) -> &Histogram {
        &self.milestones
    }

    pub fn components(&self) -> &Histogram {
        &self.components
    }

    pub fn labels(&self) -> &Histogram {
        &self.labels
    }

    pub fn types(&self) -> &Histogram {
        &self.types
    }

    pub fn issues(&self) -> &[NormalizedIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<NormalizedIssue> {
        self.issues
    }

    /// Every label the project knows of: components, labels, types and the
    /// import marker. Later sources win on equal keys.
    pub fn all_labels(&self) -> Histogram {
        let mut merged = self.components.clone();
        merged.extend(self.labels.iter().map(|(k, v)| (k.clone(), *v)));
        merged.extend(self.types.iter().map(|(k, v)| (k.clone(), *v)));
        merged.insert(IMPORT_MARKER.to_string(), 0);
        merged
    }

    /// Declared labels plus the import marker.
    pub fn labels_only(&self) -> Histogram {
        let mut merged = self.labels.clone();
        merged.insert(IMPORT_MARKER.to_string(), 0);
        merged
    }

    /// Convert one source record and fold it into the project.
    ///
    /// Records of other projects are skipped. A missing or unparseable
    /// created/updated timestamp is an error and leaves the accumulator
    /// untouched.
    pub fn add_item(&mut self, item: &SourceIssue) -> Result<ItemOutcome> {
        let item_project = project_for(item);
        if item_project != self.name {
            tracing::warn!(
                key = %item.key,
                item_project,
                project = %self.name,
                "skipping item for another project"
            );
            return Ok(ItemOutcome::Skipped {
                item_project: item_project.to_string(),
            });
        }

        let converted: Vec<String> = item
            .labels
            .iter()
            .filter_map(|raw| self.policy.convert(raw))
            .collect();

        let mut issue = self.draft_issue(item, &converted)?;
        self.add_hierarchy_notes(item, &mut issue);
        self.add_comments(item, &mut issue);
        self.add_relationships(item, &mut issue);
        self.record_aggregates(item, &converted, &mut issue);

        self.issues.push(issue);
        Ok(ItemOutcome::Added)
    }

    fn draft_issue(&self, item: &SourceIssue, converted: &[String]) -> Result<NormalizedIssue> {
        let created_at = item
            .created
            .as_deref()
            .with_context(|| format!("{} has no created timestamp", item.key))
            .and_then(dates::to_iso)
            .with_context(|| format!("Invalid created timestamp on {}", item.key))?;
        let updated_at = item
            .updated
            .as_deref()
            .with_context(|| format!("{} has no updated timestamp", item.key))
            .and_then(dates::to_iso)
            .with_context(|| format!("Invalid updated timestamp on {}", item.key))?;

        let closed = item.status_category_id.as_deref().map(str::trim)
            == Some(self.done_status_category_id.as_str());
        let closed_at = if closed {
            item.resolved
                .as_deref()
                .and_then(|raw| dates::to_iso(raw).ok())
        } else {
            None
        };

        let links = JiraLinks {
            base_url: &self.base_url,
        };
        let body = body::synthesize(item, &links, self.imported_on);

        let own_labels = item
            .issue_type
            .as_deref()
            .and_then(type_label)
            .map(String::from)
            .into_iter()
            .chain(converted.iter().cloned())
            .chain(std::iter::once(IMPORT_MARKER.to_string()));

        let mut labels: Vec<String> = self.all_labels().into_keys().collect();
        for label in own_labels {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }

        Ok(NormalizedIssue {
            title: present(&item.title)
                .unwrap_or(item.key.as_str())
                .to_string(),
            key: item.key.clone(),
            body,
            created_at,
            updated_at,
            closed,
            closed_at,
            labels,
            comments: Vec::new(),
            duplicates: Vec::new(),
            is_duplicated_by: Vec::new(),
            is_related_to: Vec::new(),
            depends_on: Vec::new(),
            blocks: Vec::new(),
            milestone_name: None,
        })
    }

    fn add_hierarchy_notes(&self, item: &SourceIssue, issue: &mut NormalizedIssue) {
        let subtasks: String = item
            .subtasks
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(|key| format!("- {}\n", key))
            .collect();
        if !subtasks.is_empty() {
            tracing::debug!(key = %item.key, subtasks = %subtasks.trim_end(), "recording subtasks");
            issue.comments.push(NormalizedComment {
                created_at: issue.created_at.clone(),
                body: format!("Subtasks:\n\n{}", subtasks),
            });
        }

        if let Some(parent) = present(&item.parent) {
            tracing::debug!(key = %item.key, parent, "recording parent task");
            issue.comments.push(NormalizedComment {
                created_at: issue.created_at.clone(),
                body: format!("Subtask of parent task {}", parent),
            });
        }
    }

    fn add_comments(&self, item: &SourceIssue, issue: &mut NormalizedIssue) {
        let links = JiraLinks {
            base_url: &self.base_url,
        };
        for comment in &item.comments {
            let created_at = match present(&comment.created).map(dates::to_iso) {
                Some(Ok(created_at)) => created_at,
                Some(Err(err)) => {
                    tracing::warn!(
                        key = %item.key,
                        error = %err,
                        "comment timestamp unreadable, using issue creation time"
                    );
                    issue.created_at.clone()
                }
                None => {
                    tracing::warn!(
                        key = %item.key,
                        "comment has no timestamp, using issue creation time"
                    );
                    issue.created_at.clone()
                }
            };
            let author = present(&comment.author).unwrap_or("Unknown");
            issue.comments.push(NormalizedComment {
                created_at,
                body: format!(
                    "<i><a href=\"{}\">{}</a>:</i>\n{}",
                    links.profile(author),
                    author,
                    decode_entities(comment.body.as_deref())
                ),
            });
        }
    }

    fn add_relationships(&self, item: &SourceIssue, issue: &mut NormalizedIssue) {
        for direction in [LinkDirection::Outward, LinkDirection::Inward] {
            match extract_links(issue, &item.issue_links, direction) {
                Ok(0) => {}
                Ok(count) => {
                    tracing::debug!(key = %item.key, %direction, count, "recorded relationships")
                }
                Err(err) => tracing::warn!(
                    key = %item.key,
                    error = %err,
                    "abandoning relationship extraction"
                ),
            }
        }
    }

    fn record_aggregates(
        &mut self,
        item: &SourceIssue,
        converted: &[String],
        issue: &mut NormalizedIssue,
    ) {
        if let Some(fix_version) = present(&item.fix_version) {
            *self.milestones.entry(fix_version.to_string()).or_default() += 1;
            issue.milestone_name = Some(fix_version.to_string());
        }

        if let Some(component) = present(&item.component) {
            *self.components.entry(component.to_string()).or_default() += 1;
            issue.labels.push(fold_label(component));
        }

        for label in converted {
            *self.labels.entry(label.clone()).or_default() += 1;
            issue.labels.push(fold_label(label));
        }

        if let Some(issue_type) = present(&item.issue_type) {
            *self.types.entry(issue_type.to_string()).or_default() += 1;
            issue.labels.push(fold_label(issue_type));
        }
    }

    /// Write the histograms as a bar chart.
    pub fn prettify<W: Write>(&self, out: &mut W) -> io::Result<()> {
        fn hist<W: Write>(out: &mut W, histogram: &Histogram) -> io::Result<()> {
            for (key, count) in histogram {
                writeln!(
                    out,
                    "{:>30} ({:>5}): {}",
                    key,
                    count,
                    "#".repeat(*count as usize)
                )?;
            }
            writeln!(out)
        }

        writeln!(out, "{}:", self.name)?;
        writeln!(out, "  Milestones:")?;
        hist(out, &self.milestones)?;
        writeln!(out, "  Types:")?;
        hist(out, &self.types)?;
        writeln!(out, "  Components:")?;
        hist(out, &self.components)?;
        writeln!(out, "  Labels:")?;
        hist(out, &self.labels)?;
        writeln!(out)?;
        writeln!(out, "Total Issues to Import: {}", self.issues.len())
    }
}
