use chrono::NaiveDate;

use crate::dates;
use crate::html::decode_entities;
use crate::models::SourceIssue;

pub const EPIC_LINK_FIELD: &str = "customfield_10014";
pub const SPRINT_FIELD: &str = "customfield_10021";
pub const STORY_POINTS_FIELD: &str = "customfield_10024";

const CUSTOM_FIELD_ROWS: &[(&str, &str)] = &[
    ("Epic Link", EPIC_LINK_FIELD),
    ("Sprint", SPRINT_FIELD),
    ("Story Points", STORY_POINTS_FIELD),
];

/// Link targets used in the footer.
pub struct JiraLinks<'a> {
    pub base_url: &'a str,
}

impl JiraLinks<'_> {
    pub fn profile(&self, user: &str) -> String {
        format!("{}/secure/ViewProfile.jspa?name={}", self.base_url, user)
    }

    pub fn browse(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    pub fn user_anchor(&self, user: &str) -> String {
        format!(
            "<a title=\"{user}\" href=\"{href}\">{user}</a>",
            user = user,
            href = self.profile(user)
        )
    }
}

/// Strip the `[PROJECT] ` prefix Jira puts on exported titles.
pub fn display_title(title: &str) -> &str {
    match title.split_once("] ") {
        Some((_, rest)) => rest,
        None => title,
    }
}

/// Build the full body for `item`.
///
/// Each metadata row is emitted only when its source field is present, so one
/// missing field never hides another.
pub fn synthesize(item: &SourceIssue, links: &JiraLinks<'_>, imported_on: NaiveDate) -> String {
    let mut body = decode_entities(item.description.as_deref());

    let reporter = item
        .reporter
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or("Unknown");
    let title = item.title.as_deref().unwrap_or_default();

    body.push_str(&format!(
        "\n\n---\n<details><summary><i>Originally reported by {}, imported from: \
         <a href=\"{}\" target=\"_blank\">{}</a></i></summary>",
        links.user_anchor(reporter),
        links.browse(&item.key),
        display_title(title)
    ));
    body.push_str("\n<i><ul>");

    if let Some(assignee) = item
        .assignee
        .as_deref()
        .filter(|a| !a.is_empty() && *a != "Unassigned")
    {
        body.push_str(&format!(
            "\n<li><b>assignee</b>: {}</li>",
            links.user_anchor(assignee)
        ));
    }

    let simple_rows = [
        ("type", item.issue_type.as_deref()),
        ("status", item.status.as_deref()),
        ("priority", item.priority.as_deref()),
        ("resolution", item.resolution.as_deref()),
    ];
    for (name, value) in simple_rows {
        if let Some(value) = value {
            body.push_str(&format!("\n<li><b>{}</b>: {}</li>", name, value));
        }
    }

    if let Some(raw) = item.resolved.as_deref() {
        match dates::to_iso(raw) {
            Ok(resolved) => {
                body.push_str(&format!("\n<li><b>resolved</b>: {}</li>", resolved));
            }
            Err(err) => tracing::debug!(key = %item.key, error = %err, "skipping resolved date"),
        }
    }

    body.push_str(&format!(
        "\n<li><b>imported</b>: {}</li>",
        imported_on.format("%Y-%m-%d")
    ));

    for (label, field_id) in CUSTOM_FIELD_ROWS {
        if let Some(value) = item.custom_field(field_id) {
            body.push_str(&format!("\n<li><b>{}</b>: {}</li>", label, value));
        }
    }

    body.push_str("\n</ul></i>\n</details>");
    body
}
