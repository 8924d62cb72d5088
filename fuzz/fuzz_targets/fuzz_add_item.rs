#![no_main]

//! Fuzz target for record conversion.
//!
//! Every optional field of a source record may be missing or hold arbitrary
//! text. Conversion may reject a record with an error, but must never panic,
//! and a converted record must serialize.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use jira_migrate::models::{CustomField, IssueLinkType, LinkGroup, SourceComment, SourceIssue};
use jira_migrate::{MappedLabelPolicy, ProjectAccumulator};

#[derive(Arbitrary, Debug)]
struct LinkInput {
    description: Option<String>,
    keys: Vec<String>,
    inward: bool,
}

#[derive(Arbitrary, Debug)]
struct ItemInput {
    key_suffix: String,
    title: Option<String>,
    status_category_id: Option<String>,
    description: Option<String>,
    reporter: Option<String>,
    assignee: Option<String>,
    issue_type: Option<String>,
    created: Option<String>,
    updated: Option<String>,
    resolved: Option<String>,
    component: Option<String>,
    labels: Vec<String>,
    custom_value: Option<String>,
    subtasks: Vec<String>,
    parent: Option<String>,
    comments: Vec<(Option<String>, Option<String>, Option<String>)>,
    links: Vec<LinkInput>,
    use_valid_dates: bool,
}

fuzz_target!(|input: ItemInput| {
    let (created, updated) = if input.use_valid_dates {
        (
            Some("Tue, 5 Mar 2019 10:23:45 +0000".to_string()),
            Some("2019-03-06T11:00:00Z".to_string()),
        )
    } else {
        (input.created, input.updated)
    };

    let item = SourceIssue {
        key: format!("FUZZ-{}", input.key_suffix),
        title: input.title,
        status_category_id: input.status_category_id,
        description: input.description,
        reporter: input.reporter,
        assignee: input.assignee,
        issue_type: input.issue_type,
        created,
        updated,
        resolved: input.resolved,
        component: input.component,
        labels: input.labels,
        custom_fields: vec![CustomField {
            id: "customfield_10024".to_string(),
            name: None,
            values: input.custom_value.into_iter().collect(),
        }],
        subtasks: input.subtasks,
        parent: input.parent,
        comments: input
            .comments
            .into_iter()
            .map(|(author, created, body)| SourceComment {
                author,
                created,
                body,
            })
            .collect(),
        issue_links: input
            .links
            .into_iter()
            .map(|link| {
                let group = Some(LinkGroup {
                    description: link.description,
                    issue_keys: link.keys,
                });
                if link.inward {
                    IssueLinkType {
                        name: None,
                        outward: None,
                        inward: group,
                    }
                } else {
                    IssueLinkType {
                        name: None,
                        outward: group,
                        inward: None,
                    }
                }
            })
            .collect(),
        ..Default::default()
    };

    let mut accumulator = ProjectAccumulator::new(
        "FUZZ",
        "3",
        "https://jira.example",
        MappedLabelPolicy::default(),
    );
    if accumulator.add_item(&item).is_ok() {
        for issue in accumulator.issues() {
            let _ = serde_json::to_string(issue);
        }
        let mut sink = Vec::new();
        let _ = accumulator.prettify(&mut sink);
    }
});
