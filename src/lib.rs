pub mod body;
pub mod commands;
pub mod dates;
pub mod html;
pub mod labels;
pub mod models;
pub mod project;
pub mod relationships;

pub use labels::{convert_label, LabelPolicy, MappedLabelPolicy};
pub use models::{NormalizedComment, NormalizedIssue, SourceIssue};
pub use project::{Histogram, ItemOutcome, ProjectAccumulator};
