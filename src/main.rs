use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jira_migrate::commands;
use jira_migrate::{MappedLabelPolicy, ProjectAccumulator};

#[derive(Parser)]
#[command(name = "jira-migrate")]
#[command(about = "Convert exported Jira issues into import-ready records")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert exported records and write the import payload as JSON
    Migrate {
        /// JSON file with the exported Jira records
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print label and milestone histograms to stderr afterwards
        #[arg(short, long)]
        summary: bool,
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Print label and milestone histograms without writing anything
    Summary {
        /// JSON file with the exported Jira records
        input: PathBuf,
        #[command(flatten)]
        project: ProjectArgs,
    },
}

#[derive(Args)]
struct ProjectArgs {
    /// Jira project key to migrate
    #[arg(short, long, env = "JIRA_MIGRATION_PROJECT")]
    project: String,
    /// Status category id that marks an issue as done
    #[arg(long, env = "JIRA_MIGRATION_DONE_STATUS_CATEGORY_ID", default_value = "3")]
    done_status_category: String,
    /// Jira base URL used for profile and issue links
    #[arg(long, env = "JIRA_MIGRATION_BASE_URL")]
    base_url: String,
    /// File of `raw=canonical` label translations
    #[arg(long, env = "JIRA_MIGRATION_LABELS_MAPPING")]
    labels_mapping: Option<PathBuf>,
    /// File listing labels allowed through unmapped, one per line
    #[arg(long, env = "JIRA_MIGRATION_ALLOWED_LABELS")]
    allowed_labels: Option<PathBuf>,
    /// Date recorded as "imported" in issue bodies (YYYY-MM-DD, default today)
    #[arg(long)]
    imported_on: Option<String>,
}

impl ProjectArgs {
    fn accumulator(&self) -> Result<ProjectAccumulator> {
        let policy =
            MappedLabelPolicy::load(self.labels_mapping.as_deref(), self.allowed_labels.as_deref())?;
        let accumulator = ProjectAccumulator::new(
            self.project.as_str(),
            self.done_status_category.as_str(),
            self.base_url.as_str(),
            policy,
        );

        match &self.imported_on {
            Some(date) => {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .with_context(|| format!("Invalid --imported-on date '{}'", date))?;
                Ok(accumulator.with_import_date(date))
            }
            None => Ok(accumulator),
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Migrate {
            input,
            output,
            summary,
            project,
        } => {
            let mut accumulator = project.accumulator()?;
            commands::migrate::run(&mut accumulator, &input, output.as_deref(), summary)
        }

        Commands::Summary { input, project } => {
            let mut accumulator = project.accumulator()?;
            commands::summary::run(&mut accumulator, &input)
        }
    }
}
