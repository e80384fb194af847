use clap::{Args, Parser, Subcommand, ValueEnum};
use insights_core::api::models::Audience;
use insights_core::core::query::{ALLOWED_PAGE_SIZES, PageSize, StatusFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "insights")]
#[command(about = "Command line console for account insights, dashboards and CSV ingestion")]
#[command(version)]
#[command(after_help = "Examples:
  insights login --email lead@example.com     # Get an access token
  insights accounts --search acme             # First page of matching accounts
  insights accounts --status active --sort-by records --sort-dir desc
  insights explore                            # Interactive accounts explorer
  insights summary --audience account_manager # Action lists for account managers
  insights analytics --limit 5                # Charts with the top 5 workflows
  insights ingest upload export.csv           # Replace the dataset

Environment Variables:
  INSIGHTS_TOKEN   Bearer token from 'insights login'
  INSIGHTS_URL     Insights server URL
  RUST_LOG         Log filter, e.g. insights_core=debug")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Insights server URL (overrides INSIGHTS_URL and the config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Bearer token (overrides INSIGHTS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration management (show, set, validate)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Exchange email and password for an access token
    #[command(after_help = "Examples:
  insights login --email lead@example.com
  export INSIGHTS_TOKEN=<printed token>")]
    Login {
        /// Account email
        #[arg(long)]
        email: String,
    },
    /// List one page of accounts
    Accounts(AccountsArgs),
    /// Browse accounts interactively with live search
    Explore(ExploreArgs),
    /// Dashboard summary for an audience
    Summary {
        /// leadership or account_manager
        #[arg(long, default_value = "leadership")]
        audience: Audience,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Subscription, notification, workflow and usage charts
    Analytics {
        /// Number of workflows in the top-workflows chart (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: Option<u32>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// CSV ingestion
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set configuration values (the server URL comes from --url)
    #[command(after_help = "Examples:
  insights config set --url http://localhost:8000
  insights config set --page-size 50 --debounce-ms 500")]
    Set {
        /// Initial page size of the explorer
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<u32>,
        /// Quiet period for live search, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
        /// Default length of the top-workflows chart
        #[arg(long)]
        top_workflows_limit: Option<u32>,
    },
    /// Validate configuration and test the connection
    Validate,
}

#[derive(Subcommand, Debug)]
pub enum IngestCommands {
    /// Upload a CSV export, replacing the current dataset
    Upload {
        /// Path to a .csv file (max 50 MiB)
        file: PathBuf,
    },
    /// Reload the server's bundled sample data
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// One-shot account listing
#[derive(Args, Debug)]
#[command(after_help = "Examples:
  insights accounts --search acme
  insights accounts --workflow Onboarding --status active
  insights accounts --sort-by messages --sort-dir desc --page 2 --page-size 50
  insights accounts --account 0f3c... --format json")]
pub struct AccountsArgs {
    /// Substring match on the account label
    #[arg(long, help_heading = "Filters")]
    pub search: Option<String>,

    /// active, inactive or all
    #[arg(long, default_value = "all", help_heading = "Filters")]
    pub status: StatusFilter,

    /// Exact account identifier
    #[arg(long, help_heading = "Filters")]
    pub account: Option<String>,

    /// Workflow title
    #[arg(long, help_heading = "Filters")]
    pub workflow: Option<String>,

    /// Column to sort by (label, records, automations, messages, notifications, billed)
    #[arg(long, default_value = "account_label", help_heading = "Sorting")]
    pub sort_by: String,

    /// Sort direction
    #[arg(long, default_value = "asc", value_parser = ["asc", "desc"], help_heading = "Sorting")]
    pub sort_dir: String,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Paging")]
    pub page: u32,

    /// Rows per page: 5, 10, 25, 50 or 100
    #[arg(long, value_parser = parse_page_size, help_heading = "Paging")]
    pub page_size: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, help_heading = "Output")]
    pub format: OutputFormat,
}

/// Interactive explorer options
#[derive(Args, Debug)]
pub struct ExploreArgs {
    /// Open the explorer filtered to one account identifier
    #[arg(long)]
    pub account: Option<String>,

    /// Rows per page: 5, 10, 25, 50 or 100
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<u32>,
}

fn parse_page_size(value: &str) -> Result<u32, String> {
    let size: u32 = value
        .parse()
        .map_err(|_| format!("Invalid page size '{}'", value))?;
    PageSize::new(size).map(PageSize::get).ok_or_else(|| {
        format!(
            "Invalid page size {}: expected one of {:?}",
            size, ALLOWED_PAGE_SIZES
        )
    })
}
