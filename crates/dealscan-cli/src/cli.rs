//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Dealscan - Pull contract terms out of closed CRM deals.
#[derive(Debug, Parser)]
#[command(name = "dealscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// Model backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderArg {
    /// AWS Bedrock
    Bedrock,
    /// Local Ollama
    Ollama,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List recently closed opportunities
    Opportunities(ListArgs),

    /// Search closed opportunities by name
    Search(SearchArgs),

    /// List closed opportunities that have attached files
    Files(ListArgs),

    /// Download a document and print its text
    Text(TextArgs),

    /// Extract effective date and total amount from a contract
    Extract(ExtractArgs),

    /// Show or refresh the access token status
    Token(TokenArgs),

    /// Manage org profiles
    Profile(ProfileArgs),
}

/// Arguments for listing commands.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Maximum number of opportunities (defaults to the configured limit)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Text contained in the opportunity name
    pub term: String,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the text command.
#[derive(Debug, Parser)]
pub struct TextArgs {
    /// Content document id
    pub document_id: String,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Opportunity to analyze (skips the opportunity prompt)
    #[arg(short, long)]
    pub opportunity: Option<String>,

    /// Content document to analyze directly (skips the CRM listing)
    #[arg(short, long, conflicts_with = "opportunity")]
    pub document: Option<String>,

    /// Send the PDF itself instead of its extracted text
    #[arg(long)]
    pub attach: bool,

    /// Number of opportunities to consider
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Model backend (overrides the configured one)
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,
}

/// Arguments for the token command.
#[derive(Debug, Parser)]
pub struct TokenArgs {
    /// Exchange credentials for a new token first
    #[arg(short, long)]
    pub refresh: bool,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Instance URL (e.g. https://acme.my.salesforce.com)
        #[arg(short, long)]
        instance_url: Option<String>,
        /// Login domain used without an instance URL (login or test)
        #[arg(short, long)]
        login_domain: Option<String>,
        /// REST API version
        #[arg(short, long)]
        api_version: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Bedrock => crate::config::ProviderKind::Bedrock,
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
        }
    }
}
