//! Dealscan CLI - Contract terms from closed CRM deals.

use clap::Parser;
use dealscan_cli::commands;
use dealscan_cli::prompt::ConsoleSelector;
use dealscan_cli::{app, Cli, Command, Config, Environment, Formatter, Resolved};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> dealscan_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);
    execute(cli.command, &mut config, &formatter).await
}

fn resolve(config: &Config) -> dealscan_cli::Result<Resolved> {
    config.resolve(&Environment::from_process())
}

async fn execute(
    command: Command,
    config: &mut Config,
    formatter: &Formatter,
) -> dealscan_cli::Result<()> {
    let default_limit = config.settings.default_limit;

    match command {
        Command::Profile(args) => commands::execute_profile(args, config, formatter).await,
        Command::Token(args) => {
            let tokens = app::token_manager(&resolve(config)?).await?;
            commands::execute_token(args, &tokens, formatter).await
        }
        Command::Opportunities(args) => {
            let session = app::crm_session(&resolve(config)?).await?;
            commands::execute_opportunities(args, &session, default_limit, formatter).await
        }
        Command::Search(args) => {
            let session = app::crm_session(&resolve(config)?).await?;
            commands::execute_search(args, &session, default_limit, formatter).await
        }
        Command::Files(args) => {
            let session = app::crm_session(&resolve(config)?).await?;
            commands::execute_files(args, &session, default_limit, formatter).await
        }
        Command::Text(args) => {
            let session = app::crm_session(&resolve(config)?).await?;
            commands::execute_text(args, &session, formatter).await
        }
        Command::Extract(args) => {
            let resolved = resolve(config)?;
            let session = app::crm_session(&resolved).await?;
            let kind = args.provider.map(Into::into).unwrap_or(resolved.provider);
            let provider = app::model_provider(kind, &resolved).await?;
            let extractor = app::extractor(provider, &resolved)?;
            let mut selector = ConsoleSelector::new(formatter)?;
            commands::execute_extract(
                args,
                &session,
                &extractor,
                &mut selector,
                default_limit,
                formatter,
            )
            .await
        }
    }
}
