mod commands;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ytharvest_engine::{CdpPage, HtmlPage, LocatorSet, Page};

#[derive(Debug, Parser)]
#[command(name = "ytharvest-cli")]
#[command(about = "Harvest comments from a watch page and automate replies")]
struct Cli {
    /// Run against a saved HTML snapshot instead of the live browser.
    #[arg(long, global = true, value_name = "FILE")]
    html: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect comments and write them to a JSON export.
    Extract {
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(0..=100))]
        limit: u16,
        /// Directory for the export file; defaults to YTHARVEST_EXPORT_DIR.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Reply to up to `limit` comment threads with one message.
    Reply {
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..=50))]
        limit: u16,
        #[arg(long)]
        message: String,
    },
    /// Print the signed-in channel's name and URL.
    Channel,
    /// Answer JSON requests from stdin, one per line.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ytharvest_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!(env = %config.env, cdp_url = %config.cdp_url, "configuration loaded");

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("ytharvest-cli ready; run with --help to list commands");
        return Ok(());
    };

    let locators = load_locator_set(&config)?;
    match cli.html {
        Some(path) => {
            let html = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("failed to read snapshot {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "using HTML snapshot");
            execute(command, HtmlPage::parse(&html), locators, &config).await
        }
        None => {
            let (_browser, page) = CdpPage::connect(&config.cdp_url).await?;
            execute(command, page, locators, &config).await
        }
    }
}

fn load_locator_set(config: &ytharvest_core::AppConfig) -> anyhow::Result<LocatorSet> {
    let table = match &config.locators_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading locator overrides");
            ytharvest_core::load_locators(path)?
        }
        None => ytharvest_core::LocatorTable::default(),
    };
    Ok(LocatorSet::new(&table)?)
}

async fn execute<P: Page>(
    command: Commands,
    page: P,
    locators: LocatorSet,
    config: &ytharvest_core::AppConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Extract { limit, out } => {
            let dir = out.unwrap_or_else(|| config.export_dir.clone());
            commands::run_extract(&page, &locators, config, usize::from(limit), &dir).await
        }
        Commands::Reply { limit, message } => {
            commands::run_reply(&page, &locators, config, usize::from(limit), &message).await
        }
        Commands::Channel => commands::run_channel(page, locators, config).await,
        Commands::Serve => serve::run_serve(page, locators, config).await,
    }
}

#[cfg(test)]
mod tests;
