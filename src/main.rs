//! referral-pager - Command Line Entry Point
//!
//! Pages through unverified provider access points and marks them verified.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use referral_pager::constants::LOG_FILE_PREFIX;
use referral_pager::domain::{AccessPointItem, AppConfig, RecordKey};
use referral_pager::features::verify::controller::{PageView, VerifyController};
use referral_pager::helpers::default_config_path;
use referral_pager::listing::{GraphqlListing, ListingSource, MemoryListing, ReviewStatusSink};

#[derive(Parser)]
#[command(
    name = "referral-pager",
    version,
    about = "Review queue for unverified provider access points"
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve access points from a JSON file instead of the hosted API
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print pages of unverified access points
    List(ListArgs),
    /// Mark an access point verified
    Verify(VerifyArgs),
    /// Store the API key (sealed) in the config file
    SetApiKey {
        /// API key for the hosted GraphQL endpoint
        key: String,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Region code, e.g. CA (defaults to the configured region)
    #[arg(long)]
    region: Option<String>,

    /// Number of pages to print
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Override the configured page size
    #[arg(long)]
    page_size: Option<usize>,

    /// Print rows as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct VerifyArgs {
    /// Owner of the access point
    #[arg(long)]
    owner: String,

    /// Region of the access point
    #[arg(long)]
    state: String,
}

enum ListingCommand {
    List(ListArgs),
    Verify(VerifyArgs),
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_deref());

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut config = AppConfig::try_load(&config_path)?;

    let command = match cli.command {
        Command::SetApiKey { key } => {
            config.api.set_api_key(&key)?;
            config.save(&config_path)?;
            println!("API key stored in {}", config_path.display());
            return Ok(());
        }
        Command::List(args) => ListingCommand::List(args),
        Command::Verify(args) => ListingCommand::Verify(args),
    };

    match &cli.fixture {
        Some(fixture) => {
            let source = Arc::new(MemoryListing::load_fixture(fixture)?);
            run(source, &config, command).await
        }
        None => {
            let source = Arc::new(GraphqlListing::new(&config.api)?);
            tracing::info!(endpoint = source.endpoint(), "Using hosted API");
            run(source, &config, command).await
        }
    }
}

async fn run<S>(source: Arc<S>, config: &AppConfig, command: ListingCommand) -> Result<()>
where
    S: ListingSource<Item = AccessPointItem> + ReviewStatusSink,
{
    match command {
        ListingCommand::List(args) => {
            let mut pager_config = config.pager;
            if let Some(size) = args.page_size {
                pager_config.page_size = size;
            }
            let region = args.region.or_else(|| config.region.clone());
            let mut controller = VerifyController::new(source, pager_config, region.as_deref())?;

            for page in 0..args.pages.max(1) {
                let view = controller.load_page(page).await?;
                print_page(&view, pager_config.page_size, args.json)?;
                if !view.has_next {
                    break;
                }
            }
        }
        ListingCommand::Verify(args) => {
            let mut controller =
                VerifyController::new(source, config.pager, Some(args.state.as_str()))?;
            let key = RecordKey::new(args.owner, args.state);
            let count = controller.verify(std::slice::from_ref(&key)).await?;
            println!("Verified {count} access point(s): {key}");
        }
    }
    Ok(())
}

fn print_page(view: &PageView, page_size: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&view.rows)?);
        return Ok(());
    }

    for row in &view.rows {
        println!(
            "{:<28} {:<5} {:<10} {:<16} {:<12} {}",
            row.full_name,
            row.state,
            row.license_type.as_deref().unwrap_or("-"),
            row.license.as_deref().unwrap_or("-"),
            row.license_expiration
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.email.as_deref().unwrap_or("-"),
        );
    }

    let from = view.page * page_size + 1;
    let to = view.page * page_size + view.rows.len();
    if view.rows.is_empty() {
        println!("-- page {}: no rows --", view.page + 1);
    } else {
        println!("-- page {}: {from}-{to} --", view.page + 1);
    }
    if !view.has_next {
        println!("-- end of list --");
    }
    Ok(())
}
