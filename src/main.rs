mod config;
mod error;
mod models;
mod notify;
mod pipeline;
mod scrapers;
mod state;

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use notify::{DryRunNotifier, Notify, TelegramNotifier};
use scrapers::WgGesuchtScraper;

/// WG-Gesucht scraper and Telegram notifier
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Parse listings from a local HTML file instead of the live site
    /// (for testing)
    #[arg(long)]
    html_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let scraper = WgGesuchtScraper::new(&config)?;

    if config.dry_run() {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set, running in dry-run mode");
    }
    let notifier: Box<dyn Notify> = match (&config.bot_token, &config.chat_id) {
        (Some(token), Some(chat_id)) => {
            Box::new(TelegramNotifier::new(token.clone(), chat_id.clone())?)
        }
        _ => Box::new(DryRunNotifier),
    };

    let report = pipeline::run(
        &config,
        &scraper,
        notifier.as_ref(),
        args.html_file.as_deref(),
    )
    .await?;

    info!(
        "Run finished: {} on page, {} new, {} sent, {} failed",
        report.found, report.new, report.sent, report.failed
    );

    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
