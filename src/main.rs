use anyhow::Context;
use clap::Parser;
use followbot::api::{BittrexClient, TwitterClient};
use followbot::config::Settings;
use followbot::{Follower, RunOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Follow a Twitter account's market calls on Bittrex: one reconciliation pass per run
#[derive(Parser, Debug)]
#[command(name = "followbot", version)]
struct Cli {
    /// TOML settings file (defaults to ./followbot.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Decide and size the order, but do not submit it
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

// One pass, strictly sequential
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if cli.dry_run {
        settings.dry_run = true;
    }
    tracing::debug!("{:?}", settings);

    let config = settings.validate().context("Invalid settings")?;
    let credentials = settings.credentials()?;

    let twitter = TwitterClient::with_base_url(
        credentials.twitter_bearer_token,
        settings.twitter_base_url.clone(),
    );
    let bittrex = BittrexClient::with_base_url(
        credentials.bittrex_api_key,
        credentials.bittrex_api_secret,
        settings.bittrex_base_url.clone(),
    );

    tracing::info!("🚀 followbot starting");
    tracing::info!("  Account: @{}", config.account_handle);
    tracing::info!("  Keyword: {}", config.sentiment_keyword);
    tracing::info!("  Market:  {}", config.market);
    if config.dry_run {
        tracing::info!("  Dry run: orders will not be submitted");
    }

    let follower = Follower::new(Arc::new(twitter), Arc::new(bittrex), config);
    let report = follower.run_once().await;

    match &report.outcome {
        RunOutcome::NoTrade { reason } => tracing::info!("✅ No trade: {}", reason),
        RunOutcome::DryRun { plan } => tracing::info!(
            "🧪 Would {} {:.8} on {}",
            plan.side,
            plan.quantity,
            plan.market
        ),
        RunOutcome::Executed { confirmation } => tracing::info!(
            "💹 Placed {} of {:.8} on {} (order {})",
            confirmation.side,
            confirmation.quantity,
            confirmation.market,
            confirmation.order_id
        ),
        // Degraded run, not a crash: report and exit normally
        RunOutcome::Failed { error } => tracing::error!("❌ Run failed: {}", error),
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("followbot=info"));
    // Logs on stderr keep stdout clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
