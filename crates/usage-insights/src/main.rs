use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use usage_insights::View;

#[derive(Parser, Debug)]
#[command(name = "usage-insights", about = "Warehouse cost and performance insights")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/usage-insights.toml")]
    config: String,

    /// Evaluate windows as of this date instead of today (UTC)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Re-render every SECS seconds against the same query cache until interrupted
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    watch: Option<u64>,

    #[command(subcommand)]
    view: View,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = usage_insights::load_config(&cli.config)?;
    let runner = usage_insights::build_runner(&config).context("Failed to build query runner")?;

    let Some(secs) = cli.watch else {
        return render_once(&cli, &runner).await;
    };

    let interval = Duration::from_secs(secs);
    loop {
        if let Err(e) = render_once(&cli, &runner).await {
            error!(error = %e, "Render failed");
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
    Ok(())
}

async fn render_once(cli: &Cli, runner: &usage_insights::views::QueryRunner) -> Result<()> {
    let today = cli.today.unwrap_or_else(|| Utc::now().date_naive());
    let report = usage_insights::render(runner, &cli.view, today).await?;

    let stats = runner.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        hit_rate_pct = stats.hit_rate_pct(),
        "Rendered view"
    );

    // Output report as JSON to stdout
    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");
    Ok(())
}
