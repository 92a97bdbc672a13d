//! Daily finance-trends run — binary entrypoint.
//! Scrapes the configured sources, drafts a post and sends it to Telegram, then exits.

use anyhow::Context;
use finance_trends_drafter::config::{AppConfig, PipelineSettings};
use finance_trends_drafter::ingest::registry::load_sources_default;
use finance_trends_drafter::{Pipeline, RunOutcome};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact text logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("finance_trends_drafter=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env.local first so it wins over .env; both optional.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::from_env();
    let settings = PipelineSettings::load_default()?;
    let sources = load_sources_default().context("loading sources")?;
    tracing::info!(sources = sources.len(), ?settings, "starting run");

    let pipeline = Pipeline::from_config(&cfg, &settings)?;
    match pipeline.run_once(&sources, chrono::Utc::now()).await {
        Ok(RunOutcome::Delivered { posts, failures, receipt }) => {
            tracing::info!(
                posts,
                failed_sources = failures.len(),
                channel = receipt.channel,
                at = %receipt.delivered_at.to_rfc3339(),
                "run complete"
            );
            Ok(())
        }
        Ok(RunOutcome::Skipped { posts, failures }) => {
            tracing::warn!(posts, failed_sources = failures.len(), "run complete without a draft");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            Err(e.into())
        }
    }
}
