//! Coverage Stats - web form
//!
//! Serves `GET /` (form with defaults) and `POST /` (scrape, analyze, render).

use anyhow::{Context, Result};
use clap::Parser;
use coverage_stats::web::{build_router, AppState};
use coverage_stats::{
    AnalysisConfig, DEFAULT_BASE_URL, DEFAULT_COUNTRY, DEFAULT_COUNTRY_LABEL, DEFAULT_ROUNDS,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coverage-web")]
#[command(about = "Serve the tournament coverage statistics form")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "COVERAGE_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// Default results URL shown in the form
    #[arg(long, env = "COVERAGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Default rounds shown in the form
    #[arg(long, default_value = DEFAULT_ROUNDS)]
    rounds: String,

    /// Directory for results_round<N>.html cache files
    #[arg(long, env = "COVERAGE_CACHE_DIR", default_value = ".")]
    cache_dir: PathBuf,

    /// Country code for the win-rate table
    #[arg(long, env = "COVERAGE_COUNTRY", default_value = DEFAULT_COUNTRY)]
    country: String,

    /// Adjective for the country in table titles
    #[arg(long, env = "COVERAGE_COUNTRY_LABEL", default_value = DEFAULT_COUNTRY_LABEL)]
    country_label: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let state = AppState {
        default_base_url: cli.base_url,
        default_rounds: cli.rounds,
        cache_dir: cli.cache_dir,
        analysis: AnalysisConfig {
            country_code: cli.country,
            country_label: cli.country_label,
        },
    };

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    log::info!("Listening on http://{}", cli.bind);

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;
    Ok(())
}
