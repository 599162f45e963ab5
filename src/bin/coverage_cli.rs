//! Coverage CLI - download results pages, print statistics, export tables
//!
//! Works on the same cache files as the web app, so a typical session is
//! `download` once, then `stats` / `export` offline.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use coverage_stats::pipeline::{self, ReportConfig};
use coverage_stats::{
    AnalysisConfig, DEFAULT_BASE_URL, DEFAULT_COUNTRY, DEFAULT_COUNTRY_LABEL, DEFAULT_ROUNDS,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coverage-cli")]
#[command(about = "Scrape tournament coverage results and summarize deck and player statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Results URL prefix; "<round>/" is appended per round
    #[arg(long, env = "COVERAGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Rounds to load, e.g. "1-8,10"
    #[arg(short, long, default_value = DEFAULT_ROUNDS)]
    rounds: String,

    /// Directory for results_round<N>.html cache files
    #[arg(long, env = "COVERAGE_CACHE_DIR", default_value = ".")]
    cache_dir: PathBuf,
}

#[derive(Args)]
struct AnalysisArgs {
    /// Ignore cache files and fetch every round
    #[arg(long)]
    no_cache: bool,

    /// Country code for the win-rate table
    #[arg(long, env = "COVERAGE_COUNTRY", default_value = DEFAULT_COUNTRY)]
    country: String,

    /// Adjective for the country in table titles
    #[arg(long, env = "COVERAGE_COUNTRY_LABEL", default_value = DEFAULT_COUNTRY_LABEL)]
    country_label: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Xlsx,
}

#[derive(Subcommand)]
enum Commands {
    /// Download results pages into the cache directory (overwrites)
    Download {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print deck, Day 2 and country statistics
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Export matches (CSV) or every table (xlsx workbook)
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },
}

fn report_config(source: SourceArgs, analysis: Option<AnalysisArgs>) -> ReportConfig {
    let mut config = ReportConfig {
        base_url: source.base_url,
        rounds: source.rounds,
        cache_dir: source.cache_dir,
        ..Default::default()
    };
    if let Some(args) = analysis {
        config.use_local = !args.no_cache;
        config.analysis = AnalysisConfig {
            country_code: args.country,
            country_label: args.country_label,
        };
    }
    config
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let summary = match cli.command {
        Commands::Download { source } => {
            let config = report_config(source, None);
            pipeline::download_pages(&config)?
        }
        Commands::Stats { source, analysis } => {
            let config = report_config(source, Some(analysis));
            pipeline::compute_stats(&config)?
        }
        Commands::Export {
            source,
            analysis,
            output,
            format,
        } => {
            let config = report_config(source, Some(analysis));
            match format {
                ExportFormat::Csv => pipeline::export_matches_csv(&config, &output)?,
                ExportFormat::Xlsx => pipeline::export_workbook(&config, &output)?,
            }
        }
    };

    println!("{}", summary);
    Ok(())
}
