//! Results page retrieval with an on-disk HTML cache.

use crate::model::MatchRecord;
use crate::scrape::parse_results_page;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

const USER_AGENT: &str = concat!("coverage-stats/", env!("CARGO_PKG_VERSION"));

/// Where results pages come from.
#[derive(Debug, Clone)]
pub struct ResultsSource {
    /// Results URL prefix; the round number and a trailing `/` are appended
    pub base_url: String,
    /// Directory holding `results_round{N}.html` cache files
    pub cache_dir: PathBuf,
    /// Read cache files instead of the network when they exist
    pub use_local: bool,
}

impl ResultsSource {
    pub fn new(base_url: &str, cache_dir: impl Into<PathBuf>, use_local: bool) -> Self {
        ResultsSource {
            base_url: base_url.to_string(),
            cache_dir: cache_dir.into(),
            use_local,
        }
    }

    /// URL of the results page for one round.
    pub fn round_url(&self, round: u32) -> String {
        format!("{}{}/", self.base_url, round)
    }

    /// Cache file path for one round.
    pub fn cache_path(&self, round: u32) -> PathBuf {
        self.cache_dir.join(cache_file_name(round))
    }
}

pub fn cache_file_name(round: u32) -> String {
    format!("results_round{}.html", round)
}

/// Build the blocking HTTP client used for every page request.
pub fn http_client() -> Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(15))
        .build()
        .context("Failed to build HTTP client")?;
    Ok(client)
}

/// GET a page and return its body. Non-success status codes are errors.
pub fn fetch_html(client: &reqwest::blocking::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Bad response from {}", url))?;
    let body = resp
        .text()
        .with_context(|| format!("Failed to read body of {}", url))?;
    Ok(body)
}

/// Load one round's page, from the cache if allowed and present, otherwise
/// from the network (refreshing the cache file).
pub fn load_round_html(
    client: &reqwest::blocking::Client,
    source: &ResultsSource,
    round: u32,
) -> Result<String> {
    let cache_path = source.cache_path(round);

    if source.use_local && cache_path.exists() {
        log::debug!("Round {}: using cached {}", round, cache_path.display());
        return std::fs::read_to_string(&cache_path)
            .with_context(|| format!("Failed to read {}", cache_path.display()));
    }

    let url = source.round_url(round);
    log::info!("Round {}: fetching {}", round, url);
    let html = fetch_html(client, &url)?;
    write_cache(&cache_path, &html)?;
    Ok(html)
}

/// Load and parse one round.
pub fn scrape_round(
    client: &reqwest::blocking::Client,
    source: &ResultsSource,
    round: u32,
) -> Result<Vec<MatchRecord>> {
    let html = load_round_html(client, source, round)?;
    let matches = parse_results_page(&html);
    log::info!("Round {}: {} matches", round, matches.len());
    Ok(matches)
}

/// Fetch every round from the network and overwrite its cache file.
///
/// Stops at the first failure. Returns the paths written.
pub fn download_rounds(
    client: &reqwest::blocking::Client,
    source: &ResultsSource,
    rounds: &[u32],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(rounds.len());
    for &round in rounds {
        log::info!("Downloading Round {} ...", round);
        let html = fetch_html(client, &source.round_url(round))?;
        let path = source.cache_path(round);
        write_cache(&path, &html)?;
        written.push(path);
    }
    Ok(written)
}

fn write_cache(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}
