//! Coverage Stats
//!
//! Scrapes trading-card-game tournament coverage results pages and summarizes
//! them: deck popularity over the round 1 roster, decks reaching Day 2, and
//! win rates of one country's players.
//!
//! This library provides:
//! - `scrape` / `fetch`: results page parsing and retrieval with a local cache
//! - `analysis`: the statistics
//! - `report`: chart and table markup plus the index page
//! - `pipeline`: end-to-end operations shared by the binaries
//! - `web`: the form handler
//!
//! Binaries:
//! - `coverage-web`: serves the form
//! - `coverage-cli`: download pages, print stats, export CSV/xlsx

pub mod analysis;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod rounds;
pub mod scrape;
pub mod web;

pub use analysis::{analyze, Analysis, AnalysisConfig};
pub use model::{MatchRecord, MatchesByRound, Player, WinnerSide};

/// Results page prefix used when none is given.
pub const DEFAULT_BASE_URL: &str = "https://fabtcg.com/coverage/calling-hamburg/results/";

/// Rounds requested when none are given.
pub const DEFAULT_ROUNDS: &str = "1-8";

/// Country code of the win-rate table.
pub const DEFAULT_COUNTRY: &str = "RO";

/// Adjective for [`DEFAULT_COUNTRY`] used in table titles.
pub const DEFAULT_COUNTRY_LABEL: &str = "Romanian";
