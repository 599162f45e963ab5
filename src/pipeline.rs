//! Pipeline functions for programmatic use by both the CLI and the web app.
//!
//! Each operation takes a [`ReportConfig`], scrapes the requested rounds and
//! returns structured data or a summary string instead of printing.

use crate::analysis::{analyze, Analysis, AnalysisConfig};
use crate::fetch::{self, ResultsSource};
use crate::model::{MatchRecord, MatchesByRound, MATCH_HEADERS};
use crate::report::{render_analysis, RenderedReport};
use crate::rounds::parse_rounds;
use crate::{DEFAULT_BASE_URL, DEFAULT_ROUNDS};
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Error text shown when no round produced any match.
pub const NO_MATCH_DATA: &str = "No match data found.";

// ============================================================================
// Configuration
// ============================================================================

/// Configuration shared by every pipeline operation.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Results URL prefix, e.g. `https://fabtcg.com/coverage/<event>/results/`
    pub base_url: String,
    /// Rounds specifier, e.g. "1-8,10"
    pub rounds: String,
    /// Directory for `results_round{N}.html` cache files
    pub cache_dir: PathBuf,
    /// Prefer cache files over the network
    pub use_local: bool,
    pub analysis: AnalysisConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rounds: DEFAULT_ROUNDS.to_string(),
            cache_dir: PathBuf::from("."),
            use_local: true,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn source(&self) -> ResultsSource {
        ResultsSource::new(&self.base_url, &self.cache_dir, self.use_local)
    }
}

// ============================================================================
// Collect
// ============================================================================

/// Matches scraped for the requested rounds.
#[derive(Debug, Clone, Default)]
pub struct RoundData {
    /// Requested rounds, ascending
    pub rounds: Vec<u32>,
    pub matches_by_round: MatchesByRound,
    /// Matches of round 1 (empty unless round 1 was requested)
    pub round1_matches: Vec<MatchRecord>,
    /// Every match in round order
    pub all_matches: Vec<MatchRecord>,
}

impl RoundData {
    /// Rounds 1 through the highest requested round.
    ///
    /// Rounds that were not requested still get an (empty) table and the
    /// highest round sets the Day 2 cutoff.
    pub fn all_rounds(&self) -> Vec<u32> {
        match self.rounds.iter().max() {
            Some(&max) => (1..=max).collect(),
            None => Vec::new(),
        }
    }

    pub fn analyze(&self, config: &AnalysisConfig) -> Option<Analysis> {
        let all_rounds = self.all_rounds();
        analyze(
            &self.all_matches,
            Some(self.round1_matches.as_slice()),
            Some(&self.matches_by_round),
            Some(all_rounds.as_slice()),
            config,
        )
    }
}

/// Scrape every requested round.
pub fn collect_rounds(config: &ReportConfig) -> Result<RoundData> {
    let rounds = parse_rounds(&config.rounds)?;
    let source = config.source();
    let client = fetch::http_client()?;

    let mut data = RoundData {
        rounds: rounds.clone(),
        ..Default::default()
    };
    for round in rounds {
        let matches = fetch::scrape_round(&client, &source, round)
            .with_context(|| format!("Round {}", round))?;
        if round == 1 {
            data.round1_matches = matches.clone();
        }
        data.all_matches.extend(matches.iter().cloned());
        data.matches_by_round.insert(round, matches);
    }

    log::info!(
        "Collected {} matches over {} rounds",
        data.all_matches.len(),
        data.rounds.len()
    );
    Ok(data)
}

/// Scrape and analyze. `Ok(None)` means no match data was found.
pub fn run_analysis(config: &ReportConfig) -> Result<Option<Analysis>> {
    let data = collect_rounds(config)?;
    Ok(data.analyze(&config.analysis))
}

/// Scrape, analyze and render the chart/table fragments.
pub fn build_report(config: &ReportConfig) -> Result<Option<RenderedReport>> {
    Ok(run_analysis(config)?.map(|analysis| render_analysis(&analysis)))
}

fn require_analysis(config: &ReportConfig) -> Result<Analysis> {
    run_analysis(config)?.ok_or_else(|| anyhow::anyhow!(NO_MATCH_DATA))
}

// ============================================================================
// Download
// ============================================================================

/// Download every requested round into the cache directory, overwriting any
/// existing file. Returns a summary string.
pub fn download_pages(config: &ReportConfig) -> Result<String> {
    let rounds = parse_rounds(&config.rounds)?;
    let client = fetch::http_client()?;
    let written = fetch::download_rounds(&client, &config.source(), &rounds)?;
    Ok(format!(
        "Done. Saved {} pages to {}",
        written.len(),
        config.cache_dir.display()
    ))
}

// ============================================================================
// Stats
// ============================================================================

/// Compute statistics and return formatted text.
pub fn compute_stats(config: &ReportConfig) -> Result<String> {
    let analysis = require_analysis(config)?;
    format_stats(&analysis)
}

/// Plain-text rendering of an analysis for the terminal.
pub fn format_stats(analysis: &Analysis) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "Total unique players (from Round 1): {}",
        analysis.total_unique_players
    )?;
    writeln!(out, "Matches: {}\n", analysis.match_rows.len())?;

    writeln!(out, "{:=^60}", " Players per Deck (Round 1) ")?;
    writeln!(out, "{:<44} {:>15}", "Deck", "Player Count")?;
    writeln!(out, "{:-<60}", "")?;
    for (deck, count) in &analysis.deck_counts {
        writeln!(out, "{:<44} {:>15}", truncate_name(deck, 44), count)?;
    }

    writeln!(
        out,
        "\n{:=^60}",
        format!(
            " Day 2: {}+ Wins ({} Swiss Rounds) ",
            analysis.win_cutoff, analysis.swiss_rounds
        )
    )?;
    writeln!(out, "{:<44} {:>15}", "Deck", "Players")?;
    writeln!(out, "{:-<60}", "")?;
    if analysis.day2_deck_counts.is_empty() {
        writeln!(out, "(none)")?;
    }
    for (deck, count) in &analysis.day2_deck_counts {
        writeln!(out, "{:<44} {:>15}", truncate_name(deck, 44), count)?;
    }

    writeln!(
        out,
        "\n{:=^60}",
        format!(" {} Players ({}) ", analysis.country_label, analysis.country_code)
    )?;
    writeln!(out, "{:<24} {:<20} {:>5} {:>8}", "Player", "Deck", "Wins", "Win Rate")?;
    writeln!(out, "{:-<60}", "")?;
    if analysis.country_rows.is_empty() {
        writeln!(out, "(none)")?;
    }
    for row in &analysis.country_rows {
        writeln!(
            out,
            "{:<24} {:<20} {:>5} {:>8}",
            truncate_name(&row.name, 24),
            truncate_name(&row.deck, 20),
            row.wins,
            row.win_rate
        )?;
    }

    Ok(out)
}

fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}

// ============================================================================
// Export
// ============================================================================

/// Write every scraped match, tagged with its round, to a CSV file.
pub fn export_matches_csv(config: &ReportConfig, output: &Path) -> Result<String> {
    let data = collect_rounds(config)?;
    if data.all_matches.is_empty() {
        anyhow::bail!(NO_MATCH_DATA);
    }

    let mut writer = csv::Writer::from_path(output).context("Failed to create output CSV")?;
    let mut headers = vec!["Round"];
    headers.extend(MATCH_HEADERS);
    writer.write_record(&headers)?;

    let mut written = 0usize;
    for (round, matches) in &data.matches_by_round {
        for m in matches {
            let mut record = vec![round.to_string()];
            record.extend(m.table_row());
            writer.write_record(&record)?;
            written += 1;
        }
    }
    writer.flush()?;

    Ok(format!(
        "Done! Wrote {} matches to {}",
        written,
        output.display()
    ))
}

/// Create an Excel workbook with one sheet per table.
///
/// Sheets: Summary, Decks, Day 2, Matches, the country table, then one
/// sheet per round.
pub fn export_workbook(config: &ReportConfig, output: &Path) -> Result<String> {
    use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};

    let data = collect_rounds(config)?;
    let analysis = data
        .analyze(&config.analysis)
        .ok_or_else(|| anyhow::anyhow!(NO_MATCH_DATA))?;

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let header_fmt = Format::new().set_bold().set_background_color("#D9E2F3");
    let left_fmt = Format::new().set_align(FormatAlign::Left);

    fn write_headers(sheet: &mut Worksheet, headers: &[&str], fmt: &Format) -> Result<()> {
        for (col, h) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *h, fmt)?;
        }
        sheet.set_freeze_panes(1, 0)?;
        Ok(())
    }

    fn write_counts(
        sheet: &mut Worksheet,
        counts: &[(String, usize)],
        header_fmt: &Format,
    ) -> Result<()> {
        write_headers(sheet, &["Deck", "Player Count"], header_fmt)?;
        for (i, (deck, count)) in counts.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, deck)?;
            sheet.write_number(row, 1, *count as f64)?;
        }
        sheet.set_column_width(0, 36)?;
        Ok(())
    }

    fn write_matches(
        sheet: &mut Worksheet,
        rows: &[[String; 7]],
        header_fmt: &Format,
    ) -> Result<()> {
        write_headers(sheet, &MATCH_HEADERS, header_fmt)?;
        for (i, cells) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            for (col, cell) in cells.iter().enumerate() {
                sheet.write_string(row, col as u16, cell)?;
            }
        }
        for col in [0u16, 1, 3, 4, 5] {
            sheet.set_column_width(col, 24)?;
        }
        Ok(())
    }

    // -- Summary --
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        let title_fmt = Format::new().set_bold().set_font_size(16);
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();

        let mut row = 0u32;
        sheet.write_string_with_format(row, 0, "Tournament Coverage Stats", &title_fmt)?;
        row += 2;
        let entries: [(&str, String); 7] = [
            ("Results URL", config.base_url.clone()),
            ("Rounds", config.rounds.clone()),
            ("Unique Players (Round 1)", analysis.total_unique_players.to_string()),
            ("Matches", analysis.match_rows.len().to_string()),
            ("Swiss Rounds", analysis.swiss_rounds.to_string()),
            ("Day 2 Win Cutoff", analysis.win_cutoff.to_string()),
            ("Generated", now),
        ];
        for (label, value) in &entries {
            sheet.write_string_with_format(row, 0, *label, &bold)?;
            sheet.write_string_with_format(row, 1, value, &left_fmt)?;
            row += 1;
        }
        sheet.set_column_width(0, 26)?;
        sheet.set_column_width(1, 60)?;
    }

    // -- Deck popularity --
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Decks")?;
        write_counts(sheet, &analysis.deck_counts, &header_fmt)?;
    }

    // -- Day 2 --
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Day 2")?;
        write_counts(sheet, &analysis.day2_deck_counts, &header_fmt)?;
    }

    // -- All matches --
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_matches(sheet, &analysis.match_rows, &header_fmt)?;
    }

    // -- Country win rates --
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(country_sheet_name(&analysis.country_code))?;
        let player_header = format!("{} Player", analysis.country_label);
        write_headers(
            sheet,
            &[player_header.as_str(), "Deck", "Wins", "Win Rate"],
            &header_fmt,
        )?;
        for (i, r) in analysis.country_rows.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, &r.name)?;
            sheet.write_string(row, 1, &r.deck)?;
            sheet.write_number(row, 2, r.wins)?;
            sheet.write_string(row, 3, &r.win_rate)?;
        }
        sheet.set_column_width(0, 28)?;
        sheet.set_column_width(1, 28)?;
    }

    // -- Per-round --
    for table in &analysis.round_tables {
        let sheet = workbook.add_worksheet();
        sheet.set_name(format!("Round {}", table.round))?;
        write_matches(sheet, &table.rows, &header_fmt)?;
    }

    workbook
        .save(output)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    Ok(format!(
        "Done! Wrote {} sheets to {}",
        5 + analysis.round_tables.len(),
        output.display()
    ))
}

/// Worksheet name for the country table, e.g. "RO Players".
///
/// Excel rejects `[ ] : * ? / \`, leading or trailing apostrophes and names
/// over 31 characters, so the code is filtered and cut to fit.
fn country_sheet_name(country_code: &str) -> String {
    let code: String = country_code
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\' | '\''))
        .take(23)
        .collect();
    let code = code.trim();
    if code.is_empty() {
        "Country Players".to_string()
    } else {
        format!("{} Players", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Player;

    fn record(p1: &str, p2: &str, winner: &str) -> MatchRecord {
        MatchRecord {
            player1: Player::new(p1, "Kano", "RO"),
            player2: Player::new(p2, "Bravo", "DE"),
            winner: winner.to_string(),
        }
    }

    #[test]
    fn test_all_rounds_spans_from_one() {
        let data = RoundData {
            rounds: vec![3, 5],
            ..Default::default()
        };
        assert_eq!(data.all_rounds(), vec![1, 2, 3, 4, 5]);
        assert!(RoundData::default().all_rounds().is_empty());
    }

    #[test]
    fn test_round_data_analyze_without_round1() {
        let r3 = vec![record("A", "B", "Player 1 Wins")];
        let mut data = RoundData {
            rounds: vec![3],
            all_matches: r3.clone(),
            ..Default::default()
        };
        data.matches_by_round.insert(3, r3);

        let analysis = data.analyze(&AnalysisConfig::default()).unwrap();
        // Roster falls back to all matches; Day 2 cutoff from 3 rounds
        assert_eq!(analysis.total_unique_players, 2);
        assert_eq!(analysis.win_cutoff, 5);
        assert_eq!(analysis.round_tables.len(), 3);
    }

    #[test]
    fn test_country_sheet_name() {
        assert_eq!(country_sheet_name("RO"), "RO Players");
        assert_eq!(country_sheet_name("A/B[C]:D"), "ABCD Players");
        assert_eq!(country_sheet_name("'?*'"), "Country Players");
        let long = country_sheet_name(&"X".repeat(40));
        assert_eq!(long.chars().count(), 31);
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Kano", 10), "Kano");
        assert_eq!(truncate_name("Dorinthea Ironsong", 10), "Dorinthea~");
    }

    #[test]
    fn test_format_stats_sections() {
        let matches = vec![record("Ion", "Kai", "Player 1 Wins")];
        let analysis = analyze(&matches, None, None, None, &AnalysisConfig::default()).unwrap();
        let text = format_stats(&analysis).unwrap();
        assert!(text.contains("Total unique players (from Round 1): 2"));
        assert!(text.contains("Players per Deck"));
        assert!(text.contains("Day 2: 6+ Wins (8 Swiss Rounds)"));
        assert!(text.contains("Romanian Players (RO)"));
        assert!(text.contains("100.0%"));
    }
}
