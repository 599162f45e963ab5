//! Tournament statistics from scraped match records.
//!
//! Everything here is recomputed from the match list on each call:
//! - deck popularity over the round 1 roster
//! - decks of players reaching the Day 2 win cutoff
//! - win rates of players from one country
//! - the full match table and one table per round

use crate::model::{MatchRecord, MatchesByRound};
use crate::{DEFAULT_COUNTRY, DEFAULT_COUNTRY_LABEL};
use indexmap::{IndexMap, IndexSet};

/// Swiss round count assumed when no round list is known.
pub const DEFAULT_SWISS_ROUNDS: u32 = 8;

/// Options for [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Country code (as shown by the flag icon) for the win-rate table
    pub country_code: String,
    /// Adjective used in that table's title, e.g. "Romanian"
    pub country_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY.to_string(),
            country_label: DEFAULT_COUNTRY_LABEL.to_string(),
        }
    }
}

/// One row of the country win-rate table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryPlayerRow {
    pub name: String,
    pub deck: String,
    pub wins: u32,
    /// Formatted as "66.7%"
    pub win_rate: String,
}

/// Match rows for a single round (empty if the round had no results).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTable {
    pub round: u32,
    pub rows: Vec<[String; 7]>,
}

/// Result of [`analyze`].
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Distinct player names seen in round 1
    pub total_unique_players: usize,
    /// Deck -> number of round 1 players, most common first
    pub deck_counts: Vec<(String, usize)>,
    /// Last Swiss round used for the Day 2 cutoff
    pub swiss_rounds: u32,
    /// Wins needed for Day 2
    pub win_cutoff: u32,
    /// Deck -> number of Day 2 players, most common first
    pub day2_deck_counts: Vec<(String, usize)>,
    /// Every match, in input order
    pub match_rows: Vec<[String; 7]>,
    /// Country code the country table was filtered on
    pub country_code: String,
    pub country_label: String,
    /// Wins descending, then name ascending
    pub country_rows: Vec<CountryPlayerRow>,
    /// Ascending by round
    pub round_tables: Vec<RoundTable>,
}

#[derive(Debug, Default, Clone)]
struct PlayerStats {
    deck: String,
    country: String,
    matches: u32,
}

/// Compute all statistics.
///
/// * `matches` - every scraped match across the requested rounds
/// * `round1_matches` - matches of round 1; when absent or empty, `matches`
///   stands in for the round 1 roster
/// * `matches_by_round` - per-round matches for the per-round tables
/// * `all_rounds` - rounds to emit tables for (empty rounds included) and to
///   derive the Swiss round count from; when absent, the keys of
///   `matches_by_round` are used for the tables and 8 Swiss rounds are assumed
///
/// Returns `None` when there are no matches.
pub fn analyze(
    matches: &[MatchRecord],
    round1_matches: Option<&[MatchRecord]>,
    matches_by_round: Option<&MatchesByRound>,
    all_rounds: Option<&[u32]>,
    config: &AnalysisConfig,
) -> Option<Analysis> {
    if matches.is_empty() {
        return None;
    }

    // Round 1 roster: one deck per player, last listing wins
    let roster_source = match round1_matches {
        Some(r1) if !r1.is_empty() => r1,
        _ => matches,
    };
    let mut round1_players: IndexSet<&str> = IndexSet::new();
    let mut round1_decks: IndexMap<&str, &str> = IndexMap::new();
    for m in roster_source {
        for p in [&m.player1, &m.player2] {
            round1_players.insert(&p.name);
            round1_decks.insert(&p.name, &p.deck);
        }
    }
    let deck_counts = most_common(round1_decks.values().copied());

    // Per-player tallies over every match
    let mut players: IndexMap<&str, PlayerStats> = IndexMap::new();
    let mut wins: IndexMap<&str, u32> = IndexMap::new();
    let mut match_rows = Vec::with_capacity(matches.len());
    for m in matches {
        for p in [&m.player1, &m.player2] {
            let stats = players.entry(&p.name).or_default();
            stats.deck = p.deck.clone();
            stats.country = p.country.clone();
            stats.matches += 1;
        }
        // Unnamed winners are not credited
        if let Some(winner) = m.winner_name().filter(|name| !name.is_empty()) {
            *wins.entry(winner).or_insert(0) += 1;
        }
        match_rows.push(m.table_row());
    }

    // Day 2
    let swiss_rounds = all_rounds
        .and_then(|rounds| rounds.iter().max().copied())
        .unwrap_or(DEFAULT_SWISS_ROUNDS);
    let win_cutoff = day2_win_cutoff(swiss_rounds);
    let day2_decks = wins
        .iter()
        .filter(|(_, w)| **w >= win_cutoff)
        .filter_map(|(name, _)| players.get(name).map(|s| s.deck.as_str()));
    let day2_deck_counts = most_common(day2_decks);

    // Country table
    let code = config.country_code.to_uppercase();
    let mut country_rows: Vec<CountryPlayerRow> = players
        .iter()
        .filter(|(_, stats)| stats.country.to_uppercase() == code)
        .map(|(name, stats)| {
            let player_wins = wins.get(name).copied().unwrap_or(0);
            CountryPlayerRow {
                name: name.to_string(),
                deck: stats.deck.clone(),
                wins: player_wins,
                win_rate: format_win_rate(player_wins, stats.matches),
            }
        })
        .collect();
    country_rows.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.name.cmp(&b.name)));

    // Per-round tables
    let table_rounds: Vec<u32> = match (all_rounds, matches_by_round) {
        (Some(rounds), _) => rounds.to_vec(),
        (None, Some(by_round)) => by_round.keys().copied().collect(),
        (None, None) => Vec::new(),
    };
    let round_tables = table_rounds
        .into_iter()
        .map(|round| RoundTable {
            round,
            rows: matches_by_round
                .and_then(|by_round| by_round.get(&round))
                .map(|ms| ms.iter().map(MatchRecord::table_row).collect())
                .unwrap_or_default(),
        })
        .collect();

    Some(Analysis {
        total_unique_players: round1_players.len(),
        deck_counts,
        swiss_rounds,
        win_cutoff,
        day2_deck_counts,
        match_rows,
        country_code: code,
        country_label: config.country_label.clone(),
        country_rows,
        round_tables,
    })
}

/// Wins required for Day 2: at most two losses over the Swiss rounds.
///
/// Events with 8 or more Swiss rounds need 6 wins, shorter ones 5.
pub fn day2_win_cutoff(swiss_rounds: u32) -> u32 {
    if swiss_rounds >= 8 {
        6
    } else {
        5
    }
}

/// Win percentage with one decimal, "0.0%" when no matches were played.
pub fn format_win_rate(wins: u32, matches: u32) -> String {
    if matches == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", wins as f64 / matches as f64 * 100.0)
}

/// Count occurrences, most common first. Ties keep first-seen order.
fn most_common<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(item, count)| (item.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Player;

    fn m(p1: (&str, &str, &str), p2: (&str, &str, &str), winner: &str) -> MatchRecord {
        MatchRecord {
            player1: Player::new(p1.0, p1.1, p1.2),
            player2: Player::new(p2.0, p2.1, p2.2),
            winner: winner.to_string(),
        }
    }

    #[test]
    fn test_format_win_rate() {
        assert_eq!(format_win_rate(0, 0), "0.0%");
        assert_eq!(format_win_rate(2, 3), "66.7%");
        assert_eq!(format_win_rate(1, 8), "12.5%");
        assert_eq!(format_win_rate(8, 8), "100.0%");
        assert_eq!(format_win_rate(0, 5), "0.0%");
    }

    #[test]
    fn test_day2_win_cutoff() {
        assert_eq!(day2_win_cutoff(9), 6);
        assert_eq!(day2_win_cutoff(8), 6);
        assert_eq!(day2_win_cutoff(7), 5);
        assert_eq!(day2_win_cutoff(1), 5);
    }

    #[test]
    fn test_empty_matches_give_none() {
        assert!(analyze(&[], None, None, None, &AnalysisConfig::default()).is_none());
    }

    #[test]
    fn test_most_common_keeps_first_seen_order_on_ties() {
        let counts = most_common(["B", "A", "A", "C", "B", "D"].into_iter());
        assert_eq!(
            counts,
            vec![
                ("B".to_string(), 2),
                ("A".to_string(), 2),
                ("C".to_string(), 1),
                ("D".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_roster_falls_back_to_all_matches() {
        let matches = vec![
            m(("A", "Kano", "RO"), ("B", "Bravo", "DE"), "Player 1 Wins"),
            m(("C", "Kano", "FR"), ("A", "Kano", "RO"), "Player 2 Wins"),
        ];
        let analysis =
            analyze(&matches, Some(&[][..]), None, None, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.total_unique_players, 3);
        assert_eq!(
            analysis.deck_counts,
            vec![("Kano".to_string(), 2), ("Bravo".to_string(), 1)]
        );
        assert_eq!(analysis.swiss_rounds, 8);
        assert_eq!(analysis.win_cutoff, 6);
        assert!(analysis.round_tables.is_empty());
    }

    #[test]
    fn test_round1_roster_counts_last_deck_once_per_player() {
        let round1 = vec![
            m(("A", "Kano", ""), ("B", "Bravo", ""), ""),
            m(("A", "Dash", ""), ("C", "Bravo", ""), ""),
        ];
        let later = vec![m(("D", "Oldhim", ""), ("A", "Kano", ""), "")];
        let all: Vec<MatchRecord> = round1.iter().chain(later.iter()).cloned().collect();

        let config = AnalysisConfig::default();
        let analysis = analyze(&all, Some(round1.as_slice()), None, None, &config).unwrap();
        assert_eq!(analysis.total_unique_players, 3);
        assert_eq!(
            analysis.deck_counts,
            vec![("Bravo".to_string(), 2), ("Dash".to_string(), 1)]
        );
    }

    #[test]
    fn test_day2_uses_max_round_for_cutoff() {
        let mut matches = Vec::new();
        // A wins 5 times, B wins 6 times
        for _ in 0..5 {
            matches.push(m(("A", "Kano", ""), ("X", "Bravo", ""), "Player 1 Wins"));
        }
        for _ in 0..6 {
            matches.push(m(("Y", "Dash", ""), ("B", "Oldhim", ""), "Player 2 Wins"));
        }

        let seven: Vec<u32> = (1..=7).collect();
        let config = AnalysisConfig::default();
        let a = analyze(&matches, None, None, Some(seven.as_slice()), &config).unwrap();
        assert_eq!(a.win_cutoff, 5);
        assert_eq!(
            a.day2_deck_counts,
            vec![("Kano".to_string(), 1), ("Oldhim".to_string(), 1)]
        );

        let nine: Vec<u32> = (1..=9).collect();
        let a = analyze(&matches, None, None, Some(nine.as_slice()), &config).unwrap();
        assert_eq!(a.swiss_rounds, 9);
        assert_eq!(a.win_cutoff, 6);
        assert_eq!(a.day2_deck_counts, vec![("Oldhim".to_string(), 1)]);
    }

    #[test]
    fn test_country_table_sorted_by_wins_then_name() {
        let matches = vec![
            m(("Zed", "Kano", "ro"), ("Ana", "Bravo", "RO"), "Player 1 Wins"),
            m(("Bob", "Dash", "RO"), ("Kai", "Iyslander", "DE"), "Player 1 Wins"),
            m(("Ana", "Bravo", "RO"), ("Kai", "Iyslander", "DE"), "Draw"),
        ];
        let a = analyze(&matches, None, None, None, &AnalysisConfig::default()).unwrap();

        let names: Vec<&str> = a.country_rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Zed", "Ana"]);
        assert_eq!(a.country_rows[0].win_rate, "100.0%");
        assert_eq!(a.country_rows[2].wins, 0);
        assert_eq!(a.country_rows[2].win_rate, "0.0%");
        assert_eq!(a.country_rows[2].deck, "Bravo");
    }

    #[test]
    fn test_unnamed_winner_is_not_credited() {
        let matches: Vec<MatchRecord> = (0..6)
            .map(|i| {
                m(
                    ("", "Ghost", "RO"),
                    (&format!("P{}", i), "Kano", "DE"),
                    "Player 1 Wins",
                )
            })
            .collect();
        let a = analyze(&matches, None, None, None, &AnalysisConfig::default()).unwrap();

        assert!(a.day2_deck_counts.is_empty());
        assert_eq!(a.country_rows.len(), 1);
        assert_eq!(a.country_rows[0].name, "");
        assert_eq!(a.country_rows[0].wins, 0);
        assert_eq!(a.country_rows[0].win_rate, "0.0%");
    }

    #[test]
    fn test_country_code_is_configurable() {
        let matches = vec![m(("A", "Kano", "de"), ("B", "Bravo", "RO"), "Player 1 Wins")];
        let config = AnalysisConfig {
            country_code: "de".to_string(),
            country_label: "German".to_string(),
        };
        let a = analyze(&matches, None, None, None, &config).unwrap();
        assert_eq!(a.country_code, "DE");
        assert_eq!(a.country_rows.len(), 1);
        assert_eq!(a.country_rows[0].name, "A");
    }

    #[test]
    fn test_round_tables_include_empty_rounds() {
        let r1 = vec![m(("A", "Kano", ""), ("B", "Bravo", ""), "Player 1 Wins")];
        let r3 = vec![m(("A", "Kano", ""), ("C", "Dash", ""), "Player 2 Wins")];
        let mut by_round = MatchesByRound::new();
        by_round.insert(1, r1.clone());
        by_round.insert(3, r3.clone());
        let all: Vec<MatchRecord> = r1.iter().chain(r3.iter()).cloned().collect();

        let rounds = [1, 2, 3];
        let a = analyze(
            &all,
            Some(r1.as_slice()),
            Some(&by_round),
            Some(&rounds[..]),
            &AnalysisConfig::default(),
        )
        .unwrap();
        let table_rounds: Vec<u32> = a.round_tables.iter().map(|t| t.round).collect();
        assert_eq!(table_rounds, vec![1, 2, 3]);
        assert!(a.round_tables[1].rows.is_empty());
        assert_eq!(a.round_tables[2].rows[0][3], "Player 2 Wins");
        assert_eq!(a.match_rows.len(), 2);

        let a = analyze(&all, None, Some(&by_round), None, &AnalysisConfig::default()).unwrap();
        let table_rounds: Vec<u32> = a.round_tables.iter().map(|t| t.round).collect();
        assert_eq!(table_rounds, vec![1, 3]);
    }
}
