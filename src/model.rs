//! Match records scraped from a coverage results page.

use std::collections::BTreeMap;

/// One side of a match as listed on the results page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    /// Display name (empty if the page omitted it)
    pub name: String,
    /// Deck / hero name
    pub deck: String,
    /// Upper-cased country code taken from the flag icon
    pub country: String,
}

impl Player {
    pub fn new(name: &str, deck: &str, country: &str) -> Self {
        Player {
            name: name.to_string(),
            deck: deck.to_string(),
            country: country.to_string(),
        }
    }
}

/// Which player a winner label credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinnerSide {
    Player1,
    Player2,
    /// Draws, byes and unreported results credit nobody
    Nobody,
}

impl WinnerSide {
    /// Interpret a winner label such as "Player 1 Wins".
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.starts_with("player 1") {
            WinnerSide::Player1
        } else if lower.starts_with("player 2") {
            WinnerSide::Player2
        } else {
            WinnerSide::Nobody
        }
    }
}

/// A single pairing from one results table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRecord {
    pub player1: Player,
    pub player2: Player,
    /// Winner label exactly as shown on the page
    pub winner: String,
}

impl MatchRecord {
    pub fn winner_side(&self) -> WinnerSide {
        WinnerSide::from_label(&self.winner)
    }

    /// Name of the credited winner, if any.
    pub fn winner_name(&self) -> Option<&str> {
        match self.winner_side() {
            WinnerSide::Player1 => Some(self.player1.name.as_str()),
            WinnerSide::Player2 => Some(self.player2.name.as_str()),
            WinnerSide::Nobody => None,
        }
    }

    /// Row layout shared by every match table.
    pub fn table_row(&self) -> [String; 7] {
        [
            self.player1.name.clone(),
            self.player1.deck.clone(),
            self.player1.country.clone(),
            self.winner.clone(),
            self.player2.name.clone(),
            self.player2.deck.clone(),
            self.player2.country.clone(),
        ]
    }
}

/// Column headers for [`MatchRecord::table_row`].
pub const MATCH_HEADERS: [&str; 7] = [
    "P1 Name",
    "P1 Deck",
    "P1 Country",
    "Winner",
    "P2 Name",
    "P2 Deck",
    "P2 Country",
];

/// Matches keyed by round number, iterated in ascending round order.
pub type MatchesByRound = BTreeMap<u32, Vec<MatchRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_side_from_label() {
        assert_eq!(WinnerSide::from_label("Player 1 Wins"), WinnerSide::Player1);
        assert_eq!(WinnerSide::from_label("PLAYER 2 WINS"), WinnerSide::Player2);
        assert_eq!(WinnerSide::from_label("player 2"), WinnerSide::Player2);
        assert_eq!(WinnerSide::from_label("Draw"), WinnerSide::Nobody);
        assert_eq!(WinnerSide::from_label(""), WinnerSide::Nobody);
        assert_eq!(WinnerSide::from_label(" Player 1"), WinnerSide::Nobody);
    }

    #[test]
    fn test_winner_name() {
        let m = MatchRecord {
            player1: Player::new("Alice", "Dorinthea", "DE"),
            player2: Player::new("Bob", "Kano", "RO"),
            winner: "Player 2 Wins".to_string(),
        };
        assert_eq!(m.winner_name(), Some("Bob"));
        assert_eq!(m.table_row()[3], "Player 2 Wins");
        assert_eq!(m.table_row()[4], "Bob");
    }
}
