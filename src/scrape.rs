//! Results page parsing.
//!
//! A coverage results page lists one `<tr class="match-row">` per pairing with
//! three cells: player 1, the result pill, player 2. Each player cell carries a
//! `.player-text` block holding the name (`strong`), the deck (`span`) and a
//! flag icon (`<i class="flag de">`) whose second class is the country code.

use crate::model::{MatchRecord, Player};
use scraper::{ElementRef, Html, Selector};

lazy_static::lazy_static! {
    static ref MATCH_ROW: Selector = Selector::parse("tr.match-row").unwrap();
    static ref CELL: Selector = Selector::parse("td").unwrap();
    static ref WINNER_PILL: Selector = Selector::parse(".winner-pill").unwrap();
    static ref PLAYER_NAME: Selector = Selector::parse(".player-text strong").unwrap();
    static ref PLAYER_DECK: Selector = Selector::parse(".player-text span").unwrap();
    static ref PLAYER_FLAG: Selector = Selector::parse(".player-text i.flag").unwrap();
}

/// Extract every match from a results page.
///
/// Rows that do not have exactly three cells are skipped.
pub fn parse_results_page(html: &str) -> Vec<MatchRecord> {
    let document = Html::parse_document(html);
    let mut matches = Vec::new();

    for row in document.select(&MATCH_ROW) {
        let cells: Vec<ElementRef> = row.select(&CELL).collect();
        if cells.len() != 3 {
            continue;
        }

        let winner = cells[1]
            .select(&WINNER_PILL)
            .next()
            .map(stripped_text)
            .unwrap_or_default();

        matches.push(MatchRecord {
            player1: parse_player(cells[0]),
            player2: parse_player(cells[2]),
            winner,
        });
    }

    log::debug!("Parsed {} match rows", matches.len());
    matches
}

/// Extract name, deck and country from a player cell.
pub fn parse_player(cell: ElementRef) -> Player {
    let name = cell
        .select(&PLAYER_NAME)
        .next()
        .map(stripped_text)
        .unwrap_or_default();
    let deck = cell
        .select(&PLAYER_DECK)
        .next()
        .map(stripped_text)
        .unwrap_or_default();
    let country = cell
        .select(&PLAYER_FLAG)
        .next()
        .and_then(|flag| flag.value().attr("class"))
        .and_then(|classes| classes.split_whitespace().find(|c| *c != "flag"))
        .map(|c| c.to_uppercase())
        .unwrap_or_default();

    Player {
        name,
        deck,
        country,
    }
}

/// Concatenate the element's text nodes, each trimmed, skipping blank ones.
fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!("<html><body><table><tbody>{}</tbody></table></body></html>", rows)
    }

    #[test]
    fn test_parses_match_row() {
        let html = page(
            r#"
            <tr class="match-row">
              <td><div class="player-text"><i class="flag de"></i> <strong> Jonas Berg </strong> <span>Dorinthea Ironsong</span></div></td>
              <td><span class="winner-pill"> Player 1 Wins </span></td>
              <td><div class="player-text"><i class="flag ro"></i><strong>Andrei Pop</strong><span>Kano</span></div></td>
            </tr>"#,
        );

        let matches = parse_results_page(&html);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.player1, Player::new("Jonas Berg", "Dorinthea Ironsong", "DE"));
        assert_eq!(m.player2, Player::new("Andrei Pop", "Kano", "RO"));
        assert_eq!(m.winner, "Player 1 Wins");
    }

    #[test]
    fn test_missing_selectors_give_empty_strings() {
        let html = page(
            r#"
            <tr class="match-row">
              <td><div class="player-text"><strong>Solo</strong></div></td>
              <td></td>
              <td><div class="other"><strong>Hidden</strong></div></td>
            </tr>"#,
        );

        let matches = parse_results_page(&html);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].player1, Player::new("Solo", "", ""));
        assert_eq!(matches[0].player2, Player::default());
        assert_eq!(matches[0].winner, "");
    }

    #[test]
    fn test_skips_rows_without_three_cells() {
        let html = page(
            r#"
            <tr class="match-row"><td>bye</td><td>x</td></tr>
            <tr class="header-row"><td>a</td><td>b</td><td>c</td></tr>
            <tr class="match-row">
              <td><div class="player-text"><strong>A</strong></div></td>
              <td><span class="winner-pill">Draw</span></td>
              <td><div class="player-text"><strong>B</strong></div></td>
            </tr>"#,
        );

        let matches = parse_results_page(&html);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].winner, "Draw");
    }

    #[test]
    fn test_flag_without_country_class() {
        let html = page(
            r#"
            <tr class="match-row">
              <td><div class="player-text"><i class="flag"></i><strong>A</strong></div></td>
              <td></td>
              <td><div class="player-text"><i class="flag flag-lg us"></i><strong>B</strong></div></td>
            </tr>"#,
        );

        let matches = parse_results_page(&html);
        assert_eq!(matches[0].player1.country, "");
        assert_eq!(matches[0].player2.country, "FLAG-LG");
    }

    #[test]
    fn test_nested_text_is_joined_without_separator() {
        let html = page(
            r#"
            <tr class="match-row">
              <td><div class="player-text"><strong>Ana <em>Maria</em></strong></div></td>
              <td><span class="winner-pill">Player <b>2</b> Wins</span></td>
              <td><div class="player-text"><strong>B</strong></div></td>
            </tr>"#,
        );

        let matches = parse_results_page(&html);
        assert_eq!(matches[0].player1.name, "AnaMaria");
        assert_eq!(matches[0].winner, "Player2Wins");
    }
}
