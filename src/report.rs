//! HTML rendering of an [`Analysis`]: Plotly charts/tables and the index page.
//!
//! Figures are serialized as Plotly JSON and drawn in the browser, so the
//! page needs the Plotly bundle loaded from [`PLOTLY_CDN`].

use crate::analysis::Analysis;
use crate::model::MATCH_HEADERS;
use serde_json::{json, Value};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

// ============================================================================
// Figures
// ============================================================================

/// A Plotly figure bound to a target `<div>`.
#[derive(Debug, Clone)]
pub struct Figure {
    pub id: String,
    pub data: Value,
    pub layout: Value,
}

impl Figure {
    /// Table figure. `columns` is column-major, one inner vec per header.
    pub fn table(id: &str, title: &str, headers: &[&str], columns: Vec<Vec<Value>>) -> Self {
        Figure {
            id: id.to_string(),
            data: json!([{
                "type": "table",
                "header": { "values": headers },
                "cells": { "values": columns },
            }]),
            layout: json!({ "title": { "text": title } }),
        }
    }

    /// Vertical bar chart.
    pub fn bar(
        id: &str,
        title: &str,
        x: Vec<String>,
        y: Vec<usize>,
        x_title: &str,
        y_title: &str,
    ) -> Self {
        Figure {
            id: id.to_string(),
            data: json!([{ "type": "bar", "x": x, "y": y }]),
            layout: json!({
                "title": { "text": title },
                "xaxis": { "title": { "text": x_title } },
                "yaxis": { "title": { "text": y_title } },
            }),
        }
    }

    /// Target div plus the script drawing into it.
    pub fn to_html(&self) -> String {
        format!(
            "<div id=\"{id}\" class=\"plotly-graph-div\" style=\"width:100%;\"></div>\n\
             <script type=\"text/javascript\">Plotly.newPlot(\"{id}\", {data}, {layout}, {{\"responsive\": true}});</script>",
            id = escape_html(&self.id),
            data = script_json(&self.data),
            layout = script_json(&self.layout),
        )
    }
}

/// JSON safe to inline inside a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Transpose rows into the column-major layout Plotly tables expect.
fn match_columns(rows: &[[String; 7]]) -> Vec<Vec<Value>> {
    (0..MATCH_HEADERS.len())
        .map(|col| rows.iter().map(|row| json!(row[col])).collect())
        .collect()
}

fn count_columns(counts: &[(String, usize)]) -> (Vec<String>, Vec<usize>) {
    counts.iter().cloned().unzip()
}

// ============================================================================
// Report
// ============================================================================

/// HTML fragments for one analysis.
#[derive(Debug, Clone, Default)]
pub struct RenderedReport {
    /// Summary, deck table, deck chart, Day 2 chart, all matches, country table
    pub graphs: Vec<String>,
    /// One table per round, ascending
    pub per_round_tables: Vec<String>,
}

/// Render every figure of the analysis.
pub fn render_analysis(analysis: &Analysis) -> RenderedReport {
    let summary = format!(
        "<h2>Total unique players (from Round 1): {}</h2>",
        analysis.total_unique_players
    );

    let (decks, deck_counts) = count_columns(&analysis.deck_counts);
    let deck_table = Figure::table(
        "deck-table",
        "Number of Players per Deck (from Round 1 only)",
        &["Deck", "Player Count"],
        vec![
            decks.iter().map(|d| json!(d)).collect(),
            deck_counts.iter().map(|c| json!(c)).collect(),
        ],
    );
    let deck_bar = Figure::bar(
        "deck-bar",
        "Deck Distribution (Round 1 only)",
        decks,
        deck_counts,
        "Deck",
        "Number of Players",
    );

    let (day2_decks, day2_counts) = count_columns(&analysis.day2_deck_counts);
    let day2_bar = Figure::bar(
        "day2-bar",
        &format!(
            "Day 2 Analysis: Decks of Players with {} or More Wins (Swiss Only)",
            analysis.win_cutoff
        ),
        day2_decks,
        day2_counts,
        "Deck",
        "Number of Players",
    );

    let matches_table = Figure::table(
        "all-matches",
        "All Matches",
        &MATCH_HEADERS,
        match_columns(&analysis.match_rows),
    );

    let label = &analysis.country_label;
    let country_header = format!("{} Player", label);
    let rows = &analysis.country_rows;
    let country_table = Figure::table(
        "country-table",
        &format!(
            "{} Players and Their Win Rate (All Rounds, Sorted by Wins)",
            label
        ),
        &[country_header.as_str(), "Deck", "Wins", "Win Rate"],
        vec![
            rows.iter().map(|r| json!(r.name)).collect(),
            rows.iter().map(|r| json!(r.deck)).collect(),
            rows.iter().map(|r| json!(r.wins)).collect(),
            rows.iter().map(|r| json!(r.win_rate)).collect(),
        ],
    );

    let per_round_tables = analysis
        .round_tables
        .iter()
        .map(|table| {
            Figure::table(
                &format!("round-{}", table.round),
                &format!("Matches - Round {}", table.round),
                &MATCH_HEADERS,
                match_columns(&table.rows),
            )
            .to_html()
        })
        .collect();

    RenderedReport {
        graphs: vec![
            summary,
            deck_table.to_html(),
            deck_bar.to_html(),
            day2_bar.to_html(),
            matches_table.to_html(),
            country_table.to_html(),
        ],
        per_round_tables,
    }
}

// ============================================================================
// Index page
// ============================================================================

/// Everything the index page shows.
pub struct IndexPage<'a> {
    pub base_url: &'a str,
    pub rounds: &'a str,
    pub error: Option<&'a str>,
    pub report: Option<&'a RenderedReport>,
}

/// Full HTML document with the form and any results.
pub fn render_index(page: &IndexPage) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n<title>Tournament Coverage Stats</title>\n");
    out.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_CDN));
    out.push_str(
        "<style>body{font-family:sans-serif;margin:2em;} \
         form label{display:block;margin-top:.5em;} \
         input[type=text]{width:40em;} .error{color:#b00020;font-weight:bold;}</style>\n",
    );
    out.push_str("</head>\n<body>\n<h1>Tournament Coverage Stats</h1>\n");

    out.push_str("<form method=\"post\" action=\"/\">\n");
    out.push_str(&format!(
        "<label>Results base URL <input type=\"text\" name=\"base_url\" value=\"{}\"></label>\n",
        escape_html(page.base_url)
    ));
    out.push_str(&format!(
        "<label>Rounds (e.g. 1-8,10) <input type=\"text\" name=\"rounds\" value=\"{}\"></label>\n",
        escape_html(page.rounds)
    ));
    out.push_str("<button type=\"submit\">Analyze</button>\n</form>\n");

    if let Some(error) = page.error {
        out.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(error)));
    }

    if let Some(report) = page.report {
        for graph in &report.graphs {
            out.push_str("<section>\n");
            out.push_str(graph);
            out.push_str("\n</section>\n");
        }
        if !report.per_round_tables.is_empty() {
            out.push_str("<h2>Matches by Round</h2>\n");
            for table in &report.per_round_tables {
                out.push_str("<section>\n");
                out.push_str(table);
                out.push_str("\n</section>\n");
            }
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}
