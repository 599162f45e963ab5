//! Rounds specifier parsing ("1-8,10" style).

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeSet;

/// Highest round number accepted.
pub const MAX_ROUND: u32 = 1000;

lazy_static::lazy_static! {
    static ref RANGE_PATTERN: Regex = Regex::new(r"^(\d+)\s*-\s*(\d+)$").unwrap();
}

/// Parse a comma-separated list of rounds and inclusive ranges.
///
/// Parts that are neither a range nor a plain number are ignored, so
/// `"1-3, x, 5"` yields `[1, 2, 3, 5]`. A reversed range contributes nothing.
/// A part containing `-` whose bounds are not integers is an error, as is any
/// round above [`MAX_ROUND`].
///
/// The result is sorted ascending with duplicates removed.
pub fn parse_rounds(input: &str) -> Result<Vec<u32>> {
    let mut rounds = BTreeSet::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.contains('-') {
            let caps = RANGE_PATTERN
                .captures(part)
                .ok_or_else(|| anyhow::anyhow!("invalid round range '{}'", part))?;
            let start: u32 = caps[1]
                .parse()
                .with_context(|| format!("invalid round range '{}'", part))?;
            let end: u32 = caps[2]
                .parse()
                .with_context(|| format!("invalid round range '{}'", part))?;
            if start.max(end) > MAX_ROUND {
                anyhow::bail!("invalid round range '{}': rounds go up to {}", part, MAX_ROUND);
            }
            rounds.extend(start..=end);
        } else if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()) {
            let round: u32 = part
                .parse()
                .with_context(|| format!("invalid round '{}'", part))?;
            if round > MAX_ROUND {
                anyhow::bail!("invalid round '{}': rounds go up to {}", part, MAX_ROUND);
            }
            rounds.insert(round);
        }
    }

    Ok(rounds.into_iter().collect())
}
