//! Decklist text parsing.
//!
//! Turns free-form decklist exports (Arena, MTGO, Moxfield, Pokémon TCG Live
//! and hand-typed lists) into card names with quantities. Set codes and
//! collector numbers are dropped because price lookups match on name only.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Confidence for a line matched by a structural pattern
pub const CONFIDENCE_EXACT: f64 = 1.0;
/// Confidence for a bare card name with an assumed quantity of 1
pub const CONFIDENCE_ASSUMED: f64 = 0.5;
/// Confidence for a line that could not be understood at all
pub const CONFIDENCE_NONE: f64 = 0.0;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

const NOTE_ASSUMED_QUANTITY: &str = "no quantity found, assuming 1";
const NOTE_UNPARSABLE: &str = "could not parse this line";

/// Optional sideboard marker: "SB: 2 ..." or "sb 2 ..."
const SIDEBOARD: &str = r"(?i:sb:\s*|sb\s+)?";
/// Quantity with optional "x" separator: "4 ", "4x ", "4 x "
const QUANTITY: &str = r"(\d+)\s*[xX]?\s+";
const SET_CODE: &str = r"[A-Za-z0-9_-]+";

struct CardPattern {
    label: &'static str,
    regex: Regex,
}

impl CardPattern {
    fn new(label: &'static str, body: &str) -> Self {
        let source = format!("^{SIDEBOARD}{QUANTITY}{body}$");
        Self {
            label,
            regex: Regex::new(&source).unwrap(),
        }
    }
}

lazy_static! {
    static ref SECTION_HEADER: Regex = Regex::new(
        r"(?i)^(?:deck|main\s*deck|mainboard|sideboard|sb|commander|companion|maybeboard|pok[eé]mon|trainers?|energy|total\s+cards)\s*(?:\(\d+\)|:\s*\d*)?\s*:?$"
    )
    .unwrap();

    // Most specific first; the bare fallback must stay last.
    static ref CARD_PATTERNS: Vec<CardPattern> = vec![
        CardPattern::new(
            "paren set + collector number",
            &format!(r"(.+?)\s+\({SET_CODE}\)\s+\S+(?:\s+\S+)*"),
        ),
        CardPattern::new("paren set", &format!(r"(.+?)\s+\({SET_CODE}\)")),
        CardPattern::new(
            "bracket set + collector number",
            &format!(r"(.+?)\s+\[{SET_CODE}\]\s+\S+(?:\s+\S+)*"),
        ),
        CardPattern::new("bracket set", &format!(r"(.+?)\s+\[{SET_CODE}\]")),
        CardPattern::new("quantity + name", r"(.+)"),
    ];
}

/// One card entry produced from a decklist line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCard {
    /// Requested quantity; 0 only for unparsable lines
    pub quantity: u32,
    pub card_name: String,
    /// Original input line, kept for auditing
    pub line_raw: String,
    pub parse_confidence: f64,
    pub error: Option<String>,
}

impl ParsedCard {
    pub fn needs_review(&self) -> bool {
        self.parse_confidence < CONFIDENCE_EXACT
    }
}

/// Outcome of parsing a whole decklist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    pub cards: Vec<ParsedCard>,
    pub errors: Vec<String>,
    /// True when there are errors or any card needs manual review
    pub has_errors: bool,
}

impl ParseResult {
    pub fn total_quantity(&self) -> u32 {
        self.cards.iter().map(|c| c.quantity).sum()
    }
}

/// Returns true for blank lines, comments and section headers
pub fn is_ignored_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || line.starts_with("//")
        || line.starts_with('#')
        || SECTION_HEADER.is_match(line)
}

/// Tries the structural patterns in order. Returns quantity and bare name.
fn match_structural(line: &str) -> Option<(u32, String)> {
    for pattern in CARD_PATTERNS.iter() {
        let Some(caps) = pattern.regex.captures(line) else {
            continue;
        };

        let quantity = match caps[1].parse::<u32>() {
            Ok(q) if (MIN_QUANTITY..=MAX_QUANTITY).contains(&q) => q,
            _ => continue,
        };
        let name = caps[2].trim();
        if name.is_empty() {
            continue;
        }

        debug!("Matched '{}' as {}", line, pattern.label);
        return Some((quantity, name.to_string()));
    }
    None
}

/// Parses a single non-ignored line. Never fails: unknown text becomes an
/// entry with zero confidence.
pub fn parse_line(line: &str) -> ParsedCard {
    let trimmed = line.trim();

    if let Some((quantity, card_name)) = match_structural(trimmed) {
        return ParsedCard {
            quantity,
            card_name,
            line_raw: trimmed.to_string(),
            parse_confidence: CONFIDENCE_EXACT,
            error: None,
        };
    }

    let starts_with_letter = trimmed.chars().next().is_some_and(char::is_alphabetic);
    if starts_with_letter && !trimmed.contains(':') {
        return ParsedCard {
            quantity: 1,
            card_name: trimmed.to_string(),
            line_raw: trimmed.to_string(),
            parse_confidence: CONFIDENCE_ASSUMED,
            error: Some(NOTE_ASSUMED_QUANTITY.to_string()),
        };
    }

    debug!("Could not parse decklist line: {}", trimmed);
    ParsedCard {
        quantity: 0,
        card_name: trimmed.to_string(),
        line_raw: trimmed.to_string(),
        parse_confidence: CONFIDENCE_NONE,
        error: Some(NOTE_UNPARSABLE.to_string()),
    }
}

/// Merges entries with the same name (case-insensitive), keeping first-seen
/// order, summing quantities and keeping the lowest confidence.
pub fn consolidate(cards: Vec<ParsedCard>) -> Vec<ParsedCard> {
    let mut merged: Vec<ParsedCard> = Vec::with_capacity(cards.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for card in cards {
        let key = card.card_name.to_lowercase();
        match index.get(&key) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.quantity += card.quantity;
                existing.parse_confidence = existing.parse_confidence.min(card.parse_confidence);
                if existing.error.is_none() {
                    existing.error = card.error;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(card);
            }
        }
    }

    merged
}

/// Parses a complete decklist.
///
/// Pure and deterministic; every line either yields an entry, is ignored,
/// or yields a zero-confidence entry with an error.
pub fn parse_decklist(raw_text: &str) -> ParseResult {
    let mut parsed = Vec::new();
    let mut errors = Vec::new();

    for line in raw_text.split('\n') {
        if is_ignored_line(line) {
            continue;
        }
        let card = parse_line(line);
        if let Some(ref message) = card.error {
            errors.push(format!("\"{}\": {}", card.line_raw, message));
        }
        parsed.push(card);
    }

    let cards = consolidate(parsed);
    let has_errors = !errors.is_empty() || cards.iter().any(ParsedCard::needs_review);

    debug!(
        "Parsed decklist into {} cards ({} errors)",
        cards.len(),
        errors.len()
    );

    ParseResult {
        cards,
        errors,
        has_errors,
    }
}

/// Renders cards back into the simple "quantity name" format
pub fn format_decklist(cards: &[ParsedCard]) -> String {
    cards
        .iter()
        .filter(|c| c.quantity > 0)
        .map(|c| format!("{} {}", c.quantity, c.card_name))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
