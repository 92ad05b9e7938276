//! Post-parse sanity checks.
//!
//! Every check yields a human-readable warning. None of them is fatal: a
//! flagged decklist can still be submitted and sorted out by staff.

use log::{info, warn};

use super::parser::ParsedCard;
use crate::config::DecklistLimits;

pub const WARNING_EMPTY: &str = "No cards found in decklist";

/// Validates a parsed card list against the configured limits.
///
/// # Returns
/// A vector of warnings. Empty if nothing looks suspicious.
pub fn validate_decklist(cards: &[ParsedCard], limits: &DecklistLimits) -> Vec<String> {
    let mut warnings = Vec::new();

    if cards.is_empty() {
        warnings.push(WARNING_EMPTY.to_string());
    }

    let total: u32 = cards.iter().map(|c| c.quantity).sum();
    if total > limits.max_cards {
        warnings.push(format!(
            "Decklist has {} cards, more than the maximum of {}. Please check for duplicates.",
            total, limits.max_cards
        ));
    }

    let needs_review = cards.iter().filter(|c| c.needs_review()).count();
    if needs_review > 0 {
        warnings.push(format!(
            "{} card{} could not be read with confidence and will need manual review",
            needs_review,
            if needs_review == 1 { "" } else { "s" }
        ));
    }

    if warnings.is_empty() {
        info!("Decklist with {} cards passed validation", cards.len());
    } else {
        for warning in &warnings {
            warn!("{warning}");
        }
    }

    warnings
}

/// Checks the raw submission size before parsing
pub fn validate_decklist_text(text: &str, limits: &DecklistLimits) -> Vec<String> {
    let length = text.chars().count();
    if length > limits.max_chars {
        let warning = format!(
            "Decklist text is {} characters long, more than the maximum of {}",
            length, limits.max_chars
        );
        warn!("{warning}");
        vec![warning]
    } else {
        Vec::new()
    }
}
