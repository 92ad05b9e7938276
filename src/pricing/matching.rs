//! Picking the right printing for a requested card name.

use super::CardData;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SET_HINT: Regex = Regex::new(r"^(.+?)\s*\(([^()]+)\)\s*$").unwrap();
}

/// Splits "Pikachu (cel25)" into ("Pikachu", Some("cel25")).
/// Names without a trailing parenthesized hint come back unchanged.
pub fn split_set_hint(name: &str) -> (&str, Option<&str>) {
    let trimmed = name.trim();
    match SET_HINT.captures(trimmed) {
        Some(caps) => {
            let base = caps.get(1).map_or(trimmed, |m| m.as_str().trim());
            let hint = caps.get(2).map(|m| m.as_str().trim()).filter(|h| !h.is_empty());
            (base, hint)
        }
        None => (trimmed, None),
    }
}

/// Chooses among search results for `requested`:
/// a result whose id starts with the set hint, then an exact name match,
/// then the first result.
pub fn select_best_match(candidates: Vec<CardData>, requested: &str) -> Option<CardData> {
    let (base, hint) = split_set_hint(requested);

    if let Some(hint) = hint {
        let hint = hint.to_lowercase();
        if let Some(pos) = candidates
            .iter()
            .position(|c| c.id().to_lowercase().starts_with(&hint))
        {
            return candidates.into_iter().nth(pos);
        }
    }

    if let Some(pos) = candidates
        .iter()
        .position(|c| c.name().eq_ignore_ascii_case(base))
    {
        return candidates.into_iter().nth(pos);
    }

    candidates.into_iter().next()
}
