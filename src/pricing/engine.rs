//! Price reconciliation across card-data sources.
//!
//! [`fetch_prices`] never fails as a whole: a source error for one name or
//! one chunk only leaves those names without data.

use super::matching::{select_best_match, split_set_hint};
use super::{CardData, CardDataProvider, PriceLookup, AUTOCOMPLETE_LIMIT};
use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use tokio::time::sleep;

/// Names fetched concurrently per chunk on sources without a bulk endpoint
pub const PER_NAME_CHUNK: usize = 5;

/// Shortest input worth sending to autocomplete
pub const AUTOCOMPLETE_MIN_CHARS: usize = 2;

/// Informational reference total for a decklist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecklistPricing {
    pub total: f64,
    /// Card names without a usable reference price
    pub missing_prices: Vec<String>,
}

/// Trims names and drops case-insensitive duplicates, keeping first-seen order
fn unique_names(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Looks up every name and returns a map keyed by lowercased name.
///
/// Every distinct requested name gets an entry; names the source could not
/// resolve (or that failed) carry a null record.
pub async fn fetch_prices<P: CardDataProvider>(
    provider: &P,
    names: &[String],
) -> HashMap<String, PriceLookup> {
    let unique = unique_names(names);
    info!(
        "Fetching card data for {} names from {}",
        unique.len(),
        provider.source().label()
    );

    let mut prices = match provider.batch_limit() {
        Some(limit) => fetch_in_batches(provider, &unique, limit.max(1)).await,
        None => fetch_per_name(provider, &unique).await,
    };

    for name in &unique {
        prices.entry(name.to_lowercase()).or_default();
    }

    let resolved = prices.values().filter(|p| p.record.is_some()).count();
    info!("Resolved {} of {} names", resolved, prices.len());
    prices
}

async fn fetch_in_batches<P: CardDataProvider>(
    provider: &P,
    names: &[String],
    limit: usize,
) -> HashMap<String, PriceLookup> {
    let mut prices = HashMap::new();

    for chunk in names.chunks(limit) {
        match provider.lookup_batch(chunk).await {
            Ok(batch) => {
                if !batch.not_found.is_empty() {
                    debug!("Not found: {}", batch.not_found.join(", "));
                }
                for name in chunk {
                    let (base, _) = split_set_hint(name);
                    let candidates: Vec<CardData> = batch
                        .cards
                        .iter()
                        .filter(|c| c.answers_to(base))
                        .cloned()
                        .collect();
                    let lookup = select_best_match(candidates, name)
                        .map(|card| PriceLookup::from_card(&card))
                        .unwrap_or_default();
                    prices.insert(name.to_lowercase(), lookup);
                }
            }
            Err(e) => {
                warn!(
                    "Batch lookup of {} names failed, continuing without data: {}",
                    chunk.len(),
                    e
                );
                for name in chunk {
                    prices.insert(name.to_lowercase(), PriceLookup::default());
                }
            }
        }
    }

    prices
}

async fn fetch_per_name<P: CardDataProvider>(
    provider: &P,
    names: &[String],
) -> HashMap<String, PriceLookup> {
    let mut prices = HashMap::new();
    let delay = provider.chunk_delay();

    for (index, chunk) in names.chunks(PER_NAME_CHUNK).enumerate() {
        if index > 0 && !delay.is_zero() {
            sleep(delay).await;
        }

        let lookups = chunk.iter().map(|name| async move {
            let result = provider.lookup_fuzzy(name).await;
            (name, result)
        });

        for (name, result) in join_all(lookups).await {
            let lookup = match result {
                Ok(Some(card)) => PriceLookup::from_card(&card),
                Ok(None) => {
                    debug!("No {} match for {}", provider.source().label(), name);
                    PriceLookup::default()
                }
                Err(e) => {
                    warn!("Lookup for {} failed, continuing without data: {}", name, e);
                    PriceLookup::default()
                }
            };
            prices.insert(name.to_lowercase(), lookup);
        }
    }

    prices
}

/// Autocomplete suggestions for a partially typed name. Errors and very
/// short inputs give an empty list.
pub async fn suggest_names<P: CardDataProvider>(provider: &P, partial: &str) -> Vec<String> {
    let partial = partial.trim();
    if partial.chars().count() < AUTOCOMPLETE_MIN_CHARS {
        return Vec::new();
    }

    match provider.autocomplete(partial).await {
        Ok(mut names) => {
            names.truncate(AUTOCOMPLETE_LIMIT);
            names
        }
        Err(e) => {
            warn!("Autocomplete for {:?} failed: {}", partial, e);
            Vec::new()
        }
    }
}

/// Sums reference price × requested quantity over priced cards.
///
/// The result is a hint for staff; it never becomes the order's estimated
/// total.
pub fn price_decklist<'a, I>(cards: I, prices: &HashMap<String, PriceLookup>) -> DecklistPricing
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let mut pricing = DecklistPricing::default();

    for (name, quantity) in cards {
        let unit = prices
            .get(&name.trim().to_lowercase())
            .and_then(|p| p.reference_price.as_deref())
            .and_then(|p| p.trim().parse::<f64>().ok());

        match unit {
            Some(unit) => pricing.total += unit * quantity as f64,
            None => pricing.missing_prices.push(name.to_string()),
        }
    }

    pricing
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
