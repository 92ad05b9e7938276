//! Card-data sources and price reconciliation
//!
//! Two sources with different capabilities implement [`CardDataProvider`]:
//! Scryfall (bulk lookup, priced) and the proxied Pokémon TCG catalog
//! (per-name lookup, no prices). The engine in [`engine`] branches on the
//! batch capability, never on which source it talks to.

pub mod engine;
pub mod matching;
pub mod pokemon;
pub mod scryfall;

use crate::error::{Error, Result};
use serde::Serialize;
use std::time::Duration;

pub use engine::{fetch_prices, price_decklist, suggest_names, DecklistPricing};
pub use pokemon::{PokemonCard, PokemonTcgProvider};
pub use scryfall::{ScryfallCard, ScryfallProvider};

/// Maximum number of autocomplete suggestions returned to the UI
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// User agent sent to every card-data source
pub const USER_AGENT: &str = "ListPull/1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSource {
    Scryfall,
    PokemonTcg,
}

impl CardSource {
    pub fn label(&self) -> &'static str {
        match self {
            CardSource::Scryfall => "Scryfall",
            CardSource::PokemonTcg => "Pokémon TCG",
        }
    }
}

/// Card as returned by one of the sources, tagged once at fetch time
#[derive(Debug, Clone)]
pub enum CardData {
    Scryfall(ScryfallCard),
    Pokemon(PokemonCard),
}

impl CardData {
    pub fn source(&self) -> CardSource {
        match self {
            CardData::Scryfall(_) => CardSource::Scryfall,
            CardData::Pokemon(_) => CardSource::PokemonTcg,
        }
    }

    /// Source-side identifier (Scryfall UUID, Pokémon "set-number" id)
    pub fn id(&self) -> &str {
        match self {
            CardData::Scryfall(card) => &card.id,
            CardData::Pokemon(card) => &card.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CardData::Scryfall(card) => &card.name,
            CardData::Pokemon(card) => &card.name,
        }
    }

    /// True if `name` is this card's name or, for double-faced cards, the
    /// name of its front face (case-insensitive)
    pub fn answers_to(&self, name: &str) -> bool {
        let full = self.name();
        full.eq_ignore_ascii_case(name)
            || full
                .split(" // ")
                .next()
                .is_some_and(|front| front.eq_ignore_ascii_case(name))
    }

    pub fn to_price_record(&self) -> PriceRecord {
        match self {
            CardData::Scryfall(card) => PriceRecord {
                source: CardSource::Scryfall,
                id: card.id.clone(),
                name: card.name.clone(),
                set_name: card.set_name.clone(),
                set_id: card.set.clone(),
                rarity: card.rarity.clone(),
                image_url: card.image_url().map(str::to_string),
                reference_price: card.reference_price().map(str::to_string),
            },
            CardData::Pokemon(card) => PriceRecord {
                source: CardSource::PokemonTcg,
                id: card.id.clone(),
                name: card.name.clone(),
                set_name: card.set.name.clone(),
                set_id: card.set.id.clone(),
                rarity: card.rarity.clone(),
                image_url: card.image_url().map(str::to_string),
                reference_price: None,
            },
        }
    }
}

/// Normalized card metadata shown to staff next to a line item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub source: CardSource,
    pub id: String,
    pub name: String,
    pub set_name: String,
    pub set_id: String,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    /// Catalog price hint; always None for sources without prices
    pub reference_price: Option<String>,
}

/// Per-name result of [`fetch_prices`]; a null record means "no data"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceLookup {
    pub reference_price: Option<String>,
    pub record: Option<PriceRecord>,
}

impl PriceLookup {
    pub fn from_card(card: &CardData) -> Self {
        let record = card.to_price_record();
        Self {
            reference_price: record.reference_price.clone(),
            record: Some(record),
        }
    }
}

/// Result of a bulk lookup: matched cards plus names the source did not know
#[derive(Debug, Clone, Default)]
pub struct BatchLookup {
    pub cards: Vec<CardData>,
    pub not_found: Vec<String>,
}

/// A card-data source.
///
/// `batch_limit` advertises the bulk capability. Sources without it only
/// need `lookup_fuzzy` and `autocomplete`.
#[allow(async_fn_in_trait)]
pub trait CardDataProvider {
    fn source(&self) -> CardSource;

    /// Maximum names per bulk call, or None when the source has no bulk endpoint
    fn batch_limit(&self) -> Option<usize> {
        None
    }

    async fn lookup_batch(&self, names: &[String]) -> Result<BatchLookup> {
        let _ = names;
        Err(Error::Unsupported(self.source().label(), "batch lookup"))
    }

    /// Best match for a single (possibly misspelled or set-hinted) name
    async fn lookup_fuzzy(&self, name: &str) -> Result<Option<CardData>>;

    async fn autocomplete(&self, partial: &str) -> Result<Vec<String>>;

    /// Pause between two chunks of per-name lookups
    fn chunk_delay(&self) -> Duration {
        Duration::ZERO
    }
}
