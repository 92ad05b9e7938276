//! Scryfall API client for Magic card lookups
//!
//! Bulk name lookups go through `/cards/collection` in a single call per 75
//! names and are not throttled. Fuzzy lookups and autocomplete are one call
//! per name and go through the provider's request queue.

use super::matching::split_set_hint;
use super::{BatchLookup, CardData, CardDataProvider, CardSource, AUTOCOMPLETE_LIMIT, USER_AGENT};
use crate::error::{Error, Result};
use crate::queue::RequestQueue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scryfall's limit for identifiers per collection request
pub const COLLECTION_LIMIT: usize = 75;

/// Scryfall card response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScryfallCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub set_name: String,
    #[serde(default)]
    pub collector_number: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub prices: ScryfallPrices,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    /// For double-faced cards, images are in card_faces
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ScryfallPrices {
    pub eur: Option<String>,
    pub eur_foil: Option<String>,
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

impl ScryfallCard {
    /// Get the primary image URL (normal size)
    pub fn image_url(&self) -> Option<&str> {
        // Try direct image_uris first
        if let Some(ref uris) = self.image_uris {
            return uris.normal.as_deref();
        }
        // For double-faced cards, get front face image
        if let Some(ref faces) = self.card_faces {
            if let Some(face) = faces.first() {
                if let Some(ref uris) = face.image_uris {
                    return uris.normal.as_deref();
                }
            }
        }
        None
    }

    /// USD price, then USD foil for foil-only printings, then EUR
    pub fn reference_price(&self) -> Option<&str> {
        self.prices
            .usd
            .as_deref()
            .or(self.prices.usd_foil.as_deref())
            .or(self.prices.eur.as_deref())
    }
}

/// Scryfall API error response
#[derive(Debug, Deserialize)]
struct ScryfallError {
    code: String,
    details: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    set: Option<String>,
}

#[derive(Debug, Serialize)]
struct CollectionRequest {
    identifiers: Vec<Identifier>,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    data: Vec<ScryfallCard>,
    #[serde(default)]
    not_found: Vec<Identifier>,
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    data: Vec<String>,
}

/// Scryfall as a bulk-capable, priced card-data source
#[derive(Debug, Clone)]
pub struct ScryfallProvider {
    client: reqwest::Client,
    base_url: String,
    queue: RequestQueue,
    timeout: Duration,
}

impl ScryfallProvider {
    pub fn new(base_url: &str, queue: RequestQueue, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            queue,
            timeout,
        })
    }

    /// Runs one request, bounded by the configured timeout
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        match tokio::time::timeout(self.timeout, read_response(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(CardSource::Scryfall.label().to_string())),
        }
    }
}

/// 404 means "no such card" and maps to None; other failures are errors
async fn read_response<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<Option<T>> {
    let response = request.header("Accept", "application/json").send().await?;
    let status = response.status();

    if status.is_success() {
        let body = response.text().await?;
        return Ok(Some(serde_json::from_str(&body)?));
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    match response.json::<ScryfallError>().await {
        Ok(error) => Err(Error::ApiResponse {
            code: error.code,
            details: error.details,
        }),
        Err(_) => Err(Error::HttpStatus(status)),
    }
}

impl CardDataProvider for ScryfallProvider {
    fn source(&self) -> CardSource {
        CardSource::Scryfall
    }

    fn batch_limit(&self) -> Option<usize> {
        Some(COLLECTION_LIMIT)
    }

    async fn lookup_batch(&self, names: &[String]) -> Result<BatchLookup> {
        let identifiers: Vec<Identifier> = names
            .iter()
            .map(|name| {
                let (base, hint) = split_set_hint(name);
                Identifier {
                    name: Some(base.to_string()),
                    set: hint.map(str::to_lowercase),
                }
            })
            .collect();

        let url = format!("{}/cards/collection", self.base_url);
        log::info!("Fetching {} cards from Scryfall collection", identifiers.len());

        let request = self.client.post(&url).json(&CollectionRequest { identifiers });
        let response: CollectionResponse = self
            .send_json(request)
            .await?
            .ok_or(Error::HttpStatus(reqwest::StatusCode::NOT_FOUND))?;

        Ok(BatchLookup {
            cards: response.data.into_iter().map(CardData::Scryfall).collect(),
            not_found: response.not_found.into_iter().filter_map(|i| i.name).collect(),
        })
    }

    async fn lookup_fuzzy(&self, name: &str) -> Result<Option<CardData>> {
        let (base, hint) = split_set_hint(name);
        let mut url = format!(
            "{}/cards/named?fuzzy={}",
            self.base_url,
            urlencoding::encode(base)
        );
        if let Some(set) = hint {
            url.push_str(&format!("&set={}", urlencoding::encode(&set.to_lowercase())));
        }

        log::debug!("Fetching card from Scryfall: {}", name);

        let card: Option<ScryfallCard> = self
            .queue
            .execute(|| self.send_json(self.client.get(&url)))
            .await?;
        Ok(card.map(CardData::Scryfall))
    }

    async fn autocomplete(&self, partial: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/cards/autocomplete?q={}",
            self.base_url,
            urlencoding::encode(partial.trim())
        );

        let catalog: Option<Catalog> = self
            .queue
            .execute(|| self.send_json(self.client.get(&url)))
            .await?;

        let mut names = catalog.map(|c| c.data).unwrap_or_default();
        names.truncate(AUTOCOMPLETE_LIMIT);
        Ok(names)
    }

    fn chunk_delay(&self) -> Duration {
        self.queue.min_delay()
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
