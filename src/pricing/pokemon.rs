//! Pokémon TCG catalog client, reached through the store's proxy
//!
//! The catalog has no bulk endpoint and no usable prices: every lookup is one
//! queued call per name and records only carry identity, set and image.

use super::matching::{select_best_match, split_set_hint};
use super::{CardData, CardDataProvider, CardSource, AUTOCOMPLETE_LIMIT, USER_AGENT};
use crate::error::{Error, Result};
use crate::queue::RequestQueue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Results requested per name search
const SEARCH_PAGE_SIZE: usize = 20;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonCard {
    /// "<set id>-<number>", e.g. "cel25-5"
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rarity: Option<String>,
    pub set: PokemonSet,
    #[serde(default)]
    pub images: Option<PokemonImages>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonSet {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PokemonImages {
    pub small: Option<String>,
    pub large: Option<String>,
}

impl PokemonCard {
    pub fn image_url(&self) -> Option<&str> {
        self.images.as_ref().and_then(|i| i.small.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct NameOnly {
    name: String,
}

/// Pokémon TCG proxy as a per-name, unpriced card-data source
#[derive(Debug, Clone)]
pub struct PokemonTcgProvider {
    client: reqwest::Client,
    base_url: String,
    queue: RequestQueue,
    timeout: Duration,
}

impl PokemonTcgProvider {
    pub fn new(base_url: &str, queue: RequestQueue, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            queue,
            timeout,
        })
    }

    /// Runs a card search through the queue
    async fn search<T: DeserializeOwned>(
        &self,
        query: &str,
        page_size: usize,
        select: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut url = format!(
            "{}/cards?q={}&pageSize={}",
            self.base_url,
            urlencoding::encode(query),
            page_size
        );
        if let Some(fields) = select {
            url.push_str(&format!("&select={fields}"));
        }

        let response: SearchResponse<T> = self
            .queue
            .execute(|| async {
                match tokio::time::timeout(self.timeout, fetch_json(&self.client, &url)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(CardSource::PokemonTcg.label().to_string())),
                }
            })
            .await?;
        Ok(response.data)
    }
}

async fn fetch_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> Result<T> {
    log::debug!("Querying Pokémon TCG proxy: {}", url);
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(Error::HttpStatus(response.status()));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Double quotes would end the quoted search term early
fn quote_safe(name: &str) -> String {
    name.replace('"', "")
}

impl CardDataProvider for PokemonTcgProvider {
    fn source(&self) -> CardSource {
        CardSource::PokemonTcg
    }

    async fn lookup_fuzzy(&self, name: &str) -> Result<Option<CardData>> {
        let (base, _) = split_set_hint(name);
        let query = format!("name:\"{}\"", quote_safe(base));

        let cards: Vec<PokemonCard> = self.search(&query, SEARCH_PAGE_SIZE, None).await?;
        log::debug!("Pokémon TCG returned {} results for {}", cards.len(), name);

        let candidates = cards.into_iter().map(CardData::Pokemon).collect();
        Ok(select_best_match(candidates, name))
    }

    async fn autocomplete(&self, partial: &str) -> Result<Vec<String>> {
        let query = format!("name:\"{}*\"", quote_safe(partial.trim()));
        let hits: Vec<NameOnly> = self
            .search(&query, AUTOCOMPLETE_LIMIT * 3, Some("name"))
            .await?;

        let mut names: Vec<String> = Vec::new();
        for hit in hits {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&hit.name)) {
                names.push(hit.name);
            }
            if names.len() == AUTOCOMPLETE_LIMIT {
                break;
            }
        }
        Ok(names)
    }

    fn chunk_delay(&self) -> Duration {
        self.queue.min_delay()
    }
}

#[cfg(test)]
#[path = "pokemon_tests.rs"]
mod tests;
