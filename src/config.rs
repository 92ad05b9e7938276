//! Store and provider configuration
//!
//! Defaults match the self-hosted deployment. Every field can be overridden
//! through an environment variable, see [`AppConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

/// Public Scryfall API
pub const SCRYFALL_API_URL: &str = "https://api.scryfall.com";

/// Pokémon TCG catalog, reached through the store's proxy
pub const POKEMON_PROXY_URL: &str = "http://localhost:3000/api/pokemon";

/// Limits applied to customer-submitted decklists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecklistLimits {
    /// Total requested quantity above which the list is flagged
    pub max_cards: u32,
    /// Raw text length above which the submission is flagged
    pub max_chars: usize,
}

impl Default for DecklistLimits {
    fn default() -> Self {
        Self {
            max_cards: 500,
            max_chars: 50_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_name: String,
    pub store_email: String,
    pub store_phone: String,
    pub store_address: String,
    pub order_prefix: String,
    /// Days a ready order is held for pickup
    pub order_hold_days: u32,
    pub limits: DecklistLimits,
    pub scryfall_url: String,
    pub pokemon_url: String,
    /// Minimum gap between two Scryfall calls
    pub scryfall_delay: Duration,
    /// Minimum gap between two Pokémon proxy calls
    pub pokemon_delay: Duration,
    /// Upper bound for a single provider call
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_name: "ListPull".to_string(),
            store_email: "contact@example.com".to_string(),
            store_phone: "(555) 123-4567".to_string(),
            store_address: "123 Main Street".to_string(),
            order_prefix: "LP".to_string(),
            order_hold_days: 7,
            limits: DecklistLimits::default(),
            scryfall_url: SCRYFALL_API_URL.to_string(),
            pokemon_url: POKEMON_PROXY_URL.to_string(),
            scryfall_delay: Duration::from_millis(100),
            pokemon_delay: Duration::from_millis(250),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Build a config from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };
        Self {
            store_name: text("STORE_NAME", defaults.store_name),
            store_email: text("STORE_EMAIL", defaults.store_email),
            store_phone: text("STORE_PHONE", defaults.store_phone),
            store_address: text("STORE_ADDRESS", defaults.store_address),
            order_prefix: text("ORDER_PREFIX", defaults.order_prefix),
            order_hold_days: number(&lookup, "ORDER_HOLD_DAYS", defaults.order_hold_days),
            limits: DecklistLimits {
                max_cards: number(&lookup, "MAX_DECKLIST_CARDS", defaults.limits.max_cards),
                max_chars: number(&lookup, "MAX_DECKLIST_CHARS", defaults.limits.max_chars),
            },
            scryfall_url: text("LISTPULL_SCRYFALL_URL", defaults.scryfall_url),
            pokemon_url: text("LISTPULL_POKEMON_URL", defaults.pokemon_url),
            scryfall_delay: Duration::from_millis(number(
                &lookup,
                "LISTPULL_SCRYFALL_DELAY_MS",
                defaults.scryfall_delay.as_millis() as u64,
            )),
            pokemon_delay: Duration::from_millis(number(
                &lookup,
                "LISTPULL_POKEMON_DELAY_MS",
                defaults.pokemon_delay.as_millis() as u64,
            )),
            request_timeout: Duration::from_secs(number(
                &lookup,
                "LISTPULL_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
        }
    }
}

/// Parses `key` into the field's own type; out-of-range values are invalid
fn number<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        None => default,
    }
}
