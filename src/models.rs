use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card game an order was submitted for; selects the pricing source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    Magic,
    Pokemon,
}

impl Game {
    /// Returns the stored code (e.g. "mtg", "pokemon")
    pub fn code(&self) -> &'static str {
        match self {
            Game::Magic => "mtg",
            Game::Pokemon => "pokemon",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Game::Magic => "Magic: The Gathering",
            Game::Pokemon => "Pokémon TCG",
        }
    }
}

impl FromStr for Game {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mtg" | "magic" => Ok(Game::Magic),
            "pokemon" | "pokémon" | "ptcg" => Ok(Game::Pokemon),
            _ => Err(Error::UnknownValue {
                kind: "game",
                value: s.to_string(),
            }),
        }
    }
}

/// Order lifecycle from submission to pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    InProgress,
    Ready,
    PickedUp,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Submitted => "submitted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" => Ok(OrderStatus::Submitted),
            "in_progress" => Ok(OrderStatus::InProgress),
            "ready" => Ok(OrderStatus::Ready),
            "picked_up" => Ok(OrderStatus::PickedUp),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(Error::UnknownValue {
                kind: "order status",
                value: s.to_string(),
            }),
        }
    }
}

/// Persisted customer order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub game: Game,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub raw_decklist: String,
    /// Staff-derived total; unset until some line carries a price
    pub estimated_total: Option<f64>,
    pub missing_items: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the customer when submitting
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub game: Game,
    pub notes: Option<String>,
    pub raw_decklist: String,
}

/// One physical condition/price/quantity split of a line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionVariant {
    pub condition: String,
    pub quantity: u32,
    pub price: f64,
}

impl ConditionVariant {
    pub fn new(condition: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            condition: condition.into(),
            quantity,
            price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// Persisted card entry of an order, with staff fulfillment fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    /// Requested quantity
    pub quantity: u32,
    pub card_name: String,
    pub parse_confidence: f64,
    pub line_raw: String,
    /// None until staff checked the shelves
    pub quantity_found: Option<u32>,
    pub unit_price: Option<f64>,
    /// When non-empty, replaces `unit_price` for totals
    pub condition_variants: Vec<ConditionVariant>,
}
