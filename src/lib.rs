//! ListPull - decklist order intake for a trading card store
//!
//! Customers submit decklists as text, staff pull and price the cards, and
//! the order is tracked from submission to pickup.

pub mod config;
pub mod database;
pub mod decklist;
pub mod error;
pub mod inventory;
pub mod models;
pub mod notify;
pub mod orders;
pub mod pricing;
pub mod queue;

// Re-export commonly used items
pub use config::{AppConfig, DecklistLimits};
pub use database::{init_schema, OrderStore, SqliteOrderStore};
pub use decklist::{
    format_decklist, parse_decklist, validate_decklist, validate_decklist_text, ParseResult,
    ParsedCard,
};
pub use error::{Error, Result};
pub use inventory::{
    compute_summary, generate_customer_message, Balance, InventorySummary, InventoryWorkingSet,
    ItemStatus, OrderSummary,
};
pub use models::{ConditionVariant, Game, LineItem, NewOrder, Order, OrderStatus};
pub use notify::{render_email, Email, EmailTemplate, LogNotifier, Notifier};
pub use orders::{mark_ready, save_reconciliation, submit_order, Submission};
pub use pricing::{
    fetch_prices, price_decklist, suggest_names, CardData, CardDataProvider, CardSource,
    DecklistPricing, PokemonTcgProvider, PriceLookup, PriceRecord, ScryfallProvider,
};
pub use queue::RequestQueue;
