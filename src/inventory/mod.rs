//! Staff reconciliation state for an order's line items
//!
//! Staff edits go into an [`InventoryWorkingSet`] and are written back onto
//! the line items only when the reconciliation is saved. The order-level
//! summary and the customer message are computed from the saved items.

pub mod message;
pub mod summary;
pub mod working_set;

pub use message::generate_customer_message;
pub use summary::{compute_summary, line_total, InventorySummary, OrderSummary};
pub use working_set::{Balance, InventoryWorkingSet, ItemState, ItemStatus};

/// Conditions offered to staff, in the order new variants pick them
pub const CONDITION_PRESETS: [&str; 5] = [
    "Near Mint",
    "Lightly Played",
    "Moderately Played",
    "Heavily Played",
    "Damaged",
];

/// Condition used once every preset is taken
pub const FALLBACK_CONDITION: &str = "Other";
