//! Order lifecycle: submission, staff reconciliation, ready for pickup.
//!
//! Emails go out only after the database write succeeded. A failed email is
//! logged and never undoes the write.

use crate::config::AppConfig;
use crate::database::OrderStore;
use crate::decklist::{parse_decklist, validate_decklist, validate_decklist_text};
use crate::error::Result;
use crate::inventory::{compute_summary, InventorySummary, InventoryWorkingSet};
use crate::models::{LineItem, NewOrder, Order, OrderStatus};
use crate::notify::{EmailTemplate, Notifier};
use log::{info, warn};
use serde::Serialize;

/// What the customer sees after submitting
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub order: Order,
    pub items: Vec<LineItem>,
    /// Validation warnings; never block the submission
    pub warnings: Vec<String>,
    /// Lines the parser could not read with confidence
    pub parse_errors: Vec<String>,
}

async fn send_or_log<N: Notifier>(
    notifier: &N,
    template: EmailTemplate,
    order: &Order,
    items: &[LineItem],
) {
    if let Err(e) = notifier.send(template, order, items).await {
        warn!(
            "Failed to send {} email for order {}: {}",
            template.as_str(),
            order.order_number,
            e
        );
    }
}

/// Parses and stores a decklist as a new order, then sends the confirmation
pub async fn submit_order<S, N>(
    store: &mut S,
    notifier: &N,
    config: &AppConfig,
    new_order: NewOrder,
) -> Result<Submission>
where
    S: OrderStore,
    N: Notifier,
{
    let mut warnings = validate_decklist_text(&new_order.raw_decklist, &config.limits);
    let parsed = parse_decklist(&new_order.raw_decklist);
    warnings.extend(validate_decklist(&parsed.cards, &config.limits));

    let (order, items) =
        store.create_order_with_items(&new_order, &config.order_prefix, &parsed.cards)?;
    info!(
        "Order {} submitted with {} line items ({} cards)",
        order.order_number,
        items.len(),
        parsed.total_quantity()
    );

    send_or_log(notifier, EmailTemplate::Confirmation, &order, &items).await;

    Ok(Submission {
        order,
        items,
        warnings,
        parse_errors: parsed.errors,
    })
}

/// Writes the staff working set back and refreshes the order summary.
///
/// Every staff field is overwritten, so the last save wins. A submitted
/// order moves to in progress on its first save.
pub fn save_reconciliation<S: OrderStore>(
    store: &mut S,
    order_id: i64,
    working_set: &InventoryWorkingSet,
) -> Result<InventorySummary> {
    let order = store.get_order(order_id)?;
    let mut items = store.get_line_items(order_id)?;

    working_set.apply_to(&mut items);
    let summary = compute_summary(&items);
    let status = (order.status == OrderStatus::Submitted).then_some(OrderStatus::InProgress);
    store.save_inventory(order_id, &items, &summary.order_summary(), status)?;

    info!(
        "Saved reconciliation for {}: {} found, {} missing, {} unchecked",
        order.order_number, summary.found_count, summary.missing_count, summary.unchecked_count
    );
    Ok(summary)
}

/// Marks the order ready and sends the pickup email with the pull summary
pub async fn mark_ready<S, N>(store: &mut S, notifier: &N, order_id: i64) -> Result<Order>
where
    S: OrderStore,
    N: Notifier,
{
    let order = store.update_order_status(order_id, OrderStatus::Ready)?;
    let items = store.get_line_items(order_id)?;

    let summary = compute_summary(&items);
    if summary.unchecked_count > 0 {
        warn!(
            "Order {} marked ready with {} unchecked items",
            order.order_number, summary.unchecked_count
        );
    }

    send_or_log(notifier, EmailTemplate::Ready, &order, &items).await;
    Ok(order)
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
