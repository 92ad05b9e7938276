//! Customer-facing pull summary, sent with the "ready" email.

use super::summary::line_total;
use crate::models::LineItem;

pub fn generate_customer_message(
    customer_name: &str,
    order_number: &str,
    items: &[LineItem],
    store_name: &str,
) -> String {
    let mut found = Vec::new();
    let mut missing = Vec::new();
    let mut total = 0.0;

    for item in items {
        // unchecked items appear nowhere
        let Some(found_qty) = item.quantity_found else {
            continue;
        };

        if found_qty == 0 {
            missing.push(format!("- {} (out of stock)", item.card_name));
            continue;
        }

        match line_total(item) {
            Some(price) => {
                total += price;
                found.push(format!("- {}x {} - ${:.2}", found_qty, item.card_name, price));
            }
            None => found.push(format!("- {}x {}", found_qty, item.card_name)),
        }

        if found_qty < item.quantity {
            missing.push(format!(
                "- {} (requested {}, found {})",
                item.card_name, item.quantity, found_qty
            ));
        }
    }

    let mut output = format!("Hi {customer_name},\n\nWe've pulled the cards for order {order_number}.\n");

    if !found.is_empty() {
        output.push_str("\nHere's what we found:\n");
        for line in &found {
            output.push_str(line);
            output.push('\n');
        }
        if total > 0.0 {
            output.push_str(&format!("Subtotal: ${total:.2}\n"));
        }
    }

    if !missing.is_empty() {
        output.push_str("\nUnfortunately, we couldn't find:\n");
        for line in &missing {
            output.push_str(line);
            output.push('\n');
        }
    }

    if total > 0.0 {
        output.push_str(&format!("\nEstimated total: ${total:.2}\n"));
    }

    output.push_str(&format!("\nThanks for shopping with {store_name}!\n"));
    output
}
