//! Customer email notifications
//!
//! Emails are rendered as plain text. Delivery is behind [`Notifier`];
//! [`LogNotifier`] only writes the rendered email to the log.

use crate::config::AppConfig;
use crate::error::Result;
use crate::inventory::generate_customer_message;
use crate::models::{LineItem, Order};
use log::{debug, info};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    /// Sent right after submission
    Confirmation,
    /// Sent when staff mark the order ready for pickup
    Ready,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::Confirmation => "confirmation",
            EmailTemplate::Ready => "ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

fn store_footer(config: &AppConfig) -> String {
    format!(
        "{}\n{}\n{} | {}\n",
        config.store_name, config.store_address, config.store_phone, config.store_email
    )
}

fn confirmation_body(order: &Order, items: &[LineItem], config: &AppConfig) -> String {
    let mut body = format!(
        "Hi {},\n\nThanks for your order! We received your {} list as order {}.\n\n",
        order.customer_name,
        order.game.display_name(),
        order.order_number
    );

    let total_cards: u32 = items.iter().map(|i| i.quantity).sum();
    body.push_str(&format!("Cards requested ({total_cards}):\n"));
    for item in items {
        body.push_str(&format!("- {}x {}\n", item.quantity, item.card_name));
    }

    if let Some(notes) = order.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!("\nYour notes: {}\n", notes.trim()));
    }

    body.push_str("\nWe'll email you again as soon as your cards are ready for pickup.\n\n");
    body.push_str(&store_footer(config));
    body
}

fn ready_body(order: &Order, items: &[LineItem], config: &AppConfig) -> String {
    let mut body = generate_customer_message(
        &order.customer_name,
        &order.order_number,
        items,
        &config.store_name,
    );

    body.push_str(&format!(
        "\nYour order is ready for pickup and will be held for {} days.\n\n",
        config.order_hold_days
    ));
    body.push_str(&store_footer(config));
    body
}

pub fn render_email(
    template: EmailTemplate,
    order: &Order,
    items: &[LineItem],
    config: &AppConfig,
) -> Email {
    let (subject, body) = match template {
        EmailTemplate::Confirmation => (
            format!(
                "Order {} received - {}",
                order.order_number, config.store_name
            ),
            confirmation_body(order, items, config),
        ),
        EmailTemplate::Ready => (
            format!(
                "Order {} is ready for pickup - {}",
                order.order_number, config.store_name
            ),
            ready_body(order, items, config),
        ),
    };

    Email {
        to: order.customer_email.clone(),
        subject,
        body,
    }
}

/// Delivers order emails
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, template: EmailTemplate, order: &Order, items: &[LineItem]) -> Result<()>;
}

/// Renders emails and writes them to the log instead of sending them
#[derive(Debug, Clone)]
pub struct LogNotifier {
    config: AppConfig,
}

impl LogNotifier {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl Notifier for LogNotifier {
    async fn send(&self, template: EmailTemplate, order: &Order, items: &[LineItem]) -> Result<()> {
        let email = render_email(template, order, items, &self.config);
        info!(
            "Sending {} email to {}: {}",
            template.as_str(),
            email.to,
            email.subject
        );
        debug!("{}", email.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Game, OrderStatus};
    use chrono::Utc;

    fn order() -> Order {
        Order {
            id: 42,
            order_number: "LP-000042".to_string(),
            customer_name: "Alice".to_string(),
            customer_email: "alice@example.com".to_string(),
            customer_phone: None,
            game: Game::Magic,
            status: OrderStatus::Submitted,
            notes: Some("  Pickup Friday ".to_string()),
            raw_decklist: String::new(),
            estimated_total: None,
            missing_items: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(name: &str, quantity: u32, found: Option<u32>) -> LineItem {
        LineItem {
            id: 1,
            order_id: 42,
            quantity,
            card_name: name.to_string(),
            parse_confidence: 1.0,
            line_raw: String::new(),
            quantity_found: found,
            unit_price: Some(2.0),
            condition_variants: Vec::new(),
        }
    }

    #[test]
    fn confirmation_lists_requested_cards() {
        let config = AppConfig::default();
        let items = vec![item("Lightning Bolt", 4, None), item("Opt", 2, None)];

        let email = render_email(EmailTemplate::Confirmation, &order(), &items, &config);

        assert_eq!(email.to, "alice@example.com");
        assert_eq!(email.subject, "Order LP-000042 received - ListPull");
        assert!(email.body.starts_with("Hi Alice,"));
        assert!(email.body.contains("Magic: The Gathering"));
        assert!(email.body.contains("Cards requested (6):\n- 4x Lightning Bolt\n- 2x Opt\n"));
        assert!(email.body.contains("Your notes: Pickup Friday\n"));
        assert!(email.body.ends_with(&store_footer(&config)));
    }

    #[test]
    fn ready_email_carries_customer_message() {
        let config = AppConfig {
            order_hold_days: 3,
            ..AppConfig::default()
        };
        let items = vec![item("Lightning Bolt", 4, Some(4)), item("Black Lotus", 1, Some(0))];

        let email = render_email(EmailTemplate::Ready, &order(), &items, &config);

        assert_eq!(email.subject, "Order LP-000042 is ready for pickup - ListPull");
        assert!(email.body.contains("- 4x Lightning Bolt - $8.00"));
        assert!(email.body.contains("- Black Lotus (out of stock)"));
        assert!(email.body.contains("held for 3 days"));
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        let notifier = LogNotifier::new(AppConfig::default());
        notifier
            .send(EmailTemplate::Ready, &order(), &[])
            .await
            .unwrap();
    }
}
