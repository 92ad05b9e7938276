use listpull::{
    fetch_prices, mark_ready, save_reconciliation, submit_order, AppConfig, EmailTemplate,
    InventoryWorkingSet, LineItem, LogNotifier, NewOrder, Game, Notifier, Order, OrderStatus,
    OrderStore, RequestQueue, ScryfallProvider, SqliteOrderStore,
};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<(EmailTemplate, String)>>,
}

impl Notifier for Outbox {
    async fn send(
        &self,
        template: EmailTemplate,
        order: &Order,
        _items: &[LineItem],
    ) -> listpull::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((template, order.customer_email.clone()));
        Ok(())
    }
}

fn decklist() -> String {
    r#"Deck
4 Lightning Bolt (2XM) 141
2 Counterspell [MH2]
1 Black Lotus

Sideboard
SB: 2 Smash to Smithereens"#
        .to_string()
}

fn new_order() -> NewOrder {
    NewOrder {
        customer_name: "Alice".to_string(),
        customer_email: "alice@example.com".to_string(),
        customer_phone: None,
        game: Game::Magic,
        notes: Some("Pickup after 5pm".to_string()),
        raw_decklist: decklist(),
    }
}

fn card_json(name: &str, usd: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": format!("uuid-{}", name.to_lowercase().replace(' ', "-")),
        "name": name,
        "set": "tst",
        "set_name": "Test Set",
        "prices": { "usd": usd }
    })
}

#[tokio::test]
async fn orders_survive_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("listpull.db");
    let config = AppConfig::default();

    let order_id = {
        let mut store = SqliteOrderStore::open(&db_path).unwrap();
        let submission = submit_order(&mut store, &LogNotifier::new(config.clone()), &config, new_order())
            .await
            .unwrap();
        submission.order.id
    };

    let store = SqliteOrderStore::open(&db_path).unwrap();
    let order = store.get_order(order_id).unwrap();
    assert_eq!(order.raw_decklist, decklist());
    assert_eq!(order.notes.as_deref(), Some("Pickup after 5pm"));

    let names: Vec<String> = store
        .get_line_items(order_id)
        .unwrap()
        .into_iter()
        .map(|i| i.card_name)
        .collect();
    assert_eq!(
        names,
        vec!["Lightning Bolt", "Counterspell", "Black Lotus", "Smash to Smithereens"]
    );
}

#[tokio::test]
async fn submit_price_reconcile_and_mark_ready() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cards/collection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "not_found": [{ "name": "Black Lotus" }],
            "data": [
                card_json("Lightning Bolt", Some("1.50")),
                card_json("Counterspell", Some("0.75")),
                card_json("Smash to Smithereens", None)
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut store = SqliteOrderStore::open(&dir.path().join("orders.db")).unwrap();
    let outbox = Outbox::default();
    let config = AppConfig {
        order_prefix: "TEST".to_string(),
        ..AppConfig::default()
    };

    // customer submits
    let submission = submit_order(&mut store, &outbox, &config, new_order())
        .await
        .unwrap();
    assert!(submission.order.order_number.starts_with("TEST-"));

    // staff view: reference prices for every line
    let provider = ScryfallProvider::new(
        &server.uri(),
        RequestQueue::unthrottled(),
        Duration::from_secs(5),
    )
    .unwrap();
    let names: Vec<String> = submission.items.iter().map(|i| i.card_name.clone()).collect();
    let prices = fetch_prices(&provider, &names).await;
    assert_eq!(prices.len(), 4);
    assert!(prices["black lotus"].record.is_none());

    // staff pull the cards, using reference prices as unit prices
    let mut working_set = InventoryWorkingSet::new(&submission.items);
    for item in &submission.items {
        let found = if item.card_name == "Black Lotus" { 0 } else { item.quantity };
        working_set.set_quantity_found(item.id, Some(found)).unwrap();

        let reference = prices[&item.card_name.to_lowercase()]
            .reference_price
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok());
        working_set.set_unit_price(item.id, reference).unwrap();
    }

    let summary = save_reconciliation(&mut store, submission.order.id, &working_set).unwrap();
    assert!((summary.total - 7.50).abs() < 1e-9);
    assert_eq!(summary.missing_items, vec!["Black Lotus (0/1)".to_string()]);

    let order = mark_ready(&mut store, &outbox, submission.order.id)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Ready);
    assert_eq!(order.estimated_total, Some(7.50));
    assert_eq!(order.missing_items.as_deref(), Some("Black Lotus (0/1)"));

    let sent = outbox.sent.lock().unwrap();
    let templates: Vec<EmailTemplate> = sent.iter().map(|(t, _)| *t).collect();
    assert_eq!(templates, vec![EmailTemplate::Confirmation, EmailTemplate::Ready]);
    assert!(sent.iter().all(|(_, to)| to == "alice@example.com"));
}

#[tokio::test]
async fn last_reconciliation_save_wins() {
    let mut store = SqliteOrderStore::open_in_memory().unwrap();
    let config = AppConfig::default();
    let submission = submit_order(&mut store, &Outbox::default(), &config, new_order())
        .await
        .unwrap();
    let bolt = submission.items[0].id;

    let mut first = InventoryWorkingSet::new(&submission.items);
    first.set_quantity_found(bolt, Some(4)).unwrap();
    first.set_unit_price(bolt, Some(2.0)).unwrap();

    let mut second = InventoryWorkingSet::new(&submission.items);
    second.set_quantity_found(bolt, Some(1)).unwrap();

    save_reconciliation(&mut store, submission.order.id, &first).unwrap();
    save_reconciliation(&mut store, submission.order.id, &second).unwrap();

    let items = store.get_line_items(submission.order.id).unwrap();
    assert_eq!(items[0].quantity_found, Some(1));
    assert_eq!(items[0].unit_price, None);

    let order = store.get_order(submission.order.id).unwrap();
    assert_eq!(order.estimated_total, None);
    assert_eq!(order.missing_items.as_deref(), Some("Lightning Bolt (1/4)"));
}
