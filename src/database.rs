//! Order persistence
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Multi-row writes run in a single transaction.

use crate::decklist::ParsedCard;
use crate::error::{Error, Result};
use crate::inventory::OrderSummary;
use crate::models::{ConditionVariant, LineItem, NewOrder, Order, OrderStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;

/// Storage for orders and their line items
pub trait OrderStore {
    /// Inserts the order and assigns its order number "<prefix>-<id:06>"
    fn create_order(&mut self, order: &NewOrder, prefix: &str) -> Result<Order>;

    fn get_order(&self, id: i64) -> Result<Order>;

    fn update_order_status(&mut self, id: i64, status: OrderStatus) -> Result<Order>;

    fn update_order_summary(&mut self, id: i64, summary: &OrderSummary) -> Result<()>;

    /// Newest first, optionally filtered by status
    fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>>;

    /// Inserts one unchecked line item per parsed card, keeping list order
    fn create_line_items(&mut self, order_id: i64, cards: &[ParsedCard]) -> Result<Vec<LineItem>>;

    fn get_line_items(&self, order_id: i64) -> Result<Vec<LineItem>>;

    /// Overwrites the staff fields of every given item
    fn update_line_item_inventory(&mut self, items: &[LineItem]) -> Result<()>;

    /// Inserts the order together with its line items; nothing is stored on failure
    fn create_order_with_items(
        &mut self,
        order: &NewOrder,
        prefix: &str,
        cards: &[ParsedCard],
    ) -> Result<(Order, Vec<LineItem>)>;

    /// Writes item inventory, the order summary and an optional status change
    /// as one unit
    fn save_inventory(
        &mut self,
        order_id: i64,
        items: &[LineItem],
        summary: &OrderSummary,
        status: Option<OrderStatus>,
    ) -> Result<Order>;
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `orders`: one row per customer submission
/// - `line_items`: parsed cards with staff reconciliation fields
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_number TEXT NOT NULL DEFAULT '',
            customer_name TEXT NOT NULL,
            customer_email TEXT NOT NULL,
            customer_phone TEXT,
            game TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'submitted',
            notes TEXT,
            raw_decklist TEXT NOT NULL,
            estimated_total REAL,
            missing_items TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
        CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);

        -- condition_variants holds a JSON array, '[]' when there is no breakdown
        CREATE TABLE IF NOT EXISTS line_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            card_name TEXT NOT NULL,
            parse_confidence REAL NOT NULL,
            line_raw TEXT NOT NULL,
            quantity_found INTEGER,
            unit_price REAL,
            condition_variants TEXT NOT NULL DEFAULT '[]',
            FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_line_items_order ON line_items(order_id);
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// SQLite-backed [`OrderStore`]
pub struct SqliteOrderStore {
    conn: Connection,
}

impl SqliteOrderStore {
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Opening order database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Total number of orders, optionally for one status
    pub fn count_orders(&self, status: Option<OrderStatus>) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE (?1 IS NULL OR status = ?1)",
            params![status.map(|s| s.as_str())],
            |row| row.get(0),
        )?)
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, customer_phone, \
     game, status, notes, raw_decklist, estimated_total, missing_items, created_at, updated_at";

const LINE_ITEM_COLUMNS: &str = "id, order_id, quantity, card_name, parse_confidence, line_raw, \
     quantity_found, unit_price, condition_variants";

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let game: String = row.get(5)?;
    let status: String = row.get(6)?;

    Ok(Order {
        id: row.get(0)?,
        order_number: row.get(1)?,
        customer_name: row.get(2)?,
        customer_email: row.get(3)?,
        customer_phone: row.get(4)?,
        game: game.parse().map_err(|e| conversion_error(5, e))?,
        status: status.parse().map_err(|e| conversion_error(6, e))?,
        notes: row.get(7)?,
        raw_decklist: row.get(8)?,
        estimated_total: row.get(9)?,
        missing_items: row.get(10)?,
        created_at: timestamp_at(row, 11)?,
        updated_at: timestamp_at(row, 12)?,
    })
}

fn line_item_from_row(row: &Row<'_>) -> rusqlite::Result<LineItem> {
    let variants: String = row.get(8)?;
    let condition_variants: Vec<ConditionVariant> =
        serde_json::from_str(&variants).map_err(|e| conversion_error(8, e))?;

    Ok(LineItem {
        id: row.get(0)?,
        order_id: row.get(1)?,
        quantity: row.get(2)?,
        card_name: row.get(3)?,
        parse_confidence: row.get(4)?,
        line_raw: row.get(5)?,
        quantity_found: row.get(6)?,
        unit_price: row.get(7)?,
        condition_variants,
    })
}

/// Fixed-width UTC timestamps, so text order is time order
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn format_order_number(prefix: &str, id: i64) -> String {
    format!("{prefix}-{id:06}")
}

fn create_order_tx(tx: &Transaction<'_>, order: &NewOrder, prefix: &str) -> Result<i64> {
    let now = now_timestamp();
    tx.execute(
        "INSERT INTO orders
         (customer_name, customer_email, customer_phone, game, status, notes, raw_decklist,
          created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            &order.customer_name,
            &order.customer_email,
            &order.customer_phone,
            order.game.code(),
            OrderStatus::Submitted.as_str(),
            &order.notes,
            &order.raw_decklist,
            &now,
        ],
    )?;

    let id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE orders SET order_number = ?1 WHERE id = ?2",
        params![format_order_number(prefix, id), id],
    )?;
    Ok(id)
}

fn create_line_items_tx(tx: &Transaction<'_>, order_id: i64, cards: &[ParsedCard]) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO line_items
         (order_id, position, quantity, card_name, parse_confidence, line_raw)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for (position, card) in cards.iter().enumerate() {
        stmt.execute(params![
            order_id,
            position as i64,
            card.quantity,
            &card.card_name,
            card.parse_confidence,
            &card.line_raw,
        ])?;
    }
    Ok(())
}

fn update_line_items_tx(tx: &Transaction<'_>, items: &[LineItem]) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "UPDATE line_items
         SET quantity_found = ?1, unit_price = ?2, condition_variants = ?3
         WHERE id = ?4",
    )?;

    for item in items {
        let variants = serde_json::to_string(&item.condition_variants)?;
        let changed = stmt.execute(params![
            item.quantity_found,
            item.unit_price,
            variants,
            item.id
        ])?;
        if changed == 0 {
            return Err(Error::LineItemNotFound(item.id));
        }
    }
    Ok(())
}

fn update_order_status_tx(tx: &Transaction<'_>, id: i64, status: OrderStatus) -> Result<()> {
    let changed = tx.execute(
        "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_timestamp(), id],
    )?;
    if changed == 0 {
        return Err(Error::OrderNotFound(id));
    }
    Ok(())
}

fn update_order_summary_tx(tx: &Transaction<'_>, id: i64, summary: &OrderSummary) -> Result<()> {
    let changed = tx.execute(
        "UPDATE orders SET estimated_total = ?1, missing_items = ?2, updated_at = ?3
         WHERE id = ?4",
        params![
            summary.estimated_total,
            &summary.missing_items,
            now_timestamp(),
            id
        ],
    )?;
    if changed == 0 {
        return Err(Error::OrderNotFound(id));
    }
    Ok(())
}

impl OrderStore for SqliteOrderStore {
    fn create_order(&mut self, order: &NewOrder, prefix: &str) -> Result<Order> {
        let tx = self.conn.transaction()?;
        let id = create_order_tx(&tx, order, prefix)?;
        tx.commit()?;

        let created = self.get_order(id)?;
        log::info!(
            "Created order {} for {}",
            created.order_number,
            created.customer_email
        );
        Ok(created)
    }

    fn get_order(&self, id: i64) -> Result<Order> {
        self.conn
            .query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![id],
                order_from_row,
            )
            .optional()?
            .ok_or(Error::OrderNotFound(id))
    }

    fn update_order_status(&mut self, id: i64, status: OrderStatus) -> Result<Order> {
        let tx = self.conn.transaction()?;
        update_order_status_tx(&tx, id, status)?;
        tx.commit()?;

        log::info!("Order {} is now {}", id, status);
        self.get_order(id)
    }

    fn update_order_summary(&mut self, id: i64, summary: &OrderSummary) -> Result<()> {
        let tx = self.conn.transaction()?;
        update_order_summary_tx(&tx, id, summary)?;
        tx.commit()?;
        Ok(())
    }

    fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3"
        ))?;

        let orders: rusqlite::Result<Vec<Order>> = stmt
            .query_map(
                params![status.map(|s| s.as_str()), limit as i64, offset as i64],
                order_from_row,
            )?
            .collect();
        Ok(orders?)
    }

    fn create_line_items(&mut self, order_id: i64, cards: &[ParsedCard]) -> Result<Vec<LineItem>> {
        // surfaces OrderNotFound instead of a foreign key failure
        self.get_order(order_id)?;

        let tx = self.conn.transaction()?;
        create_line_items_tx(&tx, order_id, cards)?;
        tx.commit()?;

        log::debug!("Stored {} line items for order {}", cards.len(), order_id);
        self.get_line_items(order_id)
    }

    fn get_line_items(&self, order_id: i64) -> Result<Vec<LineItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM line_items
             WHERE order_id = ?1
             ORDER BY position ASC, id ASC"
        ))?;

        let items: rusqlite::Result<Vec<LineItem>> =
            stmt.query_map(params![order_id], line_item_from_row)?.collect();
        Ok(items?)
    }

    fn update_line_item_inventory(&mut self, items: &[LineItem]) -> Result<()> {
        let tx = self.conn.transaction()?;
        update_line_items_tx(&tx, items)?;
        tx.commit()?;

        log::debug!("Updated inventory for {} line items", items.len());
        Ok(())
    }

    fn create_order_with_items(
        &mut self,
        order: &NewOrder,
        prefix: &str,
        cards: &[ParsedCard],
    ) -> Result<(Order, Vec<LineItem>)> {
        let tx = self.conn.transaction()?;
        let id = create_order_tx(&tx, order, prefix)?;
        create_line_items_tx(&tx, id, cards)?;
        tx.commit()?;

        let created = self.get_order(id)?;
        log::info!(
            "Created order {} for {} with {} line items",
            created.order_number,
            created.customer_email,
            cards.len()
        );
        let items = self.get_line_items(id)?;
        Ok((created, items))
    }

    fn save_inventory(
        &mut self,
        order_id: i64,
        items: &[LineItem],
        summary: &OrderSummary,
        status: Option<OrderStatus>,
    ) -> Result<Order> {
        let tx = self.conn.transaction()?;
        update_line_items_tx(&tx, items)?;
        update_order_summary_tx(&tx, order_id, summary)?;
        if let Some(status) = status {
            update_order_status_tx(&tx, order_id, status)?;
        }
        tx.commit()?;

        log::debug!(
            "Saved inventory for {} line items of order {}",
            items.len(),
            order_id
        );
        self.get_order(order_id)
    }
}
