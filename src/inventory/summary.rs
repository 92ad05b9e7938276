//! Order-level fold over reconciled line items.

use crate::models::LineItem;
use serde::Serialize;

/// Result of folding all line items of an order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventorySummary {
    /// Items found in full
    pub found_count: usize,
    /// Items out of stock or found only in part
    pub missing_count: usize,
    pub unchecked_count: usize,
    pub total: f64,
    /// False when no checked item carried a price
    pub has_any_price: bool,
    /// "<name> (<found>/<requested>)" per missing item
    pub missing_items: Vec<String>,
}

/// Fields written back onto the order on every reconciliation save
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderSummary {
    pub estimated_total: Option<f64>,
    pub missing_items: Option<String>,
}

impl InventorySummary {
    pub fn order_summary(&self) -> OrderSummary {
        OrderSummary {
            estimated_total: self.has_any_price.then_some(self.total),
            missing_items: (!self.missing_items.is_empty()).then(|| self.missing_items.join(", ")),
        }
    }
}

/// Price of the copies found for one item.
///
/// The condition breakdown wins when present; otherwise unit price × found
/// quantity. None when the item carries no usable price.
pub fn line_total(item: &LineItem) -> Option<f64> {
    if !item.condition_variants.is_empty() {
        return Some(item.condition_variants.iter().map(|v| v.line_total()).sum());
    }
    match (item.unit_price, item.quantity_found) {
        (Some(price), Some(found)) if found > 0 => Some(price * found as f64),
        _ => None,
    }
}

pub fn compute_summary(items: &[LineItem]) -> InventorySummary {
    let mut summary = InventorySummary::default();

    for item in items {
        let Some(found) = item.quantity_found else {
            summary.unchecked_count += 1;
            continue;
        };

        if found == 0 || found < item.quantity {
            summary.missing_count += 1;
            summary
                .missing_items
                .push(format!("{} ({}/{})", item.card_name, found, item.quantity));
        } else {
            summary.found_count += 1;
        }

        if let Some(total) = line_total(item) {
            summary.total += total;
            summary.has_any_price = true;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConditionVariant;

    fn item(name: &str, quantity: u32, found: Option<u32>) -> LineItem {
        LineItem {
            id: 0,
            order_id: 1,
            quantity,
            card_name: name.to_string(),
            parse_confidence: 1.0,
            line_raw: String::new(),
            quantity_found: found,
            unit_price: None,
            condition_variants: Vec::new(),
        }
    }

    #[test]
    fn variants_define_the_total() {
        let mut bolt = item("Lightning Bolt", 3, Some(3));
        bolt.condition_variants = vec![ConditionVariant::new("Near Mint", 3, 2.00)];

        let summary = compute_summary(&[bolt]);

        assert!((summary.total - 6.00).abs() < 1e-9);
        assert_eq!(summary.missing_count, 0);
        assert_eq!(summary.found_count, 1);
        assert!(summary.has_any_price);
    }

    #[test]
    fn variants_override_unit_price() {
        let mut bolt = item("Lightning Bolt", 4, Some(4));
        bolt.unit_price = Some(10.0);
        bolt.condition_variants = vec![
            ConditionVariant::new("Near Mint", 2, 2.00),
            ConditionVariant::new("Damaged", 2, 0.50),
        ];

        assert_eq!(line_total(&bolt), Some(5.0));
    }

    #[test]
    fn unit_price_needs_found_copies() {
        let mut opt = item("Opt", 4, Some(0));
        opt.unit_price = Some(0.25);
        assert_eq!(line_total(&opt), None);

        opt.quantity_found = Some(2);
        assert_eq!(line_total(&opt), Some(0.5));
    }

    #[test]
    fn missing_and_unchecked_items() {
        let items = vec![
            item("Black Lotus", 1, Some(0)),
            item("Counterspell", 4, Some(2)),
            item("Island", 10, None),
            item("Opt", 1, Some(1)),
        ];

        let summary = compute_summary(&items);

        assert_eq!(summary.found_count, 1);
        assert_eq!(summary.missing_count, 2);
        assert_eq!(summary.unchecked_count, 1);
        assert_eq!(
            summary.missing_items,
            vec!["Black Lotus (0/1)".to_string(), "Counterspell (2/4)".to_string()]
        );
        assert!(!summary.has_any_price);
    }

    #[test]
    fn confirmed_zero_is_missing_even_without_a_request() {
        // unreadable lines are stored with quantity 0
        let summary = compute_summary(&[item("???", 0, Some(0))]);

        assert_eq!(summary.found_count, 0);
        assert_eq!(summary.missing_count, 1);
        assert_eq!(summary.missing_items, vec!["??? (0/0)".to_string()]);
    }

    #[test]
    fn unchecked_items_never_count_toward_the_total() {
        let mut island = item("Island", 10, None);
        island.unit_price = Some(0.10);

        let summary = compute_summary(&[island]);
        assert_eq!(summary.total, 0.0);
        assert!(!summary.has_any_price);
    }

    #[test]
    fn order_summary_leaves_total_unset_without_prices() {
        let summary = compute_summary(&[item("Black Lotus", 1, Some(0)), item("Opt", 1, Some(1))]);

        let order = summary.order_summary();
        assert_eq!(order.estimated_total, None);
        assert_eq!(order.missing_items.as_deref(), Some("Black Lotus (0/1)"));
    }

    #[test]
    fn order_summary_with_zero_priced_variants_still_writes_total() {
        let mut opt = item("Opt", 1, Some(1));
        opt.condition_variants = vec![ConditionVariant::new("Near Mint", 1, 0.0)];

        let order = compute_summary(&[opt]).order_summary();
        assert_eq!(order.estimated_total, Some(0.0));
        assert_eq!(order.missing_items, None);
    }
}
