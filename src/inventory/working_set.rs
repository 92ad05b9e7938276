use super::{CONDITION_PRESETS, FALLBACK_CONDITION};
use crate::error::{Error, Result};
use crate::models::{ConditionVariant, LineItem};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Staff-entered fields of one line item
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemState {
    /// None until checked; Some(0) confirms the card is out of stock
    pub quantity_found: Option<u32>,
    pub unit_price: Option<f64>,
    pub condition_variants: Vec<ConditionVariant>,
}

impl ItemState {
    fn from_line_item(item: &LineItem) -> Self {
        Self {
            quantity_found: item.quantity_found,
            unit_price: item.unit_price,
            condition_variants: item.condition_variants.clone(),
        }
    }

    /// Sum of quantities already assigned to a condition
    pub fn assigned(&self) -> u32 {
        self.condition_variants.iter().map(|v| v.quantity).sum()
    }

    fn has_condition(&self, condition: &str, skip: Option<usize>) -> bool {
        self.condition_variants
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, v)| v.condition.trim().eq_ignore_ascii_case(condition.trim()))
    }
}

/// Found quantity against the condition breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Balance {
    Balanced,
    /// Found copies not yet given a condition
    Unassigned(u32),
    /// Conditions list more copies than were found
    OverLimit(u32),
}

/// Status icon shown next to a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemStatus {
    Unchecked,
    Full,
    Partial,
    OutOfStock,
}

#[derive(Debug, Clone)]
struct TrackedItem {
    requested: u32,
    state: ItemState,
}

/// In-memory edits for one order, keyed by line-item id
#[derive(Debug, Clone, Default)]
pub struct InventoryWorkingSet {
    items: BTreeMap<i64, TrackedItem>,
}

fn validate_price(price: f64) -> Result<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidPrice(price))
    }
}

impl InventoryWorkingSet {
    /// Seeds the working set from persisted line items
    pub fn new(items: &[LineItem]) -> Self {
        let items = items
            .iter()
            .map(|item| {
                (
                    item.id,
                    TrackedItem {
                        requested: item.quantity,
                        state: ItemState::from_line_item(item),
                    },
                )
            })
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self, id: i64) -> Option<&ItemState> {
        self.items.get(&id).map(|t| &t.state)
    }

    fn tracked(&self, id: i64) -> Result<&TrackedItem> {
        self.items.get(&id).ok_or(Error::LineItemNotFound(id))
    }

    fn tracked_mut(&mut self, id: i64) -> Result<&mut TrackedItem> {
        self.items.get_mut(&id).ok_or(Error::LineItemNotFound(id))
    }

    /// None resets the item to unchecked; Some(n) needs n <= requested
    pub fn set_quantity_found(&mut self, id: i64, found: Option<u32>) -> Result<()> {
        let tracked = self.tracked_mut(id)?;
        if let Some(found) = found {
            if found > tracked.requested {
                return Err(Error::QuantityOutOfRange {
                    found,
                    requested: tracked.requested,
                });
            }
        }
        debug!("Line item {}: quantity found {:?}", id, found);
        tracked.state.quantity_found = found;
        Ok(())
    }

    pub fn set_unit_price(&mut self, id: i64, price: Option<f64>) -> Result<()> {
        if let Some(price) = price {
            validate_price(price)?;
        }
        self.tracked_mut(id)?.state.unit_price = price;
        Ok(())
    }

    /// Replaces the whole breakdown; an empty list returns to unit-price mode
    pub fn set_condition_variants(&mut self, id: i64, variants: Vec<ConditionVariant>) -> Result<()> {
        let tracked = self.tracked_mut(id)?;

        let mut checked = ItemState::default();
        for variant in variants {
            validate_price(variant.price)?;
            if checked.has_condition(&variant.condition, None) {
                return Err(Error::DuplicateCondition(variant.condition));
            }
            checked.condition_variants.push(variant);
        }

        tracked.state.condition_variants = checked.condition_variants;
        Ok(())
    }

    /// Appends a variant for the copies not yet assigned (at least one) at
    /// price 0. Without a condition, the first unused preset is picked.
    pub fn add_condition_variant(
        &mut self,
        id: i64,
        condition: Option<&str>,
    ) -> Result<ConditionVariant> {
        let state = &mut self.tracked_mut(id)?.state;

        let condition = match condition.map(str::trim).filter(|c| !c.is_empty()) {
            Some(condition) => {
                if state.has_condition(condition, None) {
                    return Err(Error::DuplicateCondition(condition.to_string()));
                }
                condition.to_string()
            }
            None => CONDITION_PRESETS
                .iter()
                .find(|preset| !state.has_condition(preset, None))
                .copied()
                .unwrap_or(FALLBACK_CONDITION)
                .to_string(),
        };

        let remaining = state
            .quantity_found
            .unwrap_or(0)
            .saturating_sub(state.assigned())
            .max(1);

        let variant = ConditionVariant::new(condition, remaining, 0.0);
        state.condition_variants.push(variant.clone());
        Ok(variant)
    }

    pub fn update_condition_variant(
        &mut self,
        id: i64,
        index: usize,
        variant: ConditionVariant,
    ) -> Result<()> {
        validate_price(variant.price)?;
        let state = &mut self.tracked_mut(id)?.state;

        if index >= state.condition_variants.len() {
            return Err(Error::VariantIndex(index));
        }
        if state.has_condition(&variant.condition, Some(index)) {
            return Err(Error::DuplicateCondition(variant.condition));
        }

        state.condition_variants[index] = variant;
        Ok(())
    }

    /// Removing the last variant returns the item to unit-price mode
    pub fn remove_condition_variant(&mut self, id: i64, index: usize) -> Result<ConditionVariant> {
        let state = &mut self.tracked_mut(id)?.state;
        if index >= state.condition_variants.len() {
            return Err(Error::VariantIndex(index));
        }
        Ok(state.condition_variants.remove(index))
    }

    /// Advisory check of the breakdown against the found quantity
    pub fn balance(&self, id: i64) -> Result<Balance> {
        let state = &self.tracked(id)?.state;
        let found = state.quantity_found.unwrap_or(0) as i64;
        let diff = found - state.assigned() as i64;

        Ok(match diff {
            0 => Balance::Balanced,
            d if d > 0 => Balance::Unassigned(d as u32),
            d => Balance::OverLimit(d.unsigned_abs() as u32),
        })
    }

    pub fn item_status(&self, id: i64) -> Result<ItemStatus> {
        let tracked = self.tracked(id)?;
        Ok(match tracked.state.quantity_found {
            None => ItemStatus::Unchecked,
            Some(0) => ItemStatus::OutOfStock,
            Some(found) if found >= tracked.requested => ItemStatus::Full,
            Some(_) => ItemStatus::Partial,
        })
    }

    /// Writes the staff fields back onto matching line items. Every field is
    /// overwritten.
    pub fn apply_to(&self, items: &mut [LineItem]) {
        for item in items.iter_mut() {
            if let Some(tracked) = self.items.get(&item.id) {
                item.quantity_found = tracked.state.quantity_found;
                item.unit_price = tracked.state.unit_price;
                item.condition_variants = tracked.state.condition_variants.clone();
            }
        }
    }
}

#[cfg(test)]
#[path = "working_set_tests.rs"]
mod tests;
