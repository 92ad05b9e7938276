use super::*;

fn line_item(id: i64, name: &str, quantity: u32) -> LineItem {
    LineItem {
        id,
        order_id: 1,
        quantity,
        card_name: name.to_string(),
        parse_confidence: 1.0,
        line_raw: format!("{quantity} {name}"),
        quantity_found: None,
        unit_price: None,
        condition_variants: Vec::new(),
    }
}

fn working_set() -> InventoryWorkingSet {
    InventoryWorkingSet::new(&[
        line_item(1, "Lightning Bolt", 4),
        line_item(2, "Counterspell", 2),
    ])
}

#[test]
fn seeds_from_persisted_items() {
    let mut item = line_item(7, "Opt", 3);
    item.quantity_found = Some(2);
    item.unit_price = Some(0.25);

    let set = InventoryWorkingSet::new(&[item]);

    assert_eq!(set.len(), 1);
    let state = set.state(7).unwrap();
    assert_eq!(state.quantity_found, Some(2));
    assert_eq!(state.unit_price, Some(0.25));
}

#[test]
fn zero_found_is_distinct_from_unchecked() {
    let mut set = working_set();
    assert_eq!(set.item_status(1).unwrap(), ItemStatus::Unchecked);

    set.set_quantity_found(1, Some(0)).unwrap();
    assert_eq!(set.item_status(1).unwrap(), ItemStatus::OutOfStock);

    set.set_quantity_found(1, None).unwrap();
    assert_eq!(set.item_status(1).unwrap(), ItemStatus::Unchecked);
}

#[test]
fn partial_and_full_status() {
    let mut set = working_set();
    set.set_quantity_found(1, Some(2)).unwrap();
    set.set_quantity_found(2, Some(2)).unwrap();

    assert_eq!(set.item_status(1).unwrap(), ItemStatus::Partial);
    assert_eq!(set.item_status(2).unwrap(), ItemStatus::Full);
}

#[test]
fn found_cannot_exceed_requested() {
    let mut set = working_set();
    let err = set.set_quantity_found(2, Some(3)).unwrap_err();
    assert!(matches!(
        err,
        Error::QuantityOutOfRange {
            found: 3,
            requested: 2
        }
    ));
    assert_eq!(set.state(2).unwrap().quantity_found, None);
}

#[test]
fn unknown_item_is_an_error() {
    let mut set = working_set();
    assert!(matches!(
        set.set_quantity_found(99, Some(1)),
        Err(Error::LineItemNotFound(99))
    ));
    assert!(matches!(set.balance(99), Err(Error::LineItemNotFound(99))));
}

#[test]
fn rejects_negative_and_non_finite_prices() {
    let mut set = working_set();
    assert!(matches!(
        set.set_unit_price(1, Some(-1.0)),
        Err(Error::InvalidPrice(_))
    ));
    assert!(set.set_unit_price(1, Some(f64::NAN)).is_err());
    set.set_unit_price(1, Some(0.0)).unwrap();
    set.set_unit_price(1, None).unwrap();
}

#[test]
fn add_variant_suggests_remaining_quantity() {
    let mut set = working_set();
    set.set_quantity_found(1, Some(4)).unwrap();

    let first = set.add_condition_variant(1, None).unwrap();
    assert_eq!(first, ConditionVariant::new("Near Mint", 4, 0.0));

    set.update_condition_variant(1, 0, ConditionVariant::new("Near Mint", 3, 1.5))
        .unwrap();

    let second = set.add_condition_variant(1, None).unwrap();
    assert_eq!(second, ConditionVariant::new("Lightly Played", 1, 0.0));
    assert_eq!(set.balance(1).unwrap(), Balance::Balanced);
}

#[test]
fn add_variant_floors_suggestion_at_one() {
    let mut set = working_set();
    set.set_quantity_found(2, Some(2)).unwrap();
    set.add_condition_variant(2, None).unwrap();

    let extra = set.add_condition_variant(2, Some("Damaged")).unwrap();
    assert_eq!(extra.quantity, 1);
    assert_eq!(set.balance(2).unwrap(), Balance::OverLimit(1));
}

#[test]
fn add_variant_with_unchecked_quantity_still_suggests_one() {
    let mut set = working_set();
    let variant = set.add_condition_variant(1, None).unwrap();
    assert_eq!(variant.quantity, 1);
}

#[test]
fn presets_run_out_to_other() {
    let mut set = working_set();
    set.set_quantity_found(1, Some(4)).unwrap();
    for _ in 0..CONDITION_PRESETS.len() {
        set.add_condition_variant(1, None).unwrap();
    }

    let last = set.add_condition_variant(1, None).unwrap();
    assert_eq!(last.condition, FALLBACK_CONDITION);
}

#[test]
fn conditions_are_unique_ignoring_case() {
    let mut set = working_set();
    set.add_condition_variant(1, Some("Near Mint")).unwrap();

    assert!(matches!(
        set.add_condition_variant(1, Some("near mint")),
        Err(Error::DuplicateCondition(_))
    ));

    let err = set
        .set_condition_variants(
            2,
            vec![
                ConditionVariant::new("Played", 1, 1.0),
                ConditionVariant::new("PLAYED", 1, 1.0),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateCondition(c) if c == "PLAYED"));
    assert!(set.state(2).unwrap().condition_variants.is_empty());
}

#[test]
fn update_may_keep_its_own_condition() {
    let mut set = working_set();
    set.add_condition_variant(1, Some("Near Mint")).unwrap();
    set.add_condition_variant(1, Some("Damaged")).unwrap();

    set.update_condition_variant(1, 0, ConditionVariant::new("near mint", 2, 3.0))
        .unwrap();
    assert!(matches!(
        set.update_condition_variant(1, 0, ConditionVariant::new("Damaged", 1, 1.0)),
        Err(Error::DuplicateCondition(_))
    ));
    assert!(matches!(
        set.update_condition_variant(1, 5, ConditionVariant::new("Other", 1, 1.0)),
        Err(Error::VariantIndex(5))
    ));
}

#[test]
fn removing_last_variant_returns_to_unit_price_mode() {
    let mut set = working_set();
    set.set_quantity_found(1, Some(3)).unwrap();
    set.set_unit_price(1, Some(2.0)).unwrap();
    set.add_condition_variant(1, None).unwrap();

    let removed = set.remove_condition_variant(1, 0).unwrap();
    assert_eq!(removed.condition, "Near Mint");

    let state = set.state(1).unwrap();
    assert!(state.condition_variants.is_empty());
    assert_eq!(state.unit_price, Some(2.0));
    assert!(matches!(
        set.remove_condition_variant(1, 0),
        Err(Error::VariantIndex(0))
    ));
}

#[test]
fn balance_reports_unassigned_copies() {
    let mut set = working_set();
    set.set_quantity_found(1, Some(4)).unwrap();
    set.set_condition_variants(1, vec![ConditionVariant::new("Near Mint", 1, 2.0)])
        .unwrap();

    assert_eq!(set.balance(1).unwrap(), Balance::Unassigned(3));
}

#[test]
fn apply_overwrites_staff_fields() {
    let mut set = working_set();
    set.set_quantity_found(1, Some(3)).unwrap();
    set.set_condition_variants(1, vec![ConditionVariant::new("Near Mint", 3, 2.0)])
        .unwrap();

    let mut items = vec![line_item(1, "Lightning Bolt", 4), line_item(3, "Opt", 1)];
    items[0].unit_price = Some(9.99);
    set.apply_to(&mut items);

    assert_eq!(items[0].quantity_found, Some(3));
    assert_eq!(items[0].unit_price, None);
    assert_eq!(items[0].condition_variants.len(), 1);
    assert_eq!(items[1].quantity_found, None);
}
