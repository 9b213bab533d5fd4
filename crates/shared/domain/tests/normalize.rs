use packrat_domain::{
    AddressRecord, BillingCycle, MobileNumberRecord, NumberLabel, Priority, RECORD_ID_LEN,
    SubscriptionRecord, Todo, normalize_addresses, normalize_mobile_numbers,
    normalize_subscriptions, normalize_todos,
};
use proptest::prelude::*;
use serde_json::{Value, json};

#[test]
fn repairs_a_messy_address_collection() {
    let raw = json!([
        {"id": "a1", "label": "  home  ", "line1": " 1 Main St ", "city": "Berlin"},
        {"line1": "2 Side St", "postalCode": 10115},
        {"label": "no line1, dropped"},
        "not an object",
    ]);

    let out = normalize_addresses(raw);
    assert!(out.changed);
    assert_eq!(out.value.len(), 2);

    assert_eq!(out.value[0].id, "a1");
    assert_eq!(out.value[0].label, "home");
    assert_eq!(out.value[0].line1, "1 Main St");

    // Missing id gets generated, numeric postal code is rendered as a string.
    assert_eq!(out.value[1].id.len(), RECORD_ID_LEN);
    assert_eq!(out.value[1].postal_code, "10115");
}

#[test]
fn mobile_number_labels_parse_loosely() {
    let out = normalize_mobile_numbers(json!([
        {"id": "m1", "number": "+49 170 1234567", "label": "WORK"},
        {"id": "m2", "number": "+49 30 9876543", "label": "landline"},
    ]));
    assert_eq!(out.value[0].label, NumberLabel::Work);
    assert_eq!(out.value[1].label, NumberLabel::Mobile);
}

#[test]
fn subscription_price_accepts_numeric_strings() {
    let out = normalize_subscriptions(json!([
        {"id": "s1", "name": "News", "price": "9.99", "currency": "eur", "cycle": "Yearly"},
    ]));
    assert!(out.changed);
    let sub = &out.value[0];
    assert!((sub.price - 9.99).abs() < f64::EPSILON);
    assert_eq!(sub.currency, "EUR");
    assert_eq!(sub.cycle, BillingCycle::Yearly);
}

#[test]
fn todo_defaults_apply_to_missing_fields() {
    let out = normalize_todos(json!([{"id": "t1", "title": "water plants"}]));
    let todo = &out.value[0];
    assert!(!todo.done);
    assert_eq!(todo.priority, Priority::Normal);
    assert!(todo.due.is_empty());
}

#[test]
fn unknown_fields_survive_normalization() {
    let raw = json!([
        {"id": "t1", "title": "keep", "color": "teal", "tags": ["a", "b"]},
    ]);
    let out = normalize_todos(raw);
    let todo = &out.value[0];
    assert_eq!(todo.extra.get("color"), Some(&json!("teal")));
    assert_eq!(todo.extra.get("tags"), Some(&json!(["a", "b"])));

    // The preserved fields flatten back out on serialization.
    let back = serde_json::to_value(todo).unwrap();
    assert_eq!(back.get("color"), Some(&json!("teal")));
}

#[test]
fn normalization_is_idempotent_for_every_kind() {
    settles(normalize_addresses, json!([{"line1": " 1 Main St ", "postalCode": 10115}, 7]))
        .unwrap();
    settles(normalize_mobile_numbers, json!([{"number": 491701234567_i64, "label": "Home"}]))
        .unwrap();
    settles(normalize_subscriptions, json!([{"name": "News", "price": "12", "cycle": "WEEKLY"}]))
        .unwrap();
    settles(normalize_todos, json!([{"title": "x", "done": "true", "priority": "low"}])).unwrap();
}

#[test]
fn non_finite_price_strings_settle_to_zero() {
    // A price like "inf" parses as f64 but has no JSON representation, so it
    // must be repaired to 0 instead of kept and lost on reserialization.
    let first =
        normalize_subscriptions(json!([{"id": "s1", "name": "News", "price": "inf"}]));
    assert!(first.changed);
    assert!(first.value[0].price.abs() < f64::EPSILON);

    let second = normalize_subscriptions(serde_json::to_value(&first.value).unwrap());
    assert!(!second.changed);
    assert_eq!(second.value, first.value);
}

#[test]
fn camel_case_round_trip_matches_wire_format() {
    let records = vec![AddressRecord {
        id: "a1".to_owned(),
        line1: "1 Main St".to_owned(),
        postal_code: "10115".to_owned(),
        ..Default::default()
    }];
    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(json[0]["postalCode"], json!("10115"));

    let parsed: Vec<AddressRecord> = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, records);
}

#[test]
fn typed_defaults_round_trip_unchanged() {
    // Serializing defaults and normalizing must not invent changes, for
    // records that carry their required field.
    let subs = vec![SubscriptionRecord {
        id: "s1".to_owned(),
        name: "News".to_owned(),
        ..Default::default()
    }];
    let raw = serde_json::to_value(&subs).unwrap();
    let out = normalize_subscriptions(raw);
    assert!(!out.changed);
    assert_eq!(out.value, subs);

    let numbers = vec![MobileNumberRecord {
        id: "m1".to_owned(),
        number: "+49".to_owned(),
        ..Default::default()
    }];
    let raw = serde_json::to_value(&numbers).unwrap();
    let out = normalize_mobile_numbers(raw);
    assert!(!out.changed);

    let todos =
        vec![Todo { id: "t1".to_owned(), title: "water plants".to_owned(), ..Default::default() }];
    let raw = serde_json::to_value(&todos).unwrap();
    let out = normalize_todos(raw);
    assert!(!out.changed);
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
        // Float-looking strings, including ones f64 parses but JSON cannot
        // carry (non-finite and overflowing exponents).
        "(inf|-inf|nan|NaN|1e999|-1e999|9\\.99|0\\.1)".prop_map(Value::from),
    ]
}

fn json_record() -> impl Strategy<Value = Value> {
    proptest::collection::btree_map(
        // Real schema keys mixed with arbitrary ones, so coercion paths like
        // the subscription price actually get hit.
        prop_oneof!["[a-zA-Z][a-zA-Z0-9]{0,8}", "(id|name|title|price|number|line1|done|cycle)"],
        json_leaf(),
        0..5,
    )
    .prop_map(|fields| Value::Object(fields.into_iter().collect()))
}

fn settles<T, F>(normalize: F, raw: Value) -> Result<(), TestCaseError>
where
    T: serde::Serialize + std::fmt::Debug + PartialEq,
    F: Fn(Value) -> packrat_domain::Normalized<T>,
{
    let first = normalize(raw);
    let second = normalize(serde_json::to_value(&first.value).unwrap());
    prop_assert!(!second.changed, "second pass still reported changes: {:?}", second.value);
    prop_assert_eq!(first.value, second.value);
    Ok(())
}

proptest! {
    // Whatever junk comes in, one pass settles it: normalizing the
    // normalized output never reports further changes, for any collection.
    #[test]
    fn normalization_settles_after_one_pass(
        items in proptest::collection::vec(prop_oneof![json_record(), json_leaf()], 0..8)
    ) {
        let raw = Value::Array(items);
        settles(normalize_addresses, raw.clone())?;
        settles(normalize_mobile_numbers, raw.clone())?;
        settles(normalize_subscriptions, raw.clone())?;
        settles(normalize_todos, raw)?;
    }
}
