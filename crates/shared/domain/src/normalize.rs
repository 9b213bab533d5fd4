//! Defensive normalization of untrusted decrypted JSON.
//!
//! Whatever comes out of an encrypted blob is treated as hostile-but-parsed
//! JSON: the functions here repair it into well-typed records, dropping what
//! cannot be repaired. Malformed data is never an error at this layer — the
//! `changed` flag tells the caller to write the corrected collection back so
//! the stored data converges to the strict schema.
//!
//! Repair rules, per element:
//! - non-object elements are dropped;
//! - records missing their required field are dropped;
//! - string fields are coerced to strings and trimmed;
//! - enum fields parse case-insensitively and fall back to their default;
//! - numeric fields accept finite numeric-looking strings;
//! - a missing or blank `id` gets a freshly generated one;
//! - unrecognized fields are carried through untouched.
//!
//! `changed` is set exactly when the normalized output differs from the
//! input, which makes normalization idempotent: running it on its own output
//! always yields `changed == false`.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::id::record_id;
use crate::records::{
    AddressRecord, BillingCycle, MobileNumberRecord, NumberLabel, Priority, SubscriptionRecord,
    Todo,
};

/// Result of normalizing one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub value: Vec<T>,
    /// Set when any repair happened; drives a write-back of the collection.
    pub changed: bool,
}

/// Normalizes a decrypted `addresses` collection.
#[must_use]
pub fn normalize_addresses(raw: Value) -> Normalized<AddressRecord> {
    normalize_collection(raw, repair_address)
}

/// Normalizes a decrypted `mobileNumbers` collection.
#[must_use]
pub fn normalize_mobile_numbers(raw: Value) -> Normalized<MobileNumberRecord> {
    normalize_collection(raw, repair_mobile_number)
}

/// Normalizes a decrypted `subscriptions` collection.
#[must_use]
pub fn normalize_subscriptions(raw: Value) -> Normalized<SubscriptionRecord> {
    normalize_collection(raw, repair_subscription)
}

/// Normalizes a decrypted `todos` collection.
#[must_use]
pub fn normalize_todos(raw: Value) -> Normalized<Todo> {
    normalize_collection(raw, repair_todo)
}

fn normalize_collection<T, F>(raw: Value, repair: F) -> Normalized<T>
where
    T: Serialize,
    F: Fn(&Map<String, Value>) -> Option<T>,
{
    let items = match raw {
        // Absent data is empty and needs no write-back.
        Value::Null => return Normalized { value: Vec::new(), changed: false },
        Value::Array(items) => items,
        other => {
            debug!(found = %value_kind(&other), "collection was not an array, resetting");
            return Normalized { value: Vec::new(), changed: true };
        },
    };

    let mut changed = false;
    let mut value = Vec::with_capacity(items.len());

    for item in items {
        let Value::Object(obj) = &item else {
            changed = true;
            continue;
        };
        let Some(record) = repair(obj) else {
            changed = true;
            continue;
        };
        match serde_json::to_value(&record) {
            Ok(reserialized) => {
                if reserialized != item {
                    changed = true;
                }
                value.push(record);
            },
            Err(_) => changed = true,
        }
    }

    Normalized { value, changed }
}

fn repair_address(obj: &Map<String, Value>) -> Option<AddressRecord> {
    const KNOWN: &[&str] = &["id", "label", "line1", "line2", "city", "postalCode", "country"];

    let line1 = string_field(obj, "line1");
    if line1.is_empty() {
        return None;
    }
    Some(AddressRecord {
        id: id_field(obj),
        label: string_field(obj, "label"),
        line1,
        line2: string_field(obj, "line2"),
        city: string_field(obj, "city"),
        postal_code: string_field(obj, "postalCode"),
        country: string_field(obj, "country"),
        extra: extra_fields(obj, KNOWN),
    })
}

fn repair_mobile_number(obj: &Map<String, Value>) -> Option<MobileNumberRecord> {
    const KNOWN: &[&str] = &["id", "label", "number"];

    let number = string_field(obj, "number");
    if number.is_empty() {
        return None;
    }
    Some(MobileNumberRecord {
        id: id_field(obj),
        label: NumberLabel::from_loose(&string_field(obj, "label")),
        number,
        extra: extra_fields(obj, KNOWN),
    })
}

fn repair_subscription(obj: &Map<String, Value>) -> Option<SubscriptionRecord> {
    const KNOWN: &[&str] = &["id", "name", "price", "currency", "cycle", "notes"];

    let name = string_field(obj, "name");
    if name.is_empty() {
        return None;
    }
    Some(SubscriptionRecord {
        id: id_field(obj),
        name,
        price: number_field(obj, "price"),
        currency: string_field(obj, "currency").to_ascii_uppercase(),
        cycle: BillingCycle::from_loose(&string_field(obj, "cycle")),
        notes: string_field(obj, "notes"),
        extra: extra_fields(obj, KNOWN),
    })
}

fn repair_todo(obj: &Map<String, Value>) -> Option<Todo> {
    const KNOWN: &[&str] = &["id", "title", "done", "priority", "due", "notes"];

    let title = string_field(obj, "title");
    if title.is_empty() {
        return None;
    }
    Some(Todo {
        id: id_field(obj),
        title,
        done: bool_field(obj, "done"),
        priority: Priority::from_loose(&string_field(obj, "priority")),
        due: string_field(obj, "due"),
        notes: string_field(obj, "notes"),
        extra: extra_fields(obj, KNOWN),
    })
}

/// Existing non-blank ids are kept verbatim; everything else gets a new one.
fn id_field(obj: &Map<String, Value>) -> String {
    let id = string_field(obj, "id");
    if id.is_empty() { record_id() } else { id }
}

/// Strings are trimmed; numbers and booleans are rendered; anything else
/// becomes the empty string.
fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numbers pass through; numeric-looking strings are parsed; the rest is 0.
/// Non-finite parses ("inf", "nan", "1e999") are rejected too, since JSON
/// cannot represent them.
fn number_field(obj: &Map<String, Value>, key: &str) -> f64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            s.trim().parse().ok().filter(|parsed: &f64| parsed.is_finite()).unwrap_or(0.0)
        },
        _ => 0.0,
    }
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Fields outside the schema are free-form and carried through untouched.
fn extra_fields(obj: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
