use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::normalize::Normalized;

/// The record collections a vault can hold. One encrypted blob per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Addresses,
    MobileNumbers,
    Subscriptions,
    Todos,
}

impl RecordKind {
    /// Every kind, in stable order. Sync and migration iterate this.
    pub const ALL: [Self; 4] =
        [Self::Addresses, Self::MobileNumbers, Self::Subscriptions, Self::Todos];

    /// Stable wire name, used in URLs and as the blob map key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Addresses => "addresses",
            Self::MobileNumbers => "mobileNumbers",
            Self::Subscriptions => "subscriptions",
            Self::Todos => "todos",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label for a phone number entry. Default: [`NumberLabel::Mobile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberLabel {
    #[default]
    Mobile,
    Home,
    Work,
    Other,
}

impl NumberLabel {
    /// Case-insensitive parse; unknown values fall back to the default.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "home" => Self::Home,
            "work" => Self::Work,
            "other" => Self::Other,
            _ => Self::Mobile,
        }
    }
}

/// Billing cadence of a subscription. Default: [`BillingCycle::Monthly`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
    Weekly,
    Quarterly,
}

impl BillingCycle {
    /// Case-insensitive parse; unknown values fall back to the default.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "yearly" => Self::Yearly,
            "weekly" => Self::Weekly,
            "quarterly" => Self::Quarterly,
            _ => Self::Monthly,
        }
    }
}

/// Todo priority. Default: [`Priority::Normal`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Case-insensitive parse; unknown values fall back to the default.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Normal,
        }
    }
}

/// A postal address. Required field: `line1`.
///
/// `extra` carries free-form fields outside the schema, preserved verbatim
/// across normalization and persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressRecord {
    pub id: String,
    pub label: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A phone number entry. Required field: `number`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MobileNumberRecord {
    pub id: String,
    pub label: NumberLabel,
    pub number: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A recurring subscription. Required field: `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionRecord {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub cycle: BillingCycle,
    pub notes: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A todo item. Required field: `title`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub done: bool,
    pub priority: Priority,
    pub due: String,
    pub notes: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Marker trait tying a record type to its collection kind and normalizer.
///
/// The vault codec is generic over this trait: it knows which blob to read
/// and how to repair whatever comes out of decryption.
pub trait VaultRecord: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    const KIND: RecordKind;

    /// Defensively normalizes untrusted decrypted JSON into typed records.
    fn normalize(raw: serde_json::Value) -> Normalized<Self>;
}

impl VaultRecord for AddressRecord {
    const KIND: RecordKind = RecordKind::Addresses;

    fn normalize(raw: serde_json::Value) -> Normalized<Self> {
        crate::normalize::normalize_addresses(raw)
    }
}

impl VaultRecord for MobileNumberRecord {
    const KIND: RecordKind = RecordKind::MobileNumbers;

    fn normalize(raw: serde_json::Value) -> Normalized<Self> {
        crate::normalize::normalize_mobile_numbers(raw)
    }
}

impl VaultRecord for SubscriptionRecord {
    const KIND: RecordKind = RecordKind::Subscriptions;

    fn normalize(raw: serde_json::Value) -> Normalized<Self> {
        crate::normalize::normalize_subscriptions(raw)
    }
}

impl VaultRecord for Todo {
    const KIND: RecordKind = RecordKind::Todos;

    fn normalize(raw: serde_json::Value) -> Normalized<Self> {
        crate::normalize::normalize_todos(raw)
    }
}
