//! Domain types shared across PackRat: the four personal-record collections,
//! the defensive normalizer that repairs untrusted decrypted JSON, record-id
//! generation, and layered configuration.
//!
//! ## ID generation
//! Use [`record_id`] for URL-safe, unambiguous record ids:
//! ```rust
//! let id = packrat_domain::record_id();
//! assert_eq!(id.len(), 12);
//! ```

pub mod config;
mod id;
mod normalize;
mod records;

pub use id::{RECORD_ID_LEN, SAFE_ALPHABET, record_id};
pub use normalize::{
    Normalized, normalize_addresses, normalize_mobile_numbers, normalize_subscriptions,
    normalize_todos,
};
pub use records::{
    AddressRecord, BillingCycle, MobileNumberRecord, NumberLabel, Priority, RecordKind,
    SubscriptionRecord, Todo, VaultRecord,
};
