//! Crypto primitives for the PackRat vault.
//!
//! This crate wraps authenticated encryption (AES-256-GCM), password-based key
//! derivation (PBKDF2-HMAC-SHA256), and secure random byte generation behind a
//! small, stateless API. Everything here is a pure function over explicit
//! inputs; key lifecycle and persistence live in higher layers.
//!
//! ## Blob format
//!
//! Every encrypted unit is an [`EncryptedBlob`]: a 96-bit random IV plus the
//! ciphertext with the 128-bit GCM tag appended. On the wire and on disk both
//! fields are base64 strings:
//!
//! ```text
//! { "iv": "<base64, 12 bytes>", "ciphertext": "<base64, N+16 bytes>" }
//! ```
//!
//! ## Nonce policy
//!
//! [`encrypt`] generates a **fresh random 96-bit IV for every call**. Reusing
//! an IV under the same key breaks GCM; there is deliberately no API that
//! accepts a caller-supplied IV.
//!
//! ## No oracle
//!
//! [`decrypt`] reports every failure mode (wrong key, tampered IV, tampered
//! ciphertext, truncated input) as [`CryptoError::AuthenticationFailed`].
//! Callers cannot distinguish a wrong passphrase from corrupted data.

mod cipher;
mod error;
mod kdf;
mod keys;
mod rand;

pub use cipher::{EncryptedBlob, IV_LEN, TAG_LEN, decrypt, encrypt};
pub use error::CryptoError;
pub use kdf::derive_key_from_passphrase;
pub use keys::{KEY_LEN, MasterKey};
pub use rand::{random_array, random_bytes};
