//! Key-value persistence seam for the PackRat vault.
//!
//! The original vault ran on browser `localStorage`/`sessionStorage`. This
//! crate abstracts that substrate behind the minimal [`KeyValueStore`]
//! capability (`get`, `set`, `remove`) so the same lifecycle and codec logic
//! runs unchanged against any backend:
//!
//! - [`MemoryStore`] — a mutex-guarded map. Doubles as the session-scoped
//!   store for per-session flags, since its contents die with the process.
//! - [`FileStore`] — one file per key under a root directory, written with an
//!   atomic swap (unique temp file + `fsync` + rename) so a crash never leaves
//!   a half-written value behind.
//!
//! Stores hold only ciphertext and flags; nothing in this crate ever sees
//! plaintext records.

mod error;
mod file;
mod memory;
mod store;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
