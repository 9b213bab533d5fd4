//! Sync feature: the remote vault contract, its HTTP implementation, the
//! etag-guarded write engine, and the one-shot migration runner.
//!
//! Everything that crosses the wire here is ciphertext plus public metadata;
//! the master key and plaintext records never enter this crate.

mod api;
mod engine;
mod error;
mod http;
mod migration;

pub use api::{PutReceipt, RemoteBlob, RemoteMeta, VaultApi};
pub use engine::{ConflictChoice, PutOutcome, put_blob_guarded, put_meta_guarded};
pub use error::SyncError;
pub use http::HttpVaultApi;
pub use migration::{
    MIGRATION_FLAG_KEY, MigrationError, MigrationOutcome, MigrationPrompt, MigrationRunner,
};
