use async_trait::async_trait;
use chrono::{DateTime, Utc};
use packrat_crypto::EncryptedBlob;
use packrat_domain::RecordKind;
use packrat_vault::{ExportBundle, VaultMeta};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Vault metadata as the server holds it, with its concurrency token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMeta {
    pub meta: VaultMeta,
    pub etag: String,
    pub updated_at: DateTime<Utc>,
}

/// One encrypted record collection as the server holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBlob {
    pub blob: EncryptedBlob,
    pub etag: String,
    pub updated_at: DateTime<Utc>,
}

/// Server acknowledgement of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutReceipt {
    pub etag: String,
    pub updated_at: DateTime<Utc>,
}

/// The remote vault contract. The server only ever sees ciphertext.
///
/// Reads return `Ok(None)` when the object does not exist. Writes carry an
/// optional `If-Match` etag; a stale etag (or a missing one where the server
/// requires it) yields [`SyncError::Conflict`].
#[async_trait]
pub trait VaultApi: Send + Sync + std::fmt::Debug {
    async fn get_meta(&self) -> Result<Option<RemoteMeta>, SyncError>;

    async fn put_meta(
        &self,
        meta: &VaultMeta,
        if_match: Option<&str>,
    ) -> Result<PutReceipt, SyncError>;

    async fn get_blob(&self, kind: RecordKind) -> Result<Option<RemoteBlob>, SyncError>;

    async fn put_blob(
        &self,
        kind: RecordKind,
        blob: &EncryptedBlob,
        if_match: Option<&str>,
    ) -> Result<PutReceipt, SyncError>;

    async fn get_export(&self) -> Result<Option<ExportBundle>, SyncError>;

    async fn post_import(&self, bundle: &ExportBundle) -> Result<(), SyncError>;
}
