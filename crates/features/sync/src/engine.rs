//! Optimistic-concurrency write path.
//!
//! Every guarded write carries the etag of the version it was based on. On a
//! 409 the engine fetches the current remote version and asks the
//! caller-supplied resolver what to do; policy never lives here. `KeepLocal`
//! retries exactly once against the fetched etag. A second conflict means the
//! object is changing faster than we can follow and is surfaced as a hard
//! [`SyncError::Conflict`].

use packrat_crypto::EncryptedBlob;
use packrat_domain::RecordKind;
use packrat_vault::VaultMeta;
use tracing::{debug, warn};

use crate::api::{PutReceipt, RemoteBlob, RemoteMeta, VaultApi};
use crate::error::SyncError;

/// What to do when the remote version differs from the one we based our
/// write on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Push our version anyway, over the current remote etag.
    KeepLocal,
    /// Abandon the write and adopt the remote version.
    KeepRemote,
}

/// Result of a guarded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome<R> {
    /// The write went through; the server issued a new etag.
    Updated(PutReceipt),
    /// The resolver chose the remote version; nothing was written.
    KeptRemote(R),
}

/// Writes vault metadata under an etag precondition.
///
/// # Errors
/// Returns [`SyncError::Conflict`] when no resolver is given, or when the
/// single `KeepLocal` retry conflicts again.
pub async fn put_meta_guarded<F>(
    api: &dyn VaultApi,
    meta: &VaultMeta,
    if_match: Option<&str>,
    resolver: Option<F>,
) -> Result<PutOutcome<RemoteMeta>, SyncError>
where
    F: FnOnce(&RemoteMeta) -> ConflictChoice + Send,
{
    match api.put_meta(meta, if_match).await {
        Ok(receipt) => Ok(PutOutcome::Updated(receipt)),
        Err(SyncError::Conflict) => {
            let Some(resolver) = resolver else {
                return Err(SyncError::Conflict);
            };
            let Some(remote) = api.get_meta().await? else {
                // The object vanished between our write and the re-read;
                // retry as a create.
                debug!("metadata conflict against a deleted object, retrying as create");
                return Ok(PutOutcome::Updated(api.put_meta(meta, None).await?));
            };
            match resolver(&remote) {
                ConflictChoice::KeepRemote => {
                    debug!(etag = %remote.etag, "metadata conflict resolved toward remote");
                    Ok(PutOutcome::KeptRemote(remote))
                },
                ConflictChoice::KeepLocal => {
                    warn!(etag = %remote.etag, "metadata conflict, retrying once with fresh etag");
                    Ok(PutOutcome::Updated(api.put_meta(meta, Some(&remote.etag)).await?))
                },
            }
        },
        Err(other) => Err(other),
    }
}

/// Writes one record blob under an etag precondition.
///
/// # Errors
/// Returns [`SyncError::Conflict`] when no resolver is given, or when the
/// single `KeepLocal` retry conflicts again.
pub async fn put_blob_guarded<F>(
    api: &dyn VaultApi,
    kind: RecordKind,
    blob: &EncryptedBlob,
    if_match: Option<&str>,
    resolver: Option<F>,
) -> Result<PutOutcome<RemoteBlob>, SyncError>
where
    F: FnOnce(&RemoteBlob) -> ConflictChoice + Send,
{
    match api.put_blob(kind, blob, if_match).await {
        Ok(receipt) => Ok(PutOutcome::Updated(receipt)),
        Err(SyncError::Conflict) => {
            let Some(resolver) = resolver else {
                return Err(SyncError::Conflict);
            };
            let Some(remote) = api.get_blob(kind).await? else {
                debug!(%kind, "blob conflict against a deleted object, retrying as create");
                return Ok(PutOutcome::Updated(api.put_blob(kind, blob, None).await?));
            };
            match resolver(&remote) {
                ConflictChoice::KeepRemote => {
                    debug!(%kind, etag = %remote.etag, "blob conflict resolved toward remote");
                    Ok(PutOutcome::KeptRemote(remote))
                },
                ConflictChoice::KeepLocal => {
                    warn!(%kind, etag = %remote.etag, "blob conflict, retrying once with fresh etag");
                    Ok(PutOutcome::Updated(api.put_blob(kind, blob, Some(&remote.etag)).await?))
                },
            }
        },
        Err(other) => Err(other),
    }
}
