//! One-shot local-to-server vault migration.
//!
//! Runs at most once per session, tracked by a flag in a session-scoped
//! [`KeyValueStore`]. The flag is set after every definitive outcome and
//! never after the unauthenticated skip, so a user who signs in later still
//! gets their migration. On any failure nothing local is mutated; a
//! downloaded vault is assembled completely in memory before the single
//! store write.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use packrat_storage::KeyValueStore;
use packrat_vault::{LocalVault, VaultError, VaultKeeper, VaultMeta};
use tracing::info;

use crate::api::{RemoteBlob, RemoteMeta, VaultApi};
use crate::engine::{ConflictChoice, put_blob_guarded};
use crate::error::SyncError;

/// Session-store key marking that migration already ran this session.
pub const MIGRATION_FLAG_KEY: &str = "vault_migration_attempted";

/// What the migration run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No authenticated session; nothing was attempted and the session flag
    /// was left unset.
    SkippedNotAuthenticated,
    /// The session flag was already set; the network was not touched.
    AlreadyRan,
    /// Neither a local nor a remote vault exists.
    NoVault,
    /// Local and remote metadata already matched; blobs were refreshed.
    AlreadyInSync,
    UploadedLocalToServer,
    DownloadedServerToLocal,
    KeptServerOverwroteLocal,
    KeptLocalOverwroteServer,
}

/// Decides which side wins when both a local and a remote vault exist with
/// different metadata. The one decision applies to every record collection.
#[async_trait]
pub trait MigrationPrompt: Send + Sync {
    async fn choose(&self, local: &VaultMeta, remote: &VaultMeta) -> ConflictChoice;
}

/// Custom error type for migration runs.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl MigrationError {
    /// One-line message suitable for showing to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Sync(err) => err.user_message(),
            Self::Vault(_) => "Could not read your local vault. Nothing was changed.",
        }
    }
}

/// Drives the one-shot migration between the local vault and the server.
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    api: Arc<dyn VaultApi>,
    keeper: VaultKeeper,
    session: Arc<dyn KeyValueStore>,
}

impl MigrationRunner {
    pub fn new(
        api: Arc<dyn VaultApi>,
        keeper: VaultKeeper,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self { api, keeper, session }
    }

    /// Runs the migration once for this session.
    ///
    /// # Errors
    /// Network and store failures propagate as [`MigrationError`]; the
    /// session flag stays unset so a later run can retry.
    pub async fn run(
        &self,
        authenticated: bool,
        prompt: &dyn MigrationPrompt,
    ) -> Result<MigrationOutcome, MigrationError> {
        if !authenticated {
            return Ok(MigrationOutcome::SkippedNotAuthenticated);
        }
        if self
            .session
            .get(MIGRATION_FLAG_KEY)
            .await
            .map_err(VaultError::from)?
            .is_some()
        {
            return Ok(MigrationOutcome::AlreadyRan);
        }

        let local = self.keeper.local_vault().await?;
        let remote = self.api.get_meta().await?;

        let outcome = match (local, remote) {
            (None, None) => MigrationOutcome::NoVault,
            (Some(local), None) => {
                self.upload(&local, None).await?;
                MigrationOutcome::UploadedLocalToServer
            },
            (None, Some(remote)) => {
                self.download(remote).await?;
                MigrationOutcome::DownloadedServerToLocal
            },
            (Some(local), Some(remote)) => {
                if local.meta == remote.meta {
                    self.push_blobs(&local).await?;
                    MigrationOutcome::AlreadyInSync
                } else {
                    match prompt.choose(&local.meta, &remote.meta).await {
                        ConflictChoice::KeepLocal => {
                            self.upload(&local, Some(&remote.etag)).await?;
                            MigrationOutcome::KeptLocalOverwroteServer
                        },
                        ConflictChoice::KeepRemote => {
                            self.download(remote).await?;
                            MigrationOutcome::KeptServerOverwroteLocal
                        },
                    }
                }
            },
        };

        self.session.set(MIGRATION_FLAG_KEY, b"1").await.map_err(VaultError::from)?;
        info!(?outcome, "vault migration finished");
        Ok(outcome)
    }

    /// Pushes the local metadata and every local blob to the server.
    async fn upload(&self, local: &LocalVault, if_match: Option<&str>) -> Result<(), SyncError> {
        self.api.put_meta(&local.meta, if_match).await?;
        self.push_blobs(local).await
    }

    /// Pushes local blobs, winning any per-blob etag race toward local.
    async fn push_blobs(&self, local: &LocalVault) -> Result<(), SyncError> {
        for (kind, blob) in &local.blobs {
            put_blob_guarded(
                self.api.as_ref(),
                *kind,
                blob,
                None,
                Some(|_: &RemoteBlob| ConflictChoice::KeepLocal),
            )
            .await?;
        }
        Ok(())
    }

    /// Fetches the complete remote vault, then replaces the local one in a
    /// single write.
    async fn download(&self, remote: RemoteMeta) -> Result<(), MigrationError> {
        let mut blobs = BTreeMap::new();
        for kind in packrat_domain::RecordKind::ALL {
            if let Some(remote_blob) = self.api.get_blob(kind).await? {
                blobs.insert(kind, remote_blob.blob);
            }
        }
        let vault = LocalVault { meta: remote.meta, blobs };
        self.keeper.replace_local_vault(&vault).await?;
        Ok(())
    }
}
