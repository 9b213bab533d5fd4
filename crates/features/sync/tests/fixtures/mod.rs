//! In-memory [`VaultApi`] double with etag preconditions and fault injection.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use packrat_crypto::EncryptedBlob;
use packrat_domain::RecordKind;
use packrat_sync::{PutReceipt, RemoteBlob, RemoteMeta, SyncError, VaultApi};
use packrat_vault::{ExportBundle, VaultMeta};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct FakeVaultApi {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    meta: Option<(VaultMeta, String)>,
    blobs: BTreeMap<RecordKind, (EncryptedBlob, String)>,
    next_version: u64,
    forced_put_conflicts: u32,
    forced_get_status: Option<u16>,
    get_meta_calls: u32,
    put_meta_calls: u32,
}

impl State {
    fn next_etag(&mut self) -> String {
        self.next_version += 1;
        format!("\"v{}\"", self.next_version)
    }

    fn precondition(current: Option<&String>, if_match: Option<&str>) -> Result<(), SyncError> {
        match (current, if_match) {
            (Some(tag), Some(given)) if tag == given => Ok(()),
            (None, None) => Ok(()),
            _ => Err(SyncError::Conflict),
        }
    }
}

#[allow(dead_code)]
impl FakeVaultApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plants server-side metadata, returning its etag.
    pub fn seed_meta(&self, meta: VaultMeta) -> String {
        let mut state = self.state.lock();
        let etag = state.next_etag();
        state.meta = Some((meta, etag.clone()));
        etag
    }

    pub fn seed_blob(&self, kind: RecordKind, blob: EncryptedBlob) {
        let mut state = self.state.lock();
        let etag = state.next_etag();
        state.blobs.insert(kind, (blob, etag));
    }

    /// Forces the next `n` puts to answer 409 regardless of etag.
    pub fn force_put_conflicts(&self, n: u32) {
        self.state.lock().forced_put_conflicts = n;
    }

    /// Forces every get to answer the given HTTP status.
    pub fn force_get_status(&self, status: u16) {
        self.state.lock().forced_get_status = Some(status);
    }

    pub fn meta(&self) -> Option<VaultMeta> {
        self.state.lock().meta.as_ref().map(|(meta, _)| meta.clone())
    }

    pub fn blob(&self, kind: RecordKind) -> Option<EncryptedBlob> {
        self.state.lock().blobs.get(&kind).map(|(blob, _)| blob.clone())
    }

    pub fn get_meta_calls(&self) -> u32 {
        self.state.lock().get_meta_calls
    }

    pub fn put_meta_calls(&self) -> u32 {
        self.state.lock().put_meta_calls
    }
}

#[async_trait]
impl VaultApi for FakeVaultApi {
    async fn get_meta(&self) -> Result<Option<RemoteMeta>, SyncError> {
        let mut state = self.state.lock();
        state.get_meta_calls += 1;
        if let Some(status) = state.forced_get_status {
            return Err(SyncError::Http { status });
        }
        Ok(state.meta.as_ref().map(|(meta, etag)| RemoteMeta {
            meta: meta.clone(),
            etag: etag.clone(),
            updated_at: Utc::now(),
        }))
    }

    async fn put_meta(
        &self,
        meta: &VaultMeta,
        if_match: Option<&str>,
    ) -> Result<PutReceipt, SyncError> {
        let mut state = self.state.lock();
        state.put_meta_calls += 1;
        if state.forced_put_conflicts > 0 {
            state.forced_put_conflicts -= 1;
            return Err(SyncError::Conflict);
        }
        State::precondition(state.meta.as_ref().map(|(_, etag)| etag), if_match)?;
        let etag = state.next_etag();
        state.meta = Some((meta.clone(), etag.clone()));
        Ok(PutReceipt { etag, updated_at: Utc::now() })
    }

    async fn get_blob(&self, kind: RecordKind) -> Result<Option<RemoteBlob>, SyncError> {
        let state = self.state.lock();
        if let Some(status) = state.forced_get_status {
            return Err(SyncError::Http { status });
        }
        Ok(state.blobs.get(&kind).map(|(blob, etag)| RemoteBlob {
            blob: blob.clone(),
            etag: etag.clone(),
            updated_at: Utc::now(),
        }))
    }

    async fn put_blob(
        &self,
        kind: RecordKind,
        blob: &EncryptedBlob,
        if_match: Option<&str>,
    ) -> Result<PutReceipt, SyncError> {
        let mut state = self.state.lock();
        if state.forced_put_conflicts > 0 {
            state.forced_put_conflicts -= 1;
            return Err(SyncError::Conflict);
        }
        State::precondition(state.blobs.get(&kind).map(|(_, etag)| etag), if_match)?;
        let etag = state.next_etag();
        state.blobs.insert(kind, (blob.clone(), etag.clone()));
        Ok(PutReceipt { etag, updated_at: Utc::now() })
    }

    async fn get_export(&self) -> Result<Option<ExportBundle>, SyncError> {
        let state = self.state.lock();
        Ok(state.meta.as_ref().map(|(meta, _)| ExportBundle {
            version: packrat_vault::BUNDLE_VERSION,
            exported_at: Utc::now(),
            meta: meta.clone(),
            blobs: state
                .blobs
                .iter()
                .map(|(kind, (blob, _))| (*kind, blob.clone()))
                .collect(),
        }))
    }

    async fn post_import(&self, bundle: &ExportBundle) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        let etag = state.next_etag();
        state.meta = Some((bundle.meta.clone(), etag));
        state.blobs.clear();
        for (kind, blob) in &bundle.blobs {
            let etag = state.next_etag();
            state.blobs.insert(*kind, (blob.clone(), etag));
        }
        Ok(())
    }
}

/// Builds a syntactically valid vault header without running the KDF.
#[allow(dead_code)]
pub fn fake_meta(seed: u8) -> VaultMeta {
    VaultMeta {
        version: packrat_vault::VAULT_META_VERSION,
        kdf_name: packrat_vault::KDF_NAME.to_owned(),
        kdf_salt: vec![seed; packrat_vault::KDF_SALT_LEN],
        kdf_params: packrat_vault::KdfParams {
            iterations: 10,
            hash: packrat_vault::KDF_HASH.to_owned(),
        },
        wrapped_master_key_by_passphrase: fake_blob(seed.wrapping_add(1)),
        wrapped_master_key_by_recovery: fake_blob(seed.wrapping_add(2)),
    }
}

#[allow(dead_code)]
pub fn fake_blob(seed: u8) -> EncryptedBlob {
    EncryptedBlob { iv: vec![seed; 12], ciphertext: vec![seed; 48] }
}
