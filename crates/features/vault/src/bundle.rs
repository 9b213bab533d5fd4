//! Ciphertext-only export/import bundles.
//!
//! A bundle is the local vault document plus a version and timestamp, meant
//! for user-driven backup and transfer between devices. Validation is purely
//! structural and never decrypts anything; the first defect found is
//! reported with its JSON path.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use packrat_crypto::{EncryptedBlob, IV_LEN, TAG_LEN};
use packrat_domain::RecordKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::VaultError;
use crate::keeper::VaultKeeper;
use crate::model::{LocalVault, VaultMeta};

/// Current bundle schema version.
pub const BUNDLE_VERSION: u32 = 1;

/// A portable, ciphertext-only snapshot of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub meta: VaultMeta,
    #[serde(default)]
    pub blobs: BTreeMap<RecordKind, EncryptedBlob>,
}

/// Snapshots the local vault into a bundle.
///
/// Ciphertext fields are carried over byte-for-byte; nothing is re-encrypted.
///
/// # Errors
/// Returns [`VaultError::NotFound`] if no local vault exists.
pub async fn build_export_bundle(keeper: &VaultKeeper) -> Result<ExportBundle, VaultError> {
    let vault = keeper.local_vault().await?.ok_or(VaultError::NotFound)?;
    Ok(ExportBundle {
        version: BUNDLE_VERSION,
        exported_at: Utc::now(),
        meta: vault.meta,
        blobs: vault.blobs,
    })
}

/// Replaces the local vault with the bundle's contents.
///
/// The caller is expected to have run [`validate_bundle_from_text`] first
/// when the bundle came from outside.
///
/// # Errors
/// Returns [`VaultError::Store`] if the store cannot be written.
pub async fn import_bundle(keeper: &VaultKeeper, bundle: ExportBundle) -> Result<(), VaultError> {
    let vault = LocalVault { meta: bundle.meta, blobs: bundle.blobs };
    keeper.replace_local_vault(&vault).await?;
    info!("imported vault bundle");
    Ok(())
}

/// Validates untrusted bundle text and parses it.
///
/// The size bound is checked before any parsing. Structural checks cover the
/// version, both wrapped-key blobs in the header, and every record blob:
/// each must be an `{iv, ciphertext}` pair of base64 strings with a 12-byte
/// IV and a ciphertext at least one tag long.
///
/// # Errors
/// Returns [`VaultError::BundleTooLarge`] past the size bound and
/// [`VaultError::InvalidBundle`] naming the first defect otherwise.
pub fn validate_bundle_from_text(
    text: &str,
    max_bytes: usize,
) -> Result<ExportBundle, VaultError> {
    if text.len() > max_bytes {
        return Err(VaultError::BundleTooLarge { actual: text.len(), limit: max_bytes });
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| VaultError::invalid_bundle(format!("not valid JSON: {e}")))?;
    let root = value
        .as_object()
        .ok_or_else(|| VaultError::invalid_bundle("root is not an object"))?;

    match root.get("version").and_then(Value::as_u64) {
        Some(v) if v == u64::from(BUNDLE_VERSION) => {},
        Some(v) => return Err(VaultError::invalid_bundle(format!("unsupported version {v}"))),
        None => return Err(VaultError::invalid_bundle("missing numeric version")),
    }

    let meta = root
        .get("meta")
        .and_then(Value::as_object)
        .ok_or_else(|| VaultError::invalid_bundle("missing meta object"))?;
    check_blob(meta.get("wrappedMasterKeyByPassphrase"), "meta.wrappedMasterKeyByPassphrase")?;
    check_blob(meta.get("wrappedMasterKeyByRecovery"), "meta.wrappedMasterKeyByRecovery")?;

    if let Some(blobs) = root.get("blobs") {
        let blobs = blobs
            .as_object()
            .ok_or_else(|| VaultError::invalid_bundle("blobs is not an object"))?;
        for (kind, blob) in blobs {
            if !RecordKind::ALL.iter().any(|k| k.as_str() == kind) {
                return Err(VaultError::invalid_bundle(format!("unknown collection {kind:?}")));
            }
            check_blob(Some(blob), &format!("blobs.{kind}"))?;
        }
    }

    serde_json::from_value(value)
        .map_err(|e| VaultError::invalid_bundle(format!("schema mismatch: {e}")))
}

fn check_blob(value: Option<&Value>, path: &str) -> Result<(), VaultError> {
    let obj = value
        .and_then(Value::as_object)
        .ok_or_else(|| VaultError::invalid_bundle(format!("{path} is not an object")))?;

    let iv = decoded_field(obj, path, "iv")?;
    if iv.len() != IV_LEN {
        return Err(VaultError::invalid_bundle(format!(
            "{path}.iv must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }

    let ciphertext = decoded_field(obj, path, "ciphertext")?;
    if ciphertext.len() < TAG_LEN {
        return Err(VaultError::invalid_bundle(format!(
            "{path}.ciphertext is shorter than the {TAG_LEN}-byte tag"
        )));
    }
    Ok(())
}

fn decoded_field(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<Vec<u8>, VaultError> {
    let text = obj
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| VaultError::invalid_bundle(format!("{path}.{field} is not a string")))?;
    STANDARD
        .decode(text)
        .map_err(|_| VaultError::invalid_bundle(format!("{path}.{field} is not valid base64")))
}
