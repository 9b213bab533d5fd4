use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::keys::{KEY_LEN, MasterKey};

/// Derives a 256-bit key from a passphrase with PBKDF2-HMAC-SHA256.
///
/// Deterministic: identical `(passphrase, salt, iterations)` always yield the
/// same key. The iteration count is stored alongside the vault metadata and
/// must come from configuration, not a hardcoded constant, so deployments can
/// raise it over time.
#[must_use]
pub fn derive_key_from_passphrase(passphrase: &str, salt: &[u8], iterations: u32) -> MasterKey {
    let mut out = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut out);
    MasterKey::from_bytes(out)
}
