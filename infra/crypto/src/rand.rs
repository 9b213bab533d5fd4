use getrandom::fill;

use crate::error::CryptoError;

/// Fills a fresh buffer of `n` bytes from the system CSPRNG.
///
/// Used for salts, recovery keys, and anything else that must be
/// unpredictable.
///
/// # Errors
/// Returns [`CryptoError::Rng`] if the operating system RNG is unavailable.
pub fn random_bytes(n: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; n];
    fill(&mut buf).map_err(|e| CryptoError::Rng { message: e.to_string() })?;
    Ok(buf)
}

/// Fixed-size variant of [`random_bytes`].
///
/// # Errors
/// Returns [`CryptoError::Rng`] if the operating system RNG is unavailable.
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    fill(&mut buf).map_err(|e| CryptoError::Rng { message: e.to_string() })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_have_requested_length() {
        let bytes = random_bytes(24).unwrap();
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn consecutive_draws_differ() {
        let a: [u8; 32] = random_array().unwrap();
        let b: [u8; 32] = random_array().unwrap();
        assert_ne!(a, b);
    }
}
