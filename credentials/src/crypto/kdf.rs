//! PBKDF2-HMAC-SHA256 key stretching, salt generation, and the constant-time
//! comparison every verification path funnels through.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::CredentialError;

/// Salt length for freshly minted credentials and for the legacy packed format.
pub const SALT_LEN: usize = 16;
/// Derived key length, the natural output size of HMAC-SHA256.
pub const KEY_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Stretches `password` into a 32-byte key. Callers own zeroizing the result.
pub fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> Result<[u8; KEY_LEN], CredentialError> {
    if iterations == 0 {
        return Err(CredentialError::InvalidIterations);
    }
    let mut key = [0u8; KEY_LEN];
    pbkdf2::<HmacSha256>(password, salt, iterations, &mut key)
        .map_err(|e| CredentialError::Derivation(format!("{e}")))?;
    Ok(key)
}

/// Fills a new salt from the operating system RNG.
/// An unavailable RNG is reported instead of falling back to weaker entropy.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CredentialError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CredentialError::RandomSource(format!("{e}")))?;
    Ok(salt)
}

/// Compares two keys without short-circuiting on the first differing byte.
/// Buffers of different lengths never match.
pub fn keys_match(computed: &[u8], expected: &[u8]) -> bool {
    computed.ct_eq(expected).into()
}
