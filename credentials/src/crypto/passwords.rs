//! Password hashing helpers built around PBKDF2-HMAC-SHA256.
//! New credentials are always minted in the canonical format; verification
//! accepts every format in [`super::formats`] and reports a plain yes/no.

use log::{debug, warn};
use zeroize::Zeroize;

use super::formats::{encode_canonical, parse_credential, CredentialFormat, DEFAULT_ITERATIONS};
use super::kdf::{derive_key, generate_salt, keys_match};
use super::CredentialError;

/// Hashes a password with the default cost and returns the canonical string.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    hash_password_with_iterations(plaintext, DEFAULT_ITERATIONS)
}

/// Hashes a password with an explicit PBKDF2 iteration count.
/// Fails only for a zero iteration count or an unusable OS random source.
pub fn hash_password_with_iterations(plaintext: &str, iterations: u32) -> Result<String, CredentialError> {
    if iterations == 0 {
        return Err(CredentialError::InvalidIterations);
    }
    let salt = generate_salt()?;
    let mut key = derive_key(plaintext.as_bytes(), &salt, iterations)?;
    let encoded = encode_canonical(iterations, &salt, &key);
    key.zeroize();
    Ok(encoded)
}

/// Verifies a plaintext password against a stored credential in any supported format.
/// Returns `true` on a match; every parse or derivation failure reads as `false`.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let parsed = match parse_credential(stored) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("rejecting unusable stored credential: {err}");
            return false;
        }
    };

    if parsed.format() == CredentialFormat::LegacyPack {
        debug!("checking legacy packed credential at the default cost of {DEFAULT_ITERATIONS}");
    }

    match derive_key(plaintext.as_bytes(), parsed.salt(), parsed.iterations()) {
        Ok(mut computed) => {
            let matches = keys_match(&computed, parsed.key());
            computed.zeroize();
            matches
        }
        Err(err) => {
            warn!("key derivation failed during verification: {err}");
            false
        }
    }
}

/// Reports whether a stored credential should be re-minted after the next
/// successful login: anything that is not canonical, is below the default
/// cost, or cannot be parsed at all.
pub fn needs_rehash(stored: &str) -> bool {
    match parse_credential(stored) {
        Ok(parsed) => parsed.format() != CredentialFormat::Canonical || parsed.iterations() < DEFAULT_ITERATIONS,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, hash_password_with_iterations, needs_rehash, verify_password};
    use crate::crypto::formats::DEFAULT_ITERATIONS;
    use crate::crypto::CredentialError;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use proptest::prelude::*;

    const SALT_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZg";
    const KEY_B64: &str = "pj4T35D2v4tYmC1sTJ1y5tcMADOdtnQGvuHmyYDQh2g";
    const LEGACY: &str = "MDEyMzQ1Njc4OWFiY2RlZgYgSBZOdLiGY4n1N7ZtB/rkYZI0nyaAVkxYZszoRHoE";

    #[test]
    fn hashes_and_verifies_passwords() {
        let hash = hash_password("route-agent-passcode").expect("hashing should succeed");
        assert!(hash.starts_with(&format!("pbkdf2_sha256${DEFAULT_ITERATIONS}$")));
        assert!(verify_password("route-agent-passcode", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn canonical_layout() {
        let hash = hash_password_with_iterations("pin", 10).expect("hashing should succeed");
        let parts: Vec<&str> = hash.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2_sha256");
        assert_eq!(parts[1], "10");
        // 16 and 32 bytes, unpadded url-safe
        assert_eq!(parts[2].len(), 22);
        assert_eq!(parts[3].len(), 43);
        assert!(!hash.contains('='));
    }

    #[test]
    fn empty_and_non_ascii_passwords() {
        let empty = hash_password_with_iterations("", 5).expect("hashing should succeed");
        assert!(verify_password("", &empty));
        assert!(!verify_password(" ", &empty));

        let unicode = hash_password_with_iterations("pässwörd-दिल्ली-🔑", 5).expect("hashing should succeed");
        assert!(verify_password("pässwörd-दिल्ली-🔑", &unicode));
        assert!(!verify_password("passwORD", &unicode));
    }

    #[test]
    fn salts_differ_between_calls() {
        let first = hash_password_with_iterations("same", 3).unwrap();
        let second = hash_password_with_iterations("same", 3).unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &first));
        assert!(verify_password("same", &second));
    }

    #[test]
    fn zero_iterations_is_an_error() {
        assert_eq!(
            hash_password_with_iterations("pin", 0).unwrap_err(),
            CredentialError::InvalidIterations
        );
    }

    #[test]
    fn verifies_every_prefixed_format() {
        let stored = [
            format!("pbkdf2_sha256$1000${SALT_B64}${KEY_B64}"),
            format!("pbkdf2:sha256:1000${SALT_B64}${KEY_B64}"),
            format!("$pbkdf2-sha256$1000${SALT_B64}${KEY_B64}"),
            format!("pbkdf2:sha256:1000${SALT_B64}==${KEY_B64}="),
        ];
        for value in &stored {
            assert!(verify_password("hunter2", value), "{value} should verify");
            assert!(!verify_password("hunter3", value), "{value} should reject");
        }
    }

    #[test]
    fn verifies_legacy_pack_at_default_cost() {
        assert!(verify_password("hunter2", LEGACY));
        assert!(!verify_password("hunter3", LEGACY));
    }

    #[test]
    fn legacy_pack_with_other_cost_never_verifies() {
        let salt = b"0123456789abcdef";
        let key = crate::crypto::kdf::derive_key(b"hunter2", salt, 1000).unwrap();
        let mut packed = salt.to_vec();
        packed.extend_from_slice(&key);
        assert!(!verify_password("hunter2", &STANDARD.encode(packed)));
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let hash = hash_password_with_iterations("hunter2", 7).unwrap();
        assert!(verify_password("hunter2", &format!("  {hash}\n")));
        assert!(verify_password("hunter2", &format!("\t\r\n{hash} ")));
        assert!(!verify_password("hunter3", &format!("  {hash}\n")));
    }

    #[test]
    fn malformed_values_read_as_mismatch() {
        let garbage = STANDARD.encode([0xffu8, 0x00, 0x13, 0x37, 0x42, 0x99, 0x01]);
        for stored in [
            "",
            "   ",
            "not-a-valid-format",
            "pbkdf2_sha256$abc$$",
            "pbkdf2_sha256$$$",
            "pbkdf2:sha256:",
            "$pbkdf2-sha256$",
            "$pbkdf2-sha256$99999999999$a$b",
            garbage.as_str(),
        ] {
            assert!(!verify_password("hunter2", stored), "{stored:?} should be rejected");
        }
    }

    #[test]
    fn flags_credentials_for_rehash() {
        assert!(needs_rehash(LEGACY));
        assert!(needs_rehash(&format!("pbkdf2_sha256$1000${SALT_B64}${KEY_B64}")));
        assert!(needs_rehash(&format!("$pbkdf2-sha256$300000${SALT_B64}${KEY_B64}")));
        assert!(needs_rehash("not-a-valid-format"));
        assert!(!needs_rehash(&format!("pbkdf2_sha256${DEFAULT_ITERATIONS}${SALT_B64}${KEY_B64}")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn round_trips_any_password(password in "\\PC{0,24}", iterations in 1u32..=32) {
            let hash = hash_password_with_iterations(&password, iterations).unwrap();
            prop_assert!(verify_password(&password, &hash));
        }

        #[test]
        fn rejects_other_passwords(first in "\\PC{0,16}", second in "\\PC{0,16}") {
            prop_assume!(first != second);
            let hash = hash_password_with_iterations(&first, 2).unwrap();
            prop_assert!(!verify_password(&second, &hash));
        }

        #[test]
        fn never_panics_on_arbitrary_input(
            prefix in prop::sample::select(vec!["", "pbkdf2_sha256$", "pbkdf2:sha256:", "$pbkdf2-sha256$"]),
            tail in "\\PC{0,64}",
        ) {
            let stored = format!("{prefix}{tail}");
            prop_assert!(!verify_password("hunter2", &stored));
        }
    }
}
