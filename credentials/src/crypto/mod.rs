//! Password credential primitives. Key derivation, the stored-string formats,
//! and the public hash/verify pair each live in their own submodule so the
//! parsing code never touches the RNG and the hashing code never parses.

pub mod error;
pub mod formats;
pub mod kdf;
pub mod passwords;

pub use error::CredentialError;
