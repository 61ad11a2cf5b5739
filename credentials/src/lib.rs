//! Credential hashing and verification for agent logins.
//! Stored credentials live in a spreadsheet column, so this crate only deals in
//! strings: it mints canonical PBKDF2-SHA256 hashes and checks passwords against
//! every format older tooling ever wrote into that column.

pub mod config;
pub mod crypto;

pub use crypto::passwords::{hash_password, hash_password_with_iterations, needs_rehash, verify_password};
