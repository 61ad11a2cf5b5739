use thiserror::Error;

/// Failures raised while minting or parsing a credential string.
///
/// Messages name the offending field but never echo its contents, so they are
/// safe to log next to an agent id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("iteration count must be at least 1")]
    InvalidIterations,
    #[error("secure random source unavailable: {0}")]
    RandomSource(String),
    #[error("key derivation failed: {0}")]
    Derivation(String),
    #[error("credential does not match any known format")]
    UnknownFormat,
    #[error("credential is missing its {0} field")]
    MissingField(&'static str),
    #[error("credential iteration field is not a positive integer")]
    InvalidIterationField,
    #[error("credential {0} field is not valid base64")]
    Base64(&'static str),
    #[error("credential {field} has length {actual}, expected {expected}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}
