//! Stored credential formats.
//!
//! Agents' credentials were written by several generations of tooling, so a
//! stored value may be any of:
//!
//! | format        | layout                                   |
//! |---------------|------------------------------------------|
//! | canonical     | `pbkdf2_sha256$ITERS$SALT$KEY`           |
//! | alternate     | `pbkdf2:sha256:ITERS$SALT$KEY`           |
//! | modular crypt | `$pbkdf2-sha256$ITERS$SALT$KEY`          |
//! | legacy pack   | `base64(salt ++ key)`, no metadata        |
//!
//! `SALT` and `KEY` use the URL-safe alphabet with padding stripped. The legacy
//! pack uses the standard alphabet and carries no iteration count, so it is
//! always checked against [`DEFAULT_ITERATIONS`]. A pack minted with any other
//! count can never verify; that limitation is kept as-is.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use log::debug;
use zeroize::Zeroize;

use super::kdf::{KEY_LEN, SALT_LEN};
use super::CredentialError;

/// Cost factor for new credentials, and the assumed cost of legacy packs.
pub const DEFAULT_ITERATIONS: u32 = 260_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFormat {
    Canonical,
    Alternate,
    ModularCrypt,
    LegacyPack,
}

impl CredentialFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialFormat::Canonical => "pbkdf2_sha256",
            CredentialFormat::Alternate => "pbkdf2:sha256",
            CredentialFormat::ModularCrypt => "$pbkdf2-sha256",
            CredentialFormat::LegacyPack => "legacy-pack",
        }
    }

    /// Literal prefix that identifies the format, if it has one.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            CredentialFormat::Canonical => Some("pbkdf2_sha256$"),
            CredentialFormat::Alternate => Some("pbkdf2:sha256:"),
            CredentialFormat::ModularCrypt => Some("$pbkdf2-sha256$"),
            CredentialFormat::LegacyPack => None,
        }
    }
}

type FieldParser = fn(&str) -> Result<ParsedCredential, CredentialError>;

/// Prefixed formats in the order they are tried. Anything that matches none of
/// them is handed to the legacy pack parser.
const PREFIXED_FORMATS: [(CredentialFormat, FieldParser); 3] = [
    (CredentialFormat::Canonical, parse_canonical),
    (CredentialFormat::Alternate, parse_alternate),
    (CredentialFormat::ModularCrypt, parse_modular_crypt),
];

/// Decoded view of a stored credential. Salt and key are wiped on drop.
#[derive(Debug)]
pub struct ParsedCredential {
    format: CredentialFormat,
    iterations: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl ParsedCredential {
    pub fn format(&self) -> CredentialFormat {
        self.format
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Drop for ParsedCredential {
    fn drop(&mut self) {
        self.salt.zeroize();
        self.key.zeroize();
    }
}

/// Classifies and decodes a stored credential. Surrounding whitespace is
/// ignored. A value that carries a known prefix but is malformed is an error;
/// it never falls through to the legacy parser.
pub fn parse_credential(stored: &str) -> Result<ParsedCredential, CredentialError> {
    let stored = stored.trim();
    for (format, parser) in PREFIXED_FORMATS.iter() {
        if let Some(prefix) = format.prefix() {
            if stored.starts_with(prefix) {
                debug!("credential uses {} format", format.as_str());
                return parser(stored);
            }
        }
    }
    debug!("credential has no known prefix; trying legacy pack");
    parse_legacy_pack(stored)
}

/// Renders the canonical `pbkdf2_sha256$ITERS$SALT$KEY` string.
pub fn encode_canonical(iterations: u32, salt: &[u8], key: &[u8]) -> String {
    format!(
        "{}${}${}${}",
        CredentialFormat::Canonical.as_str(),
        iterations,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(key)
    )
}

/// Decodes an unpadded (or padded) URL-safe base64 field by restoring `=`
/// padding up to the next multiple of four.
pub fn decode_b64_field(field: &str, name: &'static str) -> Result<Vec<u8>, CredentialError> {
    let mut padded = field.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|_| CredentialError::Base64(name))
}

fn parse_canonical(stored: &str) -> Result<ParsedCredential, CredentialError> {
    let mut parts = stored.splitn(4, '$');
    let _scheme = parts.next();
    let iterations = parts.next().ok_or(CredentialError::MissingField("iterations"))?;
    let salt = parts.next().ok_or(CredentialError::MissingField("salt"))?;
    let key = parts.next().ok_or(CredentialError::MissingField("key"))?;
    build(CredentialFormat::Canonical, iterations, salt, key)
}

fn parse_alternate(stored: &str) -> Result<ParsedCredential, CredentialError> {
    let mut header = stored.splitn(3, ':');
    let _method = header.next();
    let _digest = header.next();
    let rest = header.next().ok_or(CredentialError::MissingField("iterations"))?;

    let mut fields = rest.split('$');
    let iterations = fields.next().ok_or(CredentialError::MissingField("iterations"))?;
    let salt = fields.next().ok_or(CredentialError::MissingField("salt"))?;
    let key = fields.next().ok_or(CredentialError::MissingField("key"))?;
    build(CredentialFormat::Alternate, iterations, salt, key)
}

fn parse_modular_crypt(stored: &str) -> Result<ParsedCredential, CredentialError> {
    let mut parts = stored.splitn(5, '$');
    let _leading = parts.next();
    let _scheme = parts.next();
    let iterations = parts.next().ok_or(CredentialError::MissingField("iterations"))?;
    let salt = parts.next().ok_or(CredentialError::MissingField("salt"))?;
    let key = parts.next().ok_or(CredentialError::MissingField("key"))?;
    build(CredentialFormat::ModularCrypt, iterations, salt, key)
}

fn parse_legacy_pack(stored: &str) -> Result<ParsedCredential, CredentialError> {
    let mut raw = STANDARD
        .decode(stored.as_bytes())
        .map_err(|_| CredentialError::Base64("packed"))?;
    if raw.len() < SALT_LEN {
        let actual = raw.len();
        raw.zeroize();
        return Err(CredentialError::InvalidLength {
            field: "packed salt",
            expected: SALT_LEN,
            actual,
        });
    }
    let key = raw.split_off(SALT_LEN);
    let parsed = ParsedCredential {
        format: CredentialFormat::LegacyPack,
        iterations: DEFAULT_ITERATIONS,
        salt: raw,
        key,
    };
    check_key_len(parsed)
}

fn build(format: CredentialFormat, iterations: &str, salt: &str, key: &str) -> Result<ParsedCredential, CredentialError> {
    let iterations = match iterations.parse::<u32>() {
        Ok(0) | Err(_) => return Err(CredentialError::InvalidIterationField),
        Ok(n) => n,
    };
    let salt = decode_b64_field(salt, "salt")?;
    let key = decode_b64_field(key, "key")?;
    check_key_len(ParsedCredential {
        format,
        iterations,
        salt,
        key,
    })
}

fn check_key_len(parsed: ParsedCredential) -> Result<ParsedCredential, CredentialError> {
    if parsed.key.len() != KEY_LEN {
        return Err(CredentialError::InvalidLength {
            field: "key",
            expected: KEY_LEN,
            actual: parsed.key.len(),
        });
    }
    Ok(parsed)
}
