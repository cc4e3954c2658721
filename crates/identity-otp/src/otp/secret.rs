//! Base-32 shared secrets: padding, decoding and random generation.

use std::fmt;

use base32::Alphabet;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::otp::types::*;

/// A shared secret in its base-32 text form.
///
/// `size` is the pre-encoding byte length for randomly generated secrets and
/// the padded text length for secrets built from caller input.
///
/// Serialized as its text form; deserializing goes through [`Secret::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Secret {
    size: usize,
    value: String,
}

impl Secret {
    /// Wrap a caller-supplied base-32 secret, padding and upper-casing it.
    pub fn new(raw: &str) -> Self {
        let value = pad_secret(raw);
        Self {
            size: value.len(),
            value,
        }
    }

    /// Draw `byte_length` bytes from the OS-seeded CSPRNG and encode them
    /// base-32 without padding. Zero selects [`DEFAULT_SECRET_SIZE`].
    pub fn random(byte_length: usize) -> Self {
        let size = if byte_length == 0 {
            DEFAULT_SECRET_SIZE
        } else {
            byte_length
        };
        let mut buf = vec![0u8; size];
        rand::thread_rng().fill_bytes(&mut buf);
        Self {
            size,
            value: encode_secret(&buf),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Decode into raw key bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        decode_secret(&self.value)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<String> for Secret {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<Secret> for String {
    fn from(secret: Secret) -> Self {
        secret.value
    }
}

impl AsRef<str> for Secret {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Trim, right-pad with `=` to a multiple of 8 characters and upper-case.
/// Blank input yields an empty string.
pub fn pad_secret(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return String::new();
    }
    let mut padded = secret.to_uppercase();
    let remainder = padded.len() % MODULUS_SIZE;
    if remainder != 0 {
        padded.push_str(&"=".repeat(MODULUS_SIZE - remainder));
    }
    padded
}

/// Pad, then decode a base-32 secret into key bytes.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let padded = pad_secret(secret);
    if !is_well_formed(&padded) {
        return Err(OtpError::InvalidSecret);
    }
    base32::decode(Alphabet::Rfc4648 { padding: true }, &padded).ok_or(OtpError::InvalidSecret)
}

/// Encode raw bytes to base-32 (no padding, uppercase).
pub fn encode_secret(bytes: &[u8]) -> String {
    base32::encode(Alphabet::Rfc4648 { padding: false }, bytes)
}

// Padding may only trail the data, and the data length must end on a
// whole byte (2, 4, 5 or 7 characters into the last block).
fn is_well_formed(padded: &str) -> bool {
    if padded.len() % MODULUS_SIZE != 0 {
        return false;
    }
    let data = padded.trim_end_matches('=');
    if data.contains('=') {
        return false;
    }
    if !data.bytes().all(|b| matches!(b, b'A'..=b'Z' | b'2'..=b'7')) {
        return false;
    }
    !matches!(data.len() % MODULUS_SIZE, 1 | 3 | 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_pads_config_value() {
        let secret: Secret = serde_json::from_str(r#"" jbswy3dp ""#).unwrap();
        assert_eq!(secret.value(), "JBSWY3DP");
        assert_eq!(secret.size(), 8);
        assert_eq!(serde_json::to_string(&secret).unwrap(), r#""JBSWY3DP""#);
    }

    #[test]
    fn pad_short_secret() {
        assert_eq!(pad_secret("te"), "TE======");
    }

    #[test]
    fn pad_empty_secret() {
        assert_eq!(pad_secret(""), "");
        assert_eq!(pad_secret("   "), "");
    }

    #[test]
    fn pad_trims_and_leaves_full_blocks() {
        assert_eq!(pad_secret("  jbswy3dpehpk3pxp \n"), "JBSWY3DPEHPK3PXP");
    }

    #[test]
    fn new_secret_records_padded_length() {
        let secret = Secret::new("abcabcabcabcabcab");
        assert_eq!(secret.value(), "ABCABCABCABCABCAB=======");
        assert_eq!(secret.size(), 24);
    }

    #[test]
    fn random_secret_length() {
        let secret = Secret::random(20);
        assert_eq!(secret.size(), 20);
        assert_eq!(secret.value().len(), 32);
        assert!(!secret.value().contains('='));
        assert_eq!(secret.to_bytes().unwrap().len(), 20);
    }

    #[test]
    fn random_secret_defaults_to_ten_bytes() {
        let secret = Secret::random(0);
        assert_eq!(secret.size(), 10);
        assert_eq!(secret.value().len(), 16);
    }

    #[test]
    fn random_secret_unpadded_length_rounds_up() {
        // ceil(7 * 8 / 5) = 12
        assert_eq!(Secret::random(7).value().len(), 12);
    }

    #[test]
    fn random_secrets_differ() {
        assert_ne!(Secret::random(10), Secret::random(10));
    }

    #[test]
    fn decode_known_value() {
        let bytes = decode_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(bytes, b"12345678901234567890");
    }

    #[test]
    fn decode_lower_case_and_unpadded() {
        let upper = decode_secret("JBSWY3DPEHPK3PXP").unwrap();
        let lower = decode_secret("jbswy3dpehpk3pxp").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(decode_secret("MFRGG").unwrap(), b"abc");
    }

    #[test]
    fn decode_empty_is_empty_key() {
        assert_eq!(decode_secret("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_invalid_characters() {
        assert_eq!(decode_secret("!!!"), Err(OtpError::InvalidSecret));
        assert_eq!(decode_secret("ABC1ABC8"), Err(OtpError::InvalidSecret));
    }

    #[test]
    fn decode_invalid_lengths() {
        assert_eq!(decode_secret("A"), Err(OtpError::InvalidSecret));
        assert_eq!(decode_secret("ABCDEFGHA"), Err(OtpError::InvalidSecret));
        assert_eq!(decode_secret("AB=CD"), Err(OtpError::InvalidSecret));
    }

    #[test]
    fn encode_roundtrip() {
        let encoded = encode_secret(b"hello world secret");
        assert_eq!(decode_secret(&encoded).unwrap(), b"hello world secret");
    }
}
