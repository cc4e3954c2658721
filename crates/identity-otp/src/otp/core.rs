//! Core OTP generation: RFC 4226 dynamic truncation shared by HOTP and TOTP.
//!
//! Computes HMAC-SHA1/256/512 over the big-endian counter, extracts a 31-bit
//! value from the digest and reduces it to a zero-padded decimal passcode.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::otp::secret::decode_secret;
use crate::otp::types::*;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generate the passcode for `counter` from a base-32 secret.
///
/// `None` options select six digits with SHA-1. The algorithm is used as
/// given; HOTP's SHA-1 restriction is enforced by [`crate::otp::hotp`].
pub fn generate_code(secret: &str, counter: u64, options: Option<&OtpOptions>) -> Result<String> {
    let options = options.copied().unwrap_or_default();
    let key = decode_secret(secret)?;
    let message = counter.to_be_bytes();
    log::debug!("otp: counter={} buf={:?}", counter, message);

    let digest = compute_hmac(&key, &message, options.algorithm)?;
    Ok(truncate(&digest, options.code_size))
}

/// Compute HMAC(key, message) using the specified algorithm.
fn compute_hmac(key: &[u8], data: &[u8], algo: Algorithm) -> Result<Vec<u8>> {
    match algo {
        Algorithm::Sha1 => {
            let mut mac =
                Hmac::<Sha1>::new_from_slice(key).map_err(|_| OtpError::InvalidSecret)?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Algorithm::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(key).map_err(|_| OtpError::InvalidSecret)?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Algorithm::Sha512 => {
            let mut mac =
                Hmac::<Sha512>::new_from_slice(key).map_err(|_| OtpError::InvalidSecret)?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}

/// Dynamic truncation per RFC 4226 §5.3.
///
/// The offset is at most 15 and every supported digest is at least 20 bytes,
/// so the four-byte window is always in bounds.
fn truncate(digest: &[u8], code_size: CodeSize) -> String {
    debug_assert!(digest.len() >= Algorithm::Sha1.digest_len());
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    // Sign bit masked off: the value is a non-negative 31-bit integer.
    let value: i64 = (((digest[offset] as i64) & 0x7f) << 24)
        | ((digest[offset + 1] as i64) << 16)
        | ((digest[offset + 2] as i64) << 8)
        | (digest[offset + 3] as i64);
    let code = (value % code_size.modulus()) as u64;
    log::debug!("otp: offset={} value={} mod'ed={}", offset, value, code);
    code_size.format(code)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Check `code` against the passcode for exactly one counter value.
///
/// Surrounding whitespace is ignored. A code of the wrong length fails with
/// [`OtpError::WrongCodeSize`] before any HMAC work; a well-formed but
/// different code returns `Ok(false)`.
pub fn validate_code(
    code: &str,
    counter: u64,
    secret: &str,
    options: Option<&OtpOptions>,
) -> Result<bool> {
    let code = code.trim();
    let options = options.copied().unwrap_or_default();

    if code.len() != options.code_size.length() {
        return Err(OtpError::WrongCodeSize);
    }

    let expected = generate_code(secret, counter, Some(&options))?;
    Ok(constant_time_eq(code.as_bytes(), expected.as_bytes()))
}

/// Constant-time comparison (to prevent timing attacks on code verification).
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
