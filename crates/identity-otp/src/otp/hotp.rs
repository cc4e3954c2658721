//! HOTP (counter-based, RFC 4226).
//!
//! RFC 4226 only defines HMAC-SHA1, so any SHA-256/SHA-512 request made
//! through this module is downgraded to SHA-1 before a code is computed.

use crate::otp::core;
use crate::otp::key::{Key, KeyOptions};
use crate::otp::types::*;

/// Rewrite the options for HOTP use.
fn hotp_options(options: &OtpOptions) -> OtpOptions {
    match options.algorithm {
        Algorithm::Sha256 | Algorithm::Sha512 => {
            log::trace!("hotp: downgrading {} to SHA1", options.algorithm);
            options.with_algorithm(Algorithm::Sha1)
        }
        Algorithm::Sha1 => *options,
    }
}

/// Generate the HOTP code for `counter`.
pub fn generate_code(secret: &str, counter: u64, options: &OtpOptions) -> Result<String> {
    core::generate_code(secret, counter, Some(&hotp_options(options)))
}

/// Generate a six-digit SHA-1 HOTP code for `counter`.
pub fn generate_code_default(secret: &str, counter: u64) -> Result<String> {
    generate_code(secret, counter, &OtpOptions::default())
}

/// Check `code` against the HOTP code for exactly `counter`.
///
/// No look-ahead is performed; callers that need resynchronisation or replay
/// protection track counters themselves.
pub fn validate(code: &str, counter: u64, secret: &str, options: &OtpOptions) -> Result<bool> {
    core::validate_code(code, counter, secret, Some(&hotp_options(options)))
}

pub fn validate_default(code: &str, counter: u64, secret: &str) -> Result<bool> {
    validate(code, counter, secret, &OtpOptions::default())
}

/// Build an `otpauth://hotp/...` provisioning key.
pub fn generate_key(opts: Option<&KeyOptions>) -> Result<Key> {
    Key::build(OtpType::Hotp, opts)
}

/// Build an HOTP key with a fresh 10-byte secret and default options.
pub fn generate_default_key(issuer: &str, user_id: &str) -> Result<Key> {
    generate_key(Some(&KeyOptions::new_default(issuer, user_id)))
}
