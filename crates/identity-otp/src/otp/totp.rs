//! TOTP (time-based, RFC 6238).
//!
//! The counter is the number of whole periods elapsed since the unix epoch.
//! Validation accepts codes from `skew` periods on either side of the current
//! one to absorb clock drift between client and server.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::otp::core;
use crate::otp::key::{Key, KeyOptions};
use crate::otp::types::*;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Time-step helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Seconds since the unix epoch; times before the epoch clamp to zero.
pub fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Compute the time-step counter for a given unix timestamp.
pub fn time_counter_at(unix_seconds: u64, period: u32) -> u64 {
    let period = if period == 0 { DEFAULT_PERIOD } else { period };
    unix_seconds / period as u64
}

/// Compute the time-step counter for `time`.
pub fn time_counter(period: u32, time: SystemTime) -> u64 {
    time_counter_at(unix_seconds(time), period)
}

/// Seconds remaining until the step containing `unix_seconds` expires.
pub fn seconds_remaining_at(unix_seconds: u64, period: u32) -> u32 {
    let p = if period == 0 { DEFAULT_PERIOD } else { period } as u64;
    (p - (unix_seconds % p)) as u32
}

/// Counters checked during validation: the current one first, then each
/// offset up to `skew`, the later step before the earlier one.
///
/// Arithmetic wraps, so near counter zero the "earlier" steps are huge
/// counters rather than an underflow. Candidates are produced lazily.
pub fn candidate_counters(counter: u64, skew: u32) -> impl Iterator<Item = u64> {
    std::iter::once(counter).chain(
        (1..=skew as u64).flat_map(move |i| [counter.wrapping_add(i), counter.wrapping_sub(i)]),
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generate the TOTP code for `time`.
pub fn generate_code(secret: &str, time: SystemTime, options: &TotpOptions) -> Result<String> {
    generate_code_at(secret, unix_seconds(time), options)
}

/// Generate the TOTP code at an explicit unix timestamp.
pub fn generate_code_at(secret: &str, unix_seconds: u64, options: &TotpOptions) -> Result<String> {
    let counter = time_counter_at(unix_seconds, options.effective_period());
    core::generate_code(secret, counter, Some(&options.otp_options()))
}

/// Generate the current code with default options.
pub fn generate_default(secret: &str) -> Result<String> {
    generate_code(secret, SystemTime::now(), &TotpOptions::default())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validate `code` at `time`, accepting `options.skew` steps of drift.
pub fn validate(code: &str, secret: &str, time: SystemTime, options: &TotpOptions) -> Result<bool> {
    validate_at(code, secret, unix_seconds(time), options)
}

/// Validate `code` at an explicit unix timestamp.
///
/// The first error (wrong code length, undecodable secret) is returned
/// immediately; `Ok(false)` means every candidate was checked and none matched.
pub fn validate_at(
    code: &str,
    secret: &str,
    unix_seconds: u64,
    options: &TotpOptions,
) -> Result<bool> {
    let counter = time_counter_at(unix_seconds, options.effective_period());
    let otp_options = options.otp_options();

    for candidate in candidate_counters(counter, options.skew) {
        if core::validate_code(code, candidate, secret, Some(&otp_options))? {
            log::debug!("totp: matched counter {} (current {})", candidate, counter);
            return Ok(true);
        }
    }

    log::trace!("totp: no match within ±{} of counter {}", options.skew, counter);
    Ok(false)
}

/// Validate against the current time with default options.
pub fn validate_default(code: &str, secret: &str) -> Result<bool> {
    validate(code, secret, SystemTime::now(), &TotpOptions::default())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Keys
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build an `otpauth://totp/...` provisioning key.
pub fn generate_key(opts: Option<&KeyOptions>) -> Result<Key> {
    Key::build(OtpType::Totp, opts)
}

/// Build a TOTP key with a fresh 10-byte secret and default options.
pub fn generate_default_key(issuer: &str, user_id: &str) -> Result<Key> {
    generate_key(Some(&KeyOptions::new_default(issuer, user_id)))
}
