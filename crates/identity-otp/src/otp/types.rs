//! Core types for the HOTP/TOTP generator and validators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width in bytes of the HOTP moving counter, and the block size secrets are
/// padded to in base-32 characters.
pub const MODULUS_SIZE: usize = 8;

/// Default QR image edge length in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 512;

/// Default TOTP time-step in seconds.
pub const DEFAULT_PERIOD: u32 = 30;

/// Default number of adjacent time-steps accepted on either side.
pub const DEFAULT_SKEW: u32 = 1;

/// Default byte length of a randomly generated secret.
pub const DEFAULT_SECRET_SIZE: usize = 10;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Algorithm
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hash algorithm used for HMAC-based OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri_name())
    }
}

impl Algorithm {
    /// Parse from a case-insensitive string.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SHA1" | "SHA-1" | "HMACSHA1" | "HMAC-SHA1" => Some(Self::Sha1),
            "SHA256" | "SHA-256" | "HMACSHA256" | "HMAC-SHA256" => Some(Self::Sha256),
            "SHA512" | "SHA-512" | "HMACSHA512" | "HMAC-SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Name used in the `algorithm` parameter of `otpauth://` URIs.
    pub fn uri_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Length in bytes of the HMAC digest this algorithm produces.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Code size
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Number of decimal digits in a generated passcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CodeSize {
    #[default]
    Six,
    Seven,
    Eight,
}

impl CodeSize {
    /// Digit count as a string length.
    pub fn length(&self) -> usize {
        match self {
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }

    /// `10^digits`, the modulus applied to the truncated HMAC value.
    pub fn modulus(&self) -> i64 {
        10i64.pow(self.length() as u32)
    }

    /// Zero-pad `value` on the left to exactly `length()` digits.
    pub fn format(&self, value: u64) -> String {
        format!("{:0width$}", value, width = self.length())
    }
}

impl fmt::Display for CodeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.length())
    }
}

impl TryFrom<u8> for CodeSize {
    type Error = OtpError;

    fn try_from(digits: u8) -> Result<Self> {
        match digits {
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            _ => Err(OtpError::UnsupportedCodeSize),
        }
    }
}

impl From<CodeSize> for u8 {
    fn from(size: CodeSize) -> u8 {
        size.length() as u8
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OTP type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Whether a key is time-based or counter-based. Doubles as the host part of
/// an `otpauth://` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    #[default]
    Totp,
    Hotp,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Totp => "totp",
            Self::Hotp => "hotp",
        }
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Options
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings shared by every code generation: digit count and hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpOptions {
    pub code_size: CodeSize,
    pub algorithm: Algorithm,
}

impl OtpOptions {
    pub fn new(code_size: CodeSize, algorithm: Algorithm) -> Self {
        Self {
            code_size,
            algorithm,
        }
    }

    /// Builder: set digit count.
    pub fn with_code_size(mut self, code_size: CodeSize) -> Self {
        self.code_size = code_size;
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Time-based settings.
///
/// `period` is the step length in seconds; a zero period falls back to
/// [`DEFAULT_PERIOD`] each time it is used. `skew` is the number of steps
/// accepted on either side of the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpOptions {
    pub period: u32,
    pub skew: u32,
    pub code_size: CodeSize,
    pub algorithm: Algorithm,
}

impl Default for TotpOptions {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            skew: DEFAULT_SKEW,
            code_size: CodeSize::default(),
            algorithm: Algorithm::default(),
        }
    }
}

impl TotpOptions {
    /// Builder: set time period.
    pub fn with_period(mut self, period: u32) -> Self {
        self.period = period;
        self
    }

    /// Builder: set skew window.
    pub fn with_skew(mut self, skew: u32) -> Self {
        self.skew = skew;
        self
    }

    /// Builder: set digit count.
    pub fn with_code_size(mut self, code_size: CodeSize) -> Self {
        self.code_size = code_size;
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Period in seconds, with zero mapped to the default.
    pub fn effective_period(&self) -> u32 {
        if self.period == 0 {
            DEFAULT_PERIOD
        } else {
            self.period
        }
    }

    /// The generator settings carried by these options.
    pub fn otp_options(&self) -> OtpOptions {
        OtpOptions::new(self.code_size, self.algorithm)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Error type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Crate-level error. Every variant is a fixed sentinel so callers can match
/// on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum OtpError {
    #[error("code length is not of expected length")]
    WrongCodeSize,
    #[error("issuer cannot be empty")]
    EmptyIssuer,
    #[error("user id cannot be empty")]
    EmptyUserId,
    #[error("key options cannot be nil")]
    NilOptions,
    #[error("invalid base32 encoding of the secret")]
    InvalidSecret,
    #[error("code size must be 6, 7 or 8 digits")]
    UnsupportedCodeSize,
    #[error("invalid otpauth uri")]
    InvalidUri,
    #[error("failed to encode qr code")]
    QrEncode,
    #[error("failed to encode or decode qr image")]
    ImageEncode,
}

pub type Result<T> = std::result::Result<T, OtpError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ── Algorithm ────────────────────────────────────────────────

    #[test]
    fn algorithm_default_is_sha1() {
        assert_eq!(Algorithm::default(), Algorithm::Sha1);
    }

    #[test]
    fn algorithm_display() {
        assert_eq!(Algorithm::Sha1.to_string(), "SHA1");
        assert_eq!(Algorithm::Sha256.to_string(), "SHA256");
        assert_eq!(Algorithm::Sha512.to_string(), "SHA512");
    }

    #[test]
    fn algorithm_from_str_loose() {
        assert_eq!(Algorithm::from_str_loose("sha1"), Some(Algorithm::Sha1));
        assert_eq!(Algorithm::from_str_loose("SHA-256"), Some(Algorithm::Sha256));
        assert_eq!(Algorithm::from_str_loose("HMAC-SHA512"), Some(Algorithm::Sha512));
        assert_eq!(Algorithm::from_str_loose("MD5"), None);
    }

    #[test]
    fn algorithm_serde_roundtrip() {
        let json = serde_json::to_string(&Algorithm::Sha256).unwrap();
        assert_eq!(json, "\"SHA256\"");
        let back: Algorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Algorithm::Sha256);
    }

    // ── CodeSize ─────────────────────────────────────────────────

    #[test]
    fn code_size_format_keeps_leading_zeros() {
        assert_eq!(CodeSize::Six.format(42), "000042");
        assert_eq!(CodeSize::Seven.format(0), "0000000");
        assert_eq!(CodeSize::Eight.format(7081804), "07081804");
    }

    #[test]
    fn code_size_modulus() {
        assert_eq!(CodeSize::Six.modulus(), 1_000_000);
        assert_eq!(CodeSize::Eight.modulus(), 100_000_000);
    }

    #[test]
    fn code_size_try_from() {
        assert_eq!(CodeSize::try_from(7), Ok(CodeSize::Seven));
        assert_eq!(CodeSize::try_from(0), Err(OtpError::UnsupportedCodeSize));
        assert_eq!(CodeSize::try_from(9), Err(OtpError::UnsupportedCodeSize));
    }

    #[test]
    fn code_size_serde_as_number() {
        assert_eq!(serde_json::to_string(&CodeSize::Eight).unwrap(), "8");
        let back: CodeSize = serde_json::from_str("6").unwrap();
        assert_eq!(back, CodeSize::Six);
        assert!(serde_json::from_str::<CodeSize>("5").is_err());
    }

    // ── OtpType ──────────────────────────────────────────────────

    #[test]
    fn otp_type_display() {
        assert_eq!(OtpType::Totp.to_string(), "totp");
        assert_eq!(OtpType::Hotp.to_string(), "hotp");
    }

    // ── Options ──────────────────────────────────────────────────

    #[test]
    fn totp_options_defaults() {
        let opts = TotpOptions::default();
        assert_eq!(opts.period, 30);
        assert_eq!(opts.skew, 1);
        assert_eq!(opts.code_size, CodeSize::Six);
        assert_eq!(opts.algorithm, Algorithm::Sha1);
    }

    #[test]
    fn totp_options_zero_period_falls_back() {
        let opts = TotpOptions::default().with_period(0);
        assert_eq!(opts.effective_period(), 30);
        assert_eq!(opts.with_period(60).effective_period(), 60);
    }

    #[test]
    fn options_load_from_partial_config() {
        let opts: TotpOptions =
            serde_json::from_str(r#"{"period": 60, "algorithm": "SHA512"}"#).unwrap();
        assert_eq!(opts.period, 60);
        assert_eq!(opts.skew, 1);
        assert_eq!(opts.algorithm, Algorithm::Sha512);
        assert_eq!(opts.code_size, CodeSize::Six);

        let opts: OtpOptions = serde_json::from_str(r#"{"code_size": 8}"#).unwrap();
        assert_eq!(opts, OtpOptions::new(CodeSize::Eight, Algorithm::Sha1));
    }

    // ── Error ────────────────────────────────────────────────────

    #[test]
    fn error_messages_are_fixed() {
        assert_eq!(
            OtpError::InvalidSecret.to_string(),
            "invalid base32 encoding of the secret"
        );
        assert_eq!(OtpError::EmptyIssuer.to_string(), "issuer cannot be empty");
    }
}
