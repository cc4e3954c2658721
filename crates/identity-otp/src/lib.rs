//! # Identity OTP – HOTP / TOTP passcodes
//!
//! Counter-based and time-based one-time passwords:
//!
//! - **RFC 4226 / 6238** – HOTP & TOTP generation with SHA-1, SHA-256, SHA-512
//! - **Validation** – constant-time comparison, symmetric clock-skew window
//! - **Secrets** – base-32 padding, decoding and random generation
//! - **otpauth:// keys** – provisioning URIs with read-through accessors
//! - **QR Codes** – PNG rendering of a key's URI for authenticator apps

pub mod otp;

pub use otp::types::*;
pub use otp::{pad_secret, Key, KeyOptions, PngQrRenderer, QrRenderer, Secret};
