//! OTP crate: sub-modules.

pub mod types;
pub mod secret;
pub mod core;
pub mod hotp;
pub mod totp;
pub mod uri;
pub mod key;
pub mod qr;

// Re-export top-level items for convenience.
pub use types::*;
pub use secret::{pad_secret, Secret};
pub use key::{Key, KeyOptions};
pub use qr::{PngQrRenderer, QrRenderer};
