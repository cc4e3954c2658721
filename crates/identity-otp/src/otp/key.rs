//! Provisioning keys: `otpauth://` URIs consumed by authenticator apps.
//!
//! Format: `otpauth://TYPE/ISSUER:USER?algorithm=SHA1&digits=6&issuer=ISSUER&secret=BASE32`
//!
//! A [`Key`] holds only the canonical URI. Issuer, user, secret, algorithm
//! and digits are read back out of it on every access.

use std::collections::BTreeMap;
use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::otp::qr::{self, PngQrRenderer, QrRenderer};
use crate::otp::secret::Secret;
use crate::otp::types::*;
use crate::otp::uri;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Key options
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Inputs for building a key. A missing secret is replaced by a random
/// 10-byte one and missing options by six-digit SHA-1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyOptions {
    pub issuer: String,
    pub user_id: String,
    pub secret: Option<Secret>,
    pub options: Option<OtpOptions>,
}

impl KeyOptions {
    pub fn new(issuer: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Options with a freshly generated secret and default settings.
    pub fn new_default(issuer: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new(issuer, user_id)
            .with_secret(Secret::random(DEFAULT_SECRET_SIZE))
            .with_options(OtpOptions::default())
    }

    /// Builder: set secret.
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Builder: set code options.
    pub fn with_options(mut self, options: OtpOptions) -> Self {
        self.options = Some(options);
        self
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Key
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An immutable provisioning key.
///
/// `Key::default()` has no backing URI: its accessors return empty strings
/// and rendering it as an image fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key {
    raw: String,
    url: Option<Url>,
}

impl Key {
    /// Validate `opts` and compose the canonical URI for `otp_type`.
    pub fn build(otp_type: OtpType, opts: Option<&KeyOptions>) -> Result<Self> {
        let opts = opts.ok_or(OtpError::NilOptions)?;

        if opts.issuer.trim().is_empty() {
            return Err(OtpError::EmptyIssuer);
        }
        if opts.user_id.trim().is_empty() {
            return Err(OtpError::EmptyUserId);
        }

        let secret = opts
            .secret
            .clone()
            .unwrap_or_else(|| Secret::random(DEFAULT_SECRET_SIZE));
        let options = opts.options.unwrap_or_default();

        let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
        query.insert("secret".into(), vec![secret.value().to_string()]);
        query.insert("issuer".into(), vec![opts.issuer.clone()]);
        query.insert("algorithm".into(), vec![options.algorithm.uri_name().to_string()]);
        query.insert("digits".into(), vec![options.code_size.to_string()]);

        let path = format!("/{}:{}", opts.issuer, opts.user_id);
        let raw = format!(
            "otpauth://{}{}?{}",
            otp_type,
            uri::escape_path(&path),
            uri::encode_query(&query)
        );
        log::debug!("key: built {} key for issuer {:?}", otp_type, opts.issuer);

        Self::parse(&raw)
    }

    /// Wrap an existing `otpauth://` URI.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|_| OtpError::InvalidUri)?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        if url.scheme() != "otpauth" {
            return Err(OtpError::InvalidUri);
        }
        Ok(Self {
            raw: url.as_str().to_string(),
            url: Some(url),
        })
    }

    /// The canonical URI string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `"totp"` or `"hotp"`, taken from the URI host.
    pub fn otp_type(&self) -> String {
        self.url
            .as_ref()
            .and_then(|u| u.host_str())
            .unwrap_or_default()
            .to_string()
    }

    /// The `issuer` parameter, or the label before the first `:` when the
    /// parameter is missing or empty.
    pub fn issuer(&self) -> String {
        let issuer = self.query_value("issuer");
        if !issuer.is_empty() {
            return issuer;
        }
        self.label()
            .and_then(|label| label.split_once(':').map(|(issuer, _)| issuer.to_string()))
            .unwrap_or_default()
    }

    /// The label after the first `:`; empty when the label has no issuer.
    pub fn user_id(&self) -> String {
        self.label()
            .and_then(|label| label.split_once(':').map(|(_, user)| user.to_string()))
            .unwrap_or_default()
    }

    pub fn secret(&self) -> String {
        self.query_value("secret")
    }

    pub fn algorithm(&self) -> String {
        self.query_value("algorithm")
    }

    pub fn digits(&self) -> String {
        self.query_value("digits")
    }

    /// Render the URI as a PNG QR code at the default size.
    pub fn png(&self) -> Result<Vec<u8>> {
        self.png_with(&PngQrRenderer::default(), DEFAULT_IMAGE_SIZE)
    }

    /// Render the URI through `renderer` as a `size`×`size` image.
    pub fn png_with<R: QrRenderer + ?Sized>(&self, renderer: &R, size: u32) -> Result<Vec<u8>> {
        renderer.render_png(&self.raw, size)
    }

    /// Render the URI and decode the PNG back into a raster image.
    pub fn image(&self) -> Result<DynamicImage> {
        qr::decode_png(&self.png()?)
    }

    // Decoded path without the leading `/`.
    fn label(&self) -> Option<String> {
        let url = self.url.as_ref()?;
        let path = uri::unescape(url.path());
        Some(path.strip_prefix('/').unwrap_or(&path).to_string())
    }

    // First value of `name` in the query, or empty.
    fn query_value(&self, name: &str) -> String {
        self.url
            .as_ref()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.into_owned())
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
