//! Base URL and API key, passed explicitly into every request builder.

use crate::error::ErrorContext;
use crate::{Error, Result};
use std::env;
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://uce.ngrok.app/";

/// Credential values for one backend.
///
/// `base_url` is stored without trailing slashes so that endpoints can be
/// appended with a single `/`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: String,
    api_key: String,
}

impl Credentials {
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let raw = base_url.as_ref().trim();
        url::Url::parse(raw).map_err(|e| {
            Error::configuration_with_context(
                "Base URL is not a valid URL",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(format!("{}: {}", raw, e)),
            )
        })?;
        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Read `COURIER_BASE_URL` and `COURIER_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("COURIER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let api_key = env::var("COURIER_API_KEY").unwrap_or_default();
        Self::new(base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `{base_url}{path}`; `path` must start with `/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
