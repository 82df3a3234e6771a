//! API key and secret handling.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "BINANCE_API_KEY";
/// Environment variable holding the API secret.
pub const API_SECRET_ENV: &str = "BINANCE_API_SECRET";

/// An HMAC API key pair.
///
/// The key identifies the account and travels with every API-key or signed
/// call. The secret never leaves the process; it only keys the signature.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: SecretString,
}

impl Credentials {
    /// Create credentials from an API key and secret.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }

    /// The API key, sent as `X-MBX-APIKEY` or as the `apiKey` WebSocket parameter.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Source of the credentials a client signs with.
///
/// Implement this to pull keys from somewhere other than memory or the
/// environment, for example a secrets manager.
pub trait CredentialsProvider: Send + Sync {
    /// The credentials to use for the next call.
    fn credentials(&self) -> &Credentials;
}

impl CredentialsProvider for Credentials {
    fn credentials(&self) -> &Credentials {
        self
    }
}

impl<T: CredentialsProvider + ?Sized> CredentialsProvider for Arc<T> {
    fn credentials(&self) -> &Credentials {
        (**self).credentials()
    }
}

/// Credentials fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    inner: Credentials,
}

impl StaticCredentials {
    /// Wrap an API key and secret.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            inner: Credentials::new(api_key, api_secret),
        }
    }
}

impl CredentialsProvider for StaticCredentials {
    fn credentials(&self) -> &Credentials {
        &self.inner
    }
}

/// Credentials read once from the environment.
///
/// Reads `BINANCE_API_KEY` and `BINANCE_API_SECRET` unless other variable
/// names are given. Empty values count as unset.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    inner: Credentials,
}

impl EnvCredentials {
    /// Read the default variables, `None` if either is unset or empty.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_vars(API_KEY_ENV, API_SECRET_ENV)
    }

    /// Read the given variables, `None` if either is unset or empty.
    pub fn try_from_vars(key_var: &str, secret_var: &str) -> Option<Self> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let api_key = read(key_var)?;
        let api_secret = read(secret_var)?;

        Some(Self {
            inner: Credentials::new(api_key, api_secret),
        })
    }
}

impl CredentialsProvider for EnvCredentials {
    fn credentials(&self) -> &Credentials {
        &self.inner
    }
}
