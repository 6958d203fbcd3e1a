//! URL Signer Port - Interface for issuing time-limited download URLs.
//!
//! A signer turns a parsed storage locator into a URL that grants read
//! access until a given expiry. Locator validation and TTL policy live in the
//! link issuer; the signer only signs.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::storage::StorageLocator;

/// Port for signing read URLs.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Sign a GET URL for the object.
    async fn sign_read_url(&self, request: &SignUrlRequest) -> Result<String, SigningError>;
}

/// Which credential the signer should use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialRef {
    /// Credential the process was configured with.
    #[default]
    Ambient,
    /// HMAC key file at the given path.
    KeyFile(PathBuf),
}

/// One signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUrlRequest {
    pub locator: StorageLocator,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub credential: CredentialRef,
}

impl SignUrlRequest {
    /// Lifetime of the URL in whole seconds.
    pub fn ttl_secs(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// Signing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// No credential could be loaded.
    #[error("signing credential unavailable: {0}")]
    CredentialUnavailable(String),

    /// Expiry is not after the issue time, or too far away.
    #[error("invalid expiry: {0}")]
    InvalidExpiry(String),

    /// Any other signing failure.
    #[error("signing failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ttl_is_difference_in_seconds() {
        let issued_at = Utc::now();
        let request = SignUrlRequest {
            locator: StorageLocator::parse("gs://docs/a.pdf").unwrap(),
            issued_at,
            expires_at: issued_at + Duration::seconds(3600),
            credential: CredentialRef::default(),
        };
        assert_eq!(request.ttl_secs(), 3600);
        assert_eq!(request.credential, CredentialRef::Ambient);
    }
}
