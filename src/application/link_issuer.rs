//! Link issuer - turns storage locators into time-limited download URLs.
//!
//! Single issuance validates the locator and TTL before the signer is
//! touched. Batch issuance is total: every input locator appears in the
//! output, mapped either to its signed URL or, if signing failed, to itself.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;

use crate::domain::storage::{LocatorError, StorageLocator};
use crate::ports::{CredentialRef, SignUrlRequest, UrlSigner};

/// Default link lifetime (one hour).
pub const DEFAULT_LINK_TTL_SECS: u64 = 3600;

/// Longest link lifetime a V4 signature supports (seven days).
pub const MAX_LINK_TTL_SECS: u64 = 604_800;

/// Default deadline for a single signing call.
pub const DEFAULT_SIGN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from issuing a single link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkIssuanceError {
    /// The locator does not follow `gs://bucket/path`.
    #[error("Invalid GCS URI format: {0}")]
    InvalidLocatorFormat(String),

    /// The requested lifetime is outside `1..=604800` seconds.
    #[error("link lifetime must be between 1 and 604800 seconds, got {0}")]
    InvalidTtl(u64),

    /// The signer rejected or failed the request.
    #[error("Failed to generate signed URL for {locator}: {message}")]
    Signing { locator: String, message: String },

    /// The signer did not answer in time.
    #[error("Failed to generate signed URL for {locator}: timed out after {timeout_ms}ms")]
    Timeout { locator: String, timeout_ms: u64 },
}

impl From<LocatorError> for LinkIssuanceError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::InvalidLocatorFormat(raw) => Self::InvalidLocatorFormat(raw),
        }
    }
}

/// Issues signed read links through a [`UrlSigner`].
#[derive(Clone)]
pub struct LinkIssuer {
    signer: Arc<dyn UrlSigner>,
    sign_timeout: Duration,
}

impl LinkIssuer {
    /// Creates an issuer with the default signing deadline.
    pub fn new(signer: Arc<dyn UrlSigner>) -> Self {
        Self {
            signer,
            sign_timeout: DEFAULT_SIGN_TIMEOUT,
        }
    }

    /// Sets the per-call signing deadline.
    pub fn with_sign_timeout(mut self, timeout: Duration) -> Self {
        self.sign_timeout = timeout;
        self
    }

    /// Issues one read-only link valid for `ttl_secs` from now.
    ///
    /// With no credential the signer's ambient credential is used.
    pub async fn issue_link(
        &self,
        locator: &str,
        ttl_secs: u64,
        credential: Option<&CredentialRef>,
    ) -> Result<String, LinkIssuanceError> {
        let parsed = StorageLocator::parse(locator)?;
        if !(1..=MAX_LINK_TTL_SECS).contains(&ttl_secs) {
            return Err(LinkIssuanceError::InvalidTtl(ttl_secs));
        }

        let issued_at = Utc::now();
        // Bounded by MAX_LINK_TTL_SECS above.
        let expires_at = issued_at + chrono::Duration::seconds(ttl_secs as i64);
        let request = SignUrlRequest {
            locator: parsed,
            issued_at,
            expires_at,
            credential: credential.cloned().unwrap_or_default(),
        };

        match tokio::time::timeout(self.sign_timeout, self.signer.sign_read_url(&request)).await {
            Ok(Ok(url)) => Ok(url),
            Ok(Err(e)) => Err(LinkIssuanceError::Signing {
                locator: locator.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(LinkIssuanceError::Timeout {
                locator: locator.to_string(),
                timeout_ms: self.sign_timeout.as_millis() as u64,
            }),
        }
    }

    /// Issues links for many locators concurrently.
    ///
    /// The returned map has exactly the distinct input locators as keys. A
    /// locator whose link could not be issued maps to itself.
    pub async fn issue_links<I, S>(
        &self,
        locators: I,
        ttl_secs: u64,
        credential: Option<&CredentialRef>,
    ) -> HashMap<String, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: HashSet<String> = locators.into_iter().map(Into::into).collect();

        let issued = join_all(distinct.into_iter().map(|locator| async move {
            match self.issue_link(&locator, ttl_secs, credential).await {
                Ok(url) => (locator, url),
                Err(e) => {
                    tracing::warn!(locator = %locator, error = %e, "link issuance failed, using locator");
                    let fallback = locator.clone();
                    (locator, fallback)
                }
            }
        }))
        .await;

        issued.into_iter().collect()
    }
}
