//! Cloud Storage V4 URL signer (HMAC keys).
//!
//! Produces `GOOG4-HMAC-SHA256` query-string signed GET URLs:
//!
//! ```text
//! kDate    = HMAC("GOOG4" + secret, date)
//! kRegion  = HMAC(kDate, "auto")
//! kService = HMAC(kRegion, "storage")
//! kSigning = HMAC(kService, "goog4_request")
//! ```
//!
//! The ambient credential comes from configuration. A `KeyFile` credential
//! reference names a JSON file `{"accessId": "...", "secret": "..."}`; each
//! file is read once and cached by path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::storage::StorageLocator;
use crate::ports::{CredentialRef, SignUrlRequest, SigningError, UrlSigner};

type HmacSha256 = Hmac<Sha256>;

/// Default storage host.
pub const DEFAULT_STORAGE_HOST: &str = "storage.googleapis.com";

/// Longest lifetime a V4 signature may have (7 days).
pub const MAX_SIGNED_URL_TTL_SECS: i64 = 604_800;

const ALGORITHM: &str = "GOOG4-HMAC-SHA256";

/// An HMAC key for a service account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HmacCredential {
    pub access_id: String,
    secret: Secret<String>,
}

impl HmacCredential {
    /// Creates a credential from its parts.
    pub fn new(access_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            secret: Secret::new(secret.into()),
        }
    }
}

/// V4 signer backed by HMAC keys.
pub struct GcsUrlSigner {
    host: String,
    ambient: Option<HmacCredential>,
    key_files: Arc<RwLock<HashMap<PathBuf, HmacCredential>>>,
}

impl GcsUrlSigner {
    /// Creates a signer. Without an ambient credential only key-file
    /// references can be signed.
    pub fn new(ambient: Option<HmacCredential>) -> Self {
        Self {
            host: DEFAULT_STORAGE_HOST.to_string(),
            ambient,
            key_files: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Overrides the storage host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    async fn credential(&self, reference: &CredentialRef) -> Result<HmacCredential, SigningError> {
        match reference {
            CredentialRef::Ambient => self.ambient.clone().ok_or_else(|| {
                SigningError::CredentialUnavailable("no HMAC key configured".to_string())
            }),
            CredentialRef::KeyFile(path) => self.key_file(path).await,
        }
    }

    async fn key_file(&self, path: &Path) -> Result<HmacCredential, SigningError> {
        if let Some(credential) = self.key_files.read().await.get(path) {
            return Ok(credential.clone());
        }

        let raw = fs::read_to_string(path).await.map_err(|e| {
            SigningError::CredentialUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let credential: HmacCredential = serde_json::from_str(&raw).map_err(|e| {
            SigningError::CredentialUnavailable(format!("invalid key file {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), access_id = %credential.access_id, "loaded HMAC key file");

        self.key_files
            .write()
            .await
            .entry(path.to_path_buf())
            .or_insert_with(|| credential.clone());
        Ok(credential)
    }

    /// Builds the signed URL. Pure apart from its inputs.
    fn sign(
        &self,
        credential: &HmacCredential,
        locator: &StorageLocator,
        issued_at: DateTime<Utc>,
        ttl_secs: i64,
    ) -> Result<String, SigningError> {
        if !(1..=MAX_SIGNED_URL_TTL_SECS).contains(&ttl_secs) {
            return Err(SigningError::InvalidExpiry(format!(
                "expiry must be between 1 and {} seconds, got {}",
                MAX_SIGNED_URL_TTL_SECS, ttl_secs
            )));
        }

        let date_stamp = issued_at.format("%Y%m%d").to_string();
        let goog_date = issued_at.format("%Y%m%dT%H%M%SZ").to_string();
        let scope = format!("{}/auto/storage/goog4_request", date_stamp);

        let mut params = vec![
            ("X-Goog-Algorithm", ALGORITHM.to_string()),
            ("X-Goog-Credential", format!("{}/{}", credential.access_id, scope)),
            ("X-Goog-Date", goog_date.clone()),
            ("X-Goog-Expires", ttl_secs.to_string()),
            ("X-Goog-SignedHeaders", "host".to_string()),
        ];
        params.sort_by(|a, b| a.0.cmp(b.0));
        let canonical_query: String = params
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let path = format!("/{}/{}", uri_encode(locator.bucket()), encode_object_path(locator.object()));

        let canonical_request = format!(
            "GET\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            path, canonical_query, self.host
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            goog_date,
            scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(credential.secret.expose_secret(), &date_stamp)?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(format!(
            "https://{}{}?{}&X-Goog-Signature={}",
            self.host, path, canonical_query, signature
        ))
    }
}

#[async_trait]
impl UrlSigner for GcsUrlSigner {
    async fn sign_read_url(&self, request: &SignUrlRequest) -> Result<String, SigningError> {
        let credential = self.credential(&request.credential).await?;
        self.sign(&credential, &request.locator, request.issued_at, request.ttl_secs())
    }
}

/// Compute the hex-encoded SHA-256 hash of data.
fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compute HMAC-SHA256 of data with the given key.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SigningError::Backend(format!("invalid HMAC key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn derive_signing_key(secret: &str, date_stamp: &str) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(format!("GOOG4{}", secret).as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, b"auto")?;
    let k_service = hmac_sha256(&k_region, b"storage")?;
    hmac_sha256(&k_service, b"goog4_request")
}

/// URI-encode a string per RFC 3986, leaving only `A-Z a-z 0-9 - _ . ~`.
fn uri_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}

/// Encodes an object name segment by segment, keeping `/` separators.
fn encode_object_path(object: &str) -> String {
    object.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}
