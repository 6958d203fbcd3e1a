//! Storage Adapters
//!
//! Implementations of the UrlSigner port.
//!
//! ## Available Adapters
//!
//! - **GcsUrlSigner** - Cloud Storage V4 signed URLs with HMAC keys
//! - **FakeUrlSigner** - Deterministic URLs with failure injection (testing)

mod fake_signer;
mod gcs_signer;

pub use fake_signer::FakeUrlSigner;
pub use gcs_signer::{GcsUrlSigner, HmacCredential, DEFAULT_STORAGE_HOST, MAX_SIGNED_URL_TTL_SECS};
