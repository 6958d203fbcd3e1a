//! Deterministic URL signer for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{SignUrlRequest, SigningError, UrlSigner};

/// Signer that returns `https://signed.test/{bucket}/{object}?ttl={secs}`.
///
/// Individual locators can be made to fail, and a delay can be added to
/// exercise deadlines.
#[derive(Debug, Clone, Default)]
pub struct FakeUrlSigner {
    failing: HashSet<String>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl FakeUrlSigner {
    /// Creates a signer that succeeds for every locator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes signing fail for the given `gs://` locator.
    pub fn failing_for(mut self, locator: impl Into<String>) -> Self {
        self.failing.insert(locator.into());
        self
    }

    /// Sets simulated latency per signature.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of signing calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UrlSigner for FakeUrlSigner {
    async fn sign_read_url(&self, request: &SignUrlRequest) -> Result<String, SigningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let locator = request.locator.to_string();
        if self.failing.contains(&locator) {
            return Err(SigningError::Backend(format!("refusing to sign {}", locator)));
        }

        Ok(format!(
            "https://signed.test/{}/{}?ttl={}",
            request.locator.bucket(),
            request.locator.object(),
            request.ttl_secs()
        ))
    }
}
