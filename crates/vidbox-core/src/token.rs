//! Time-boxed stream capability tokens.
//!
//! A token is the lowercase hex SHA-256 digest of `id ‖ secret ‖ hour-bucket`,
//! where the bucket is the UTC wall-clock hour. Tokens require no server-side
//! session state: a token minted in one hour stops verifying when the clock
//! rolls into the next, and the client is expected to re-fetch. There is no
//! revocation.

use chrono::{DateTime, Timelike, Utc};
use sha2::{Digest, Sha256};

use crate::MediaId;

/// A wall-clock hour in UTC, the validity window of a stream token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourBucket(DateTime<Utc>);

impl HourBucket {
    /// The bucket containing the current wall-clock time.
    pub fn now() -> Self {
        Self::from_time(Utc::now())
    }

    /// The bucket containing an arbitrary instant (truncated to the hour).
    pub fn from_time(t: DateTime<Utc>) -> Self {
        Self(
            t.with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(t),
        )
    }

    /// The bucket one hour after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + chrono::Duration::hours(1))
    }

    fn digest_component(&self) -> String {
        self.0.format("%Y-%m-%d-%H").to_string()
    }
}

/// Generator and verifier for stream tokens, keyed by a shared secret.
#[derive(Debug, Clone)]
pub struct StreamTokens {
    secret: String,
}

impl StreamTokens {
    /// Build a token authority from an explicitly injected secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mint the token for `id` valid within `bucket`.
    pub fn generate(&self, id: MediaId, bucket: HourBucket) -> String {
        let mut hasher = Sha256::new();
        hasher.update(id.to_string().as_bytes());
        hasher.update(self.secret.as_bytes());
        hasher.update(bucket.digest_component().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check `token` against the expected token for `id` within `bucket`.
    ///
    /// Comparison is constant-time over the full expected length so response
    /// timing does not leak how much of a guess matched.
    pub fn verify(&self, id: MediaId, token: &str, bucket: HourBucket) -> bool {
        let expected = self.generate(id, bucket);
        constant_time_eq(expected.as_bytes(), token.as_bytes())
    }
}

/// Byte-wise comparison that always walks the whole of `a`.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
