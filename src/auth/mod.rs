//! Boundary authentication
//!
//! Requests carry a unix timestamp and an HMAC-SHA256 signature computed over
//! `timestamp + body` with a shared secret. The check runs before any engine
//! code; dev mode disables it entirely. Comparison is constant-time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::types::{EngineError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request timestamp (unix seconds)
pub const TIMESTAMP_HEADER: &str = "x-attune-timestamp";

/// Header carrying the hex-encoded signature
pub const SIGNATURE_HEADER: &str = "x-attune-signature";

/// Maximum clock skew accepted, in seconds
pub const MAX_SKEW_SECS: i64 = 300;

/// Verifies request signatures against the shared secret
pub struct RequestVerifier {
    secret: Vec<u8>,
}

impl RequestVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Compute the expected signature for `timestamp + body`
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(timestamp.as_bytes());
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Validate timestamp freshness and signature. `now_secs` is injected so
    /// the staleness window is testable.
    pub fn verify(
        &self,
        timestamp: &str,
        signature_hex: &str,
        body: &[u8],
        now_secs: i64,
    ) -> Result<()> {
        let ts: i64 = timestamp
            .parse()
            .map_err(|_| EngineError::Auth("timestamp is not a unix epoch value".into()))?;
        if (now_secs - ts).abs() > MAX_SKEW_SECS {
            return Err(EngineError::Auth("timestamp outside accepted window".into()));
        }

        let provided = hex::decode(signature_hex)
            .map_err(|_| EngineError::Auth("signature is not valid hex".into()))?;
        let expected = hex::decode(self.sign(timestamp, body))
            .map_err(|_| EngineError::Internal("signature encoding failed".into()))?;

        if provided.len() != expected.len() || provided.ct_eq(&expected).unwrap_u8() != 1 {
            return Err(EngineError::Auth("signature mismatch".into()));
        }
        Ok(())
    }
}
