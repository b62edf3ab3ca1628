//! Inbound webhook signature checks, compatible with the identity
//! provider's svix-style scheme: HMAC-SHA256 over `"{id}.{timestamp}.{body}"`
//! under a base64 secret, base64 signatures, and bounded timestamp skew.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Secrets are issued with this prefix; the remainder is the base64 key.
const SECRET_PREFIX: &str = "whsec_";

/// Tolerated clock skew between the provider and this service.
const TOLERANCE_MINUTES: i64 = 5;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook secret must be '{SECRET_PREFIX}' followed by base64")]
    BadSecret,

    #[error("webhook timestamp is not a unix timestamp")]
    BadTimestamp,

    #[error("webhook timestamp outside tolerance")]
    StaleTimestamp,

    #[error("webhook signature mismatch")]
    BadSignature,
}

#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret
            .strip_prefix(SECRET_PREFIX)
            .ok_or(WebhookError::BadSecret)?;
        let key = BASE64.decode(encoded).map_err(|_| WebhookError::BadSecret)?;
        Ok(Self { key })
    }

    /// Checks the `v1,<base64>` candidates in the signature header against
    /// the MAC of `"{msg_id}.{timestamp}.{payload}"`. Any single match
    /// accepts, which lets the provider rotate secrets without a gap.
    pub fn verify(
        &self,
        msg_id: &str,
        timestamp: &str,
        signatures: &str,
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), WebhookError> {
        let ts = timestamp
            .parse::<i64>()
            .map_err(|_| WebhookError::BadTimestamp)?;
        let sent_at = DateTime::<Utc>::from_timestamp(ts, 0).ok_or(WebhookError::BadTimestamp)?;

        let skew = now.signed_duration_since(sent_at);
        let tolerance = Duration::minutes(TOLERANCE_MINUTES);
        if skew > tolerance || skew < -tolerance {
            return Err(WebhookError::StaleTimestamp);
        }

        let mut mac = HmacSha256::new_from_slice(&self.key).expect("hmac accepts keys of any length");
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        for candidate in signatures.split_whitespace() {
            let Some(encoded) = candidate.strip_prefix("v1,") else {
                continue;
            };
            let Ok(signature) = BASE64.decode(encoded) else {
                continue;
            };
            // verify_slice is constant-time; clone because each candidate
            // consumes the MAC.
            if mac.clone().verify_slice(&signature).is_ok() {
                return Ok(());
            }
        }

        Err(WebhookError::BadSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleQ==";

    fn sign(msg_id: &str, timestamp: &str, payload: &[u8]) -> String {
        let key = BASE64.decode(SECRET.trim_start_matches(SECRET_PREFIX)).unwrap();
        let mut mac = HmacSha256::new_from_slice(&key).unwrap();
        mac.update(format!("{msg_id}.{timestamp}").as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("v1,{}", BASE64.encode(mac.finalize().into_bytes()))
    }

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET).unwrap()
    }

    #[test]
    fn accepts_a_fresh_signed_message() {
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let payload = br#"{"type":"user.created"}"#;
        let signature = sign("msg_1", &ts, payload);

        assert!(verifier().verify("msg_1", &ts, &signature, payload, now).is_ok());
    }

    #[test]
    fn accepts_when_any_candidate_matches() {
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let payload = b"{}";
        let good = sign("msg_2", &ts, payload);
        let header = format!("v1,AAAA {good}");

        assert!(verifier().verify("msg_2", &ts, &header, payload, now).is_ok());
    }

    #[test]
    fn rejects_a_tampered_payload() {
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let signature = sign("msg_3", &ts, b"{\"role\":\"user\"}");

        let result = verifier().verify("msg_3", &ts, &signature, b"{\"role\":\"admin\"}", now);
        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[test]
    fn rejects_a_stale_timestamp() {
        let now = Utc::now();
        let old = (now - Duration::minutes(10)).timestamp().to_string();
        let payload = b"{}";
        let signature = sign("msg_4", &old, payload);

        let result = verifier().verify("msg_4", &old, &signature, payload, now);
        assert!(matches!(result, Err(WebhookError::StaleTimestamp)));
    }

    #[test]
    fn rejects_a_timestamp_from_the_future() {
        let now = Utc::now();
        let ahead = (now + Duration::minutes(10)).timestamp().to_string();
        let payload = b"{}";
        let signature = sign("msg_5", &ahead, payload);

        let result = verifier().verify("msg_5", &ahead, &signature, payload, now);
        assert!(matches!(result, Err(WebhookError::StaleTimestamp)));
    }

    #[test]
    fn rejects_unknown_signature_schemes() {
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let payload = b"{}";
        let good = sign("msg_6", &ts, payload);
        let downgraded = good.replacen("v1,", "v0,", 1);

        let result = verifier().verify("msg_6", &ts, &downgraded, payload, now);
        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[test]
    fn rejects_a_non_numeric_timestamp() {
        let now = Utc::now();
        let result = verifier().verify("msg_7", "yesterday", "v1,AAAA", b"{}", now);
        assert!(matches!(result, Err(WebhookError::BadTimestamp)));
    }

    #[test]
    fn secret_must_carry_the_expected_prefix() {
        assert!(matches!(
            WebhookVerifier::new("dGVzdA=="),
            Err(WebhookError::BadSecret)
        ));
        assert!(matches!(
            WebhookVerifier::new("whsec_!!!not-base64!!!"),
            Err(WebhookError::BadSecret)
        ));
    }
}
