//! Stateless, HMAC-signed share tokens.
//!
//! A token names one analysis record and an expiry instant. Nothing is stored
//! server side: the signature over `"<detail_id>/<expires>"` is the only
//! credential, so a token cannot be revoked before it expires.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::ids::AnalysisId;
use crate::ports::ClockPort;
use crate::security::ShareSecret;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of every issued share token.
pub const SHARE_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const PARAM_DETAIL_ID: &str = "detailId";
const PARAM_EXPIRES: &str = "expires";
const PARAM_SIG: &str = "sig";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareToken {
    #[serde(rename = "detailId")]
    pub detail_id: AnalysisId,
    /// Unix seconds after which the token is rejected.
    #[serde(rename = "expires")]
    pub expires_at: i64,
    /// Lowercase hex HMAC-SHA256.
    #[serde(rename = "sig")]
    pub signature: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareTokenError {
    #[error("share token expired")]
    Expired,

    #[error("share token signature mismatch")]
    InvalidSignature,

    #[error("malformed share token: {0}")]
    Malformed(String),
}

impl ShareToken {
    fn signing_payload(detail_id: AnalysisId, expires_at: i64) -> String {
        format!("{}/{}", detail_id, expires_at)
    }
}

/// Query-string form: `detailId=<id>&expires=<unix>&sig=<hex>`.
impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}&{}={}&{}={}",
            PARAM_DETAIL_ID,
            self.detail_id,
            PARAM_EXPIRES,
            self.expires_at,
            PARAM_SIG,
            self.signature
        )
    }
}

impl FromStr for ShareToken {
    type Err = ShareTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let query = s.trim().trim_start_matches('?');

        let mut detail_id = None;
        let mut expires_at = None;
        let mut signature = None;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                PARAM_DETAIL_ID => {
                    let id = value.parse::<AnalysisId>().map_err(|_| {
                        ShareTokenError::Malformed(format!("{} is not an integer", PARAM_DETAIL_ID))
                    })?;
                    detail_id = Some(id);
                }
                PARAM_EXPIRES => {
                    let expires = value.parse::<i64>().map_err(|_| {
                        ShareTokenError::Malformed(format!("{} is not an integer", PARAM_EXPIRES))
                    })?;
                    expires_at = Some(expires);
                }
                PARAM_SIG => signature = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(ShareToken {
            detail_id: detail_id
                .ok_or_else(|| ShareTokenError::Malformed(format!("missing {}", PARAM_DETAIL_ID)))?,
            expires_at: expires_at
                .ok_or_else(|| ShareTokenError::Malformed(format!("missing {}", PARAM_EXPIRES)))?,
            signature: signature
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ShareTokenError::Malformed(format!("missing {}", PARAM_SIG)))?,
        })
    }
}

/// Issues and checks share tokens with one process-wide secret.
pub struct ShareTokenCodec {
    secret: ShareSecret,
    clock: Arc<dyn ClockPort>,
}

impl ShareTokenCodec {
    pub fn new(secret: ShareSecret, clock: Arc<dyn ClockPort>) -> Self {
        Self { secret, clock }
    }

    pub fn sign(&self, detail_id: AnalysisId, ttl: Duration) -> ShareToken {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = self.now_secs().saturating_add(ttl_secs);
        let signature = hex::encode(self.mac(detail_id, expires_at).finalize().into_bytes());

        ShareToken {
            detail_id,
            expires_at,
            signature,
        }
    }

    /// Check expiry first, then the signature in constant time.
    pub fn verify(&self, token: &ShareToken) -> Result<AnalysisId, ShareTokenError> {
        if self.now_secs() > token.expires_at {
            #[cfg(feature = "tracing")]
            tracing::debug!(detail_id = %token.detail_id, expires_at = token.expires_at, "share token expired");
            return Err(ShareTokenError::Expired);
        }

        let presented =
            hex::decode(&token.signature).map_err(|_| ShareTokenError::InvalidSignature)?;

        self.mac(token.detail_id, token.expires_at)
            .verify_slice(&presented)
            .map_err(|_| ShareTokenError::InvalidSignature)?;

        Ok(token.detail_id)
    }

    fn mac(&self, detail_id: AnalysisId, expires_at: i64) -> HmacSha256 {
        // HMAC accepts keys of any length
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.expose())
            .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any length"));
        mac.update(ShareToken::signing_payload(detail_id, expires_at).as_bytes());
        mac
    }

    fn now_secs(&self) -> i64 {
        self.clock.now_ms().div_euclid(1000)
    }
}

impl fmt::Debug for ShareTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareTokenCodec")
            .field("secret", &self.secret)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct FixedClock(AtomicI64);

    impl FixedClock {
        fn at_secs(secs: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(secs * 1000)))
        }

        fn advance_secs(&self, secs: i64) {
            self.0.fetch_add(secs * 1000, Ordering::SeqCst);
        }
    }

    impl ClockPort for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn codec(clock: Arc<FixedClock>) -> ShareTokenCodec {
        ShareTokenCodec::new(ShareSecret::from_passphrase("share-secret"), clock)
    }

    #[test]
    fn sign_then_verify_returns_detail_id() {
        let codec = codec(FixedClock::at_secs(1_700_000_000));

        let token = codec.sign(AnalysisId::new(42), SHARE_TOKEN_TTL);

        assert_eq!(token.expires_at, 1_700_000_000 + 86_400);
        assert_eq!(codec.verify(&token), Ok(AnalysisId::new(42)));
    }

    #[test]
    fn signature_is_hmac_of_canonical_payload() {
        let codec = codec(FixedClock::at_secs(1_000));
        let token = codec.sign(AnalysisId::new(7), Duration::from_secs(60));

        let mut mac = HmacSha256::new_from_slice(b"share-secret").unwrap();
        mac.update(b"7/1060");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(token.signature, expected);
    }

    #[test]
    fn expired_token_is_rejected_even_with_valid_signature() {
        let clock = FixedClock::at_secs(1_000);
        let codec = codec(clock.clone());
        let token = codec.sign(AnalysisId::new(1), Duration::from_secs(10));

        clock.advance_secs(10);
        assert_eq!(codec.verify(&token), Ok(AnalysisId::new(1)));

        clock.advance_secs(1);
        assert_eq!(codec.verify(&token), Err(ShareTokenError::Expired));
    }

    #[test]
    fn expiry_is_checked_before_signature() {
        let clock = FixedClock::at_secs(5_000);
        let codec = codec(clock);
        let token = ShareToken {
            detail_id: AnalysisId::new(1),
            expires_at: 4_000,
            signature: "not-even-hex".to_string(),
        };

        assert_eq!(codec.verify(&token), Err(ShareTokenError::Expired));
    }

    #[test]
    fn single_bit_flip_in_signature_is_rejected() {
        let codec = codec(FixedClock::at_secs(1_000));
        let token = codec.sign(AnalysisId::new(9), SHARE_TOKEN_TTL);

        let mut raw = hex::decode(&token.signature).unwrap();
        raw[0] ^= 0x01;
        let tampered = ShareToken {
            signature: hex::encode(raw),
            ..token
        };

        assert_eq!(codec.verify(&tampered), Err(ShareTokenError::InvalidSignature));
    }

    #[test]
    fn tampered_detail_id_or_expiry_is_rejected() {
        let codec = codec(FixedClock::at_secs(1_000));
        let token = codec.sign(AnalysisId::new(9), SHARE_TOKEN_TTL);

        let other_id = ShareToken {
            detail_id: AnalysisId::new(10),
            ..token.clone()
        };
        let later = ShareToken {
            expires_at: token.expires_at + 1,
            ..token
        };

        assert_eq!(codec.verify(&other_id), Err(ShareTokenError::InvalidSignature));
        assert_eq!(codec.verify(&later), Err(ShareTokenError::InvalidSignature));
    }

    #[test]
    fn different_secret_does_not_verify() {
        let clock = FixedClock::at_secs(1_000);
        let issuer = codec(clock.clone());
        let other = ShareTokenCodec::new(ShareSecret::from_passphrase("other"), clock);

        let token = issuer.sign(AnalysisId::new(3), SHARE_TOKEN_TTL);

        assert_eq!(other.verify(&token), Err(ShareTokenError::InvalidSignature));
    }

    #[test]
    fn different_expiry_gives_different_signature() {
        let clock = FixedClock::at_secs(1_000);
        let codec = codec(clock.clone());

        let first = codec.sign(AnalysisId::new(42), SHARE_TOKEN_TTL);
        clock.advance_secs(1);
        let second = codec.sign(AnalysisId::new(42), SHARE_TOKEN_TTL);

        assert_ne!(first.expires_at, second.expires_at);
        assert_ne!(first.signature, second.signature);
    }

    #[test]
    fn query_string_form_parses_back() {
        let codec = codec(FixedClock::at_secs(1_000));
        let token = codec.sign(AnalysisId::new(42), SHARE_TOKEN_TTL);

        let wire = token.to_string();
        assert!(wire.starts_with("detailId=42&expires=87400&sig="));

        let parsed: ShareToken = wire.parse().expect("parse token");
        assert_eq!(parsed, token);
    }

    #[test]
    fn parser_ignores_order_prefix_and_unknown_params() {
        let parsed: ShareToken = "?sig=abcd&utm=x&expires=99&detailId=5"
            .parse()
            .expect("parse token");

        assert_eq!(parsed.detail_id, AnalysisId::new(5));
        assert_eq!(parsed.expires_at, 99);
        assert_eq!(parsed.signature, "abcd");
    }

    #[test]
    fn parser_rejects_missing_or_non_numeric_fields() {
        assert!(matches!(
            "expires=1&sig=ab".parse::<ShareToken>(),
            Err(ShareTokenError::Malformed(_))
        ));
        assert!(matches!(
            "detailId=x&expires=1&sig=ab".parse::<ShareToken>(),
            Err(ShareTokenError::Malformed(_))
        ));
        assert!(matches!(
            "detailId=1&expires=1&sig=".parse::<ShareToken>(),
            Err(ShareTokenError::Malformed(_))
        ));
    }

    #[test]
    fn json_uses_wire_field_names() {
        let token = ShareToken {
            detail_id: AnalysisId::new(1),
            expires_at: 2,
            signature: "ff".to_string(),
        };

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json, serde_json::json!({"detailId": 1, "expires": 2, "sig": "ff"}));
    }

    #[test]
    fn debug_never_prints_secret() {
        let codec = codec(FixedClock::at_secs(0));
        assert!(!format!("{:?}", codec).contains("share-secret"));
    }
}
