//! Use case: machine-to-machine tokens.
//!
//! Client-credentials issuance and verification. The TTL knob is honoured
//! literally: `Some(0)` mints an already-expired token; only `None` falls
//! back to the default. Verification categorizes failures so callers can
//! distinguish an expired token from a missing claim from a user token
//! presented where a machine token was required.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::TokenError;
use crate::core::token::{M2mClaims, M2mConfig, M2M_TTL_SECONDS};
use crate::core::usecases::ports::TokenSigner;

/// Issued M2M token plus its advertised lifetime.
#[derive(Debug, Clone)]
pub struct IssuedM2mToken {
    pub access_token: String,
    pub expires_in: u64,
    /// Token id, for the audit trail
    pub jti: String,
}

pub struct M2mService {
    signer: Arc<dyn TokenSigner>,
    issuer: String,
    clock_tolerance: i64,
}

impl M2mService {
    pub fn new(signer: Arc<dyn TokenSigner>, issuer: impl Into<String>) -> Self {
        Self {
            signer,
            issuer: issuer.into(),
            clock_tolerance: 30,
        }
    }

    pub fn with_clock_tolerance(mut self, seconds: i64) -> Self {
        self.clock_tolerance = seconds;
        self
    }

    /// Mint an M2M token for a service caller.
    pub fn generate_m2m_token(
        &self,
        client_id: &str,
        tenant_id: Option<&str>,
        scopes: &[String],
        config: &M2mConfig,
    ) -> Result<IssuedM2mToken, TokenError> {
        // ttl 0 is a valid "already expired" value; only None defaults.
        let ttl = config.ttl_seconds.unwrap_or(M2M_TTL_SECONDS);
        let include_tenant = config.include_tenant_id.unwrap_or(tenant_id.is_some());
        let iat = Utc::now().timestamp();

        let claims = M2mClaims {
            mode: "m2m".to_string(),
            sub: client_id.to_string(),
            client_id: client_id.to_string(),
            scope: scopes.join(" "),
            iat,
            exp: iat + ttl as i64,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: config.audience.clone(),
            tenant_id: if include_tenant {
                tenant_id.map(str::to_string)
            } else {
                None
            },
        };

        let access_token = self.signer.sign_m2m(&claims)?;
        Ok(IssuedM2mToken {
            access_token,
            expires_in: ttl,
            jti: claims.jti,
        })
    }

    /// Verify an M2M token with categorized failures: `expired_token`,
    /// `invalid_issuer`, `invalid_audience`, `not_m2m_token`,
    /// `missing_claims`, `invalid_token`.
    pub fn verify_m2m_token(
        &self,
        token: &str,
        expected_audience: Option<&str>,
    ) -> Result<M2mClaims, TokenError> {
        let raw = self.signer.verify_raw(token)?;

        let mode = raw.get("mode").and_then(|v| v.as_str()).unwrap_or("");
        if mode != "m2m" {
            return Err(TokenError::not_m2m(mode));
        }

        let mut missing = Vec::new();
        for claim in ["client_id", "sub", "exp"] {
            if raw.get(claim).is_none() {
                missing.push(claim);
            }
        }
        if !missing.is_empty() {
            return Err(TokenError::missing_claims(missing.join(", ")));
        }

        let exp = raw.get("exp").and_then(|v| v.as_i64()).unwrap_or(0);
        if Utc::now().timestamp() > exp + self.clock_tolerance {
            return Err(TokenError::expired(exp.to_string()));
        }

        let iss = raw.get("iss").and_then(|v| v.as_str()).unwrap_or("");
        if iss != self.issuer {
            return Err(TokenError::invalid_issuer(&self.issuer, iss));
        }

        // aud enforced only when the verifier asks for one and the token
        // carries one; an absent claim skips the check.
        if let Some(expected) = expected_audience {
            if let Some(aud) = raw.get("aud").and_then(|v| v.as_str()) {
                if aud != expected {
                    return Err(TokenError::invalid_audience(expected, aud));
                }
            }
        }

        serde_json::from_value(raw)
            .map_err(|e| TokenError::invalid(format!("claims do not parse: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::crypto::SigningKeyRing;

    fn service() -> M2mService {
        let signer = Arc::new(SigningKeyRing::generate().unwrap());
        M2mService::new(signer, "https://issuer.example.com").with_clock_tolerance(0)
    }

    fn scopes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_generate_verify_round_trip() {
        let service = service();
        let issued = service
            .generate_m2m_token(
                "svc-1",
                Some("acme"),
                &scopes(&["read", "write"]),
                &M2mConfig::default(),
            )
            .unwrap();
        assert_eq!(issued.expires_in, M2M_TTL_SECONDS);

        let claims = service.verify_m2m_token(&issued.access_token, None).unwrap();
        assert_eq!(claims.client_id, "svc-1");
        assert_eq!(claims.scopes(), vec!["read", "write"]);
        assert_eq!(claims.tenant_id.as_deref(), Some("acme"));
    }

    #[test]
    fn test_ttl_zero_is_already_expired() {
        let service = service();
        let issued = service
            .generate_m2m_token(
                "svc-1",
                None,
                &scopes(&["read"]),
                &M2mConfig {
                    ttl_seconds: Some(0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(issued.expires_in, 0);

        // exp == iat: one second later the token is dead.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(matches!(
            service.verify_m2m_token(&issued.access_token, None),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn test_tenant_claim_gated_by_config() {
        let service = service();
        let issued = service
            .generate_m2m_token(
                "svc-1",
                Some("acme"),
                &scopes(&[]),
                &M2mConfig {
                    include_tenant_id: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        let claims = service.verify_m2m_token(&issued.access_token, None).unwrap();
        assert!(claims.tenant_id.is_none());
    }

    #[test]
    fn test_issuer_mismatch_categorized() {
        let signer = Arc::new(SigningKeyRing::generate().unwrap());
        let issuing = M2mService::new(signer.clone(), "https://a.example.com");
        let verifying = M2mService::new(signer, "https://b.example.com");

        let issued = issuing
            .generate_m2m_token("svc-1", None, &scopes(&[]), &M2mConfig::default())
            .unwrap();
        assert!(matches!(
            verifying.verify_m2m_token(&issued.access_token, None),
            Err(TokenError::InvalidIssuer { .. })
        ));
    }

    #[test]
    fn test_audience_enforced_only_when_both_present() {
        let service = service();
        let with_aud = service
            .generate_m2m_token(
                "svc-1",
                None,
                &scopes(&[]),
                &M2mConfig {
                    audience: Some("api".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(service.verify_m2m_token(&with_aud.access_token, Some("api")).is_ok());
        assert!(matches!(
            service.verify_m2m_token(&with_aud.access_token, Some("other")),
            Err(TokenError::InvalidAudience { .. })
        ));

        // No aud claim: expected audience is skipped.
        let without_aud = service
            .generate_m2m_token("svc-1", None, &scopes(&[]), &M2mConfig::default())
            .unwrap();
        assert!(service
            .verify_m2m_token(&without_aud.access_token, Some("api"))
            .is_ok());
    }

    #[test]
    fn test_access_token_is_not_m2m() {
        let signer = Arc::new(SigningKeyRing::generate().unwrap());
        let service = M2mService::new(signer.clone(), "https://issuer.example.com");

        use crate::core::token::AccessClaims;
        use crate::core::usecases::ports::TokenSigner;
        let access = AccessClaims {
            iss: "https://issuer.example.com".to_string(),
            sub: "u1".to_string(),
            aud: None,
            jti: None,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
            nonce: None,
            roles: vec![],
            permissions: vec![],
            tenant_id: "acme".to_string(),
            mode: "access".to_string(),
        };
        let token = signer.sign_access(&access).unwrap();
        assert!(matches!(
            service.verify_m2m_token(&token, None),
            Err(TokenError::NotM2m { .. })
        ));
    }
}
