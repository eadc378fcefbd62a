use serde::{Deserialize, Serialize};

/// Claim set of a user access token.
///
/// Serialized as the JWT payload; `mode` distinguishes user access tokens
/// from M2M tokens sharing the same signing keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
    /// Token id; what the revocation deny list and the audit trail key on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub tenant_id: String,
    pub mode: String,
}

/// Default user access-token lifetime (30 days).
pub const ACCESS_TTL_SECONDS: u64 = 30 * 24 * 3600;
/// Default OAuth refresh-token lifetime (1 year).
pub const REFRESH_TTL_SECONDS: u64 = 365 * 24 * 3600;

impl AccessClaims {
    pub fn is_access(&self) -> bool {
        self.mode == "access"
    }

    pub fn is_expired(&self, now_epoch: i64) -> bool {
        now_epoch >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> AccessClaims {
        AccessClaims {
            iss: "https://issuer.example.com".to_string(),
            sub: "u1".to_string(),
            aud: None,
            exp: 2_000_000_000,
            iat: 1_700_000_000,
            jti: None,
            nonce: None,
            roles: vec!["editor".to_string()],
            permissions: vec!["posts:read".to_string()],
            tenant_id: "acme".to_string(),
            mode: "access".to_string(),
        }
    }

    #[test]
    fn test_absent_aud_is_omitted_from_json() {
        let json = serde_json::to_value(claims()).unwrap();
        assert!(json.get("aud").is_none());
        assert!(json.get("nonce").is_none());
        assert_eq!(json["mode"], "access");
    }

    #[test]
    fn test_expiry_check() {
        let claims = claims();
        assert!(!claims.is_expired(1_900_000_000));
        assert!(claims.is_expired(2_000_000_000));
    }
}
