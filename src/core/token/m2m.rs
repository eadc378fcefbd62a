use serde::{Deserialize, Serialize};

/// Default M2M token lifetime.
pub const M2M_TTL_SECONDS: u64 = 3600;

/// Claim set of a machine-to-machine (client-credentials) token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M2mClaims {
    pub mode: String,
    pub sub: String,
    pub client_id: String,
    /// Space-joined scope list, RFC 6749 style
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Issuance knobs for `generate_m2m_token`.
///
/// `ttl` is honoured literally: `Some(0)` mints an already-expired token
/// (`exp == iat`); only `None` falls back to the default.
#[derive(Debug, Clone, Default)]
pub struct M2mConfig {
    pub ttl_seconds: Option<u64>,
    /// Gates the `tenant_id` claim; defaults to true when a tenant is given
    pub include_tenant_id: Option<bool>,
    /// Optional `aud` claim; enforced on verification only when the
    /// verifier supplies an expected audience
    pub audience: Option<String>,
}

impl M2mClaims {
    pub fn is_m2m(&self) -> bool {
        self.mode == "m2m"
    }

    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split_whitespace().collect()
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }

    pub fn has_all_scopes(&self, scopes: &[&str]) -> bool {
        scopes.iter().all(|s| self.has_scope(s))
    }

    pub fn has_any_scope(&self, scopes: &[&str]) -> bool {
        scopes.iter().any(|s| self.has_scope(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(scope: &str) -> M2mClaims {
        M2mClaims {
            mode: "m2m".to_string(),
            sub: "svc-1".to_string(),
            client_id: "svc-1".to_string(),
            scope: scope.to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            jti: "jti-1".to_string(),
            iss: "https://issuer.example.com".to_string(),
            aud: None,
            tenant_id: None,
        }
    }

    #[test]
    fn test_scope_helpers() {
        let claims = claims("read write admin:sessions");
        assert!(claims.has_scope("write"));
        assert!(!claims.has_scope("wri"));
        assert!(claims.has_all_scopes(&["read", "write"]));
        assert!(!claims.has_all_scopes(&["read", "delete"]));
        assert!(claims.has_any_scope(&["delete", "admin:sessions"]));
        assert!(!claims.has_any_scope(&["delete", "create"]));
    }

    #[test]
    fn test_empty_scope_has_nothing() {
        let claims = claims("");
        assert!(claims.scopes().is_empty());
        assert!(!claims.has_scope(""));
    }
}
