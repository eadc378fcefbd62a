/// Errors related to token validity and integrity.

/*
 This error type answers the question: "Is the trust artifact valid and intact?"
It covers JWT verification for both user access tokens and M2M tokens. The
M2M verifier reports through the categorized variants (Expired, InvalidIssuer,
InvalidAudience, NotM2m, MissingClaims); anything else collapses to Invalid.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token has expired
    Expired { expired_at: String },
    /// Token issuer does not match expected issuer
    InvalidIssuer { expected: String, actual: String },
    /// Token audience does not match expected audience
    InvalidAudience { expected: String, actual: String },
    /// Token is valid but was not issued by the M2M subsystem
    NotM2m { mode: String },
    /// Token is missing required claims
    MissingClaims { claims: String },
    /// Token key ID (kid) does not match any known key
    KeyIdNotFound { kid: String },
    /// Token is malformed, tampered with, or otherwise unverifiable
    Invalid { reason: String },
}

impl TokenError {
    pub fn expired(expired_at: impl Into<String>) -> Self {
        Self::Expired {
            expired_at: expired_at.into(),
        }
    }

    pub fn invalid_issuer(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidIssuer {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_audience(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidAudience {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn not_m2m(mode: impl Into<String>) -> Self {
        Self::NotM2m { mode: mode.into() }
    }

    pub fn missing_claims(claims: impl Into<String>) -> Self {
        Self::MissingClaims {
            claims: claims.into(),
        }
    }

    pub fn key_id_not_found(kid: impl Into<String>) -> Self {
        Self::KeyIdNotFound { kid: kid.into() }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Stable machine code for the wire and for M2M verifier callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "expired_token",
            Self::InvalidIssuer { .. } => "invalid_issuer",
            Self::InvalidAudience { .. } => "invalid_audience",
            Self::NotM2m { .. } => "not_m2m_token",
            Self::MissingClaims { .. } => "missing_claims",
            Self::KeyIdNotFound { .. } | Self::Invalid { .. } => "invalid_token",
        }
    }
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expired { expired_at } => write!(f, "Token expired at: {}", expired_at),
            Self::InvalidIssuer { expected, actual } => {
                write!(f, "Token issuer mismatch: expected {}, got {}", expected, actual)
            }
            Self::InvalidAudience { expected, actual } => {
                write!(
                    f,
                    "Token audience mismatch: expected {}, got {}",
                    expected, actual
                )
            }
            Self::NotM2m { mode } => write!(f, "Token is not an M2M token (mode: {})", mode),
            Self::MissingClaims { claims } => {
                write!(f, "Token is missing required claims: {}", claims)
            }
            Self::KeyIdNotFound { kid } => write!(f, "Token key ID not found: {}", kid),
            Self::Invalid { reason } => write!(f, "Token is invalid: {}", reason),
        }
    }
}

impl std::error::Error for TokenError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_m2m_verifier_codes() {
        assert_eq!(TokenError::expired("2025-01-01T00:00:00Z").code(), "expired_token");
        assert_eq!(TokenError::not_m2m("access").code(), "not_m2m_token");
        assert_eq!(TokenError::missing_claims("client_id").code(), "missing_claims");
        assert_eq!(TokenError::key_id_not_found("k1").code(), "invalid_token");
    }

    #[test]
    fn test_issuer_mismatch_display() {
        let err = TokenError::invalid_issuer("https://issuer.example.com", "https://other");
        assert_eq!(
            err.to_string(),
            "Token issuer mismatch: expected https://issuer.example.com, got https://other"
        );
    }
}
