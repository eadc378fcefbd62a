/// Errors raised by the OAuth / OIDC authorization pipeline.

/*
 This error type answers the question: "Why did the authorization flow stop?"
It covers request validation, grant redemption, and authorization-state
failures. Variants map 1:1 to the stable machine codes returned on the wire;
whether a failure renders as JSON or redirects back to the client is decided
by the HTTP layer, not here.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A required OAuth parameter is missing or malformed
    InvalidRequest { reason: String },
    /// The client exists but may not use this redirect URI or response type
    UnauthorizedClient { reason: String },
    /// Client authentication failed (unknown client or bad secret)
    InvalidClient { reason: String },
    /// Authorization code or refresh token is unknown, expired, or reused
    InvalidGrant { reason: String },
    /// The authorization-state blob is expired or failed integrity checks
    InvalidState { reason: String },
    /// `prompt=none` was requested but no usable session exists
    LoginRequired,
    /// The requested response_type is not supported
    UnsupportedResponseType { got: String },
    /// The requested grant_type is not supported
    UnsupportedGrantType { got: String },
    /// The upstream identity provider failed or timed out
    ProviderError { reason: String },
}

impl FlowError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn unauthorized_client(reason: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            reason: reason.into(),
        }
    }

    pub fn invalid_client(reason: impl Into<String>) -> Self {
        Self::InvalidClient {
            reason: reason.into(),
        }
    }

    pub fn invalid_grant(reason: impl Into<String>) -> Self {
        Self::InvalidGrant {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn unsupported_response_type(got: impl Into<String>) -> Self {
        Self::UnsupportedResponseType { got: got.into() }
    }

    pub fn unsupported_grant_type(got: impl Into<String>) -> Self {
        Self::UnsupportedGrantType { got: got.into() }
    }

    pub fn provider_error(reason: impl Into<String>) -> Self {
        Self::ProviderError {
            reason: reason.into(),
        }
    }

    /// Stable machine code for the wire (`{error, message}` bodies and
    /// `error=` redirect parameters).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::InvalidState { .. } => "invalid_state",
            Self::LoginRequired => "login_required",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::ProviderError { .. } => "provider_error",
        }
    }
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest { reason } => write!(f, "Invalid request: {}", reason),
            Self::UnauthorizedClient { reason } => write!(f, "Unauthorized client: {}", reason),
            Self::InvalidClient { reason } => write!(f, "Invalid client: {}", reason),
            Self::InvalidGrant { reason } => write!(f, "Invalid grant: {}", reason),
            Self::InvalidState { reason } => write!(f, "Invalid authorization state: {}", reason),
            Self::LoginRequired => write!(f, "Login required"),
            Self::UnsupportedResponseType { got } => {
                write!(f, "Unsupported response_type: {}", got)
            }
            Self::UnsupportedGrantType { got } => write!(f, "Unsupported grant_type: {}", got),
            Self::ProviderError { reason } => write!(f, "Provider error: {}", reason),
        }
    }
}

impl std::error::Error for FlowError {}
