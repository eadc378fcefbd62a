// Core error types for the issuer domain.

// This module defines the complete error semantics for the core layer.
/*
Errors are organized by ownership and responsibility:
 - [`FlowError`]: The OAuth / OIDC authorization pipeline stopped
 - [`SessionError`]: Browser or account session state does not exist
 - [`RbacError`]: A role/permission mutation was rejected
 - [`TokenError`]: A trust artifact is invalid or compromised
 - [`TenantError`]: The request could not be bound to a tenant
 - [`StorageError`]: The KV or SQL backend failed

Design Principles:
 - **No transport concepts**: Errors contain no HTTP status codes or similar
 - **No exceptions**: Errors are values, not panics
 - **Domain language**: Errors express intent, not technical implementation
 - **Stable codes**: Each variant maps to a machine code fixed on the wire
*/
pub mod flow_error;
pub mod rbac_error;
pub mod session_error;
pub mod storage_error;
pub mod tenant_error;
pub mod token_error;

pub use flow_error::FlowError;
pub use rbac_error::RbacError;
pub use session_error::SessionError;
pub use storage_error::StorageError;
pub use tenant_error::TenantError;
pub use token_error::TokenError;

/// Core error type that encompasses all issuer domain failures.
///
/// This is the main error type used throughout the core layer.
/// Each variant represents a different category of failure with its own semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The authorization pipeline stopped
    Flow(FlowError),
    /// Session state does not exist
    Session(SessionError),
    /// RBAC mutation rejected
    Rbac(RbacError),
    /// Token validation failed
    Token(TokenError),
    /// Tenant resolution failed
    Tenant(TenantError),
    /// Storage backend failed
    Storage(StorageError),
}

impl CoreError {
    /// Stable machine code for the wire (`{error, message}` bodies).
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Flow(err) => err.code(),
            CoreError::Session(err) => err.code(),
            CoreError::Rbac(err) => err.code(),
            CoreError::Token(err) => err.code(),
            CoreError::Tenant(err) => err.code(),
            CoreError::Storage(_) => "server_error",
        }
    }

    /// Returns true if this error represents a pipeline failure
    pub fn is_flow(&self) -> bool {
        matches!(self, CoreError::Flow(_))
    }

    /// Returns true if this error represents missing session state
    pub fn is_session(&self) -> bool {
        matches!(self, CoreError::Session(_))
    }

    /// Returns true if this error represents a rejected RBAC mutation
    pub fn is_rbac(&self) -> bool {
        matches!(self, CoreError::Rbac(_))
    }

    /// Returns true if this error represents a token failure
    pub fn is_token(&self) -> bool {
        matches!(self, CoreError::Token(_))
    }

    /// Returns true if this error represents a tenant resolution failure
    pub fn is_tenant(&self) -> bool {
        matches!(self, CoreError::Tenant(_))
    }

    /// Returns true if this error represents a storage failure
    pub fn is_storage(&self) -> bool {
        matches!(self, CoreError::Storage(_))
    }

    /// Extracts the flow error if this is one
    pub fn as_flow(&self) -> Option<&FlowError> {
        match self {
            CoreError::Flow(err) => Some(err),
            _ => None,
        }
    }

    /// Extracts the token error if this is one
    pub fn as_token(&self) -> Option<&TokenError> {
        match self {
            CoreError::Token(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::Flow(err) => write!(f, "Flow error: {}", err),
            CoreError::Session(err) => write!(f, "Session error: {}", err),
            CoreError::Rbac(err) => write!(f, "RBAC error: {}", err),
            CoreError::Token(err) => write!(f, "Token error: {}", err),
            CoreError::Tenant(err) => write!(f, "Tenant error: {}", err),
            CoreError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<FlowError> for CoreError {
    fn from(err: FlowError) -> Self {
        CoreError::Flow(err)
    }
}

impl From<SessionError> for CoreError {
    fn from(err: SessionError) -> Self {
        CoreError::Session(err)
    }
}

impl From<RbacError> for CoreError {
    fn from(err: RbacError) -> Self {
        CoreError::Rbac(err)
    }
}

impl From<TokenError> for CoreError {
    fn from(err: TokenError) -> Self {
        CoreError::Token(err)
    }
}

impl From<TenantError> for CoreError {
    fn from(err: TenantError) -> Self {
        CoreError::Tenant(err)
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::Storage(err)
    }
}
