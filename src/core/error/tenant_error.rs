/// Errors related to tenant resolution and lifecycle.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantError {
    /// No tenant matched the request (host, path, header, or query)
    NotFound { hint: String },
    /// The tenant exists but is suspended or soft-deleted
    Unavailable { tenant_id: String },
}

impl TenantError {
    pub fn not_found(hint: impl Into<String>) -> Self {
        Self::NotFound { hint: hint.into() }
    }

    pub fn unavailable(tenant_id: impl Into<String>) -> Self {
        Self::Unavailable {
            tenant_id: tenant_id.into(),
        }
    }

    /// Stable machine code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "tenant_not_found",
            Self::Unavailable { .. } => "tenant_unavailable",
        }
    }
}

impl std::fmt::Display for TenantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { hint } => write!(f, "Tenant not found: {}", hint),
            Self::Unavailable { tenant_id } => write!(f, "Tenant unavailable: {}", tenant_id),
        }
    }
}

impl std::error::Error for TenantError {}
