use std::collections::HashMap;

/// How a request names its tenant.
///
/// Resolution order is fixed: custom-domain map, host suffix against the
/// base domain, path prefix, header, query parameter. The first hint that
/// yields a value wins; lookup against the tenant store happens afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantHint {
    /// The request host matched the explicit custom-domain map
    CustomDomain { tenant_id: String },
    /// `{tenant}.{base_domain}` host
    HostSuffix { tenant_id: String },
    /// `/t/{tenant}/...` path prefix
    PathPrefix { tenant_id: String },
    /// Configured tenant header
    Header { tenant_id: String },
    /// Configured tenant query parameter
    Query { tenant_id: String },
}

impl TenantHint {
    pub fn tenant_id(&self) -> &str {
        match self {
            Self::CustomDomain { tenant_id }
            | Self::HostSuffix { tenant_id }
            | Self::PathPrefix { tenant_id }
            | Self::Header { tenant_id }
            | Self::Query { tenant_id } => tenant_id,
        }
    }
}

/// Static resolver configuration, loaded once at startup and shared.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Suffix stripped from the request host to obtain the tenant id
    pub base_domain: Option<String>,
    /// Header carrying an explicit tenant id (default `x-tenant-id`)
    pub header_name: String,
    /// Query parameter carrying an explicit tenant id (default `tenant`)
    pub query_param: String,
    /// host -> tenant id, takes precedence over everything else
    pub custom_domains: HashMap<String, String>,
}

impl ResolverConfig {
    pub fn new(base_domain: Option<String>) -> Self {
        Self {
            base_domain,
            header_name: "x-tenant-id".to_string(),
            query_param: "tenant".to_string(),
            custom_domains: HashMap::new(),
        }
    }
}

/// Raw request facts the resolver works from. The HTTP layer extracts these
/// once; resolution itself is a pure function.
#[derive(Debug, Clone, Default)]
pub struct RequestHints<'a> {
    pub host: Option<&'a str>,
    pub path: &'a str,
    pub header_value: Option<&'a str>,
    pub query_value: Option<&'a str>,
}

/// Resolve the tenant hint for a request, in precedence order.
///
/// Returns `None` when nothing names a tenant; the caller decides whether
/// that falls back to a default tenant or fails with `tenant_not_found`.
pub fn resolve_hint(config: &ResolverConfig, hints: &RequestHints<'_>) -> Option<TenantHint> {
    // Host port never participates in matching.
    let host = hints.host.map(|h| h.split(':').next().unwrap_or(h));

    if let Some(host) = host {
        if let Some(tenant_id) = config.custom_domains.get(host) {
            return Some(TenantHint::CustomDomain {
                tenant_id: tenant_id.clone(),
            });
        }

        if let Some(base) = &config.base_domain {
            if let Some(sub) = host.strip_suffix(base.as_str()) {
                let sub = sub.trim_end_matches('.');
                if !sub.is_empty() && !sub.contains('.') {
                    return Some(TenantHint::HostSuffix {
                        tenant_id: sub.to_string(),
                    });
                }
            }
        }
    }

    if let Some(rest) = hints.path.strip_prefix("/t/") {
        let tenant_id = rest.split('/').next().unwrap_or("");
        if !tenant_id.is_empty() {
            return Some(TenantHint::PathPrefix {
                tenant_id: tenant_id.to_string(),
            });
        }
    }

    if let Some(value) = hints.header_value {
        if !value.is_empty() {
            return Some(TenantHint::Header {
                tenant_id: value.to_string(),
            });
        }
    }

    if let Some(value) = hints.query_value {
        if !value.is_empty() {
            return Some(TenantHint::Query {
                tenant_id: value.to_string(),
            });
        }
    }

    None
}
