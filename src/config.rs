//! Environment-driven configuration.
//!
//! Everything the process needs arrives through the environment (a
//! `.env` file is honored in development via dotenvy, loaded by `main`).
//! Missing or malformed values fail startup with a descriptive error.

use std::collections::HashMap;

use crate::core::tenant::ResolverConfig;

/// Required 256-bit session secret, hex encoded.
const ENV_SESSION_SECRET: &str = "AUTHGRID_SESSION_SECRET";
/// Secret used to seal stored provider credentials and signing-key seeds.
const ENV_PROVIDER_SECRET: &str = "AUTHGRID_PROVIDER_SECRET_KEY";
const ENV_ISSUER_URL: &str = "AUTHGRID_ISSUER_URL";
const ENV_BASE_DOMAIN: &str = "AUTHGRID_BASE_DOMAIN";
const ENV_TENANT_HEADER: &str = "AUTHGRID_TENANT_HEADER";
const ENV_TENANT_QUERY: &str = "AUTHGRID_TENANT_QUERY";
const ENV_CUSTOM_DOMAINS: &str = "AUTHGRID_CUSTOM_DOMAINS";
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_KV_PATH: &str = "AUTHGRID_KV_PATH";
const ENV_COOKIE_NAME: &str = "AUTHGRID_COOKIE_NAME";
const ENV_SESSION_TTL: &str = "AUTHGRID_SESSION_TTL_SECS";
const ENV_ACCESS_TTL: &str = "AUTHGRID_ACCESS_TTL_SECS";
const ENV_REFRESH_TTL: &str = "AUTHGRID_REFRESH_TTL_SECS";
const ENV_MAX_ACCOUNTS: &str = "AUTHGRID_MAX_ACCOUNTS";
const ENV_BIND_ADDR: &str = "AUTHGRID_BIND_ADDR";
const ENV_ISSUER_THEME: &str = "AUTHGRID_ISSUER_THEME";
const ENV_AUDIT_QUEUE: &str = "AUTHGRID_AUDIT_QUEUE";

/// Fully parsed process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session_secret: [u8; 32],
    pub provider_secret: [u8; 32],
    pub issuer_url: String,
    pub resolver: ResolverConfig,
    /// `None` runs the in-memory KV (tests, dev); a path opens sled
    pub kv_path: Option<String>,
    /// SQL mirror connection string; the mirror backs all admin queries
    pub database_url: String,
    pub cookie_name: String,
    pub session_ttl_seconds: i64,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub max_accounts_per_session: usize,
    pub bind_addr: String,
    pub issuer_theme: Option<String>,
    /// Queue-mode audit delivery when true; direct SQL writes otherwise
    pub audit_queue: bool,
}

/// A configuration value was missing or malformed.
#[derive(Debug)]
pub struct ConfigError {
    pub variable: &'static str,
    pub reason: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.variable, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Read the full configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_secret = secret_from_env(ENV_SESSION_SECRET)?;
        let provider_secret = secret_from_env(ENV_PROVIDER_SECRET)?;

        let issuer_url = required(ENV_ISSUER_URL)?;
        if !issuer_url.starts_with("http://") && !issuer_url.starts_with("https://") {
            return Err(ConfigError {
                variable: ENV_ISSUER_URL,
                reason: "must be an absolute http(s) URL".to_string(),
            });
        }
        let issuer_url = issuer_url.trim_end_matches('/').to_string();

        let mut resolver = ResolverConfig::new(optional(ENV_BASE_DOMAIN));
        if let Some(header) = optional(ENV_TENANT_HEADER) {
            resolver.header_name = header;
        }
        if let Some(query) = optional(ENV_TENANT_QUERY) {
            resolver.query_param = query;
        }
        resolver.custom_domains = parse_domain_map(optional(ENV_CUSTOM_DOMAINS).as_deref())?;

        Ok(Self {
            session_secret,
            provider_secret,
            issuer_url,
            resolver,
            kv_path: optional(ENV_KV_PATH),
            database_url: required(ENV_DATABASE_URL)?,
            cookie_name: optional(ENV_COOKIE_NAME)
                .unwrap_or_else(|| "openauth.session".to_string()),
            session_ttl_seconds: parsed(ENV_SESSION_TTL)?.unwrap_or(7 * 24 * 3600),
            access_ttl_seconds: parsed(ENV_ACCESS_TTL)?
                .unwrap_or(crate::core::token::ACCESS_TTL_SECONDS),
            refresh_ttl_seconds: parsed(ENV_REFRESH_TTL)?
                .unwrap_or(crate::core::token::REFRESH_TTL_SECONDS),
            max_accounts_per_session: parsed(ENV_MAX_ACCOUNTS)?.unwrap_or(3),
            bind_addr: optional(ENV_BIND_ADDR).unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            issuer_theme: optional(ENV_ISSUER_THEME),
            audit_queue: optional(ENV_AUDIT_QUEUE)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn required(variable: &'static str) -> Result<String, ConfigError> {
    std::env::var(variable).map_err(|_| ConfigError {
        variable,
        reason: "is required".to_string(),
    })
}

fn optional(variable: &str) -> Option<String> {
    std::env::var(variable).ok().filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(variable: &'static str) -> Result<Option<T>, ConfigError> {
    match optional(variable) {
        Some(raw) => raw.parse().map(Some).map_err(|_| ConfigError {
            variable,
            reason: format!("could not parse {:?}", raw),
        }),
        None => Ok(None),
    }
}

fn secret_from_env(variable: &'static str) -> Result<[u8; 32], ConfigError> {
    let raw = required(variable)?;
    let bytes = hex::decode(raw.trim()).map_err(|e| ConfigError {
        variable,
        reason: format!("must be hex: {}", e),
    })?;
    bytes.try_into().map_err(|_| ConfigError {
        variable,
        reason: "must decode to exactly 32 bytes".to_string(),
    })
}

/// `host=tenant,host=tenant` pairs.
fn parse_domain_map(raw: Option<&str>) -> Result<HashMap<String, String>, ConfigError> {
    let mut map = HashMap::new();
    let Some(raw) = raw else {
        return Ok(map);
    };
    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let (host, tenant) = pair.split_once('=').ok_or_else(|| ConfigError {
            variable: ENV_CUSTOM_DOMAINS,
            reason: format!("expected host=tenant, got {:?}", pair),
        })?;
        map.insert(host.trim().to_string(), tenant.trim().to_string());
    }
    Ok(map)
}
