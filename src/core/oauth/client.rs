use serde::{Deserialize, Serialize};

/// Grants a client may exercise at `/token` (or `/authorize` for implicit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
    ClientCredentials,
    Implicit,
}

impl GrantType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            "client_credentials" => Some(Self::ClientCredentials),
            "implicit" => Some(Self::Implicit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
            Self::ClientCredentials => "client_credentials",
            Self::Implicit => "implicit",
        }
    }
}

/// A registered OAuth client, owned by a tenant.
///
/// The secret is only ever stored hashed (Argon2id). Verification runs
/// through the crypto adapter so unknown-client and bad-secret cases are
/// timing-equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    /// Argon2id PHC string; `None` for public clients
    pub client_secret_hash: Option<String>,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<GrantType>,
    pub scopes: Vec<String>,
    pub tenant_id: String,
}

impl OAuthClient {
    pub fn allows_grant(&self, grant: GrantType) -> bool {
        self.grant_types.contains(&grant)
    }

    /// Exact-match check against the registered redirect URIs.
    pub fn allows_redirect_uri(&self, redirect_uri: &str) -> bool {
        self.redirect_uris.iter().any(|u| u == redirect_uri)
    }

    pub fn is_confidential(&self) -> bool {
        self.client_secret_hash.is_some()
    }
}

/// Default `allow` hook for `/authorize`: loopback redirect hosts are always
/// allowed; anything else must match the host serving the request.
pub fn default_redirect_allow(redirect_uri: &str, request_host: Option<&str>) -> bool {
    let host = match host_of(redirect_uri) {
        Some(host) => host,
        None => return false,
    };

    if host == "localhost" || host == "127.0.0.1" || host == "[::1]" {
        return true;
    }

    match request_host {
        Some(request_host) => {
            let request_host = request_host.split(':').next().unwrap_or(request_host);
            host == request_host
        }
        None => false,
    }
}

fn host_of(uri: &str) -> Option<&str> {
    let rest = uri.split_once("://")?.1;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);
    if host.starts_with('[') {
        // Bracketed IPv6 literal, keep the brackets and drop any port.
        host.find(']').map(|end| &host[..=end])
    } else {
        Some(host.split(':').next().unwrap_or(host))
    }
}
