/// Raw database row for a registered OAuth client (`oauth_clients`).

use sqlx::FromRow;

use crate::core::error::StorageError;
use crate::core::oauth::{GrantType, OAuthClient};

#[derive(Debug, Clone, FromRow)]
pub struct OAuthClientRow {
    pub client_id: String,
    /// Argon2id PHC string; NULL for public clients
    pub client_secret_hash: Option<String>,
    /// JSON array text
    pub redirect_uris: String,
    /// JSON array text of grant type names
    pub grant_types: String,
    /// JSON array text
    pub scopes: String,
    pub tenant_id: String,
}

impl OAuthClientRow {
    pub fn into_domain(self) -> Result<OAuthClient, StorageError> {
        let redirect_uris: Vec<String> = parse_list(&self.redirect_uris, "redirect_uris")?;
        let grant_names: Vec<String> = parse_list(&self.grant_types, "grant_types")?;
        let scopes: Vec<String> = parse_list(&self.scopes, "scopes")?;

        let grant_types = grant_names
            .iter()
            .filter_map(|name| GrantType::parse(name))
            .collect();

        Ok(OAuthClient {
            client_id: self.client_id,
            client_secret_hash: self.client_secret_hash,
            redirect_uris,
            grant_types,
            scopes,
            tenant_id: self.tenant_id,
        })
    }
}

pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn parse_list(text: &str, column: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(text)
        .map_err(|e| StorageError::serialization(format!("corrupt {}: {}", column, e)))
}
