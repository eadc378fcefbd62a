/// SQL-backed implementation of the OAuth client registry.
///
/// Implements operations against the `oauth_clients` table. List-valued
/// columns (redirect URIs, grant types, scopes) are stored as JSON text and
/// decoded in the row model.

use async_trait::async_trait;

use crate::adapters::persistence::database::Database;
use crate::adapters::persistence::models::{encode_list, OAuthClientRow};
use crate::core::error::StorageError;
use crate::core::oauth::OAuthClient;
use crate::core::usecases::ports::ClientRegistry;

pub struct ClientRegistrySql {
    db: Database,
}

impl ClientRegistrySql {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn query_failed(what: &str, e: sqlx::Error) -> StorageError {
        StorageError::unavailable(format!("{}: {}", what, e))
    }
}

#[async_trait]
impl ClientRegistry for ClientRegistrySql {
    async fn get(&self, client_id: &str) -> Result<Option<OAuthClient>, StorageError> {
        const QUERY: &str = r#"
            SELECT client_id, client_secret_hash, redirect_uris, grant_types, scopes, tenant_id
            FROM oauth_clients
            WHERE client_id = $1
        "#;

        let row = sqlx::query_as::<_, OAuthClientRow>(QUERY)
            .bind(client_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to query client", e))?;

        row.map(OAuthClientRow::into_domain).transpose()
    }

    async fn put(&self, client: &OAuthClient) -> Result<(), StorageError> {
        const QUERY: &str = r#"
            INSERT INTO oauth_clients
            (client_id, client_secret_hash, redirect_uris, grant_types, scopes, tenant_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (client_id) DO UPDATE SET
                client_secret_hash = EXCLUDED.client_secret_hash,
                redirect_uris = EXCLUDED.redirect_uris,
                grant_types = EXCLUDED.grant_types,
                scopes = EXCLUDED.scopes
        "#;

        let grant_names: Vec<String> = client
            .grant_types
            .iter()
            .map(|g| g.as_str().to_string())
            .collect();

        sqlx::query(QUERY)
            .bind(&client.client_id)
            .bind(&client.client_secret_hash)
            .bind(encode_list(&client.redirect_uris))
            .bind(encode_list(&grant_names))
            .bind(encode_list(&client.scopes))
            .bind(&client.tenant_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to upsert client", e))?;

        Ok(())
    }

    async fn delete(&self, client_id: &str) -> Result<bool, StorageError> {
        const QUERY: &str = "DELETE FROM oauth_clients WHERE client_id = $1";

        let result = sqlx::query(QUERY)
            .bind(client_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to delete client", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<OAuthClient>, StorageError> {
        const QUERY: &str = r#"
            SELECT client_id, client_secret_hash, redirect_uris, grant_types, scopes, tenant_id
            FROM oauth_clients
            WHERE tenant_id = $1
            ORDER BY client_id
        "#;

        let rows = sqlx::query_as::<_, OAuthClientRow>(QUERY)
            .bind(tenant_id)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| Self::query_failed("failed to list clients", e))?;

        rows.into_iter().map(OAuthClientRow::into_domain).collect()
    }
}
