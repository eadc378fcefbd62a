use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::oauth::Subject;

/// Record behind `oauth:refresh:<subject>:<tokenId>`.
///
/// Successive rotations form a family chain through `parent_token_id`.
/// Presenting any token other than the current head is reuse: the whole
/// family (every record under the subject's refresh prefix) is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token_id: String,
    pub client_id: String,
    pub subject: Subject,
    pub ttl_seconds: u64,
    /// Access-token lifetime granted at each rotation of this family
    pub access_ttl_seconds: u64,
    /// Rotation depth, starting at 1 for the code-redemption issue
    pub generation: u32,
    #[serde(default)]
    pub parent_token_id: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// First token of a family, minted at code redemption.
    pub fn root(
        client_id: impl Into<String>,
        subject: Subject,
        ttl_seconds: u64,
        access_ttl_seconds: u64,
        scope: Option<String>,
        audience: Option<String>,
    ) -> Self {
        Self {
            token_id: Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            subject,
            ttl_seconds,
            access_ttl_seconds,
            generation: 1,
            parent_token_id: None,
            scope,
            audience,
            created_at: Utc::now(),
        }
    }

    /// Rotate: a new token id referencing this record as parent.
    pub fn rotate(&self) -> Self {
        Self {
            token_id: Uuid::new_v4().to_string(),
            client_id: self.client_id.clone(),
            subject: self.subject.clone(),
            ttl_seconds: self.ttl_seconds,
            access_ttl_seconds: self.access_ttl_seconds,
            generation: self.generation + 1,
            parent_token_id: Some(self.token_id.clone()),
            scope: self.scope.clone(),
            audience: self.audience.clone(),
            created_at: Utc::now(),
        }
    }
}
