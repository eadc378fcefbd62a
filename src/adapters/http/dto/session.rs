// Session endpoint DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::session::{AccountSession, BrowserSession};

/// One account as shown to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub user_id: String,
    pub is_active: bool,
    pub authenticated_at: DateTime<Utc>,
    pub subject_type: String,
    pub client_id: String,
}

impl From<&AccountSession> for AccountView {
    fn from(account: &AccountSession) -> Self {
        Self {
            user_id: account.user_id.clone(),
            is_active: account.is_active,
            authenticated_at: account.authenticated_at,
            subject_type: account.subject_type.clone(),
            client_id: account.client_id.clone(),
        }
    }
}

/// `GET /session/accounts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountView>,
}

/// `POST /session/switch`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchAccountRequest {
    pub user_id: String,
}

/// `GET /session/check`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCheckResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_count: Option<usize>,
}

impl SessionCheckResponse {
    pub fn inactive() -> Self {
        Self {
            active: false,
            session_id: None,
            tenant_id: None,
            active_user_id: None,
            account_count: None,
        }
    }

    pub fn from_session(session: &BrowserSession, account_count: usize) -> Self {
        Self {
            active: true,
            session_id: Some(session.id.clone()),
            tenant_id: Some(session.tenant_id.clone()),
            active_user_id: session.active_user_id.clone(),
            account_count: Some(account_count),
        }
    }
}

/// Uniform `{success: true}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
