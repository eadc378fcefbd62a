use serde::{Deserialize, Serialize};

use crate::core::session::AccountSession;

/// OIDC prompt parameter. Controls how much UI the authorization endpoint
/// is allowed (or required) to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    None,
    Login,
    Consent,
    SelectAccount,
}

impl Prompt {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "login" => Some(Self::Login),
            "consent" => Some(Self::Consent),
            "select_account" => Some(Self::SelectAccount),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Login => "login",
            Self::Consent => "consent",
            Self::SelectAccount => "select_account",
        }
    }
}

/// Validated inputs to the `/authorize` front controller.
///
/// Construction happens in the HTTP layer; the pipeline itself never parses
/// query strings. Serializable because the request rides the sealed
/// authorization-state blob across the provider round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub prompt: Option<Prompt>,
    pub login_hint: Option<String>,
    pub account_hint: Option<String>,
    /// Seconds since authentication beyond which re-auth is forced
    pub max_age: Option<u64>,
    pub audience: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
}

/// Which account the request effectively speaks for, after hint overrides.
///
/// Starts from the session's active account; `account_hint` overrides when
/// it names an account in-session; `login_hint` (case-insensitive email)
/// overrides after that. Returns the winning account and whether it differs
/// from the currently active one (the caller must then switch).
pub fn effective_account<'a>(
    accounts: &'a [AccountSession],
    active_user_id: Option<&str>,
    account_hint: Option<&str>,
    login_hint: Option<&str>,
) -> Option<(&'a AccountSession, bool)> {
    let mut chosen: Option<&AccountSession> = active_user_id
        .and_then(|uid| accounts.iter().find(|a| a.user_id == uid));

    if let Some(hint) = account_hint {
        if let Some(hit) = accounts.iter().find(|a| a.user_id == hint) {
            chosen = Some(hit);
        }
    }

    if let Some(email) = login_hint {
        if let Some(hit) = accounts.iter().find(|a| a.email_matches(email)) {
            chosen = Some(hit);
        }
    }

    chosen.map(|account| {
        let switched = active_user_id != Some(account.user_id.as_str());
        (account, switched)
    })
}

/// `max_age` check: true when the account authenticated longer ago than the
/// requested bound, forcing re-authentication.
pub fn exceeds_max_age(
    account: &AccountSession,
    max_age_seconds: u64,
    now: chrono::DateTime<chrono::Utc>,
) -> bool {
    let age = now - account.authenticated_at;
    age.num_milliseconds() > (max_age_seconds as i64).saturating_mul(1000)
}
