// OAuth endpoint DTOs

use serde::Deserialize;

use crate::adapters::http::error::HttpError;
use crate::core::oauth::{AuthorizeRequest, Prompt};
use crate::core::usecases::TokenRequest;

/// Raw `/authorize` query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeQuery {
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub prompt: Option<String>,
    pub login_hint: Option<String>,
    pub account_hint: Option<String>,
    pub max_age: Option<u64>,
    pub audience: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
}

impl AuthorizeQuery {
    /// Validate presence of the required parameters and parse enums.
    pub fn into_domain(self) -> Result<AuthorizeRequest, HttpError> {
        let client_id = require(self.client_id, "client_id")?;
        let redirect_uri = require(self.redirect_uri, "redirect_uri")?;
        let response_type = require(self.response_type, "response_type")?;

        let prompt = match self.prompt.as_deref() {
            Some(raw) => Some(Prompt::parse(raw).ok_or_else(|| {
                HttpError::bad_request("invalid_request", format!("unknown prompt: {}", raw))
            })?),
            None => None,
        };

        Ok(AuthorizeRequest {
            client_id,
            redirect_uri,
            response_type,
            scope: self.scope,
            state: self.state,
            nonce: self.nonce,
            prompt,
            login_hint: self.login_hint,
            account_hint: self.account_hint,
            max_age: self.max_age,
            audience: self.audience,
            code_challenge: self.code_challenge,
            code_challenge_method: self.code_challenge_method,
        })
    }
}

fn require(value: Option<String>, name: &str) -> Result<String, HttpError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| HttpError::bad_request("invalid_request", format!("{} is required", name)))
}

/// `/token` form body.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

impl From<TokenForm> for TokenRequest {
    fn from(form: TokenForm) -> Self {
        TokenRequest {
            grant_type: form.grant_type,
            code: form.code,
            redirect_uri: form.redirect_uri,
            code_verifier: form.code_verifier,
            refresh_token: form.refresh_token,
            client_id: form.client_id,
            client_secret: form.client_secret,
            scope: form.scope,
        }
    }
}
