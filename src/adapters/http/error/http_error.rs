// HTTP-specific error projection for the issuer surface.

/*
This module maps core errors onto the wire contract.

Design Principles:
 - **Stable codes**: the `error` field is a machine code fixed in the API
 - **Projection**: core errors map to HTTP status codes here, nowhere else
 - **User-safe**: messages are safe to expose to clients
 - **Redirect rule**: OAuth failures with a trustworthy redirect target are
   handled by the authorize handler before they ever become an HttpError;
   anything reaching this type renders JSON

Status mapping:
 - `tenant_not_found`, `account_not_found`, `session_not_found` → 404
 - `privilege_escalation` → 403
 - token verification failures → 401
 - `server_error` (storage trouble; authorization fails closed) → 500
 - everything else (invalid_request, invalid_grant, ...) → 400
*/

use axum::http::StatusCode;
use axum::Json;

use crate::adapters::http::error::error_response::ErrorResponse;
use crate::core::error::CoreError;

#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "server_error", message)
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        use crate::core::error::{RbacError, SessionError, TenantError};

        let status = match &err {
            CoreError::Tenant(TenantError::NotFound { .. }) => StatusCode::NOT_FOUND,
            CoreError::Tenant(_) => StatusCode::FORBIDDEN,
            CoreError::Session(SessionError::AccountNotFound { .. })
            | CoreError::Session(SessionError::SessionNotFound { .. }) => StatusCode::NOT_FOUND,
            CoreError::Rbac(RbacError::PrivilegeEscalation { .. }) => StatusCode::FORBIDDEN,
            CoreError::Rbac(RbacError::RoleNotFound { .. })
            | CoreError::Rbac(RbacError::PermissionNotFound { .. }) => StatusCode::NOT_FOUND,
            CoreError::Rbac(_) => StatusCode::BAD_REQUEST,
            CoreError::Token(_) => StatusCode::UNAUTHORIZED,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CoreError::Flow(_) => StatusCode::BAD_REQUEST,
        };

        Self {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for HttpError {}

impl axum::response::IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse {
            error: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
