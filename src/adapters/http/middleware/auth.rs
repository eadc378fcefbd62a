// Bearer token authentication middleware

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// Bearer token pulled off the Authorization header, for handlers.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Extract the Bearer token from the Authorization header and store it in
/// request extensions.
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing
/// - Header does not start with "Bearer "
/// - Token is empty
pub async fn bearer_auth(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let token = {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }
        token.to_string()
    };

    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}
