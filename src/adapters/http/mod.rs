// HTTP adapter: the axum surface over the authorization pipeline.

/*
This module is the transport layer. It is responsible for:
 - Tenant resolution and session attachment middleware
 - Request/response DTOs and their validation
 - Projecting core errors onto HTTP statuses and `{error, message}` bodies
 - Route assembly and the admin auth guard

It is NOT responsible for:
 - Authorization semantics (core::usecases owns the pipeline)
 - Persistence or cryptography
*/

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::{ErrorResponse, HttpError};
pub use router::create_router;
pub use state::{AppState, HttpConfig};
