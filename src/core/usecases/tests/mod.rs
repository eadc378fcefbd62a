//! Service-level tests over the in-memory fixtures.

mod admin_sessions_tests;
mod rbac_service_tests;
mod session_service_tests;
mod token_grants_tests;
