//! Multi-tenant OAuth 2.1 / OpenID Connect issuer.
//!
//! A single deployment serves many isolated tenants, each with its own
//! client registry, users, role graph, and branding. The crate is split
//! hexagonally:
//!
//! - [`core`]: domain types, errors, ports, and the use-case services
//!   (the authorization pipeline: sessions, `/authorize`, token grants,
//!   RBAC, revocation, audit, M2M)
//! - [`adapters`]: infrastructure behind the ports: ordered KV storage (memory/sled),
//!   SQL persistence (sqlx/Postgres), crypto (AEAD cookies, Ed25519 JWT
//!   ring, Argon2id secrets), and the axum HTTP surface
//!
//! The binary in `main.rs` wires the two together from environment
//! configuration.

pub mod adapters;
pub mod config;
pub mod core;
