// Persistence adapter: SQL-backed repositories for domain entities.

/*
This module implements the infrastructure layer for relational persistence:
the session mirror, the client registry, the RBAC catalog, the audit trail,
and signing-key storage.

It is responsible for:
 - Connecting to the database and managing the connection pool
 - Mapping database rows to domain entities
 - Executing queries and mutations
 - Validating configurable table identifiers against the allow-list

It is NOT responsible for:
 - Business logic or policy enforcement
 - Cryptography or hashing
 - Token parsing or validation
 - HTTP or network concerns

All repositories implement ports defined in `core::usecases::ports`.
Database errors surface as `StorageError`.
*/

pub mod database;
pub mod models;
pub mod repositories;
pub mod tables;

pub use database::{Database, PoolConfig};
pub use repositories::{
    AuditSinkSql, ClientRegistrySql, JwtKeysSql, RbacRepositorySql, SessionMirrorSql,
};
pub use tables::{validate_table, ALLOWED_TABLES};
