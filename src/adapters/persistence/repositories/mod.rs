// SQL-backed repository implementations.

/*
Repositories implement the port interfaces defined in `core::usecases::ports`.

Each repository:
 - Uses the database connection pool
 - Maps database rows to domain entities
 - Translates database errors to storage errors
 - Does NOT contain business logic
*/

pub mod audit_sink_sql;
pub mod client_registry_sql;
pub mod jwt_keys_sql;
pub mod rbac_repository_sql;
pub mod session_mirror_sql;

pub use audit_sink_sql::AuditSinkSql;
pub use client_registry_sql::ClientRegistrySql;
pub use jwt_keys_sql::JwtKeysSql;
pub use rbac_repository_sql::RbacRepositorySql;
pub use session_mirror_sql::SessionMirrorSql;
