// Database row models: raw representations of persisted data.

/*
These models represent raw database rows before mapping to domain entities.

Important distinctions:
 - Models are NOT domain entities
 - Models use database column names and types directly
 - Models are only used internally in the persistence adapter
 - Mapping to domain entities happens in repository implementations

All row types must implement `sqlx::FromRow` for direct deserialization.
*/

pub mod audit_row;
pub mod client_row;
pub mod jwt_key_row;
pub mod rbac_rows;
pub mod session_rows;

pub use audit_row::AuditRow;
pub use client_row::{encode_list, OAuthClientRow};
pub use jwt_key_row::JwtKeyRow;
pub use rbac_rows::{PermissionRow, RoleRow, UserRoleRow};
pub use session_rows::{AccountSessionRow, BrowserSessionRow};
