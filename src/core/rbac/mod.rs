// RBAC domain: the role/permission catalog, assignment join rows, and the
// claim-enrichment rules (dedupe, cap, app-claim merge).

pub mod assignment;
pub mod enrichment;
pub mod permission;
pub mod role;

pub use assignment::{RolePermission, UserRole};
pub use enrichment::{CachedPermissions, EnrichedClaims, MAX_PERMISSIONS_IN_TOKEN};
pub use permission::Permission;
pub use role::{is_valid_role_name, Role};
