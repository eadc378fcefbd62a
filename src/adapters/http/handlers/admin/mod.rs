// Admin surface handlers: tenants, clients, RBAC catalog, session
// inspection, provider listing. All guarded by the admin M2M scope.

pub mod clients;
pub mod providers;
pub mod rbac_admin;
pub mod sessions_admin;
pub mod tenants;
