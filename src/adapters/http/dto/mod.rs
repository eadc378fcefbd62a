// Request/response DTOs for the HTTP surface.

pub mod admin;
pub mod oauth;
pub mod rbac;
pub mod session;

pub use admin::{
    AssignRoleRequest, CleanupRequest, CleanupResponse, ClientView, CreateClientRequest,
    CreatePermissionRequest, CreateRoleRequest, CreateTenantRequest, GrantPermissionRequest,
    PageQuery, ProviderView, RevokeSessionResponse, RevokeUserSessionsResponse,
    UnassignRoleRequest, UpdateRoleRequest, UpdateTenantRequest,
};
pub use oauth::{AuthorizeQuery, TokenForm};
pub use rbac::{
    CheckBatchRequest, CheckBatchResponse, CheckPermissionRequest, CheckPermissionResponse,
    PermissionsResponse, RolesResponse,
};
pub use session::{
    AccountView, AccountsResponse, SessionCheckResponse, SuccessResponse, SwitchAccountRequest,
};
