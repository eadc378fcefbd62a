// Tenant domain types: the tenant record, request-to-tenant resolution,
// and theme composition.

pub mod resolution;
pub mod tenant;
pub mod theme;

pub use resolution::{resolve_hint, RequestHints, ResolverConfig, TenantHint};
pub use tenant::{Branding, Tenant, TenantStatus};
pub use theme::{ResolvedTheme, ThemeSource, BUILTIN_THEME};
