// HTTP middleware: tenant resolution, session attachment, and the two
// bearer-auth flavors (raw extraction, M2M admin verification).

pub mod admin_auth;
pub mod auth;
pub mod session;
pub mod tenant;

pub use admin_auth::{m2m_admin_auth, ADMIN_SCOPE};
pub use auth::{bearer_auth, BearerToken};
pub use session::{
    attach_session, clear_cookie_header, session_cookie_header, SessionContext,
};
pub use tenant::resolve_tenant;
