// OAuth / OIDC domain: registered clients, the /authorize request shape,
// authorization codes, refresh-token families, and the subject they all
// speak for.

pub mod authorize;
pub mod client;
pub mod code;
pub mod refresh;
pub mod subject;

pub use authorize::{effective_account, exceeds_max_age, AuthorizeRequest, Prompt};
pub use client::{default_redirect_allow, GrantType, OAuthClient};
pub use code::{verify_pkce_s256, AuthorizationCode, PkceChallenge, CODE_TTL_SECONDS};
pub use refresh::RefreshTokenRecord;
pub use subject::Subject;
