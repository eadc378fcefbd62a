// Browser-session domain: the session container, the accounts inside it,
// and the encrypted cookie payload that anchors it to a browser.

pub mod account_session;
pub mod browser_session;
pub mod cookie;

pub use account_session::{
    eviction_candidate, promotion_candidate, AccountSession, NewAccount,
};
pub use browser_session::BrowserSession;
pub use cookie::SessionCookie;
