/// Errors related to browser and account sessions.

/*
 This error type answers the question: "Does the session state the caller
named actually exist?" It covers lookups and mutations of browser sessions
and the accounts inside them. Cookie integrity failures are NOT errors -
they resolve to "no session present" upstream of this type.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The named user is not an account in the browser session
    AccountNotFound { user_id: String },
    /// No browser session exists for the given identifier
    SessionNotFound { session_id: String },
}

impl SessionError {
    pub fn account_not_found(user_id: impl Into<String>) -> Self {
        Self::AccountNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    /// Stable machine code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountNotFound { .. } => "account_not_found",
            Self::SessionNotFound { .. } => "session_not_found",
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNotFound { user_id } => {
                write!(f, "Account not found in session: {}", user_id)
            }
            Self::SessionNotFound { session_id } => {
                write!(f, "Session not found: {}", session_id)
            }
        }
    }
}

impl std::error::Error for SessionError {}
