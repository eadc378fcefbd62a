// Table identifier allow-list.
//
// Repositories that take a table name (the audit sink is configurable)
// validate it here before it is ever interpolated into SQL text.

use crate::core::error::StorageError;

/// Every table this adapter may touch. Anything else is rejected.
pub const ALLOWED_TABLES: &[&str] = &[
    "browser_sessions",
    "account_sessions",
    "oauth_clients",
    "rbac_roles",
    "rbac_permissions",
    "rbac_user_roles",
    "rbac_role_permissions",
    "token_usage",
    "jwt_keys",
];

/// Validate a table identifier against the allow-list.
pub fn validate_table(name: &str) -> Result<&str, StorageError> {
    if ALLOWED_TABLES.contains(&name) {
        Ok(name)
    } else {
        Err(StorageError::invalid_table(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tables_pass() {
        assert_eq!(validate_table("token_usage").unwrap(), "token_usage");
        assert_eq!(validate_table("jwt_keys").unwrap(), "jwt_keys");
    }

    #[test]
    fn test_unknown_and_hostile_identifiers_fail() {
        assert!(validate_table("users").is_err());
        assert!(validate_table("token_usage; DROP TABLE jwt_keys").is_err());
        assert!(validate_table("").is_err());
    }
}
