/// Errors raised by the role and permission subsystem.

/*
 This error type answers the question: "Was the RBAC mutation allowed?"
Read-path failures (cache miss, storage trouble) are storage errors, not
RBAC errors; authorization reads fail closed elsewhere. These variants
cover catalog mutations and the assignment guards.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RbacError {
    /// A non-system assigner attempted to grant a system role they lack
    PrivilegeEscalation { role: String },
    /// System roles cannot be updated or deleted
    CannotModifySystemRole { role: String },
    /// An assigner attempted to grant a role to themselves
    SelfAssignment { user_id: String },
    /// Role name does not match `[A-Za-z0-9_-]+`
    InvalidRoleName { name: String },
    /// No role exists with the given identifier
    RoleNotFound { role_id: String },
    /// No permission exists with the given identifier
    PermissionNotFound { permission_id: String },
}

impl RbacError {
    pub fn privilege_escalation(role: impl Into<String>) -> Self {
        Self::PrivilegeEscalation { role: role.into() }
    }

    pub fn cannot_modify_system_role(role: impl Into<String>) -> Self {
        Self::CannotModifySystemRole { role: role.into() }
    }

    pub fn self_assignment(user_id: impl Into<String>) -> Self {
        Self::SelfAssignment {
            user_id: user_id.into(),
        }
    }

    pub fn invalid_role_name(name: impl Into<String>) -> Self {
        Self::InvalidRoleName { name: name.into() }
    }

    pub fn role_not_found(role_id: impl Into<String>) -> Self {
        Self::RoleNotFound {
            role_id: role_id.into(),
        }
    }

    pub fn permission_not_found(permission_id: impl Into<String>) -> Self {
        Self::PermissionNotFound {
            permission_id: permission_id.into(),
        }
    }

    /// Stable machine code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PrivilegeEscalation { .. } => "privilege_escalation",
            Self::CannotModifySystemRole { .. } => "cannot_modify_system_role",
            Self::SelfAssignment { .. } => "self_assignment",
            Self::InvalidRoleName { .. } => "invalid_role_name",
            Self::RoleNotFound { .. } => "role_not_found",
            Self::PermissionNotFound { .. } => "permission_not_found",
        }
    }
}

impl std::fmt::Display for RbacError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrivilegeEscalation { role } => {
                write!(f, "Assigner does not hold system role: {}", role)
            }
            Self::CannotModifySystemRole { role } => {
                write!(f, "System role cannot be modified: {}", role)
            }
            Self::SelfAssignment { user_id } => {
                write!(f, "Users cannot assign roles to themselves: {}", user_id)
            }
            Self::InvalidRoleName { name } => write!(f, "Invalid role name: {}", name),
            Self::RoleNotFound { role_id } => write!(f, "Role not found: {}", role_id),
            Self::PermissionNotFound { permission_id } => {
                write!(f, "Permission not found: {}", permission_id)
            }
        }
    }
}

impl std::error::Error for RbacError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_codes() {
        assert_eq!(
            RbacError::privilege_escalation("super-admin").code(),
            "privilege_escalation"
        );
        assert_eq!(
            RbacError::cannot_modify_system_role("super-admin").code(),
            "cannot_modify_system_role"
        );
        assert_eq!(RbacError::self_assignment("u1").code(), "self_assignment");
    }
}
