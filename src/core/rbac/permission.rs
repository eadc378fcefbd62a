use serde::{Deserialize, Serialize};

/// An app-scoped permission. Permissions belong to a client, not a tenant:
/// the same tenant can run several apps with disjoint permission sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub client_id: String,
    /// Canonical `resource:action` style name, e.g. `posts:read`
    pub name: String,
    pub resource: String,
    pub action: String,
}

impl Permission {
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        let resource = resource.into();
        let action = action.into();
        Self {
            id: id.into(),
            client_id: client_id.into(),
            name: format!("{}:{}", resource, action),
            resource,
            action,
        }
    }
}
