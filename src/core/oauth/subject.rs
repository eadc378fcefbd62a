use serde::{Deserialize, Serialize};

/// The authenticated principal an authorization grant speaks for.
///
/// `properties` is opaque to the pipeline; providers and the RBAC
/// enrichment step populate it (email, display name, roles, permissions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_type: String,
    pub subject_id: String,
    pub properties: serde_json::Value,
}

impl Subject {
    pub fn new(
        subject_type: impl Into<String>,
        subject_id: impl Into<String>,
        properties: serde_json::Value,
    ) -> Self {
        Self {
            subject_type: subject_type.into(),
            subject_id: subject_id.into(),
            properties,
        }
    }

    /// Roles carried in the subject properties, if any.
    pub fn roles(&self) -> Vec<String> {
        string_list(&self.properties, "roles")
    }

    /// Permissions carried in the subject properties, if any.
    pub fn permissions(&self) -> Vec<String> {
        string_list(&self.properties, "permissions")
    }
}

fn string_list(value: &serde_json::Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_and_permissions_projection() {
        let subject = Subject::new(
            "user",
            "u1",
            json!({"roles": ["editor", 7, "viewer"], "email": "u1@example.com"}),
        );
        assert_eq!(subject.roles(), vec!["editor", "viewer"]);
        assert!(subject.permissions().is_empty());
    }
}
