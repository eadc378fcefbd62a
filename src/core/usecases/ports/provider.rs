//! Ports for upstream identity providers and the success seam.
//!
//! Concrete provider protocols (OAuth upstreams, password forms) are out of
//! scope; each one plugs in behind [`UpstreamProvider`]. The pipeline calls
//! [`SuccessResponder::on_success`] when a provider hands back an identity,
//! giving the host application its user lookup/creation hook.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::FlowError;
use crate::core::oauth::Subject;

/// Identity asserted by an upstream provider after its callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub subject_type: String,
    pub subject_id: String,
    pub properties: serde_json::Value,
    /// App-supplied roles, set-union merged with RBAC-derived ones
    #[serde(default)]
    pub roles: Vec<String>,
    /// App-supplied permissions, set-union merged with RBAC-derived ones
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// What the provider wants the browser to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderAction {
    /// Redirect the browser to the provider (or an interstitial)
    Redirect { url: String },
    /// Render provider-owned HTML (a login form, say)
    Render { html: String },
}

/// Contract for an upstream identity provider.
///
/// Implementations register under their name; the bridge serves
/// `/{provider}/authorize` and `/{provider}/callback` on their behalf and
/// enforces a wall-clock timeout around both calls.
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// Registration name, unique per deployment (`google`, `password`, ...).
    fn name(&self) -> &str;

    /// Protocol family, advertised in admin listings.
    fn kind(&self) -> &str;

    /// Start the upstream round-trip. `state` is the opaque blob the
    /// provider must thread through to its callback.
    async fn begin(&self, state: &str) -> Result<ProviderAction, FlowError>;

    /// Complete the upstream round-trip from callback parameters.
    /// Returns the asserted identity and the threaded-through state blob.
    async fn callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<(ProviderIdentity, String), FlowError>;
}

/// The success seam: invoked once per provider return, before the OAuth
/// response completes. Looks up or creates the user record.
#[async_trait]
pub trait SuccessResponder: Send + Sync {
    async fn on_success(
        &self,
        tenant_id: &str,
        identity: &ProviderIdentity,
    ) -> Result<Subject, FlowError>;
}

/// Default responder: pass the provider identity through as the subject.
pub struct PassthroughResponder;

#[async_trait]
impl SuccessResponder for PassthroughResponder {
    async fn on_success(
        &self,
        _tenant_id: &str,
        identity: &ProviderIdentity,
    ) -> Result<Subject, FlowError> {
        Ok(Subject::new(
            identity.subject_type.clone(),
            identity.subject_id.clone(),
            identity.properties.clone(),
        ))
    }
}
