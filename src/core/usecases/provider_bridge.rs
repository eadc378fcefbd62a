//! Use case: upstream provider bridge.
//!
//! Holds the registered providers and fronts every upstream round-trip with
//! a wall-clock timeout. Timeouts and registry misses both surface as
//! `provider_error`; the pipeline never distinguishes a slow provider from
//! a broken one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::timeout;

use crate::core::error::FlowError;
use crate::core::usecases::ports::{ProviderAction, ProviderIdentity, UpstreamProvider};

pub struct ProviderBridge {
    providers: DashMap<String, Arc<dyn UpstreamProvider>>,
    upstream_timeout: Duration,
}

impl ProviderBridge {
    pub fn new(upstream_timeout: Duration) -> Self {
        Self {
            providers: DashMap::new(),
            upstream_timeout,
        }
    }

    /// Register a provider under its name. Last registration wins.
    pub fn register(&self, provider: Arc<dyn UpstreamProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Registered provider names, sorted for stable rendering.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.providers.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn get(&self, name: &str) -> Result<Arc<dyn UpstreamProvider>, FlowError> {
        self.providers
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FlowError::provider_error(format!("unknown provider: {}", name)))
    }

    /// Start the upstream round-trip for `name`, bounded by the timeout.
    pub async fn begin(&self, name: &str, state: &str) -> Result<ProviderAction, FlowError> {
        let provider = self.get(name)?;
        match timeout(self.upstream_timeout, provider.begin(state)).await {
            Ok(result) => result,
            Err(_) => Err(FlowError::provider_error(format!(
                "provider {} timed out",
                name
            ))),
        }
    }

    /// Complete the upstream round-trip from callback parameters.
    pub async fn callback(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<(ProviderIdentity, String), FlowError> {
        let provider = self.get(name)?;
        match timeout(self.upstream_timeout, provider.callback(params)).await {
            Ok(result) => result,
            Err(_) => Err(FlowError::provider_error(format!(
                "provider {} timed out",
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct SlowProvider;

    #[async_trait]
    impl UpstreamProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        fn kind(&self) -> &str {
            "test"
        }

        async fn begin(&self, _state: &str) -> Result<ProviderAction, FlowError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("timeout fires first");
        }

        async fn callback(
            &self,
            _params: &HashMap<String, String>,
        ) -> Result<(ProviderIdentity, String), FlowError> {
            Ok((
                ProviderIdentity {
                    subject_type: "user".to_string(),
                    subject_id: "u1".to_string(),
                    properties: json!({}),
                    roles: vec![],
                    permissions: vec![],
                },
                "state".to_string(),
            ))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_timeout_maps_to_provider_error() {
        let bridge = ProviderBridge::new(Duration::from_secs(5));
        bridge.register(Arc::new(SlowProvider));

        let result = bridge.begin("slow", "blob").await;
        assert!(matches!(result, Err(FlowError::ProviderError { .. })));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_provider_error() {
        let bridge = ProviderBridge::new(Duration::from_secs(5));
        assert!(matches!(
            bridge.begin("ghost", "blob").await,
            Err(FlowError::ProviderError { .. })
        ));
    }
}
