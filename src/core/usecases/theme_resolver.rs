//! Use case: theme resolution.
//!
//! Priority chain, highest first: the request tenant's branding theme, the
//! issuer-config theme, the default tenant's branding theme (read through a
//! one-hour cache that also caches misses for 30 s), then the built-in
//! fallback. The resolved theme travels with the request; there is no
//! process-global theme slot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::tenant::{ResolvedTheme, Tenant, ThemeSource};
use crate::core::usecases::ports::{Clock, TenantStore};

const POSITIVE_TTL: Duration = Duration::from_secs(3600);
const NEGATIVE_RETRY: Duration = Duration::from_secs(30);

#[derive(Clone)]
enum CacheSlot {
    Empty,
    /// Default tenant's theme (or None when it has no branding theme)
    Hit {
        theme: Option<ResolvedTheme>,
        cached_at: DateTime<Utc>,
    },
    /// Backend failure; retry after the negative window
    Miss { cached_at: DateTime<Utc> },
}

pub struct ThemeResolver {
    tenant_store: Arc<dyn TenantStore>,
    clock: Arc<dyn Clock>,
    issuer_theme: Option<String>,
    default_tenant_id: String,
    cache: RwLock<CacheSlot>,
}

impl ThemeResolver {
    pub fn new(
        tenant_store: Arc<dyn TenantStore>,
        clock: Arc<dyn Clock>,
        issuer_theme: Option<String>,
        default_tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_store,
            clock,
            issuer_theme,
            default_tenant_id: default_tenant_id.into(),
            cache: RwLock::new(CacheSlot::Empty),
        }
    }

    /// Run the priority chain for a request.
    pub async fn resolve(&self, request_tenant: Option<&Tenant>) -> ResolvedTheme {
        if let Some(tenant) = request_tenant {
            if let Some(theme) =
                ResolvedTheme::from_branding(&tenant.branding, ThemeSource::TenantBranding)
            {
                return theme;
            }
        }

        if let Some(name) = &self.issuer_theme {
            return ResolvedTheme::from_issuer_config(name.clone());
        }

        if let Some(theme) = self.default_tenant_theme().await {
            return theme;
        }

        ResolvedTheme::builtin()
    }

    /// Default tenant's branding theme through the single-slot cache.
    /// Thundering-herd on expiry is acceptable.
    async fn default_tenant_theme(&self) -> Option<ResolvedTheme> {
        let now = self.clock.now();
        {
            let slot = self.cache.read().await;
            match &*slot {
                CacheSlot::Hit { theme, cached_at }
                    if age_within(*cached_at, now, POSITIVE_TTL) =>
                {
                    return theme.clone();
                }
                CacheSlot::Miss { cached_at } if age_within(*cached_at, now, NEGATIVE_RETRY) => {
                    return None;
                }
                _ => {}
            }
        }

        let slot = match self.tenant_store.get(&self.default_tenant_id).await {
            Ok(tenant) => {
                let theme = tenant.and_then(|t| {
                    ResolvedTheme::from_branding(&t.branding, ThemeSource::DefaultTenant)
                });
                CacheSlot::Hit {
                    theme,
                    cached_at: now,
                }
            }
            Err(e) => {
                debug!(error = %e, "default tenant read failed; caching miss");
                CacheSlot::Miss { cached_at: now }
            }
        };

        let theme = match &slot {
            CacheSlot::Hit { theme, .. } => theme.clone(),
            _ => None,
        };
        *self.cache.write().await = slot;
        theme
    }
}

fn age_within(cached_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    (now - cached_at).num_seconds() < ttl.as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{KvTenantStore, MemoryStorage};
    use crate::core::tenant::Branding;
    use crate::core::usecases::ports::SystemClock;

    async fn store_with_default_theme(theme: Option<&str>) -> Arc<KvTenantStore> {
        let store = Arc::new(KvTenantStore::new(Arc::new(MemoryStorage::new())));
        let mut tenant = Tenant::new("default", "Default");
        tenant.branding = Branding {
            theme: theme.map(str::to_string),
            ..Default::default()
        };
        store.put(&tenant).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_request_tenant_branding_wins() {
        let store = store_with_default_theme(Some("fallback")).await;
        let resolver = ThemeResolver::new(
            store,
            Arc::new(SystemClock),
            Some("issuer-theme".to_string()),
            "default",
        );

        let mut tenant = Tenant::new("acme", "Acme");
        tenant.branding.theme = Some("acme-dark".to_string());

        let theme = resolver.resolve(Some(&tenant)).await;
        assert_eq!(theme.name, "acme-dark");
        assert_eq!(theme.source, ThemeSource::TenantBranding);
    }

    #[tokio::test]
    async fn test_issuer_config_beats_default_tenant() {
        let store = store_with_default_theme(Some("fallback")).await;
        let resolver = ThemeResolver::new(
            store,
            Arc::new(SystemClock),
            Some("issuer-theme".to_string()),
            "default",
        );

        let tenant = Tenant::new("acme", "Acme");
        let theme = resolver.resolve(Some(&tenant)).await;
        assert_eq!(theme.name, "issuer-theme");
        assert_eq!(theme.source, ThemeSource::IssuerConfig);
    }

    #[tokio::test]
    async fn test_default_tenant_theme_used_when_nothing_else() {
        let store = store_with_default_theme(Some("fallback")).await;
        let resolver = ThemeResolver::new(store, Arc::new(SystemClock), None, "default");

        let theme = resolver.resolve(None).await;
        assert_eq!(theme.name, "fallback");
        assert_eq!(theme.source, ThemeSource::DefaultTenant);
    }

    #[tokio::test]
    async fn test_builtin_fallback() {
        let store = store_with_default_theme(None).await;
        let resolver = ThemeResolver::new(store, Arc::new(SystemClock), None, "default");

        let theme = resolver.resolve(None).await;
        assert_eq!(theme.source, ThemeSource::BuiltIn);
    }

    #[tokio::test]
    async fn test_default_theme_is_cached() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(KvTenantStore::new(storage.clone()));
        let mut tenant = Tenant::new("default", "Default");
        tenant.branding.theme = Some("cached".to_string());
        store.put(&tenant).await.unwrap();

        let resolver = ThemeResolver::new(store.clone(), Arc::new(SystemClock), None, "default");
        assert_eq!(resolver.resolve(None).await.name, "cached");

        // Mutating the record does not show through inside the cache TTL.
        tenant.branding.theme = Some("changed".to_string());
        store.put(&tenant).await.unwrap();
        assert_eq!(resolver.resolve(None).await.name, "cached");
    }
}
