//! Server binary: wire configuration, storage, SQL, crypto, and the
//! service graph, then serve the axum router until ctrl-c.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use authgrid::adapters::crypto::{AeadCodec, ClientSecretHasher, SigningKeyRing, SEED_LEN};
use authgrid::adapters::http::{create_router, AppState, HttpConfig};
use authgrid::adapters::persistence::{
    AuditSinkSql, ClientRegistrySql, Database, JwtKeysSql, RbacRepositorySql, SessionMirrorSql,
};
use authgrid::adapters::storage::{KvTenantStore, MemoryStorage, SledStorage};
use authgrid::config::AppConfig;
use authgrid::core::tenant::Tenant;
use authgrid::core::usecases::ports::{
    PassthroughResponder, StateCodec, Storage, SystemClock, TenantStore,
};
use authgrid::core::usecases::{
    spawn_consumer, AdminSessionService, AuditService, AuthorizeFlow, BrowserSessionService,
    M2mService, ProviderBridge, RbacConfig, RbacService, RevocationService, SessionConfig,
    ThemeResolver, TokenGrantService, TokenTtlConfig,
};

/// AAD label for sealed signing-key seeds at rest.
const JWT_KEY_AAD: &str = "jwt_keys.seed";
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);
const SWEEP_INTERVAL: Duration = Duration::from_secs(600);
const AUDIT_RETENTION_DAYS: i64 = 90;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().context("configuration")?;

    let storage: Arc<dyn Storage> = match &config.kv_path {
        Some(path) => {
            info!(path, "opening sled KV store");
            Arc::new(SledStorage::open(path).context("open KV store")?)
        }
        None => {
            warn!("no KV path configured; using in-memory storage");
            Arc::new(MemoryStorage::new())
        }
    };

    let db = Database::new_default(&config.database_url)
        .await
        .context("connect database")?;

    let mirror = Arc::new(SessionMirrorSql::new(db.clone()));
    let rbac_repo = Arc::new(RbacRepositorySql::new(db.clone()));
    let clients = Arc::new(ClientRegistrySql::new(db.clone()));
    let audit_sink = Arc::new(AuditSinkSql::new(db.clone(), "token_usage").context("audit table")?);
    let jwt_keys = JwtKeysSql::new(db.clone());

    let codec = Arc::new(AeadCodec::new(&config.session_secret).context("session codec")?);
    let key_codec = AeadCodec::new(&config.provider_secret).context("provider codec")?;
    let signer = Arc::new(
        load_or_generate_keys(&jwt_keys, &key_codec)
            .await
            .context("signing keys")?,
    );
    let secrets = Arc::new(ClientSecretHasher::new().context("secret hasher")?);

    let clock = Arc::new(SystemClock);
    let sessions = Arc::new(BrowserSessionService::new(
        storage.clone(),
        mirror.clone(),
        clock.clone(),
        SessionConfig {
            lifetime_seconds: config.session_ttl_seconds,
            max_accounts_per_session: config.max_accounts_per_session,
            ..SessionConfig::default()
        },
    ));
    let admin_sessions = Arc::new(AdminSessionService::new(mirror.clone(), storage.clone()));
    let rbac = Arc::new(RbacService::new(
        storage.clone(),
        rbac_repo,
        clock.clone(),
        RbacConfig::default(),
    ));
    let revocation = Arc::new(RevocationService::new(storage.clone(), clock.clone()));

    let audit = if config.audit_queue {
        let (audit, rx) = AuditService::queued(audit_sink.clone(), 1024);
        spawn_consumer(rx, audit_sink.clone(), 64);
        Arc::new(audit)
    } else {
        Arc::new(AuditService::direct(audit_sink.clone()))
    };

    let m2m = Arc::new(M2mService::new(signer.clone(), config.issuer_url.clone()));
    let bridge = Arc::new(ProviderBridge::new(UPSTREAM_TIMEOUT));
    if bridge.is_empty() {
        warn!("no upstream providers registered; interactive login is unavailable");
    }

    let tenants = Arc::new(KvTenantStore::new(storage.clone()));
    ensure_default_tenant(tenants.as_ref()).await?;
    let theme = Arc::new(ThemeResolver::new(
        tenants.clone(),
        clock.clone(),
        config.issuer_theme.clone(),
        "default",
    ));

    let flow = Arc::new(AuthorizeFlow::new(
        sessions.clone(),
        rbac.clone(),
        clients.clone(),
        codec.clone(),
        bridge.clone(),
        Arc::new(PassthroughResponder),
        storage.clone(),
        audit.clone(),
        clock.clone(),
        TokenTtlConfig {
            access_ttl_seconds: config.access_ttl_seconds,
            refresh_ttl_seconds: config.refresh_ttl_seconds,
        },
    ));
    let grants = Arc::new(TokenGrantService::new(
        storage.clone(),
        signer.clone(),
        clients.clone(),
        secrets.clone(),
        audit.clone(),
        m2m.clone(),
        config.issuer_url.clone(),
    ));

    let state = AppState {
        storage: storage.clone(),
        tenants,
        clients,
        secrets,
        codec,
        signer,
        sessions,
        admin_sessions: admin_sessions.clone(),
        rbac,
        revocation: revocation.clone(),
        audit: audit.clone(),
        flow,
        grants,
        m2m,
        bridge,
        theme,
        resolver: Arc::new(config.resolver.clone()),
        http: Arc::new(HttpConfig {
            issuer_url: config.issuer_url.clone(),
            cookie_name: config.cookie_name.clone(),
            session_lifetime_seconds: config.session_ttl_seconds,
        }),
        db: Some(db.clone()),
    };

    let sweeper = tokio::spawn(maintenance_sweep(
        storage,
        admin_sessions,
        revocation,
        audit,
    ));

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, issuer = %config.issuer_url, "issuer listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("server")?;

    sweeper.abort();
    db.shutdown().await;
    Ok(())
}

/// Rehydrate the signing ring from `jwt_keys`, generating and persisting a
/// first key on a fresh deployment. Seeds are sealed at rest.
async fn load_or_generate_keys(
    jwt_keys: &JwtKeysSql,
    key_codec: &AeadCodec,
) -> anyhow::Result<SigningKeyRing> {
    let rows = jwt_keys.load_all().await?;

    let mut keys = Vec::with_capacity(rows.len());
    for row in rows {
        let seed = key_codec
            .open(JWT_KEY_AAD, &row.sealed_seed)
            .ok_or_else(|| anyhow::anyhow!("stored key {} failed to unseal", row.kid))?;
        let seed: [u8; SEED_LEN] = seed
            .try_into()
            .map_err(|_| anyhow::anyhow!("stored key {} has a bad seed length", row.kid))?;
        keys.push((row.kid, seed));
    }

    if keys.is_empty() {
        let (kid, seed) = SigningKeyRing::generate_key();
        let sealed = key_codec.seal(JWT_KEY_AAD, &seed)?;
        jwt_keys.insert(&kid, "EdDSA", &sealed).await?;
        info!(%kid, "generated initial signing key");
        keys.push((kid, seed));
    }

    Ok(SigningKeyRing::new(keys)?)
}

/// A fresh deployment gets a `default` tenant so requests resolve before
/// any admin configuration happens.
async fn ensure_default_tenant(tenants: &KvTenantStore) -> anyhow::Result<()> {
    if tenants.list().await?.is_empty() {
        info!("creating default tenant");
        tenants.put(&Tenant::new("default", "Default")).await?;
    }
    Ok(())
}

/// Periodic housekeeping: expired sessions, stale deny-list entries,
/// audit retention, and KV reaping.
async fn maintenance_sweep(
    storage: Arc<dyn Storage>,
    admin_sessions: Arc<AdminSessionService>,
    revocation: Arc<RevocationService>,
    audit: Arc<AuditService>,
) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;

        match admin_sessions
            .cleanup_expired_sessions(7 * 24 * 3600 * 1000)
            .await
        {
            Ok(removed) if removed > 0 => info!(removed, "expired sessions cleaned"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "session cleanup failed"),
        }

        match revocation.clean_expired_revocations().await {
            Ok(removed) if removed > 0 => info!(removed, "stale revocations cleaned"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "revocation cleanup failed"),
        }

        let audit_removed = audit.cleanup(AUDIT_RETENTION_DAYS).await;
        if audit_removed > 0 {
            info!(removed = audit_removed, "audit records expired");
        }

        if let Err(e) = storage.purge_expired().await {
            warn!(error = %e, "KV purge failed");
        }
    }
}
