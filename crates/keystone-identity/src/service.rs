//! Identity service wiring.

use std::{path::Path, str::FromStr, sync::Arc, time::Instant};

use anyhow::Context;
use keystone_identity_config::{Config, validation};
use keystone_identity_observe::{LogConfig, init_logging, logging};
use keystone_identity_repository::{
    Argon2Hasher, AuthenticatedUser, IdentityStore, Namespace, RepositoryError, RepositoryResult,
};
use keystone_identity_store::{BackendType, MetricsSnapshot, NodeStore, StorageConfig, StoreFactory};
use tracing::Instrument;

/// Facade over a type-erased store handle.
pub type SharedIdentityStore = IdentityStore<Arc<dyn NodeStore>>;

/// Authentications slower than this are logged as warnings.
const SLOW_OPERATION_MS: u128 = 250;

/// Owns the store handle and the facade built on top of it.
pub struct IdentityService {
    config: Config,
    store: Arc<dyn NodeStore>,
    identity: SharedIdentityStore,
}

impl IdentityService {
    /// Load configuration from `path` (plus environment), validate it,
    /// install logging and build the service.
    ///
    /// Validation runs first, so the log filter handed to the subscriber is
    /// known to parse. If a subscriber is already installed it is kept.
    pub fn bootstrap<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config = keystone_identity_config::load(path.as_ref())
            .with_context(|| format!("loading configuration from {:?}", path.as_ref()))?;
        validation::validate(&config).context("invalid identity configuration")?;

        if let Err(e) = init_logging(LogConfig::with_level(&config.logging)) {
            tracing::warn!(error = %e, "Logging setup skipped, keeping the current subscriber");
        }

        Self::build(config)
    }

    /// Build the service from an already loaded configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        validation::validate(&config).context("invalid identity configuration")?;
        Self::build(config)
    }

    fn build(config: Config) -> anyhow::Result<Self> {
        let backend = BackendType::from_str(&config.storage.backend)?;
        let store = StoreFactory::create(&StorageConfig {
            backend,
            connect_string: Some(config.storage.connect_string.clone()),
        })?;

        let namespace = Namespace::new(&config.namespace)?;
        let password = &config.password;
        let hasher = Arc::new(
            Argon2Hasher::new(password.rounds, password.memory_kib, password.salt_len)
                .context("password hasher settings")?,
        );

        let identity = IdentityStore::builder()
            .backend(Arc::clone(&store))
            .namespace(namespace)
            .hasher(hasher)
            .build();

        tracing::info!(
            backend = backend.as_str(),
            namespace = %identity.namespace().root(),
            "Identity service configured"
        );

        Ok(Self { config, store, identity })
    }

    /// Open the store session.
    pub async fn connect(&self) -> anyhow::Result<()> {
        self.store.connect().await.context("connecting to node store")?;
        tracing::info!(connect_string = %self.config.storage.connect_string, "Identity store connected");
        Ok(())
    }

    /// Close the store session. Facade calls fail with `StoreUnavailable`
    /// until the next [`connect`](Self::connect).
    pub async fn disconnect(&self) -> anyhow::Result<()> {
        self.store.disconnect().await.context("disconnecting from node store")?;
        tracing::info!("Identity store disconnected");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    pub fn identity(&self) -> &SharedIdentityStore {
        &self.identity
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store_metrics(&self) -> Option<MetricsSnapshot> {
        self.store.metrics()
    }

    /// [`IdentityStore::authenticate`] inside an `identity` span that records
    /// the outcome and duration.
    pub async fn authenticate(
        &self,
        user_id: &str,
        tenant_id: Option<&str>,
        password: &str,
    ) -> RepositoryResult<AuthenticatedUser> {
        let span = logging::identity_span("authenticate", user_id);
        let start = Instant::now();

        let result = self
            .identity
            .authenticate(user_id, tenant_id, password)
            .instrument(span.clone())
            .await;

        let elapsed = start.elapsed().as_millis();
        let outcome = match &result {
            Ok(_) => "ok",
            Err(RepositoryError::Authentication(_)) => "rejected",
            Err(_) => "error",
        };
        logging::record_outcome(&span, outcome, elapsed);
        logging::log_slow_operation("authenticate", elapsed, SLOW_OPERATION_MS);
        result
    }
}
