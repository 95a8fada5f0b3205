//! Launchpad process bootstrap
//!
//! Builds the configured store, seeds the planet catalog, wires the launch
//! services and runs the startup sync against the SpaceX API.

pub mod config;

use std::sync::Arc;
use tracing::{info, instrument};

use launchpad_core::{
    CoreResult, ExternalLaunchFetcher, LaunchService, LaunchServiceDeps, StateStores,
    SyncOrchestrator, SyncOutcome,
};
use launchpad_spacex::SpaceXClient;
use launchpad_state_inmemory::InMemoryStateStoreProvider;
use launchpad_state_sql::SqlStateStoreProvider;

pub use config::{LaunchpadConfig, StoreKind};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured filter applies.
pub fn init_tracing(config: &LaunchpadConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))
}

/// Open the store selected by `store_url` and seed its planet catalog
#[instrument(skip(config), fields(store_url = %config.store_url))]
pub async fn open_store(config: &LaunchpadConfig) -> CoreResult<StateStores> {
    match config.store_kind()? {
        StoreKind::InMemory => {
            let provider = InMemoryStateStoreProvider::new();
            provider.seed_planets(config.known_planets.iter().cloned()).await;
            Ok(provider.create_repositories())
        }
        StoreKind::Sqlite(url) => {
            let provider = SqlStateStoreProvider::new(&url).await?;
            let catalog = provider.planet_catalog();
            for planet in &config.known_planets {
                catalog.insert(planet).await?;
            }
            Ok(provider.create_repositories())
        }
    }
}

/// A bootstrapped Launchpad instance
pub struct Launchpad {
    /// Store handles
    pub stores: StateStores,
    /// Boundary operations for the routing layer
    pub launches: LaunchService,
}

impl Launchpad {
    /// Wire services over already-opened stores
    pub fn new(stores: StateStores, config: &LaunchpadConfig) -> Self {
        let launches = LaunchService::new(LaunchServiceDeps {
            launch_repo: stores.launches.clone(),
            sequence: stores.sequence.clone(),
            planets: stores.planets.clone(),
            defaults: config.schedule_defaults(),
        });

        Self { stores, launches }
    }

    /// Run the startup sync with the given fetcher
    pub async fn bootstrap(
        &self,
        fetcher: Arc<dyn ExternalLaunchFetcher>,
    ) -> CoreResult<SyncOutcome> {
        SyncOrchestrator::new(
            self.stores.launches.clone(),
            self.stores.sync_status.clone(),
            fetcher,
        )
        .ensure_bootstrapped()
        .await
    }
}

/// Open the store, sync from SpaceX and report what is stored
pub async fn run(config: LaunchpadConfig) -> CoreResult<Launchpad> {
    let stores = open_store(&config).await?;
    let launchpad = Launchpad::new(stores, &config);

    let fetcher = Arc::new(SpaceXClient::new(config.spacex_client_config())?);
    match launchpad.bootstrap(fetcher).await? {
        SyncOutcome::Synced(summary) => info!(
            fetched = summary.fetched,
            stored = summary.stored,
            skipped = summary.skipped.len(),
            "Bootstrap sync finished"
        ),
        SyncOutcome::AlreadyBootstrapped { evidence } => {
            info!(?evidence, "Bootstrap sync not needed")
        }
    }

    let records = launchpad.stores.launches.count().await?;
    let latest_flight_number = launchpad.launches.latest_flight_number().await?;
    info!(records, latest_flight_number, "Launch catalog ready");

    Ok(launchpad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(store_url: &str) -> LaunchpadConfig {
        LaunchpadConfig {
            store_url: store_url.to_string(),
            known_planets: vec!["Kepler-62 f".to_string(), "Kepler-442 b".to_string()],
            ..LaunchpadConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_store_seeds_planets() {
        for store_url in ["memory://", "sqlite::memory:"] {
            let stores = open_store(&config(store_url)).await.unwrap();

            assert!(stores.planets.exists("Kepler-62 f").await.unwrap());
            assert!(stores.planets.exists("Kepler-442 b").await.unwrap());
            assert!(!stores.planets.exists("Kepler-1652 b").await.unwrap());
            assert_eq!(stores.launches.count().await.unwrap(), 0, "store {store_url}");
        }
    }

    #[tokio::test]
    async fn test_open_store_rejects_unknown_scheme() {
        let err = open_store(&config("postgres://localhost/launchpad"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, launchpad_core::CoreError::ConfigurationError(_)));
    }
}
