//! In-memory state store implementation for Launchpad
//!
//! This crate provides in-memory implementations of the repository
//! interfaces defined in launchpad-core. It is useful for development,
//! tests and single-process deployments where persistence is not required.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub mod repositories;
pub use repositories::{
    InMemoryFlightNumberSequence, InMemoryLaunchRepository, InMemoryPlanetCatalog,
    InMemorySyncStatusRepository,
};

use launchpad_core::{FlightNumber, Launch, StateStores, SyncAttempt, SyncMarker};

/// Provider for in-memory state store repositories
#[derive(Default)]
pub struct InMemoryStateStoreProvider {
    // Launch records keyed by flight number
    launches: Arc<RwLock<BTreeMap<FlightNumber, Launch>>>,

    // Last flight number handed out by the sequence
    last_allocated: Arc<Mutex<u32>>,

    // Sync completion marker
    marker: Arc<RwLock<Option<SyncMarker>>>,

    // Most recent sync attempt
    attempt: Arc<RwLock<Option<SyncAttempt>>>,

    // Known planet names
    planets: Arc<RwLock<BTreeSet<String>>>,
}

impl InMemoryStateStoreProvider {
    /// Create a new, empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add planet names to the shared catalog
    pub async fn seed_planets<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut planets = self.planets.write().await;
        planets.extend(names.into_iter().map(Into::into));
        debug!(count = planets.len(), "Seeded planet catalog");
    }

    /// Create repositories sharing this provider's state
    pub fn create_repositories(&self) -> StateStores {
        StateStores {
            launches: Arc::new(InMemoryLaunchRepository::new(self.launches.clone())),
            sequence: Arc::new(InMemoryFlightNumberSequence::new(
                self.last_allocated.clone(),
                self.launches.clone(),
            )),
            sync_status: Arc::new(InMemorySyncStatusRepository::new(
                self.marker.clone(),
                self.attempt.clone(),
            )),
            planets: Arc::new(InMemoryPlanetCatalog::new(self.planets.clone())),
        }
    }
}
