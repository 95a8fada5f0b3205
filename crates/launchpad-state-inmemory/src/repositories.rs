use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use launchpad_core::{
    CoreError, CoreResult, FlightNumber, FlightNumberSequence, Launch, LaunchFilter, LaunchPatch,
    LaunchRepository, PlanetCatalog, SyncAttempt, SyncMarker, SyncStatusRepository, UpdateResult,
};

type LaunchMap = Arc<RwLock<BTreeMap<FlightNumber, Launch>>>;

/// In-memory implementation of the LaunchRepository
pub struct InMemoryLaunchRepository {
    launches: LaunchMap,
}

impl InMemoryLaunchRepository {
    /// Create a new in-memory launch repository
    pub fn new(launches: LaunchMap) -> Self {
        Self { launches }
    }
}

#[async_trait]
impl LaunchRepository for InMemoryLaunchRepository {
    async fn upsert(&self, launch: &Launch) -> CoreResult<()> {
        let mut launches = self.launches.write().await;
        launches.insert(launch.flight_number, launch.clone());
        debug!(flight_number = %launch.flight_number, "Upserted launch");
        Ok(())
    }

    async fn find_one(&self, filter: &LaunchFilter) -> CoreResult<Option<Launch>> {
        let launches = self.launches.read().await;

        let found = match filter.flight_number {
            Some(flight_number) => launches
                .get(&flight_number)
                .filter(|launch| filter.matches(launch)),
            None => launches.values().find(|launch| filter.matches(launch)),
        };

        Ok(found.cloned())
    }

    async fn list(&self, skip: usize, limit: Option<usize>) -> CoreResult<Vec<Launch>> {
        let launches = self.launches.read().await;
        Ok(launches
            .values()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn update_fields(
        &self,
        filter: &LaunchFilter,
        patch: &LaunchPatch,
    ) -> CoreResult<UpdateResult> {
        let mut launches = self.launches.write().await;

        let target = match filter.flight_number {
            Some(flight_number) => launches
                .get_mut(&flight_number)
                .filter(|launch| filter.matches(launch)),
            None => launches.values_mut().find(|launch| filter.matches(launch)),
        };

        Ok(match target {
            Some(launch) => UpdateResult {
                matched: true,
                modified: patch.apply(launch),
            },
            None => UpdateResult::not_found(),
        })
    }

    async fn latest_flight_number(&self) -> CoreResult<Option<FlightNumber>> {
        let launches = self.launches.read().await;
        Ok(launches.keys().next_back().copied())
    }

    async fn count(&self) -> CoreResult<usize> {
        Ok(self.launches.read().await.len())
    }
}

/// In-memory implementation of the FlightNumberSequence
pub struct InMemoryFlightNumberSequence {
    last_allocated: Arc<Mutex<u32>>,
    launches: LaunchMap,
}

impl InMemoryFlightNumberSequence {
    /// Create a new sequence over the shared counter and launch map
    pub fn new(last_allocated: Arc<Mutex<u32>>, launches: LaunchMap) -> Self {
        Self {
            last_allocated,
            launches,
        }
    }
}

#[async_trait]
impl FlightNumberSequence for InMemoryFlightNumberSequence {
    async fn allocate(&self) -> CoreResult<FlightNumber> {
        // Counter lock is held across the max read
        let mut last_allocated = self.last_allocated.lock().await;

        let stored_max = self
            .launches
            .read()
            .await
            .keys()
            .next_back()
            .map_or(0, |n| n.get());

        let next = (*last_allocated)
            .max(stored_max)
            .checked_add(1)
            .ok_or_else(|| CoreError::StateStoreError("Flight number sequence exhausted".into()))?;
        let allocated = FlightNumber::new(next)?;

        *last_allocated = allocated.get();
        Ok(allocated)
    }
}

/// In-memory implementation of the SyncStatusRepository
pub struct InMemorySyncStatusRepository {
    marker: Arc<RwLock<Option<SyncMarker>>>,
    attempt: Arc<RwLock<Option<SyncAttempt>>>,
}

impl InMemorySyncStatusRepository {
    /// Create a new in-memory sync status repository
    pub fn new(
        marker: Arc<RwLock<Option<SyncMarker>>>,
        attempt: Arc<RwLock<Option<SyncAttempt>>>,
    ) -> Self {
        Self { marker, attempt }
    }
}

#[async_trait]
impl SyncStatusRepository for InMemorySyncStatusRepository {
    async fn marker(&self) -> CoreResult<Option<SyncMarker>> {
        Ok(self.marker.read().await.clone())
    }

    async fn record_marker(&self, marker: &SyncMarker) -> CoreResult<()> {
        *self.marker.write().await = Some(marker.clone());
        Ok(())
    }

    async fn attempt(&self) -> CoreResult<Option<SyncAttempt>> {
        Ok(self.attempt.read().await.clone())
    }

    async fn record_attempt(&self, attempt: &SyncAttempt) -> CoreResult<()> {
        *self.attempt.write().await = Some(attempt.clone());
        Ok(())
    }
}

/// In-memory planet catalog keyed by Kepler name
pub struct InMemoryPlanetCatalog {
    planets: Arc<RwLock<BTreeSet<String>>>,
}

impl InMemoryPlanetCatalog {
    /// Create a catalog over a shared planet set
    pub fn new(planets: Arc<RwLock<BTreeSet<String>>>) -> Self {
        Self { planets }
    }

    /// Create a standalone catalog holding the given names
    pub fn with_planets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Arc::new(RwLock::new(
            names.into_iter().map(Into::into).collect(),
        )))
    }

    /// Add a planet
    pub async fn insert(&self, kepler_name: impl Into<String>) {
        self.planets.write().await.insert(kepler_name.into());
    }
}

#[async_trait]
impl PlanetCatalog for InMemoryPlanetCatalog {
    async fn exists(&self, kepler_name: &str) -> CoreResult<bool> {
        Ok(self.planets.read().await.contains(kepler_name))
    }
}
