//! Repository traits for Launchpad
//!
//! This module defines the storage and collaborator seams used by the
//! application services. The state crates implement the storage traits;
//! the provider crate implements [`ExternalLaunchFetcher`].

use async_trait::async_trait;
use std::sync::Arc;

use super::launch::{FlightNumber, Launch, LaunchFilter, LaunchPatch, UpdateResult};
use super::raw::RawLaunchDocument;
use super::sync::{SyncAttempt, SyncMarker};
use crate::CoreResult;

/// Store of launch records keyed by flight number
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LaunchRepository: Send + Sync {
    /// Insert the record, or replace the whole stored record with the same flight number
    async fn upsert(&self, launch: &Launch) -> CoreResult<()>;

    /// First record matching the filter, in ascending flight number order
    async fn find_one(&self, filter: &LaunchFilter) -> CoreResult<Option<Launch>>;

    /// Records in ascending flight number order; `limit` of `None` means no limit
    async fn list(&self, skip: usize, limit: Option<usize>) -> CoreResult<Vec<Launch>>;

    /// Apply a partial update to at most one matching record
    async fn update_fields(
        &self,
        filter: &LaunchFilter,
        patch: &LaunchPatch,
    ) -> CoreResult<UpdateResult>;

    /// Largest stored flight number
    async fn latest_flight_number(&self) -> CoreResult<Option<FlightNumber>>;

    /// Number of stored records
    async fn count(&self) -> CoreResult<usize>;
}

/// Atomic source of new flight numbers.
///
/// Implementations hand out `max(last allocated, largest stored) + 1` and
/// never give the same value to two callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlightNumberSequence: Send + Sync {
    /// Reserve the next flight number
    async fn allocate(&self) -> CoreResult<FlightNumber>;
}

/// Storage for the sync attempt and completion records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncStatusRepository: Send + Sync {
    /// The recorded marker, if a sync has completed
    async fn marker(&self) -> CoreResult<Option<SyncMarker>>;

    /// Record (or overwrite) the marker
    async fn record_marker(&self, marker: &SyncMarker) -> CoreResult<()>;

    /// The most recent sync attempt, if one was started
    async fn attempt(&self) -> CoreResult<Option<SyncAttempt>>;

    /// Record (or overwrite) the sync attempt
    async fn record_attempt(&self, attempt: &SyncAttempt) -> CoreResult<()>;
}

/// Lookup of known planets by Kepler name
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanetCatalog: Send + Sync {
    /// Whether a planet with exactly this name exists
    async fn exists(&self, kepler_name: &str) -> CoreResult<bool>;
}

/// Retrieves the complete raw launch dataset from a remote provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExternalLaunchFetcher: Send + Sync {
    /// Label used in sync markers and logs
    fn source_name(&self) -> &str;

    /// Every document the provider has, or an error; never a partial set
    async fn fetch_all(&self) -> CoreResult<Vec<RawLaunchDocument>>;
}

/// Handles to every store a Launchpad process works against
#[derive(Clone)]
pub struct StateStores {
    /// Launch records
    pub launches: Arc<dyn LaunchRepository>,
    /// Flight number sequence
    pub sequence: Arc<dyn FlightNumberSequence>,
    /// Sync marker storage
    pub sync_status: Arc<dyn SyncStatusRepository>,
    /// Planet lookup
    pub planets: Arc<dyn PlanetCatalog>,
}
