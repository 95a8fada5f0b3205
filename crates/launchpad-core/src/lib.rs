//!
//! Launchpad Core - launch catalog domain and services
//!
//! This crate defines the launch record model, the storage and provider
//! interfaces, and the services that bootstrap the catalog from the
//! provider, schedule new launches and abort existing ones. Storage and
//! provider implementations live in their own crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - launch records, provider documents and repository traits
pub mod domain;

/// Application services - sync, allocation, scheduling and abort
pub mod application;

/// Error types
pub mod error;

pub use error::{CoreError, CoreResult};

pub use domain::launch::{FlightNumber, Launch, LaunchFilter, LaunchPatch, UpdateResult};
pub use domain::normalizer::LaunchNormalizer;
pub use domain::raw::{RawLaunchDocument, RawPayload, RawRocket};
pub use domain::repository::{
    ExternalLaunchFetcher, FlightNumberSequence, LaunchRepository, PlanetCatalog, StateStores,
    SyncStatusRepository,
};
pub use domain::sync::{
    BootstrapEvidence, SkippedDocument, SyncAttempt, SyncMarker, SyncOutcome, SyncSummary,
};

pub use application::abort_service::{AbortOutcome, AbortService};
pub use application::allocator::FlightNumberAllocator;
pub use application::launch_service::{LaunchService, LaunchServiceDeps, Pagination};
pub use application::schedule_service::{ScheduleDefaults, ScheduleLaunchRequest, ScheduleService};
pub use application::sync_service::SyncOrchestrator;
