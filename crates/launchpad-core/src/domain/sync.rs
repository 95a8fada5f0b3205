use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::launch::{FlightNumber, LaunchFilter};

/// Flight number of the first launch ever published by the provider
pub const SENTINEL_FLIGHT_NUMBER: FlightNumber = FlightNumber::FIRST;

/// Mission name of the first launch
pub const SENTINEL_MISSION: &str = "FalconSat";

/// Rocket name of the first launch
pub const SENTINEL_ROCKET: &str = "Falcon 1";

/// Filter matching the sentinel record written by an earlier sync
pub fn sentinel_filter() -> LaunchFilter {
    LaunchFilter::by_flight_number(SENTINEL_FLIGHT_NUMBER)
        .with_mission(SENTINEL_MISSION)
        .with_rocket(SENTINEL_ROCKET)
}

/// Status record written once a bootstrap sync has completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMarker {
    /// Name of the provider the data came from
    pub source: String,
    /// When the sync finished
    pub completed_at: DateTime<Utc>,
    /// Records written by the sync
    pub stored: usize,
    /// Documents the sync could not normalize
    pub skipped: usize,
}

/// Status record written before a sync stores its first record.
///
/// An attempt without a [`SyncMarker`] means an earlier sync stopped
/// part way, so the catalog must be synced again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAttempt {
    /// Name of the provider being synced
    pub source: String,
    /// When the attempt began writing
    pub started_at: DateTime<Utc>,
}

/// A provider document that was left out of a sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDocument {
    /// Position of the document in the provider response
    pub index: usize,
    /// Provider flight number, when present
    pub flight_number: Option<i64>,
    /// Why it was skipped
    pub reason: String,
}

/// Per-run counts reported by a completed sync
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// Documents returned by the provider
    pub fetched: usize,
    /// Records upserted
    pub stored: usize,
    /// Documents that failed normalization
    pub skipped: Vec<SkippedDocument>,
}

/// What told the orchestrator that sync had already run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootstrapEvidence {
    /// A sync marker was present
    Marker,
    /// No marker and no interrupted attempt, but the sentinel record was already stored
    SentinelRecord,
}

/// Result of `ensure_bootstrapped`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    /// Nothing to do
    AlreadyBootstrapped {
        /// How it was detected
        evidence: BootstrapEvidence,
    },
    /// A sync ran to completion
    Synced(SyncSummary),
}
