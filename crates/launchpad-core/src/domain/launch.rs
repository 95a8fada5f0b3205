use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

/// Unique, positive identifier of a launch record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FlightNumber(u32);

impl FlightNumber {
    /// The first flight number a sequence hands out
    pub const FIRST: FlightNumber = FlightNumber(1);

    /// Create a flight number, rejecting zero
    pub fn new(value: u32) -> CoreResult<Self> {
        if value == 0 {
            return Err(CoreError::ValidationError(
                "Flight number must be positive".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// The raw integer value
    pub fn get(self) -> u32 {
        self.0
    }

    /// The flight number that follows this one
    pub fn successor(self) -> CoreResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| CoreError::StateStoreError("Flight number sequence exhausted".to_string()))
    }
}

impl TryFrom<u32> for FlightNumber {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FlightNumber> for u32 {
    fn from(value: FlightNumber) -> Self {
        value.0
    }
}

impl fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Canonical launch record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Launch {
    /// Unique key
    pub flight_number: FlightNumber,

    /// Mission name
    pub mission: String,

    /// Rocket display name
    pub rocket: String,

    /// Launch instant
    pub launch_date: DateTime<Utc>,

    /// Target planet (Kepler name), only set on scheduled launches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Customers in payload order, duplicates preserved
    #[serde(default)]
    pub customers: Vec<String>,

    /// Whether the launch is still in the future
    pub upcoming: bool,

    /// Whether the launch succeeded (or is expected to)
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

/// Conjunction of exact-match constraints over launch fields.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchFilter {
    /// Match on flight number
    pub flight_number: Option<FlightNumber>,
    /// Match on mission name
    pub mission: Option<String>,
    /// Match on rocket name
    pub rocket: Option<String>,
    /// Match on target planet
    pub target: Option<String>,
    /// Match on upcoming flag
    pub upcoming: Option<bool>,
    /// Match on success flag
    pub success: Option<bool>,
}

impl LaunchFilter {
    /// Filter matching every record
    pub fn any() -> Self {
        Self::default()
    }

    /// Filter on a single flight number
    pub fn by_flight_number(flight_number: FlightNumber) -> Self {
        Self {
            flight_number: Some(flight_number),
            ..Self::default()
        }
    }

    /// Add a mission constraint
    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    /// Add a rocket constraint
    pub fn with_rocket(mut self, rocket: impl Into<String>) -> Self {
        self.rocket = Some(rocket.into());
        self
    }

    /// Add a target constraint
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add an upcoming constraint
    pub fn with_upcoming(mut self, upcoming: bool) -> Self {
        self.upcoming = Some(upcoming);
        self
    }

    /// Add a success constraint
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Whether a record satisfies every constraint
    pub fn matches(&self, launch: &Launch) -> bool {
        self.flight_number.map_or(true, |n| launch.flight_number == n)
            && self.mission.as_ref().map_or(true, |m| &launch.mission == m)
            && self.rocket.as_ref().map_or(true, |r| &launch.rocket == r)
            && self
                .target
                .as_ref()
                .map_or(true, |t| launch.target.as_ref() == Some(t))
            && self.upcoming.map_or(true, |u| launch.upcoming == u)
            && self.success.map_or(true, |s| launch.success == s)
    }
}

/// Partial update applied by `update_fields`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchPatch {
    /// New upcoming flag
    pub upcoming: Option<bool>,
    /// New success flag
    pub success: Option<bool>,
    /// New target planet
    pub target: Option<String>,
}

impl LaunchPatch {
    /// Patch that marks a launch as aborted
    pub fn aborted() -> Self {
        Self {
            upcoming: Some(false),
            success: Some(false),
            target: None,
        }
    }

    /// Apply the patch in place, returning whether any stored value changed
    pub fn apply(&self, launch: &mut Launch) -> bool {
        let mut changed = false;

        if let Some(upcoming) = self.upcoming {
            changed |= launch.upcoming != upcoming;
            launch.upcoming = upcoming;
        }
        if let Some(success) = self.success {
            changed |= launch.success != success;
            launch.success = success;
        }
        if let Some(target) = &self.target {
            changed |= launch.target.as_ref() != Some(target);
            launch.target = Some(target.clone());
        }

        changed
    }
}

/// Outcome of a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// A record matched the filter
    pub matched: bool,
    /// The matched record's stored values changed
    pub modified: bool,
}

impl UpdateResult {
    /// No record matched
    pub fn not_found() -> Self {
        Self::default()
    }
}
