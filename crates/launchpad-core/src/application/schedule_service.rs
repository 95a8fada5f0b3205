use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::allocator::FlightNumberAllocator;
use crate::domain::launch::Launch;
use crate::domain::repository::{LaunchRepository, PlanetCatalog};
use crate::{CoreError, CoreResult};

/// Message returned when a required field is absent or blank
pub const MISSING_PROPERTY: &str = "Missing required launch property";

/// Message returned when the launch date cannot be parsed
pub const INVALID_LAUNCH_DATE: &str = "Invalid launch date";

/// Caller-submitted launch, as received from the routing layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleLaunchRequest {
    /// Mission name
    #[serde(default)]
    pub mission: Option<String>,
    /// Rocket name
    #[serde(default)]
    pub rocket: Option<String>,
    /// Launch date in one of the accepted formats
    #[serde(default)]
    pub launch_date: Option<String>,
    /// Kepler name of the target planet
    #[serde(default)]
    pub target: Option<String>,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLaunch {
    /// Mission name
    pub mission: String,
    /// Rocket name
    pub rocket: String,
    /// Parsed launch instant
    pub launch_date: DateTime<Utc>,
    /// Kepler name of the target planet
    pub target: String,
}

impl ScheduleLaunchRequest {
    /// Check required fields and parse the launch date
    pub fn validate(&self) -> CoreResult<ValidatedLaunch> {
        let (Some(mission), Some(rocket), Some(launch_date), Some(target)) = (
            required(&self.mission),
            required(&self.rocket),
            required(&self.launch_date),
            required(&self.target),
        ) else {
            return Err(CoreError::ValidationError(MISSING_PROPERTY.to_string()));
        };

        let launch_date = parse_launch_date(launch_date)
            .ok_or_else(|| CoreError::ValidationError(INVALID_LAUNCH_DATE.to_string()))?;

        Ok(ValidatedLaunch {
            mission: mission.to_string(),
            rocket: rocket.to_string(),
            launch_date,
            target: target.to_string(),
        })
    }
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a caller-supplied launch date.
///
/// Accepts RFC 3339 instants, `YYYY-MM-DDTHH:MM:SS` (UTC), `YYYY-MM-DD`
/// and `Month D, YYYY` with full or abbreviated month names. Date-only
/// forms resolve to midnight UTC.
pub fn parse_launch_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }

    ["%Y-%m-%d", "%B %d, %Y", "%B %d %Y", "%d %B %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Customers attached to every caller-scheduled launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDefaults {
    /// Default customer list
    pub customers: Vec<String>,
}

impl Default for ScheduleDefaults {
    fn default() -> Self {
        Self {
            customers: vec!["s1rbl4ck".to_string(), "NASA".to_string()],
        }
    }
}

/// Service for scheduling caller-created launches
pub struct ScheduleService {
    launch_repo: Arc<dyn LaunchRepository>,
    planets: Arc<dyn PlanetCatalog>,
    allocator: Arc<FlightNumberAllocator>,
    defaults: ScheduleDefaults,
}

impl ScheduleService {
    /// Create a new schedule service
    pub fn new(
        launch_repo: Arc<dyn LaunchRepository>,
        planets: Arc<dyn PlanetCatalog>,
        allocator: Arc<FlightNumberAllocator>,
        defaults: ScheduleDefaults,
    ) -> Self {
        Self {
            launch_repo,
            planets,
            allocator,
            defaults,
        }
    }

    /// Validate, resolve the target, allocate a flight number and store the launch.
    ///
    /// No flight number is consumed and nothing is written when validation
    /// or target resolution fails.
    #[instrument(skip(self, request), fields(mission = ?request.mission, target = ?request.target))]
    pub async fn schedule(&self, request: &ScheduleLaunchRequest) -> CoreResult<Launch> {
        let validated = request.validate()?;

        if !self.planets.exists(&validated.target).await? {
            return Err(CoreError::UnknownTargetError(validated.target));
        }

        let flight_number = self.allocator.next().await?;

        let launch = Launch {
            flight_number,
            mission: validated.mission,
            rocket: validated.rocket,
            launch_date: validated.launch_date,
            target: Some(validated.target),
            customers: self.defaults.customers.clone(),
            upcoming: true,
            success: true,
        };

        self.launch_repo.upsert(&launch).await?;

        info!(flight_number = %launch.flight_number, "Launch scheduled");

        Ok(launch)
    }
}
