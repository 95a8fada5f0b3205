//! Boundary operations exposed to the routing layer.
//!
//! `LaunchService` wires the allocator, schedule and abort services over a
//! shared set of collaborators and adds the read-side operations.

use std::sync::Arc;

use super::abort_service::{AbortOutcome, AbortService};
use super::allocator::FlightNumberAllocator;
use super::schedule_service::{ScheduleDefaults, ScheduleLaunchRequest, ScheduleService};
use crate::domain::launch::{FlightNumber, Launch, LaunchFilter};
use crate::domain::repository::{FlightNumberSequence, LaunchRepository, PlanetCatalog};
use crate::CoreResult;

/// Window over the launch list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    /// Records to skip
    pub skip: usize,
    /// Maximum records to return; `None` for no limit
    pub limit: Option<usize>,
}

impl Pagination {
    /// Build a window from 1-based `page` and `limit` query values.
    ///
    /// A missing or zero page means the first page. A missing or zero
    /// limit means no limit, in which case nothing is skipped.
    pub fn from_query(page: Option<usize>, limit: Option<usize>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        match limit.filter(|l| *l > 0) {
            Some(limit) => Self {
                skip: (page - 1).saturating_mul(limit),
                limit: Some(limit),
            },
            None => Self::default(),
        }
    }
}

/// Collaborators shared by every launch operation
#[derive(Clone)]
pub struct LaunchServiceDeps {
    /// Launch store
    pub launch_repo: Arc<dyn LaunchRepository>,
    /// Flight number source
    pub sequence: Arc<dyn FlightNumberSequence>,
    /// Planet lookup
    pub planets: Arc<dyn PlanetCatalog>,
    /// Defaults for scheduled launches
    pub defaults: ScheduleDefaults,
}

/// Facade over the launch catalog
pub struct LaunchService {
    launch_repo: Arc<dyn LaunchRepository>,
    allocator: Arc<FlightNumberAllocator>,
    schedule: ScheduleService,
    abort: AbortService,
}

impl LaunchService {
    /// Create a new launch service
    pub fn new(deps: LaunchServiceDeps) -> Self {
        let allocator = Arc::new(FlightNumberAllocator::new(
            deps.launch_repo.clone(),
            deps.sequence,
        ));

        Self {
            schedule: ScheduleService::new(
                deps.launch_repo.clone(),
                deps.planets,
                allocator.clone(),
                deps.defaults,
            ),
            abort: AbortService::new(deps.launch_repo.clone()),
            launch_repo: deps.launch_repo,
            allocator,
        }
    }

    /// Launches in ascending flight number order
    pub async fn list_launches(&self, pagination: Pagination) -> CoreResult<Vec<Launch>> {
        self.launch_repo
            .list(pagination.skip, pagination.limit)
            .await
    }

    /// Schedule a caller-created launch
    pub async fn schedule_launch(&self, request: &ScheduleLaunchRequest) -> CoreResult<Launch> {
        self.schedule.schedule(request).await
    }

    /// Abort a launch by flight number
    pub async fn abort_launch(&self, flight_number: FlightNumber) -> CoreResult<AbortOutcome> {
        self.abort.abort(flight_number).await
    }

    /// Whether a launch with this flight number is stored
    pub async fn exists_with_flight_number(&self, flight_number: FlightNumber) -> CoreResult<bool> {
        Ok(self
            .launch_repo
            .find_one(&LaunchFilter::by_flight_number(flight_number))
            .await?
            .is_some())
    }

    /// Largest stored flight number, 0 when empty
    pub async fn latest_flight_number(&self) -> CoreResult<u32> {
        self.allocator.latest().await
    }
}
