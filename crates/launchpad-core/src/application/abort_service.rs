use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::launch::{FlightNumber, LaunchFilter, LaunchPatch};
use crate::domain::repository::LaunchRepository;
use crate::CoreResult;

/// What an abort request did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortOutcome {
    /// No launch has that flight number
    NotFound,
    /// The launch was already aborted
    AlreadyInState,
    /// The launch was flipped to aborted
    Updated,
}

impl AbortOutcome {
    /// True only when the stored record changed
    pub fn is_updated(self) -> bool {
        matches!(self, AbortOutcome::Updated)
    }
}

/// Service marking launches as aborted
pub struct AbortService {
    launch_repo: Arc<dyn LaunchRepository>,
}

impl AbortService {
    /// Create a new abort service
    pub fn new(launch_repo: Arc<dyn LaunchRepository>) -> Self {
        Self { launch_repo }
    }

    /// Set `upcoming` and `success` to false on the given launch
    #[instrument(skip(self), fields(flight_number = %flight_number))]
    pub async fn abort(&self, flight_number: FlightNumber) -> CoreResult<AbortOutcome> {
        let result = self
            .launch_repo
            .update_fields(
                &LaunchFilter::by_flight_number(flight_number),
                &LaunchPatch::aborted(),
            )
            .await?;

        let outcome = match (result.matched, result.modified) {
            (true, true) => AbortOutcome::Updated,
            (true, false) => AbortOutcome::AlreadyInState,
            (false, _) => AbortOutcome::NotFound,
        };

        info!(?outcome, "Abort processed");
        Ok(outcome)
    }
}
