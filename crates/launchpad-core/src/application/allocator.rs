use std::sync::Arc;

use crate::domain::launch::FlightNumber;
use crate::domain::repository::{FlightNumberSequence, LaunchRepository};
use crate::CoreResult;

/// Flight number reported when no launch is stored yet
pub const DEFAULT_FLIGHT_NUMBER: u32 = 0;

/// Hands out flight numbers for caller-created launches
pub struct FlightNumberAllocator {
    launch_repo: Arc<dyn LaunchRepository>,
    sequence: Arc<dyn FlightNumberSequence>,
}

impl FlightNumberAllocator {
    /// Create a new allocator
    pub fn new(
        launch_repo: Arc<dyn LaunchRepository>,
        sequence: Arc<dyn FlightNumberSequence>,
    ) -> Self {
        Self {
            launch_repo,
            sequence,
        }
    }

    /// Largest stored flight number, or [`DEFAULT_FLIGHT_NUMBER`] when empty
    pub async fn latest(&self) -> CoreResult<u32> {
        Ok(self
            .launch_repo
            .latest_flight_number()
            .await?
            .map_or(DEFAULT_FLIGHT_NUMBER, FlightNumber::get))
    }

    /// Reserve the next flight number.
    ///
    /// The read of the current maximum and the reservation happen atomically
    /// inside the sequence, so concurrent callers get distinct values.
    pub async fn next(&self) -> CoreResult<FlightNumber> {
        let allocated = self.sequence.allocate().await?;
        tracing::debug!(flight_number = %allocated, "Allocated flight number");
        Ok(allocated)
    }
}
