//! Pure transform from provider documents to canonical launch records.

use chrono::{DateTime, Utc};

use super::launch::{FlightNumber, Launch};
use super::raw::RawLaunchDocument;
use crate::{CoreError, CoreResult};

/// Turns raw provider documents into [`Launch`] records
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchNormalizer;

impl LaunchNormalizer {
    /// Create a normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize one document.
    ///
    /// Customers are the concatenation of every payload's customer list in
    /// payload order. A payload without a customer list contributes nothing.
    /// A missing `success` becomes `true`.
    pub fn normalize(&self, doc: &RawLaunchDocument) -> CoreResult<Launch> {
        let raw_number = doc.flight_number;
        let fail = |reason: &str| CoreError::normalization(raw_number, reason);

        let flight_number = raw_number
            .and_then(|n| u32::try_from(n).ok())
            .and_then(|n| FlightNumber::new(n).ok())
            .ok_or_else(|| fail("missing or non-positive flight number"))?;

        let mission = non_empty(doc.name.as_deref()).ok_or_else(|| fail("missing mission name"))?;

        let rocket = doc
            .rocket
            .as_ref()
            .and_then(|rocket| non_empty(rocket.name.as_deref()))
            .ok_or_else(|| fail("missing rocket name"))?;

        let payloads = doc.payloads.as_ref().ok_or_else(|| fail("missing payload list"))?;

        let date_local = doc.date_local.as_deref().ok_or_else(|| fail("missing launch date"))?;
        let launch_date = DateTime::parse_from_rfc3339(date_local)
            .map_err(|e| fail(&format!("invalid launch date '{}': {}", date_local, e)))?
            .with_timezone(&Utc);

        let upcoming = doc.upcoming.ok_or_else(|| fail("missing upcoming flag"))?;

        let customers = payloads
            .iter()
            .filter_map(|payload| payload.customers.as_ref())
            .flatten()
            .cloned()
            .collect();

        Ok(Launch {
            flight_number,
            mission,
            rocket,
            launch_date,
            target: None,
            customers,
            upcoming,
            success: doc.success.unwrap_or(true),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
