use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::normalizer::LaunchNormalizer;
use crate::domain::repository::{ExternalLaunchFetcher, LaunchRepository, SyncStatusRepository};
use crate::domain::sync::{
    sentinel_filter, BootstrapEvidence, SkippedDocument, SyncAttempt, SyncMarker, SyncOutcome,
    SyncSummary,
};
use crate::CoreResult;

/// Drives the one-time import of provider data into the launch store
pub struct SyncOrchestrator {
    launch_repo: Arc<dyn LaunchRepository>,
    sync_status: Arc<dyn SyncStatusRepository>,
    fetcher: Arc<dyn ExternalLaunchFetcher>,
    normalizer: LaunchNormalizer,
}

impl SyncOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        launch_repo: Arc<dyn LaunchRepository>,
        sync_status: Arc<dyn SyncStatusRepository>,
        fetcher: Arc<dyn ExternalLaunchFetcher>,
    ) -> Self {
        Self {
            launch_repo,
            sync_status,
            fetcher,
            normalizer: LaunchNormalizer::new(),
        }
    }

    /// Run the bootstrap sync unless it has already completed.
    ///
    /// A fetch or store failure is returned without recording the marker,
    /// so the next call starts over. An attempt record is written before
    /// the first upsert; while it stands without a marker, a stored
    /// sentinel record is not taken as evidence. Documents that fail
    /// normalization are skipped and reported in the summary.
    #[instrument(skip(self), fields(source = %self.fetcher.source_name()))]
    pub async fn ensure_bootstrapped(&self) -> CoreResult<SyncOutcome> {
        if let Some(evidence) = self.bootstrap_evidence().await? {
            info!(?evidence, "Launch data already bootstrapped");
            return Ok(SyncOutcome::AlreadyBootstrapped { evidence });
        }

        info!("Downloading launch data");
        let documents = self.fetcher.fetch_all().await?;

        let mut summary = SyncSummary {
            fetched: documents.len(),
            ..SyncSummary::default()
        };

        self.sync_status
            .record_attempt(&SyncAttempt {
                source: self.fetcher.source_name().to_string(),
                started_at: Utc::now(),
            })
            .await?;

        for (index, document) in documents.iter().enumerate() {
            let launch = match self.normalizer.normalize(document) {
                Ok(launch) => launch,
                Err(err) => {
                    warn!(index, flight_number = ?document.flight_number, error = %err, "Skipping launch document");
                    summary.skipped.push(SkippedDocument {
                        index,
                        flight_number: document.flight_number,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            self.launch_repo.upsert(&launch).await?;
            debug!(flight_number = %launch.flight_number, "Stored launch");
            summary.stored += 1;
        }

        self.sync_status
            .record_marker(&SyncMarker {
                source: self.fetcher.source_name().to_string(),
                completed_at: Utc::now(),
                stored: summary.stored,
                skipped: summary.skipped.len(),
            })
            .await?;

        info!(
            fetched = summary.fetched,
            stored = summary.stored,
            skipped = summary.skipped.len(),
            "Launch data sync completed"
        );

        Ok(SyncOutcome::Synced(summary))
    }

    async fn bootstrap_evidence(&self) -> CoreResult<Option<BootstrapEvidence>> {
        if self.sync_status.marker().await?.is_some() {
            return Ok(Some(BootstrapEvidence::Marker));
        }

        if let Some(attempt) = self.sync_status.attempt().await? {
            warn!(started_at = %attempt.started_at, "Previous sync did not complete, syncing again");
            return Ok(None);
        }

        if self.launch_repo.find_one(&sentinel_filter()).await?.is_none() {
            return Ok(None);
        }

        // Store populated before markers existed
        let count = self.launch_repo.count().await?;
        self.sync_status
            .record_marker(&SyncMarker {
                source: self.fetcher.source_name().to_string(),
                completed_at: Utc::now(),
                stored: count,
                skipped: 0,
            })
            .await?;

        Ok(Some(BootstrapEvidence::SentinelRecord))
    }
}
