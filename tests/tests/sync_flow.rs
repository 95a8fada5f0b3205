use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use launchpad_core::{
    BootstrapEvidence, CoreError, CoreResult, FlightNumber, Launch, LaunchFilter,
    LaunchNormalizer, LaunchPatch, LaunchRepository, RawLaunchDocument, SyncOutcome,
    UpdateResult,
};
use launchpad_server::{open_store, Launchpad};
use launchpad_spacex::SpaceXClient;
use launchpad_tests::{
    falconsat_doc, launchpad, mock_provider, provider_docs, test_config, QUERY_PATH,
};

/// Launch store whose Nth upsert fails once
struct FailingNthUpsert {
    inner: Arc<dyn LaunchRepository>,
    fail_on: usize,
    upserts: AtomicUsize,
}

#[async_trait]
impl LaunchRepository for FailingNthUpsert {
    async fn upsert(&self, launch: &Launch) -> CoreResult<()> {
        if self.upserts.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(CoreError::StateStoreError("disk full".to_string()));
        }
        self.inner.upsert(launch).await
    }

    async fn find_one(&self, filter: &LaunchFilter) -> CoreResult<Option<Launch>> {
        self.inner.find_one(filter).await
    }

    async fn list(&self, skip: usize, limit: Option<usize>) -> CoreResult<Vec<Launch>> {
        self.inner.list(skip, limit).await
    }

    async fn update_fields(
        &self,
        filter: &LaunchFilter,
        patch: &LaunchPatch,
    ) -> CoreResult<UpdateResult> {
        self.inner.update_fields(filter, patch).await
    }

    async fn latest_flight_number(&self) -> CoreResult<Option<FlightNumber>> {
        self.inner.latest_flight_number().await
    }

    async fn count(&self) -> CoreResult<usize> {
        self.inner.count().await
    }
}

fn fetcher(config: &launchpad_server::LaunchpadConfig) -> Arc<SpaceXClient> {
    Arc::new(SpaceXClient::new(config.spacex_client_config()).unwrap())
}

#[tokio::test]
async fn test_sync_stores_normalized_records() {
    let provider = mock_provider(provider_docs()).await;
    let config = test_config(&provider.uri(), "memory://");
    let app = launchpad(&config).await;

    let SyncOutcome::Synced(summary) = app.bootstrap(fetcher(&config)).await.unwrap() else {
        panic!("expected the first bootstrap to sync");
    };

    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.stored, 3);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].flight_number, Some(3));
    assert_eq!(app.stores.launches.count().await.unwrap(), 3);

    let raw: RawLaunchDocument = serde_json::from_value(falconsat_doc()).unwrap();
    let expected = LaunchNormalizer::new().normalize(&raw).unwrap();
    let stored = app
        .stores
        .launches
        .find_one(&LaunchFilter::by_flight_number(FlightNumber::FIRST))
        .await
        .unwrap();
    assert_eq!(stored, Some(expected));

    let demosat = app
        .stores
        .launches
        .find_one(&LaunchFilter::by_flight_number(FlightNumber::new(2).unwrap()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        demosat,
        Launch {
            flight_number: FlightNumber::new(2).unwrap(),
            mission: "DemoSat".to_string(),
            rocket: "Falcon 1".to_string(),
            launch_date: Utc.with_ymd_and_hms(2007, 3, 21, 1, 10, 0).unwrap(),
            target: None,
            customers: vec!["DARPA".to_string(), "NASA".to_string()],
            upcoming: false,
            success: false,
        }
    );
}

#[tokio::test]
async fn test_second_bootstrap_does_not_fetch() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": provider_docs() })))
        .expect(1)
        .mount(&provider)
        .await;

    let config = test_config(&provider.uri(), "memory://");
    let app = launchpad(&config).await;

    assert!(matches!(
        app.bootstrap(fetcher(&config)).await.unwrap(),
        SyncOutcome::Synced(_)
    ));
    assert_eq!(
        app.bootstrap(fetcher(&config)).await.unwrap(),
        SyncOutcome::AlreadyBootstrapped {
            evidence: BootstrapEvidence::Marker
        }
    );
    assert_eq!(app.stores.launches.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_legacy_store_with_sentinel_skips_sync() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": [] })))
        .expect(0)
        .mount(&provider)
        .await;

    let config = test_config(&provider.uri(), "memory://");
    let app = launchpad(&config).await;

    let raw: RawLaunchDocument = serde_json::from_value(falconsat_doc()).unwrap();
    let sentinel = LaunchNormalizer::new().normalize(&raw).unwrap();
    app.stores.launches.upsert(&sentinel).await.unwrap();

    assert_eq!(
        app.bootstrap(fetcher(&config)).await.unwrap(),
        SyncOutcome::AlreadyBootstrapped {
            evidence: BootstrapEvidence::SentinelRecord
        }
    );

    let marker = app.stores.sync_status.marker().await.unwrap().unwrap();
    assert_eq!(marker.source, "spacex");
    assert_eq!(marker.stored, 1);
}

#[tokio::test]
async fn test_failed_fetch_is_retried_on_next_bootstrap() {
    let provider = MockServer::start().await;
    // Two attempts per bootstrap with the test retry policy
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&provider)
        .await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": provider_docs() })))
        .expect(1)
        .mount(&provider)
        .await;

    let config = test_config(&provider.uri(), "memory://");
    let app = launchpad(&config).await;

    let err = app.bootstrap(fetcher(&config)).await.unwrap_err();
    assert!(matches!(err, CoreError::FetchError { status: 502, .. }));
    assert_eq!(app.stores.launches.count().await.unwrap(), 0);
    assert!(app.stores.sync_status.marker().await.unwrap().is_none());

    assert!(matches!(
        app.bootstrap(fetcher(&config)).await.unwrap(),
        SyncOutcome::Synced(_)
    ));
    assert_eq!(app.stores.launches.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_sync_into_sqlite_store() {
    let provider = mock_provider(provider_docs()).await;
    let config = test_config(&provider.uri(), "sqlite::memory:");
    let app = launchpad(&config).await;

    assert!(matches!(
        app.bootstrap(fetcher(&config)).await.unwrap(),
        SyncOutcome::Synced(_)
    ));

    let ratsat = app
        .stores
        .launches
        .find_one(&LaunchFilter::any().with_mission("RatSat"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ratsat.flight_number.get(), 4);
    assert_eq!(ratsat.customers, vec!["SpaceX", "SpaceX"]);
    assert!(ratsat.success);

    let listed: Vec<u32> = app
        .stores
        .launches
        .list(0, None)
        .await
        .unwrap()
        .iter()
        .map(|l| l.flight_number.get())
        .collect();
    assert_eq!(listed, vec![1, 2, 4]);
}

#[tokio::test]
async fn test_interrupted_sync_runs_again_despite_sentinel() {
    for store_url in ["memory://", "sqlite::memory:"] {
        let provider = mock_provider(provider_docs()).await;
        let config = test_config(&provider.uri(), store_url);

        let mut stores = open_store(&config).await.unwrap();
        stores.launches = Arc::new(FailingNthUpsert {
            inner: stores.launches.clone(),
            fail_on: 2,
            upserts: AtomicUsize::new(0),
        });
        let app = Launchpad::new(stores, &config);

        let err = app.bootstrap(fetcher(&config)).await.unwrap_err();
        assert_eq!(err, CoreError::StateStoreError("disk full".to_string()));
        // FalconSat made it in before the failure
        assert_eq!(app.stores.launches.count().await.unwrap(), 1);
        assert!(app.stores.sync_status.marker().await.unwrap().is_none());
        assert!(app.stores.sync_status.attempt().await.unwrap().is_some());

        let SyncOutcome::Synced(summary) = app.bootstrap(fetcher(&config)).await.unwrap() else {
            panic!("expected the interrupted sync to run again ({store_url})");
        };
        assert_eq!(summary.stored, 3);
        assert_eq!(app.stores.launches.count().await.unwrap(), 3, "store {store_url}");

        assert_eq!(
            app.bootstrap(fetcher(&config)).await.unwrap(),
            SyncOutcome::AlreadyBootstrapped {
                evidence: BootstrapEvidence::Marker
            }
        );
    }
}
