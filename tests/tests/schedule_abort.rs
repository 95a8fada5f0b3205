use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use launchpad_core::{
    AbortOutcome, CoreError, FlightNumber, LaunchFilter, Pagination, ScheduleLaunchRequest,
};
use launchpad_spacex::SpaceXClient;
use launchpad_tests::{launchpad, mock_provider, provider_docs, test_config};

const NO_PROVIDER: &str = "http://127.0.0.1:9";

fn enterprise() -> ScheduleLaunchRequest {
    ScheduleLaunchRequest {
        mission: Some("USS Enterprise".to_string()),
        rocket: Some("NCC 1701-D".to_string()),
        launch_date: Some("July 8, 2003".to_string()),
        target: Some("Kepler-62 f".to_string()),
    }
}

#[tokio::test]
async fn test_schedule_on_empty_store_gets_flight_one() {
    for store_url in ["memory://", "sqlite::memory:"] {
        let app = launchpad(&test_config(NO_PROVIDER, store_url)).await;

        let launch = app.launches.schedule_launch(&enterprise()).await.unwrap();

        assert_eq!(launch.flight_number, FlightNumber::FIRST);
        assert!(launch.upcoming);
        assert!(launch.success);
        assert_eq!(launch.launch_date, Utc.with_ymd_and_hms(2003, 7, 8, 0, 0, 0).unwrap());
        assert_eq!(launch.customers, vec!["s1rbl4ck", "NASA"]);

        let stored = app
            .stores
            .launches
            .find_one(&LaunchFilter::by_flight_number(FlightNumber::FIRST))
            .await
            .unwrap();
        assert_eq!(stored, Some(launch), "store {store_url}");
    }
}

#[tokio::test]
async fn test_schedule_follows_synced_data() {
    let provider = mock_provider(provider_docs()).await;
    let config = test_config(&provider.uri(), "memory://");
    let app = launchpad(&config).await;
    let fetcher = Arc::new(SpaceXClient::new(config.spacex_client_config()).unwrap());
    app.bootstrap(fetcher).await.unwrap();

    assert_eq!(app.launches.latest_flight_number().await.unwrap(), 4);

    let first = app.launches.schedule_launch(&enterprise()).await.unwrap();
    let second = app.launches.schedule_launch(&enterprise()).await.unwrap();
    assert_eq!(first.flight_number.get(), 5);
    assert_eq!(second.flight_number.get(), 6);
}

#[tokio::test]
async fn test_unknown_target_leaves_store_unchanged() {
    let app = launchpad(&test_config(NO_PROVIDER, "memory://")).await;
    app.launches.schedule_launch(&enterprise()).await.unwrap();

    let mut request = enterprise();
    request.target = Some("Kepler-999 z".to_string());
    let err = app.launches.schedule_launch(&request).await.unwrap_err();

    assert_eq!(err, CoreError::UnknownTargetError("Kepler-999 z".to_string()));
    assert_eq!(err.to_string(), "No matching planet found: Kepler-999 z");
    assert_eq!(app.stores.launches.count().await.unwrap(), 1);

    // Rejected requests consume no flight number
    let next = app.launches.schedule_launch(&enterprise()).await.unwrap();
    assert_eq!(next.flight_number.get(), 2);
}

#[tokio::test]
async fn test_invalid_requests_are_rejected_before_allocation() {
    let app = launchpad(&test_config(NO_PROVIDER, "memory://")).await;

    let mut missing_date = enterprise();
    missing_date.launch_date = None;
    assert_eq!(
        app.launches.schedule_launch(&missing_date).await.unwrap_err().to_string(),
        "Missing required launch property"
    );

    let mut bad_date = enterprise();
    bad_date.launch_date = Some("ThisIsNotADate:))))".to_string());
    assert_eq!(
        app.launches.schedule_launch(&bad_date).await.unwrap_err().to_string(),
        "Invalid launch date"
    );

    assert_eq!(app.stores.launches.count().await.unwrap(), 0);
    let launch = app.launches.schedule_launch(&enterprise()).await.unwrap();
    assert_eq!(launch.flight_number, FlightNumber::FIRST);
}

#[tokio::test]
async fn test_abort_then_abort_again() {
    for store_url in ["memory://", "sqlite::memory:"] {
        let app = launchpad(&test_config(NO_PROVIDER, store_url)).await;
        let launch = app.launches.schedule_launch(&enterprise()).await.unwrap();

        let first = app.launches.abort_launch(launch.flight_number).await.unwrap();
        assert_eq!(first, AbortOutcome::Updated);
        assert!(first.is_updated());

        let second = app.launches.abort_launch(launch.flight_number).await.unwrap();
        assert_eq!(second, AbortOutcome::AlreadyInState);
        assert!(!second.is_updated());

        let missing = app
            .launches
            .abort_launch(FlightNumber::new(404).unwrap())
            .await
            .unwrap();
        assert_eq!(missing, AbortOutcome::NotFound);

        let stored = app
            .stores
            .launches
            .find_one(&LaunchFilter::by_flight_number(launch.flight_number))
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.upcoming, "store {store_url}");
        assert!(!stored.success, "store {store_url}");
        assert_eq!(stored.target.as_deref(), Some("Kepler-62 f"));
    }
}

#[tokio::test]
async fn test_concurrent_schedules_get_distinct_flight_numbers() {
    for store_url in ["memory://", "sqlite::memory:"] {
        let app = launchpad(&test_config(NO_PROVIDER, store_url)).await;
        let request = enterprise();

        let results =
            futures::future::join_all((0..25).map(|_| app.launches.schedule_launch(&request)))
                .await;

        let numbers: BTreeSet<u32> = results
            .into_iter()
            .map(|r| r.unwrap().flight_number.get())
            .collect();

        assert_eq!(numbers, (1..=25).collect::<BTreeSet<u32>>(), "store {store_url}");
        assert_eq!(app.stores.launches.count().await.unwrap(), 25);
    }
}

#[tokio::test]
async fn test_list_and_exists_through_facade() {
    let app = launchpad(&test_config(NO_PROVIDER, "memory://")).await;
    for _ in 0..5 {
        app.launches.schedule_launch(&enterprise()).await.unwrap();
    }

    let page: Vec<u32> = app
        .launches
        .list_launches(Pagination::from_query(Some(2), Some(2)))
        .await
        .unwrap()
        .iter()
        .map(|l| l.flight_number.get())
        .collect();
    assert_eq!(page, vec![3, 4]);

    let all = app
        .launches
        .list_launches(Pagination::from_query(None, None))
        .await
        .unwrap();
    assert_eq!(all.len(), 5);

    assert!(app
        .launches
        .exists_with_flight_number(FlightNumber::new(5).unwrap())
        .await
        .unwrap());
    assert!(!app
        .launches
        .exists_with_flight_number(FlightNumber::new(6).unwrap())
        .await
        .unwrap());
}
