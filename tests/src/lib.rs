//! Shared fixtures for the Launchpad end-to-end tests
//!
//! A wiremock server stands in for the SpaceX API; stores are opened
//! through the same path the `launchpad` binary uses.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use launchpad_server::config::LaunchpadConfig;
use launchpad_server::{open_store, Launchpad};

/// Path of the launches query endpoint
pub const QUERY_PATH: &str = "/v4/launches/query";

/// Planets every test store knows about
pub const KNOWN_PLANETS: [&str; 3] = ["Kepler-62 f", "Kepler-442 b", "Kepler-1652 b"];

/// One provider document in the populated query shape
pub fn provider_doc(
    flight_number: i64,
    name: &str,
    rocket: &str,
    customers: &[&[&str]],
    date_local: &str,
    upcoming: bool,
    success: Option<bool>,
) -> Value {
    let payloads: Vec<Value> = customers
        .iter()
        .map(|list| json!({ "customers": list }))
        .collect();

    json!({
        "flight_number": flight_number,
        "name": name,
        "rocket": { "name": rocket },
        "payloads": payloads,
        "date_local": date_local,
        "upcoming": upcoming,
        "success": success,
    })
}

/// The first launch, which older stores used as the bootstrap flag
pub fn falconsat_doc() -> Value {
    provider_doc(
        1,
        "FalconSat",
        "Falcon 1",
        &[&["DARPA"]],
        "2006-03-25T10:30:00+12:00",
        false,
        Some(false),
    )
}

/// A small provider dataset: three good documents and one without a rocket
pub fn provider_docs() -> Vec<Value> {
    vec![
        falconsat_doc(),
        provider_doc(
            2,
            "DemoSat",
            "Falcon 1",
            &[&["DARPA", "NASA"], &[]],
            "2007-03-21T13:10:00+12:00",
            false,
            Some(false),
        ),
        json!({
            "flight_number": 3,
            "name": "Trailblazer",
            "payloads": [{ "customers": ["NASA"] }],
            "date_local": "2008-08-03T15:34:00+12:00",
            "upcoming": false,
            "success": false,
        }),
        provider_doc(
            4,
            "RatSat",
            "Falcon 1",
            &[&["SpaceX"], &["SpaceX"]],
            "2008-09-28T11:15:00+12:00",
            false,
            Some(true),
        ),
    ]
}

/// Start a mock provider that answers every query with `docs`
pub async fn mock_provider(docs: Vec<Value>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "docs": docs })))
        .mount(&server)
        .await;
    server
}

/// Configuration pointing at a mock provider with fast retries
pub fn test_config(provider_url: &str, store_url: &str) -> LaunchpadConfig {
    LaunchpadConfig {
        store_url: store_url.to_string(),
        spacex_api_url: provider_url.to_string(),
        fetch_timeout_secs: 5,
        fetch_max_attempts: 2,
        fetch_initial_backoff_ms: 1,
        known_planets: KNOWN_PLANETS.iter().map(|p| p.to_string()).collect(),
        ..LaunchpadConfig::default()
    }
}

/// Open the configured store and wire the services over it
pub async fn launchpad(config: &LaunchpadConfig) -> Launchpad {
    let stores = open_store(config).await.expect("Failed to open store");
    Launchpad::new(stores, config)
}
