//! End-to-end pipeline tests against a mock weather provider.
//!
//! Each test seeds the state store, points every client at a wiremock
//! server, and checks both the outcome and what the store looks like
//! afterwards.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skywatch::{Pipeline, TickOutcome};
use skywatch_alert::{AlertMessage, Notifier, NotifyError};
use skywatch_core::store::{
    keys, LastKnownLocation, LocationMethod, NotificationRecord, Settings, StateStore,
};
use skywatch_weather::{GeocodeClient, IpLocator, LocationResolver, WeatherClient};

/// Captures alerts instead of delivering them.
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<AlertMessage>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn current_body(category: &str, description: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "cod": 200,
        "weather": [{"main": category, "description": description}],
        "main": {"temp": temp}
    })
}

fn onecall_body(hour_ahead: (&str, &str, f64)) -> serde_json::Value {
    let (category, description, temp) = hour_ahead;
    serde_json::json!({
        "hourly": [
            {"temp": 0.0, "weather": [{"main": "Clear", "description": "now"}]},
            {"temp": temp, "weather": [{"main": category, "description": description}]}
        ]
    })
}

fn forecast_body(category: &str, description: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "list": [
            {"main": {"temp": temp}, "weather": [{"main": category, "description": description}]}
        ]
    })
}

/// Build a pipeline whose store lives at `store_path` and whose clients all
/// talk to `mock_server`. Returns the delivered alerts alongside.
fn pipeline_against(
    mock_server: &MockServer,
    store_path: &std::path::Path,
) -> (Pipeline, Arc<Mutex<Vec<AlertMessage>>>) {
    let store = StateStore::open(store_path).unwrap();
    let geocoder = GeocodeClient::with_base_url("test-key", &mock_server.uri()).unwrap();
    let ip = IpLocator::with_base_url(&mock_server.uri()).unwrap();
    let weather = WeatherClient::with_base_url("test-key", "zh_tw", &mock_server.uri()).unwrap();

    let sent = Arc::new(Mutex::new(Vec::new()));
    let notifier = RecordingNotifier { sent: sent.clone() };

    let pipeline = Pipeline::new(
        store,
        LocationResolver::new(geocoder, ip),
        weather,
        Box::new(notifier),
    );
    (pipeline, sent)
}

fn seed_settings(store_path: &std::path::Path, method: LocationMethod, input: Option<&str>) {
    let store = StateStore::open(store_path).unwrap();
    let settings = Settings {
        location_method: method,
        location_input: input.map(str::to_string),
    };
    store.put(keys::SETTINGS, &settings).unwrap();
}

async fn mount_geocode(mock_server: &MockServer, lat: f64, lon: f64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"lat": lat, "lon": lon}])),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_significant_change_notifies_then_suppresses() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state.db");

    mount_geocode(&mock_server, 25.0375, 121.5637).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Rain", "小雨", 18.4)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(onecall_body(("Clear", "晴", 20.5))),
        )
        .mount(&mock_server)
        .await;

    seed_settings(&store_path, LocationMethod::Manual, Some("Taipei"));
    let (pipeline, sent) = pipeline_against(&mock_server, &store_path);

    let outcome = pipeline.try_run().await.unwrap();
    assert_eq!(outcome, TickOutcome::Notified);

    {
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "天氣即將變化");
        assert_eq!(sent[0].body, "目前：小雨 18°C\n1小時後：晴 21°C");
    }

    let store = StateStore::open(&store_path).unwrap();
    let cached: LastKnownLocation = store.get(keys::LAST_KNOWN).unwrap().unwrap();
    assert_eq!(cached.method, "manual");
    assert_eq!(cached.lat, 25.0375);
    let record: NotificationRecord = store.get(keys::LAST_NOTIFY).unwrap().unwrap();
    assert_eq!(record.key, "小雨|18|晴|21");

    // The same readings a tick later are suppressed.
    let outcome = pipeline.try_run().await.unwrap();
    assert_eq!(outcome, TickOutcome::Suppressed);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_change_sends_nothing() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state.db");

    mount_geocode(&mock_server, 25.0, 121.5).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Clouds", "多雲", 20.0)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(onecall_body(("Clouds", "多雲", 21.4))),
        )
        .mount(&mock_server)
        .await;

    seed_settings(&store_path, LocationMethod::Manual, Some("Taipei"));
    let (pipeline, sent) = pipeline_against(&mock_server, &store_path);

    let outcome = pipeline.try_run().await.unwrap();
    assert_eq!(outcome, TickOutcome::NoChange);
    assert!(sent.lock().unwrap().is_empty());

    // No alert means no suppression record either.
    let store = StateStore::open(&store_path).unwrap();
    let record: Option<NotificationRecord> = store.get(keys::LAST_NOTIFY).unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_provider_failure_is_swallowed_by_run() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state.db");

    mount_geocode(&mock_server, 25.0, 121.5).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    seed_settings(&store_path, LocationMethod::Manual, Some("Taipei"));
    let (pipeline, sent) = pipeline_against(&mock_server, &store_path);

    // run() must not panic or propagate; the next tick just tries again.
    pipeline.run().await;
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_three_hour_fallback_feeds_the_alert() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state.db");

    mount_geocode(&mock_server, 25.0, 121.5).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Clear", "晴", 28.0)))
        .mount(&mock_server)
        .await;
    // The hourly feed is not enabled for this account.
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(forecast_body("Rain", "陣雨", 24.6)),
        )
        .mount(&mock_server)
        .await;

    seed_settings(&store_path, LocationMethod::Manual, Some("Taipei"));
    let (pipeline, sent) = pipeline_against(&mock_server, &store_path);

    let outcome = pipeline.try_run().await.unwrap();
    assert_eq!(outcome, TickOutcome::Notified);

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].body, "目前：晴 28°C\n1小時後：陣雨 25°C");
}

#[tokio::test]
async fn test_default_settings_use_ip_location() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state.db");

    // No settings record at all; the pipeline falls back to defaults.
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 24.15, "longitude": 120.67
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Clear", "晴", 30.0)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(onecall_body(("Thunderstorm", "雷雨", 26.0))),
        )
        .mount(&mock_server)
        .await;

    let (pipeline, sent) = pipeline_against(&mock_server, &store_path);

    let outcome = pipeline.try_run().await.unwrap();
    assert_eq!(outcome, TickOutcome::Notified);
    assert_eq!(sent.lock().unwrap().len(), 1);

    let store = StateStore::open(&store_path).unwrap();
    let cached: LastKnownLocation = store.get(keys::LAST_KNOWN).unwrap().unwrap();
    assert_eq!(cached.method, "ip");
    assert_eq!(cached.lat, 24.15);
}

#[tokio::test]
async fn test_corrupt_settings_row_degrades_to_defaults() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state.db");

    // A settings row that does not deserialize must cost its contents,
    // not the tick.
    {
        let store = StateStore::open(&store_path).unwrap();
        store.put(keys::SETTINGS, &"scrambled").unwrap();
    }

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 24.15, "longitude": 120.67
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Clouds", "多雲", 22.0)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(onecall_body(("Clouds", "多雲", 22.5))),
        )
        .mount(&mock_server)
        .await;

    let (pipeline, sent) = pipeline_against(&mock_server, &store_path);

    let outcome = pipeline.try_run().await.unwrap();
    assert_eq!(outcome, TickOutcome::NoChange);
    assert!(sent.lock().unwrap().is_empty());

    let store = StateStore::open(&store_path).unwrap();
    let cached: LastKnownLocation = store.get(keys::LAST_KNOWN).unwrap().unwrap();
    assert_eq!(cached.method, "ip");
}

#[tokio::test]
async fn test_unresolvable_location_aborts_quietly() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state.db");

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    // The weather endpoints must never be reached without coordinates.
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Clear", "晴", 30.0)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (pipeline, sent) = pipeline_against(&mock_server, &store_path);

    pipeline.run().await;
    assert!(sent.lock().unwrap().is_empty());
}
