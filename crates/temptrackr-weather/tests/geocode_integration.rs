//! Integration tests for geocoding and LocationManager using wiremock.

use std::sync::Arc;
use std::time::Duration;

use temptrackr_store::MemoryStore;
use temptrackr_weather::{GeocodingClient, GeocodingConfig, LocationManager};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeocodingClient {
    GeocodingClient::new(GeocodingConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        timeout: Duration::from_secs(5),
        search_limit: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_search_maps_state_into_display_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Springfield"))
        .and(query_param("limit", "5"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Springfield", "state": "Illinois", "country": "US", "lat": 39.7817, "lon": -89.6501 },
            { "name": "Springfield", "country": "JM", "lat": 18.1, "lon": -77.3 }
        ])))
        .mount(&mock_server)
        .await;

    let hits = client_for(&mock_server).search("Springfield").await;

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].display_name, "Springfield, Illinois, US");
    assert_eq!(hits[0].coordinates.lat, 39.7817);
    assert_eq!(hits[1].display_name, "Springfield, JM");
}

#[tokio::test]
async fn test_search_empty_result_stays_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let hits = client_for(&mock_server).search("Paris").await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_search_server_error_falls_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let hits = client_for(&mock_server).search("Paris").await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].display_name, "Paris, France");
}

#[tokio::test]
async fn test_search_bad_body_falls_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let hits = client_for(&mock_server).search("tokyo").await;
    assert_eq!(hits[0].name, "Tokyo");
}

#[tokio::test]
async fn test_search_blank_query_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).search("  ").await.is_empty());
}

#[tokio::test]
async fn test_reverse_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Seattle", "state": "Washington", "country": "US", "lat": 47.6062, "lon": -122.3321 }
        ])))
        .mount(&mock_server)
        .await;

    let name = client_for(&mock_server).reverse(47.6, -122.3).await;
    assert_eq!(name.as_deref(), Some("Seattle, Washington, US"));
}

#[tokio::test]
async fn test_reverse_empty_result_uses_nearest_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let name = client_for(&mock_server).reverse(51.4, -0.2).await;
    assert_eq!(name.as_deref(), Some("London, UK"));
}

#[tokio::test]
async fn test_unreachable_server_falls_back() {
    let client = GeocodingClient::new(GeocodingConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: Some("test-key".to_string()),
        timeout: Duration::from_secs(2),
        search_limit: 5,
    })
    .unwrap();

    let hits = client.search("Berlin").await;
    assert_eq!(hits[0].name, "Berlin");

    let name = client.reverse(-33.9, 151.2).await;
    assert_eq!(name.as_deref(), Some("Sydney, Australia"));
}

#[tokio::test]
async fn test_location_manager_search_then_save() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Bergen", "state": "Vestland", "country": "NO", "lat": 60.39, "lon": 5.32 }
        ])))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let manager = LocationManager::new(store, client_for(&mock_server));

    let hits = manager.search_locations("Bergen").await;
    assert_eq!(hits.len(), 1);

    let saved = manager.save_location(hits[0].clone().into());
    manager.add_to_recent(&saved.display_name);

    let all = manager.get_saved_locations();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].display_name, "Bergen, Vestland, NO");
    assert_eq!(manager.get_recent_locations(), vec!["Bergen, Vestland, NO"]);
}
