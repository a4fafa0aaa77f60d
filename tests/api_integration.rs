//! Integration tests for Skycast API endpoints.
//!
//! These verify the full request/response cycle through the HTTP API,
//! with the upstream provider stubbed by a mock server.

use axum_test::TestServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skycast::api::{AppState, router};
use skycast::service::WeatherService;
use skycast::upstream::OpenWeatherClient;

fn create_test_server(mock: &MockServer) -> TestServer {
    let client = OpenWeatherClient::with_base_urls("test-key", &mock.uri(), &mock.uri()).unwrap();
    let state = AppState {
        weather: WeatherService::new(client),
    };
    TestServer::new(router(state)).unwrap()
}

fn current_body(humidity: f64, temperature: f64) -> serde_json::Value {
    serde_json::json!({
        "name": "Sao Paulo",
        "sys": { "country": "BR" },
        "main": { "temp": temperature, "feels_like": temperature - 0.5, "humidity": humidity },
        "weather": [{ "description": "scattered clouds", "icon": "03d" }]
    })
}

fn forecast_body() -> serde_json::Value {
    // 24 slices starting at midnight: a full first day (skipped as the
    // partial "today" group) followed by two complete days.
    let list: Vec<serde_json::Value> = (0..24)
        .map(|i| {
            serde_json::json!({
                "dt": 1_786_838_400_i64 + 3 * 3600 * i,
                "main": { "temp": 18.0 },
                "weather": [{ "description": "few clouds", "icon": "02d" }]
            })
        })
        .collect();
    serde_json::json!({ "list": list })
}

async fn mount_happy_upstream(mock: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(60.0, 22.0)))
        .mount(mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(mock)
        .await;
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock);

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_get_current_weather() {
    let mock = MockServer::start().await;
    mount_happy_upstream(&mock).await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather/current?latitude=-23.55&longitude=-46.63")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["city"], "Sao Paulo");
    assert_eq!(body["region"], "SP");
    assert_eq!(body["country"], "BR");
    assert_eq!(body["humidity"], 60.0);
}

#[tokio::test]
async fn test_out_of_range_coordinate_is_bad_request() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather/current?latitude=91.0&longitude=0.0")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_missing_query_params_is_bad_request() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock);

    let response = server.get("/weather/current").await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_outage_maps_to_503() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock)
        .await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather/current?latitude=-23.55&longitude=-46.63")
        .await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_get_forecast() {
    let mock = MockServer::start().await;
    mount_happy_upstream(&mock).await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather/forecast?latitude=-23.55&longitude=-46.63")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["description"], "few clouds");
}

#[tokio::test]
async fn test_get_alerts_humid_conditions() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(85.0, 22.0)))
        .mount(&mock)
        .await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather/alerts?latitude=-23.55&longitude=-46.63")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let alerts = body.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["category"], "heavy_rain");
    assert_eq!(alerts[0]["affected_areas"][0], "Sao Paulo");
}

#[tokio::test]
async fn test_get_alerts_calm_conditions_placeholder() {
    let mock = MockServer::start().await;
    mount_happy_upstream(&mock).await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather/alerts?latitude=-23.55&longitude=-46.63")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let alerts = body.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["id"], "no-alert");
    assert_eq!(alerts[0]["category"], "informational");
}

#[tokio::test]
async fn test_get_composite() {
    let mock = MockServer::start().await;
    mount_happy_upstream(&mock).await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather?latitude=-23.55&longitude=-46.63")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["current"]["city"], "Sao Paulo");
    assert_eq!(body["forecast"].as_array().unwrap().len(), 2);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 1);
    for rel in ["self", "current", "forecast", "alerts"] {
        assert!(body["links"][rel]["href"].is_string(), "missing link {rel}");
    }
}

#[tokio::test]
async fn test_composite_fails_whole_when_current_fails() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock)
        .await;
    let server = create_test_server(&mock);

    let response = server
        .get("/weather?latitude=-23.55&longitude=-46.63")
        .await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert!(body.get("forecast").is_none());
    assert!(body.get("alerts").is_none());
}

#[tokio::test]
async fn test_geocode_success() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Sao Paulo", "lat": -23.55, "lon": -46.63, "country": "BR", "state": "SP" }
        ])))
        .mount(&mock)
        .await;
    let server = create_test_server(&mock);

    let response = server
        .get("/geocode?city=Sao%20Paulo&region=SP&country=BR")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["latitude"], -23.55);
    assert_eq!(body["formatted_address"], "Sao Paulo, SP, BR");
}

#[tokio::test]
async fn test_geocode_no_match_is_404() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock)
        .await;
    let server = create_test_server(&mock);

    let response = server
        .get("/geocode?city=Atlantis&region=XX&country=ZZ")
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn test_geocode_empty_city_is_400() {
    let mock = MockServer::start().await;
    let server = create_test_server(&mock);

    let response = server.get("/geocode?city=%20&region=SP&country=BR").await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}
