//! HTTP-level tests for the service routes using wiremock upstreams.
//!
//! One mock server stands in for geocoding, forecast and VOICEVOX; their
//! paths do not overlap.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tenki::geocoding::fallback_notice;
use tenki::http::GuardedClient;
use tenki::romaji::ReadingAnalyzer;
use tenki::{
    AppState, ForecastClient, Geocoder, RomajiConverter, SpeechSynthesizer, WeatherClient,
    prefecture, web,
};
use tower::ServiceExt;
use wiremock::matchers::{body_string, header as header_matcher, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Analyzer that treats its input as already being a reading
struct EchoReadings;

impl ReadingAnalyzer for EchoReadings {
    fn to_hiragana(&self, text: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

fn ready_converter() -> RomajiConverter {
    RomajiConverter::ready(Arc::new(EchoReadings))
}

fn state_for(upstream: &str, converter: RomajiConverter, timeout: Duration) -> AppState {
    let http = GuardedClient::new(timeout).unwrap();
    AppState {
        geocoder: Geocoder::new(http.clone(), upstream),
        forecast: ForecastClient::new(http.clone(), upstream),
        speech: SpeechSynthesizer::new(http, upstream),
        converter,
        await_converter: false,
    }
}

fn app_for(upstream: &MockServer) -> Router {
    web::app(
        state_for(&upstream.uri(), ready_converter(), Duration::from_secs(5)),
        None,
    )
}

fn geocoding_hit(name: &str) -> Value {
    json!({
        "results": [{
            "id": 1850147,
            "name": name,
            "latitude": 35.6895,
            "longitude": 139.69171,
            "country": "日本"
        }],
        "generationtime_ms": 0.6
    })
}

fn geocoding_miss() -> Value {
    json!({ "generationtime_ms": 0.4 })
}

fn forecast_body() -> Value {
    json!({
        "latitude": 35.7,
        "longitude": 139.69,
        "timezone": "Asia/Tokyo",
        "current": {
            "time": "2026-10-18T09:00",
            "interval": 900,
            "temperature_2m": 19.4,
            "relative_humidity_2m": 71,
            "weather_code": 3,
            "wind_speed_10m": 9.7
        }
    })
}

async fn mount_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        // coordinates of the geocoding hit are forwarded unchanged
        .and(query_param("latitude", "35.6895"))
        .and(query_param("longitude", "139.69171"))
        .and(query_param(
            "current",
            "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m",
        ))
        .and(query_param("timezone", "Asia/Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn weather_uri(city: &str, original_city: &str) -> String {
    format!(
        "/weather?city={}&originalCity={}",
        urlencoding::encode(city),
        urlencoding::encode(original_city)
    )
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;

    for uri in ["/health", "/api/health"] {
        let (status, body) = get(app_for(&server), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }
}

#[tokio::test]
async fn test_weather_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "tokyo"))
        .and(query_param("countryCode", "JP"))
        .and(query_param("language", "ja"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit("東京")))
        .expect(1)
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let (status, body) = get(app_for(&server), &weather_uri("Tokyo", "東京")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["city"], json!("東京"));
    assert_eq!(body["country"], json!("日本"));
    assert!(body.get("notice").is_none());
    assert_eq!(body["current"]["temperatureC"], json!(19.4));
    assert_eq!(body["current"]["humidity"], json!(71.0));
    assert_eq!(body["current"]["weatherCode"], json!(3));
    assert_eq!(body["current"]["windSpeed"], json!(9.7));
    assert_eq!(body["current"]["time"], json!("2026-10-18T09:00"));
}

#[tokio::test]
async fn test_weather_under_api_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit("大阪市")))
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let (status, body) = get(app_for(&server), "/api/weather?city=osaka").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], json!("大阪市"));
}

#[tokio::test]
async fn test_weather_prefecture_fallback_for_every_prefecture() {
    let server = MockServer::start().await;

    for (prefecture, city) in prefecture::entries() {
        server.reset().await;
        // The direct lookup misses once; a prefecture sharing its city's name
        // must still reach the representative city on the retry.
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("name", prefecture))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_miss()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("name", city))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit(city)))
            .mount(&server)
            .await;
        mount_forecast(&server).await;

        let original = format!("{prefecture}県");
        let (status, body) = get(app_for(&server), &weather_uri(prefecture, &original)).await;

        assert_eq!(status, StatusCode::OK, "{prefecture}");
        assert_eq!(body["city"], json!(city), "{prefecture}");
        assert_eq!(
            body["notice"],
            json!(fallback_notice(&original, city)),
            "{prefecture}"
        );
    }
}

#[tokio::test]
async fn test_weather_fallback_term_is_lower_cased() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "aichi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_miss()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "nagoya"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit("名古屋市")))
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let (status, body) = get(app_for(&server), &weather_uri("Aichi", "愛知")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["notice"],
        json!("「愛知」が見つからなかったため、主要都市（名古屋市）で検索しています。")
    );
}

#[tokio::test]
async fn test_weather_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_miss()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/weather?city=atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "ok": false, "message": "検索結果がヒットしませんでした。" })
    );
}

#[tokio::test]
async fn test_weather_prefecture_without_representative_hit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_miss()))
        .expect(2)
        .mount(&server)
        .await;

    let (status, _) = get(app_for(&server), "/weather?city=okinawa").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_weather_fallback_retry_errors_propagate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "aichi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_miss()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "nagoya"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "nagoya"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":"nagoya"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/weather?city=aichi").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "ok": false, "message": tenki::geocoding::GEOCODING_FETCH_ERROR_MESSAGE })
    );

    let (status, body) = get(app_for(&server), "/weather?city=aichi").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "ok": false, "message": tenki::geocoding::GEOCODING_PARSE_ERROR_MESSAGE })
    );
}

#[tokio::test]
async fn test_weather_rejects_invalid_city_without_upstream_calls() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let too_long = "a".repeat(101);
    for uri in [
        "/weather".to_string(),
        "/weather?city=".to_string(),
        "/weather?city=%20%20".to_string(),
        "/weather?city=tokyo%3Bdrop".to_string(),
        format!("/weather?city={too_long}"),
        format!("/weather?city=tokyo&originalCity={too_long}"),
    ] {
        let (status, body) = get(app_for(&server), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body,
            json!({ "ok": false, "message": "city query is required" }),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_weather_geocoding_timeout_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(geocoding_hit("東京"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let app = web::app(
        state_for(&server.uri(), ready_converter(), Duration::from_millis(200)),
        None,
    );
    let started = Instant::now();
    let (status, body) = get(app, "/weather?city=tokyo").await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(
        body["message"],
        json!(tenki::geocoding::GEOCODING_FETCH_ERROR_MESSAGE)
    );
}

#[tokio::test]
async fn test_weather_geocoding_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/elsewhere", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit("東京")))
        .expect(0)
        .mount(&server)
        .await;

    let (status, _) = get(app_for(&server), "/weather?city=tokyo").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_weather_geocoding_bad_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/weather?city=tokyo").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["message"],
        json!(tenki::geocoding::GEOCODING_PARSE_ERROR_MESSAGE)
    );
}

#[tokio::test]
async fn test_weather_forecast_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit("東京")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "current": {} })))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/weather?city=tokyo").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "ok": false, "message": "Failed to fetch weather data" })
    );

    let (status, body) = get(app_for(&server), "/weather?city=tokyo").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "ok": false, "message": "Invalid weather data response" })
    );
}

#[tokio::test]
async fn test_convert_to_romaji_ready() {
    let server = MockServer::start().await;

    let (status, body) =
        post_json(app_for(&server), "/convert-to-romaji", r#"{"text":"とうきょう"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "romaji": "tokyo" }));

    let (status, body) =
        post_json(app_for(&server), "/api/convert-to-romaji", r#"{"text":"おおさか"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["romaji"], json!("osaka"));
}

#[tokio::test]
async fn test_convert_to_romaji_rejects_bad_bodies() {
    let server = MockServer::start().await;

    let (status, body) = post_json(app_for(&server), "/convert-to-romaji", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "ok": false, "message": "Invalid JSON" }));

    let too_long = format!(r#"{{"text":"{}"}}"#, "あ".repeat(101));
    for payload in [r#"{"text":""}"#, r#"{"text":42}"#, r#"{}"#, too_long.as_str()] {
        let (status, body) = post_json(app_for(&server), "/convert-to-romaji", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(
            body,
            json!({ "ok": false, "message": "Invalid request" }),
            "{payload}"
        );
    }
}

#[tokio::test]
async fn test_convert_to_romaji_without_content_type() {
    let server = MockServer::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/convert-to-romaji")
        .body(Body::from(r#"{"text":"とうきょう"}"#))
        .unwrap();

    let (status, _, body) = send(app_for(&server), request).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "ok": true, "romaji": "tokyo" }));
}

#[tokio::test]
async fn test_convert_to_romaji_oversized_body() {
    let server = MockServer::start().await;
    let payload = format!(r#"{{"text":"{}"}}"#, "a".repeat(20_000));
    let request = Request::builder()
        .method("POST")
        .uri("/convert-to-romaji")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();

    let (status, _, body) = send(app_for(&server), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "ok": false, "message": "Invalid JSON" }));
}

#[tokio::test]
async fn test_convert_to_romaji_oversized_body_while_initializing() {
    let server = MockServer::start().await;
    let converter = RomajiConverter::initialize(std::future::pending::<
        anyhow::Result<Arc<dyn ReadingAnalyzer>>,
    >());
    let app = web::app(
        state_for(&server.uri(), converter, Duration::from_secs(5)),
        None,
    );

    let (status, body) = post_json(
        app,
        "/convert-to-romaji",
        &format!(r#"{{"text":"{}"}}"#, "a".repeat(20_000)),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], json!("Converter not ready"));
}

#[tokio::test]
async fn test_convert_to_romaji_while_initializing() {
    let server = MockServer::start().await;
    let converter = RomajiConverter::initialize(std::future::pending::<
        anyhow::Result<Arc<dyn ReadingAnalyzer>>,
    >());
    let app = web::app(
        state_for(&server.uri(), converter, Duration::from_secs(5)),
        None,
    );

    let (status, body) = post_json(app, "/convert-to-romaji", r#"{"text":"とうきょう"}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "ok": false, "message": "Converter not ready" }));
}

#[tokio::test]
async fn test_convert_to_romaji_awaits_initialization_when_configured() {
    let server = MockServer::start().await;
    let converter = RomajiConverter::initialize(async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Arc::new(EchoReadings) as Arc<dyn ReadingAnalyzer>)
    });
    let mut state = state_for(&server.uri(), converter, Duration::from_secs(5));
    state.await_converter = true;

    let (status, body) = post_json(
        web::app(state, None),
        "/convert-to-romaji",
        r#"{"text":"きょうと"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["romaji"], json!("kyoto"));
}

#[tokio::test]
async fn test_convert_to_romaji_after_failed_initialization() {
    let server = MockServer::start().await;
    let app = web::app(
        state_for(
            &server.uri(),
            RomajiConverter::failed("dictionary missing"),
            Duration::from_secs(5),
        ),
        None,
    );

    let (status, body) = post_json(app, "/convert-to-romaji", r#"{"text":"とうきょう"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["message"], json!("Converter initialization failed"));
}

#[tokio::test]
async fn test_speech_success() {
    let server = MockServer::start().await;
    let query = r#"{"accent_phrases":[],"speedScale":1.0,"outputSamplingRate":24000}"#;
    Mock::given(method("POST"))
        .and(path("/audio_query"))
        .and(query_param("speaker", "3"))
        .and(query_param("text", "こんにちは"))
        .respond_with(ResponseTemplate::new(200).set_body_string(query))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/synthesis"))
        .and(query_param("speaker", "3"))
        .and(header_matcher("content-type", "application/json"))
        .and(body_string(query))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF\x24\0\0\0WAVE".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let uri = format!(
        "/speech?text={}&speaker=3",
        urlencoding::encode("こんにちは")
    );
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, headers, body) = send(app_for(&server), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(&body[..], b"RIFF\x24\0\0\0WAVE");
}

#[tokio::test]
async fn test_speech_defaults_to_speaker_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio_query"))
        .and(query_param("speaker", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/synthesis"))
        .and(query_param("speaker", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::builder()
        .uri("/api/speech?text=hello")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(app_for(&server), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_speech_rejects_invalid_input_without_engine_calls() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let too_long = "あ".repeat(301);
    for uri in [
        "/speech".to_string(),
        "/speech?text=".to_string(),
        "/speech?text=hi&speaker=0".to_string(),
        "/speech?text=hi&speaker=abc".to_string(),
        "/speech?text=hi&speaker=1000000".to_string(),
        format!("/speech?text={}", urlencoding::encode(&too_long)),
    ] {
        let (status, body) = get(app_for(&server), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body,
            json!({ "ok": false, "message": "読み上げテキストが不正です。" }),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_speech_engine_unreachable() {
    let app = web::app(
        state_for("http://127.0.0.1:9", ready_converter(), Duration::from_secs(2)),
        None,
    );

    let (status, body) = get(app, "/speech?text=hello").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "ok": false, "message": "VOICEVOXエンジンへの接続に失敗しました。" })
    );
}

#[tokio::test]
async fn test_speech_synthesis_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio_query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/synthesis"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/speech?text=hello").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "ok": false, "message": "音声の生成に失敗しました。" })
    );
}

#[tokio::test]
async fn test_client_lookup_against_running_service() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", "tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_hit("東京")))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_miss()))
        .mount(&upstream)
        .await;
    mount_forecast(&upstream).await;
    Mock::given(method("POST"))
        .and(path("/audio_query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/synthesis"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .mount(&upstream)
        .await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_for(&upstream);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = WeatherClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    let weather = client.lookup(" とうきょう ").await.unwrap();
    assert_eq!(weather.city, "東京");
    assert!(weather.notice.is_none());
    assert_eq!(weather.current.temperature_c, 19.4);

    let audio = client.speak(&weather, None).await.unwrap();
    assert_eq!(&audio[..], b"RIFF");

    let missing = client.lookup("atlantis").await.unwrap_err();
    assert_eq!(missing.to_string(), "検索結果がヒットしませんでした。");
}
