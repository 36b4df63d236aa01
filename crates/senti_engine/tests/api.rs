use std::time::Duration;

use senti_engine::{AnalysisApi, ApiSettings, FailureKind, ReqwestApi};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings::with_base_url(server.uri())).expect("valid base url")
}

#[tokio::test]
async fn submit_posts_product_and_accepts_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_json(json!({"product": "Apple IPhone 15"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"product_name": "Apple IPhone 15"})))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .submit_analysis("Apple IPhone 15")
        .await
        .expect("accepted");
}

#[tokio::test]
async fn submit_accepts_an_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(api_for(&server).submit_analysis("Dell XPS 13").await.is_ok());
}

#[tokio::test]
async fn submit_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .submit_analysis("Dell XPS 13")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn progress_defaults_missing_modules() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"google": 40, "summary": 100, "completed": false})),
        )
        .mount(&server)
        .await;

    let snapshot = api_for(&server).fetch_progress().await.expect("progress");
    assert_eq!(snapshot.google, 40);
    assert_eq!(snapshot.youtube, 0);
    assert_eq!(snapshot.summary, 100);
    assert!(!snapshot.completed);
    assert_eq!(snapshot.aggregate_percent(), 32);
}

#[tokio::test]
async fn results_keep_display_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "google_summary": "Strong battery.",
            "comment_summary": "Viewers like the camera.",
            "tldr_lines": ["Good", "Low risk", "Buy"],
            "sentiment": {"positive": 70.5}
        })))
        .mount(&server)
        .await;

    let envelope = api_for(&server).fetch_results().await.expect("results");
    assert!(!envelope.is_processing());
    assert_eq!(envelope.google_summary.as_deref(), Some("Strong battery."));
    assert_eq!(envelope.tldr_lines.as_ref().map(Vec::len), Some(3));
    assert_eq!(envelope.rest["sentiment"]["positive"], json!(70.5));
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).fetch_progress().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_poll_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/results"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "processing"})),
        )
        .mount(&server)
        .await;

    let settings = ApiSettings {
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::with_base_url(server.uri())
    };
    let err = ReqwestApi::new(settings)
        .expect("valid base url")
        .fetch_results()
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/senti/api/progress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"completed": true})))
        .expect(1)
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings::with_base_url(format!("{}/senti", server.uri())))
        .expect("valid base url");
    assert!(api.fetch_progress().await.expect("progress").completed);
}

#[tokio::test]
async fn invalid_base_url_is_rejected() {
    let err = ReqwestApi::new(ApiSettings::with_base_url("not a url")).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let api = ReqwestApi::new(ApiSettings {
        connect_timeout: Duration::from_millis(200),
        ..ApiSettings::with_base_url("http://127.0.0.1:9")
    })
    .expect("valid base url");
    let err = api.fetch_progress().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}
