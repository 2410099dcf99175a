//! End-to-end notification capture tests.

use axum::http::StatusCode;
use serde_json::{json, Value};
use webhook_recorder::config::MalformedPolicy;

mod common;

use common::TestServer;

const BASE: &str = "/interfazpagos/api/notificaciones";

#[tokio::test]
async fn test_exact_route_acknowledges_and_logs_body() {
    let server = TestServer::start().await;

    let res = server.post(BASE, r#"{"id":1}"#).await;
    assert_eq!(res.status(), StatusCode::OK);
    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("request id echoed");

    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack["message"], "POST recibido en /notificaciones");
    assert_eq!(ack["data"]["endpoint"], BASE);
    assert_eq!(ack["data"]["body"], json!({"id": 1}));
    assert_eq!(ack["data"]["headers"]["content-type"], "application/json");
    assert!(ack["data"]["timestamp"].is_string());
    assert!(ack["data"].get("params").is_none());
    assert_eq!(ack["data"]["requestId"], request_id.as_str());

    let records = server.wait_for_records(1).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["body"], json!({"id": 1}));
    assert_eq!(records[0]["rawBody"], r#"{"id":1}"#);
    assert_eq!(records[0]["id"], request_id.as_str());
    assert_eq!(records[0]["method"], "POST");

    server.stop().await;
}

#[tokio::test]
async fn test_param_route_substitutes_segment() {
    let server = TestServer::start().await;

    let res = server.post(&format!("{BASE}/abc"), r#"{"evento":"pago"}"#).await;
    assert_eq!(res.status(), StatusCode::OK);

    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack["message"], "POST recibido en /notificaciones con parámetro");
    assert_eq!(ack["data"]["endpoint"], format!("{BASE}/abc"));
    assert_eq!(ack["data"]["params"]["param"], "abc");

    let records = server.wait_for_records(1).await;
    assert_eq!(records[0]["endpoint"], format!("{BASE}/abc"));
    assert_eq!(records[0]["params"]["param"], "abc");

    server.stop().await;
}

#[tokio::test]
async fn test_wildcard_route_captures_suffix() {
    let server = TestServer::start().await;

    let res = server.post(&format!("{BASE}/a/b/c"), r#"{"x":[1,{"y":2}]}"#).await;
    assert_eq!(res.status(), StatusCode::OK);

    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack["message"], "POST recibido en /notificaciones con multiples parámetros");
    assert_eq!(ack["data"]["endpoint"], format!("{BASE}/a/b/c"));
    assert_eq!(ack["data"]["params"]["0"], "a/b/c");

    let records = server.wait_for_records(1).await;
    assert!(records[0]["endpoint"].as_str().unwrap().ends_with("a/b/c"));
    assert_eq!(records[0]["body"], json!({"x": [1, {"y": 2}]}));

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_body_rejected_but_logged() {
    let server = TestServer::start().await;

    let res = server.post(BASE, "not-json").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "JSON inválido");
    assert!(err["detail"].is_string());

    let records = server.wait_for_records(1).await;
    assert_eq!(records[0]["rawBody"], "not-json");
    assert_eq!(records[0]["body"], Value::Null);
    assert!(records[0]["parseError"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_body_accepted_when_configured() {
    let server = TestServer::start_with(|config| {
        config.parser.on_malformed = MalformedPolicy::Accept;
    })
    .await;

    let res = server.post(&format!("{BASE}/abc"), "not-json").await;
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack["data"]["body"], json!({}));

    let records = server.wait_for_records(1).await;
    assert_eq!(records[0]["rawBody"], "not-json");
    assert_eq!(records[0]["body"], Value::Null);

    server.stop().await;
}

#[tokio::test]
async fn test_scalar_body_rejected_in_strict_mode() {
    let server = TestServer::start().await;

    let res = server.post(BASE, "42").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let records = server.wait_for_records(1).await;
    assert_eq!(records[0]["rawBody"], "42");

    server.stop().await;
}

#[tokio::test]
async fn test_empty_body_acknowledged_with_placeholder() {
    let server = TestServer::start().await;

    let res = server.client.post(server.url(BASE)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack["data"]["body"], json!({}));

    let records = server.wait_for_records(1).await;
    assert_eq!(records[0]["rawBody"], "");
    assert!(records[0].get("parseError").is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_identical_requests_produce_distinct_records() {
    let server = TestServer::start().await;

    for _ in 0..3 {
        let res = server.post(BASE, r#"{"id":7}"#).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let records = server.wait_for_records(3).await;
    assert_eq!(records.len(), 3);
    let mut timestamps: Vec<&str> = records.iter().map(|r| r["timestamp"].as_str().unwrap()).collect();
    let mut ids: Vec<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
    timestamps.sort();
    timestamps.dedup();
    ids.sort();
    ids.dedup();
    assert_eq!(timestamps.len(), 3);
    assert_eq!(ids.len(), 3);

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let server = TestServer::start().await;

    let res = server.post("/otra/ruta", r#"{"id":1}"#).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["path"], "/otra/ruta");

    let res = server.client.get(server.url(BASE)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers().get("allow").unwrap(), "POST");

    assert_eq!(server.stop().await.written, 0);
}

#[tokio::test]
async fn test_headers_recorded_in_full() {
    let server = TestServer::start().await;

    let res = server
        .client
        .post(server.url(BASE))
        .header("content-type", "application/json")
        .header("x-signature", "sig-123")
        .header("x-trace", "a")
        .header("x-trace", "b")
        .body(r#"{"id":9}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let records = server.wait_for_records(1).await;
    let headers = &records[0]["headers"];
    assert_eq!(headers["x-signature"], "sig-123");
    assert_eq!(headers["x-trace"], json!(["a", "b"]));
    assert!(headers["x-request-id"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn test_chunked_body_over_limit_is_recorded_and_rejected() {
    let server = TestServer::start_with(|config| {
        config.security.max_body_size = 64;
    })
    .await;

    let padding = "x".repeat(256);
    let chunks: Vec<Result<String, std::io::Error>> = vec![
        Ok(r#"{"padding":""#.to_string()),
        Ok(padding),
        Ok(r#""}"#.to_string()),
    ];
    let res = server
        .client
        .post(server.url(BASE))
        .header("content-type", "application/json")
        .body(reqwest::Body::wrap_stream(futures_util::stream::iter(chunks)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "Cuerpo demasiado grande");

    let records = server.wait_for_records(1).await;
    let raw = records[0]["rawBody"].as_str().unwrap();
    assert!(raw.starts_with(r#"{"padding":""#));
    assert!(raw.len() <= 64);
    assert_eq!(records[0]["body"], Value::Null);
    assert!(records[0]["captureError"].as_str().unwrap().contains("length limit"));

    server.stop().await;
}

#[tokio::test]
async fn test_aborted_upload_keeps_partial_record() {
    let server = TestServer::start().await;

    let chunks: Vec<Result<&'static str, std::io::Error>> = vec![
        Ok(r#"{"id":"#),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client gave up")),
    ];
    let sent = server
        .client
        .post(server.url(BASE))
        .header("content-type", "application/json")
        .body(reqwest::Body::wrap_stream(futures_util::stream::iter(chunks)))
        .send()
        .await;
    assert!(sent.is_err());

    let records = server.wait_for_records(1).await;
    assert_eq!(records[0]["rawBody"], r#"{"id":"#);
    assert_eq!(records[0]["body"], Value::Null);
    assert!(records[0]["captureError"].is_string());
    assert!(records[0].get("parseError").is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_route_errors_take_precedence_over_malformed_body() {
    let server = TestServer::start().await;

    let res = server.post("/otra/ruta", "not-json").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .put(server.url(BASE))
        .header("content-type", "application/json")
        .body("not-json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(server.stop().await.written, 0);
}
