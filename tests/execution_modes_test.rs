//! One call, four ways to complete it: await, block, callback, future.

mod support;

use std::time::Duration;
use support::FakeTransport;
use watson_sdk::http::headers::X_WATSON_LEARNING_OPT_OUT;
use watson_sdk::http::response::{JsonConverter, StringConverter};
use watson_sdk::prelude::*;
use watson_sdk::service::callback_fn;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ok" }))
                .insert_header("x-request-id", "r-1"),
        )
        .mount(&server)
        .await;
    server
}

fn service(uri: impl Into<String>) -> WatsonService {
    WatsonService::builder("test_service", uri)
        .username_and_password("user", "pass")
        .build()
        .unwrap()
}

fn ping(svc: &WatsonService) -> ServiceCall<JsonConverter<serde_json::Value>> {
    svc.create_call(RequestBuilder::get("/v1/ping"), JsonConverter::new())
}

#[tokio::test]
async fn execute_with_details_keeps_status_and_headers() {
    let server = server().await;
    let response = ping(&service(server.uri()))
        .execute_with_details()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-request-id"], "r-1");
    assert_eq!(response.result()["status"], "ok");
}

#[tokio::test]
async fn enqueue_reports_to_callback() {
    let server = server().await;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let ok_tx = tx.clone();
    let handle = ping(&service(server.uri())).enqueue(callback_fn(
        move |value: serde_json::Value| {
            let _ = ok_tx.send(Ok(value));
        },
        move |err| {
            let _ = tx.send(Err(err));
        },
    ));
    handle.unwrap().await.unwrap();
    let value = rx.recv().await.unwrap().unwrap();
    assert_eq!(value["status"], "ok");
}

#[tokio::test]
async fn enqueue_with_details_reports_failures() {
    let transport = FakeTransport::failing(WatsonError::HttpError("connection refused".into()));
    let svc = WatsonService::builder("test_service", "https://h/api")
        .skip_authentication(true)
        .with_transport(transport.clone())
        .build()
        .unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    let ok_tx = tx.clone();
    svc.create_call(RequestBuilder::get("/v1/ping"), StringConverter)
        .enqueue_with_details(callback_fn(
            move |r: Response<String>| {
                let _ = ok_tx.send(Ok(r.status()));
            },
            move |err| {
                let _ = tx.send(Err(err));
            },
        ))
        .unwrap()
        .await
        .unwrap();

    let err = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap_err();
    assert!(matches!(err, WatsonError::HttpError(_)));
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(transport.sent()[0].url, "https://h/api/v1/ping");
}

#[tokio::test]
async fn rx_future_resolves_to_result() {
    let server = server().await;
    let future = ping(&service(server.uri())).rx();
    let value = future.await.unwrap();
    assert_eq!(value["status"], "ok");

    let details = ping(&service(server.uri())).rx_with_details().await.unwrap();
    assert_eq!(details.status(), 200);
}

#[tokio::test]
async fn aborted_future_is_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let future = service(server.uri())
        .create_call(RequestBuilder::get("/v1/slow"), StringConverter)
        .rx();
    future.abort();
    let err = future.await.unwrap_err();
    assert!(matches!(err, WatsonError::Cancelled(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_blocking_from_plain_thread() {
    let server = server().await;
    let call = ping(&service(server.uri()));
    let worker = std::thread::spawn(move || call.execute_blocking());
    let value = tokio::task::spawn_blocking(move || worker.join().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(value["status"], "ok");
}

#[tokio::test]
async fn execute_blocking_inside_runtime_is_refused() {
    let server = server().await;
    let err = ping(&service(server.uri())).execute_blocking().unwrap_err();
    assert!(matches!(err, WatsonError::ConfigurationError(_)));
}

#[test]
fn blocking_and_enqueue_without_a_runtime() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1/ping")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .with_status(200)
        .with_body("pong")
        .expect(2)
        .create();

    let svc = WatsonService::builder("test_service", server.url())
        .username_and_password("user", "pass")
        .build()
        .unwrap();
    let call = || svc.create_call(RequestBuilder::get("/v1/ping"), StringConverter);

    assert_eq!(call().execute_blocking().unwrap(), "pong");

    let (tx, rx) = std::sync::mpsc::channel();
    let err_tx = tx.clone();
    let handle = call().enqueue(callback_fn(
        move |body: String| {
            let _ = tx.send(Ok(body));
        },
        move |err| {
            let _ = err_tx.send(Err(err));
        },
    ));
    assert!(handle.is_some());
    let body = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(body, "pong");
    mock.assert();
}

#[tokio::test]
async fn call_headers_are_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-watson-learning-opt-out", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service(server.uri());
    let body = svc
        .create_call(RequestBuilder::get("/v1/ping"), StringConverter)
        .add_header(X_WATSON_LEARNING_OPT_OUT, "true")
        .execute()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn invalid_request_surfaces_from_execute() {
    let transport = FakeTransport::responding(200, "unused");
    let svc = WatsonService::builder("test_service", "https://h/api")
        .skip_authentication(true)
        .with_transport(transport.clone())
        .build()
        .unwrap();

    let call = svc.create_call(
        RequestBuilder::get("/v1/ping").body_json(&serde_json::json!({ "a": 1 })),
        StringConverter,
    );
    assert!(call.request().is_none());
    let err = call.execute().await.unwrap_err();
    assert!(matches!(err, WatsonError::InvalidParameter(_)));

    let err = svc
        .create_call(RequestBuilder::get("/v1/ping"), StringConverter)
        .add_header("bad header", "x")
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, WatsonError::ConfigurationError(_)));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn fake_transport_sees_prepared_request() {
    let transport = FakeTransport::responding(200, "fine");
    let svc = WatsonService::builder("test_service", "https://h/api/")
        .bearer_token("t")
        .with_transport(transport.clone())
        .build()
        .unwrap();

    let body = svc
        .create_call(
            RequestBuilder::post("v1/items")
                .query("version", "2024-01-01")
                .body_json(&serde_json::json!({ "x": 1 })),
            StringConverter,
        )
        .execute()
        .await
        .unwrap();
    assert_eq!(body, "fine");

    let sent = transport.sent();
    assert_eq!(sent[0].url, "https://h/api/v1/items?version=2024-01-01");
    assert_eq!(sent[0].headers["authorization"], "Bearer t");
    assert_eq!(sent[0].headers["content-type"], "application/json");
    assert_eq!(sent[0].headers["accept"], "application/json");
}
