//! Mock backend behaviour over real HTTP

mod common;

use std::time::Duration;

use orangehrm_e2e::{Mock, MockServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn started() -> MockServer {
    common::init_tracing();
    MockServer::start().await.unwrap()
}

#[tokio::test]
async fn interceptor_is_consumed() {
    let mock = started().await;
    mock.register(Mock::get("/ping").reply(200, json!({ "pong": true })));
    let http = reqwest::Client::new();

    let first = http.get(format!("{}/ping", mock.uri())).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.json::<Value>().await.unwrap(), json!({ "pong": true }));
    assert!(mock.is_done());

    let second = http.get(format!("{}/ping", mock.uri())).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_IMPLEMENTED);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "no match for request GET /ping");
    assert_eq!(mock.unmatched()[0].path, "/ping");
}

#[tokio::test]
async fn times_allows_repeats() {
    let mock = started().await;
    mock.register(Mock::delete("/employees/1").reply_empty(204).times(2));
    let http = reqwest::Client::new();
    let url = format!("{}/employees/1", mock.uri());

    assert_eq!(http.delete(&url).send().await.unwrap().status(), StatusCode::NO_CONTENT);
    assert!(!mock.is_done());
    assert_eq!(http.delete(&url).send().await.unwrap().status(), StatusCode::NO_CONTENT);
    mock.assert_done().unwrap();
}

#[tokio::test]
async fn duplicate_query_keys_do_not_match_single_value() {
    let mock = started().await;
    mock.register(
        Mock::get("/employees/search")
            .match_query([("query", "John")])
            .reply(200, json!([])),
    );
    let url = format!("{}/employees/search?query=Jane&query=John", mock.uri());

    let status = reqwest::get(&url).await.unwrap().status();
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(mock.pending().len(), 1);
    assert_eq!(
        mock.unmatched()[0].query,
        vec![("query".to_string(), "Jane".to_string()), ("query".to_string(), "John".to_string())]
    );
}

#[tokio::test]
async fn earliest_registration_wins() {
    let mock = started().await;
    mock.register(Mock::post("/auth/logout").reply(200, json!({ "message": "first" })));
    mock.register(Mock::post("/auth/logout").reply(500, json!({ "message": "second" })));
    let http = reqwest::Client::new();
    let url = format!("{}/auth/logout", mock.uri());

    let body: Value = http.post(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["message"], "first");
    let status = http.post(&url).send().await.unwrap().status();
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn clean_all_drops_everything() {
    let mock = started().await;
    mock.register(Mock::get("/viewEmployeeList").reply(200, json!([])));
    reqwest::get(format!("{}/unknown", mock.uri())).await.unwrap();
    assert_eq!(mock.pending().len(), 1);
    assert_eq!(mock.unmatched().len(), 1);

    mock.clean_all();
    assert!(mock.is_done());
    assert!(mock.unmatched().is_empty());
}

#[tokio::test]
async fn drop_stops_listening() {
    let mock = started().await;
    let url = format!("{}/ping", mock.uri());
    drop(mock);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    assert!(http.get(&url).send().await.is_err());
}
