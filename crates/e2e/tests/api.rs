//! Employee API scenarios against the mock backend

mod common;

use orangehrm_e2e::models::{EmployeeUpdate, NewEmployee};
use orangehrm_e2e::scenarios::MOCK_TOKEN;
use orangehrm_e2e::{ApiClient, E2eError, Mock, MockServer, Outcome};
use serde_json::json;
use test_case::test_case;

#[test_case("TC_API_01" ; "login valid")]
#[test_case("TC_API_02" ; "login invalid")]
#[test_case("TC_API_03" ; "employee list")]
#[test_case("TC_API_04" ; "employee by id")]
#[test_case("TC_API_05" ; "create employee")]
#[test_case("TC_API_06" ; "update employee")]
#[test_case("TC_API_07" ; "delete employee")]
#[test_case("TC_API_08" ; "list without token")]
#[test_case("TC_API_09" ; "search employees")]
#[test_case("TC_API_10" ; "logout")]
#[tokio::test]
async fn api_scenario_passes(id: &str) {
    let result = common::run_offline(id).await;
    assert_eq!(result.outcome, Outcome::Passed, "{}: {:?}", id, result.error);
    assert_eq!(result.kind, "api");
}

/// API scenarios never touch a browser, so a live target runs them too
#[tokio::test]
async fn api_scenario_ignores_target() {
    let result = common::run("TC_API_07", orangehrm_e2e::Target::Live).await;
    assert_eq!(result.outcome, Outcome::Passed, "{:?}", result.error);
}

async fn backend() -> (MockServer, ApiClient) {
    common::init_tracing();
    let mock = MockServer::start().await.unwrap();
    let client = ApiClient::new(mock.uri()).unwrap();
    (mock, client)
}

#[tokio::test]
async fn non_success_status_names_operation() {
    let (mock, client) = backend().await;
    mock.register(Mock::get("/employees/9").reply(404, json!({ "error": "Not found" })));

    let err = client.get_employee_by_id(MOCK_TOKEN, 9).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Get employee by ID failed with status 404");
}

#[tokio::test]
async fn wrong_token_falls_through_to_501() {
    let (mock, client) = backend().await;
    mock.register(
        Mock::get("/viewEmployeeList")
            .match_header("authorization", format!("Bearer {}", MOCK_TOKEN))
            .reply(200, json!([])),
    );

    let err = client.get_employees("stale-token").await.unwrap_err();
    assert!(matches!(err, E2eError::Http { status: 501, operation: "Get employees" }));
    assert_eq!(mock.unmatched().len(), 1);
    assert_eq!(mock.pending(), vec!["GET /viewEmployeeList".to_string()]);
    assert!(mock.assert_done().is_err());
}

#[tokio::test]
async fn create_sends_camel_case_body() {
    let (mock, client) = backend().await;
    mock.register(
        Mock::post("/employees")
            .match_body(json!({ "firstName": "Ada", "lastName": "Lovelace" }))
            .reply(201, json!({ "id": 42, "firstName": "Ada", "lastName": "Lovelace" })),
    );

    let created = client
        .create_employee(
            "",
            &NewEmployee {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.id, 42);
    assert_eq!(created.email, None);
    mock.assert_done().unwrap();
}

#[tokio::test]
async fn partial_update_omits_unset_fields() {
    let (mock, client) = backend().await;
    mock.register(
        Mock::put("/employees/5")
            .match_body(json!({ "email": "new@example.com" }))
            .reply(200, json!({ "id": 5, "firstName": "Jane", "lastName": "Smith", "email": "new@example.com" })),
    );

    let update = EmployeeUpdate {
        email: Some("new@example.com".into()),
        ..Default::default()
    };
    let updated = client.update_employee(MOCK_TOKEN, 5, &update).await.unwrap();
    assert_eq!(updated.email.as_deref(), Some("new@example.com"));
    mock.assert_done().unwrap();
}

#[tokio::test]
async fn search_query_is_encoded() {
    let (mock, client) = backend().await;
    mock.register(
        Mock::get("/employees/search")
            .match_query([("query", "Jo Ann")])
            .reply(200, json!([{ "id": 7, "firstName": "Jo Ann", "lastName": "Lee" }])),
    );

    let results = client.search_employees(MOCK_TOKEN, "Jo Ann").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].first_name, "Jo Ann");
}
