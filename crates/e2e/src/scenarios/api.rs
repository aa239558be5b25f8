use futures::FutureExt;
use serde_json::json;

use super::{ensure, ApiContext, Scenario};
use crate::error::{E2eError, E2eResult};
use crate::mock::Mock;
use crate::models::{EmployeeUpdate, NewEmployee};

const TAGS: &[&str] = &["api"];

/// Token every authenticated interceptor expects
pub const MOCK_TOKEN: &str = "mocked-token-123";

fn bearer() -> String {
    format!("Bearer {}", MOCK_TOKEN)
}

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::api("TC_API_01", "Login API with valid credentials", TAGS, |ctx| {
            login_valid(ctx).boxed()
        }),
        Scenario::api("TC_API_02", "Login API with invalid credentials", TAGS, |ctx| {
            login_invalid(ctx).boxed()
        }),
        Scenario::api("TC_API_03", "Fetch employee list", TAGS, |ctx| {
            employee_list(ctx).boxed()
        }),
        Scenario::api("TC_API_04", "Fetch specific employee by ID", TAGS, |ctx| {
            employee_by_id(ctx).boxed()
        }),
        Scenario::api("TC_API_05", "Create a new employee", TAGS, |ctx| {
            create_employee(ctx).boxed()
        }),
        Scenario::api("TC_API_06", "Update existing employee", TAGS, |ctx| {
            update_employee(ctx).boxed()
        }),
        Scenario::api("TC_API_07", "Delete an employee", TAGS, |ctx| {
            delete_employee(ctx).boxed()
        }),
        Scenario::api("TC_API_08", "Access unauthorized endpoint without token", TAGS, |ctx| {
            list_without_token(ctx).boxed()
        }),
        Scenario::api("TC_API_09", "Search employees", TAGS, |ctx| {
            search_employees(ctx).boxed()
        }),
        Scenario::api("TC_API_10", "Logout API", TAGS, |ctx| logout(ctx).boxed()),
    ]
}

/// The call must have failed with `status`, and say so in its message
fn expect_status<T: std::fmt::Debug>(result: E2eResult<T>, status: u16) -> E2eResult<()> {
    match result {
        Err(err) if err.status() == Some(status) => ensure(
            err.to_string().contains(&status.to_string()),
            format!("error message {:?} does not mention {}", err.to_string(), status),
        ),
        Err(err) => Err(E2eError::AssertionFailed(format!(
            "expected a {} error, got: {}",
            status, err
        ))),
        Ok(value) => Err(E2eError::AssertionFailed(format!(
            "expected a {} error, got {:?}",
            status, value
        ))),
    }
}

async fn login_valid(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::post("/auth/login")
            .match_body(json!({ "username": "Admin", "password": "admin123" }))
            .reply(
                200,
                json!({
                    "token": MOCK_TOKEN,
                    "user": { "username": "Admin", "role": "admin" },
                }),
            ),
    );

    let response = ctx.client.login("Admin", "admin123").await?;
    ensure(response.token == MOCK_TOKEN, format!("unexpected token {:?}", response.token))?;
    ensure(
        response.user.username == "Admin",
        format!("unexpected user {:?}", response.user.username),
    )?;
    ctx.mock.assert_done()
}

async fn login_invalid(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::post("/auth/login")
            .match_body(json!({ "username": "invalid_user", "password": "wrong_password" }))
            .reply(401, json!({ "error": "Invalid username or password" })),
    );

    expect_status(ctx.client.login("invalid_user", "wrong_password").await, 401)?;
    ctx.mock.assert_done()
}

async fn employee_list(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::get("/viewEmployeeList")
            .match_header("authorization", bearer())
            .reply(
                200,
                json!([
                    { "id": 1, "firstName": "John", "lastName": "Doe" },
                    { "id": 2, "firstName": "Jane", "lastName": "Smith" },
                ]),
            ),
    );

    let employees = ctx.client.get_employees(MOCK_TOKEN).await?;
    ensure(!employees.is_empty(), "employee list is empty")?;
    ctx.mock.assert_done()
}

async fn employee_by_id(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::get("/employees/1")
            .match_header("authorization", bearer())
            .reply(
                200,
                json!({
                    "id": 1,
                    "firstName": "John",
                    "lastName": "Doe",
                    "email": "john.doe@example.com",
                }),
            ),
    );

    let employee = ctx.client.get_employee_by_id(MOCK_TOKEN, 1).await?;
    ensure(employee.id == 1, format!("unexpected id {}", employee.id))?;
    ensure(
        employee.first_name == "John",
        format!("unexpected first name {:?}", employee.first_name),
    )?;
    ctx.mock.assert_done()
}

async fn create_employee(ctx: ApiContext) -> E2eResult<()> {
    let new_employee = NewEmployee {
        first_name: "John".into(),
        last_name: "Doe".into(),
        email: Some("john.doe@example.com".into()),
    };
    ctx.mock.register(
        Mock::post("/employees")
            .match_body(json!({
                "firstName": "John",
                "lastName": "Doe",
                "email": "john.doe@example.com",
            }))
            .match_header("authorization", bearer())
            .reply(
                201,
                json!({
                    "id": 3,
                    "firstName": "John",
                    "lastName": "Doe",
                    "email": "john.doe@example.com",
                }),
            ),
    );

    let created = ctx.client.create_employee(MOCK_TOKEN, &new_employee).await?;
    ensure(created.id > 0, "created employee has no id")?;
    ensure(
        created.first_name == "John",
        format!("unexpected first name {:?}", created.first_name),
    )?;
    ctx.mock.assert_done()
}

async fn update_employee(ctx: ApiContext) -> E2eResult<()> {
    let update = EmployeeUpdate {
        first_name: Some("John".into()),
        last_name: Some("Doe Updated".into()),
        ..Default::default()
    };
    ctx.mock.register(
        Mock::put("/employees/1")
            .match_body(json!({ "firstName": "John", "lastName": "Doe Updated" }))
            .match_header("authorization", bearer())
            .reply(200, json!({ "id": 1, "firstName": "John", "lastName": "Doe Updated" })),
    );

    let updated = ctx.client.update_employee(MOCK_TOKEN, 1, &update).await?;
    ensure(
        updated.last_name == "Doe Updated",
        format!("unexpected last name {:?}", updated.last_name),
    )?;
    ctx.mock.assert_done()
}

async fn delete_employee(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::delete("/employees/1")
            .match_header("authorization", bearer())
            .reply_empty(204),
    );

    let status = ctx.client.delete_employee(MOCK_TOKEN, 1).await?;
    ensure(status == 204, format!("expected 204, got {}", status))?;
    ctx.mock.assert_done()
}

async fn list_without_token(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::get("/viewEmployeeList").reply(401, json!({ "error": "Unauthorized" })),
    );

    expect_status(ctx.client.get_employees("").await, 401)?;
    ctx.mock.assert_done()
}

async fn search_employees(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::get("/employees/search")
            .match_query([("query", "John")])
            .match_header("authorization", bearer())
            .reply(
                200,
                json!([
                    { "id": 1, "firstName": "John", "lastName": "Doe" },
                    { "id": 4, "firstName": "Johnny", "lastName": "Smith" },
                ]),
            ),
    );

    let results = ctx.client.search_employees(MOCK_TOKEN, "John").await?;
    ensure(!results.is_empty(), "search returned nothing")?;
    ctx.mock.assert_done()
}

async fn logout(ctx: ApiContext) -> E2eResult<()> {
    ctx.mock.register(
        Mock::post("/auth/logout")
            .match_header("authorization", bearer())
            .reply(200, json!({ "message": "Logout successful" })),
    );

    let response = ctx.client.logout(MOCK_TOKEN).await?;
    ensure(
        response.message == "Logout successful",
        format!("unexpected message {:?}", response.message),
    )?;
    ctx.mock.assert_done()
}
