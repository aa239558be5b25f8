use futures::FutureExt;
use regex::Regex;

use super::{ensure, Scenario, UiContext};
use crate::error::E2eResult;
use crate::pages::LoginPage;

const TAGS: &[&str] = &["ui", "login"];

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::ui("TC_LOGIN_01", "Login with valid credentials", TAGS, |ctx| {
            valid_credentials(ctx).boxed()
        }),
        Scenario::ui("TC_LOGIN_02", "Login with invalid username", TAGS, |ctx| {
            invalid_username(ctx).boxed()
        }),
        Scenario::ui("TC_LOGIN_03", "Login with invalid password", TAGS, |ctx| {
            invalid_password(ctx).boxed()
        }),
        Scenario::ui("TC_LOGIN_04", "Login with both fields empty", TAGS, |ctx| {
            both_fields_empty(ctx).boxed()
        }),
        Scenario::ui("TC_LOGIN_05", "Login with username empty", TAGS, |ctx| {
            username_empty(ctx).boxed()
        }),
        Scenario::ui("TC_LOGIN_06", "Login with password empty", TAGS, |ctx| {
            password_empty(ctx).boxed()
        }),
        Scenario::ui("TC_LOGIN_07", "Forgot your password link", TAGS, |ctx| {
            forgot_password(ctx).boxed()
        }),
        Scenario::ui("TC_LOGIN_10", "SQL injection in username field", TAGS, |ctx| {
            sql_injection(ctx).boxed()
        }),
    ]
}

async fn open(ctx: &UiContext) -> E2eResult<LoginPage> {
    let login = ctx.login_page();
    login.open().await?;
    Ok(login)
}

async fn rejected(ctx: &UiContext, username: &str, password: &str) -> E2eResult<LoginPage> {
    let login = open(ctx).await?;
    let success = login.login(username, password).await?;
    ensure(
        !success,
        format!("login as {:?} should have been rejected", username),
    )?;
    Ok(login)
}

async fn valid_credentials(ctx: UiContext) -> E2eResult<()> {
    let login = open(&ctx).await?;
    let credentials = &ctx.config.credentials;
    let success = login.login(&credentials.username, &credentials.password).await?;
    ensure(success, "login with valid credentials should succeed")?;
    login.base().expect_url(&Regex::new("dashboard")?).await
}

async fn invalid_username(ctx: UiContext) -> E2eResult<()> {
    let password = ctx.config.credentials.password.clone();
    let login = rejected(&ctx, "InvalidUser", &password).await?;
    login.expect_error_message(INVALID_CREDENTIALS).await
}

async fn invalid_password(ctx: UiContext) -> E2eResult<()> {
    let username = ctx.config.credentials.username.clone();
    let login = rejected(&ctx, &username, "wrongpass").await?;
    login.expect_error_message(INVALID_CREDENTIALS).await
}

async fn both_fields_empty(ctx: UiContext) -> E2eResult<()> {
    let login = rejected(&ctx, "", "").await?;
    login.expect_username_required_error().await?;
    login.expect_password_required_error().await
}

async fn username_empty(ctx: UiContext) -> E2eResult<()> {
    let password = ctx.config.credentials.password.clone();
    let login = rejected(&ctx, "", &password).await?;
    login.expect_username_required_error().await
}

async fn password_empty(ctx: UiContext) -> E2eResult<()> {
    let username = ctx.config.credentials.username.clone();
    let login = rejected(&ctx, &username, "").await?;
    login.expect_password_required_error().await
}

async fn forgot_password(ctx: UiContext) -> E2eResult<()> {
    let login = open(&ctx).await?;
    login.click_forgot_password().await?;
    login
        .base()
        .expect_url(&Regex::new("requestPasswordResetCode")?)
        .await
}

async fn sql_injection(ctx: UiContext) -> E2eResult<()> {
    let password = ctx.config.credentials.password.clone();
    let login = rejected(&ctx, "' OR 1=1; -- ", &password).await?;
    login.expect_error_message(INVALID_CREDENTIALS).await
}
