use std::time::{Duration, Instant};

use futures::FutureExt;
use regex::Regex;
use tracing::debug;

use super::{ensure, Scenario, UiContext};
use crate::error::E2eResult;
use crate::fake::DASHBOARD_PATH;
use crate::helper::{perform_search_and_verify, SearchCheck};
use crate::pages::SearchPage;

const TAGS: &[&str] = &["ui", "search"];

const DROPDOWN_BUDGET: Duration = Duration::from_millis(1500);
const MAX_INPUT_LEN: usize = 65;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::ui("TC_SRCH_01", "Search full module name \"Admin\"", TAGS, |ctx| {
            admin(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_02", "Search full module name \"PIM\"", TAGS, |ctx| {
            pim(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_03", "Case-insensitive search", TAGS, |ctx| {
            lowercase_leave(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_04", "Prefix search", TAGS, |ctx| prefix(ctx).boxed()),
        Scenario::ui("TC_SRCH_05", "Infix search", TAGS, |ctx| infix(ctx).boxed()),
        Scenario::ui("TC_SRCH_06", "Search with special characters", TAGS, |ctx| {
            special_characters(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_07", "Search non-existing module", TAGS, |ctx| {
            unknown_module(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_08", "Leading/trailing spaces (no results)", TAGS, |ctx| {
            padded_term(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_09", "Press Enter on empty search box", TAGS, |ctx| {
            enter_on_empty(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_10", "Show \"My Info\" on Space key", TAGS, |ctx| {
            space_lists_my_info(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_11", "No navigation with arrow keys + Enter", TAGS, |ctx| {
            arrow_keys_do_not_navigate(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_12", "Dropdown performance (< 1500 ms)", TAGS, |ctx| {
            dropdown_performance(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_13", "Input exceeding max length (65 chars)", TAGS, |ctx| {
            overlong_input(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_14", "SQL injection pattern", TAGS, |ctx| {
            sql_injection(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_15", "Repeated backspace delete", TAGS, |ctx| {
            repeated_backspace(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_16", "Search with mixed case \"AdMiN\"", TAGS, |ctx| {
            mixed_case(ctx).boxed()
        }),
        Scenario::ui("TC_SRCH_17", "Search with numbers \"123\"", TAGS, |ctx| {
            digits(ctx).boxed()
        }),
    ]
}

/// Log in, land on the dashboard and wait for the search box
async fn prepare(ctx: &UiContext) -> E2eResult<SearchPage> {
    let login = ctx.login_page();
    login.open().await?;
    let credentials = &ctx.config.credentials;
    let success = login.login(&credentials.username, &credentials.password).await?;
    ensure(success, "search setup could not log in")?;

    let search = ctx.search_page();
    search.base().goto(&ctx.config.url(DASHBOARD_PATH)).await?;
    search.base().expect().to_be_visible(&search.search_input).await?;
    Ok(search)
}

async fn verify(ctx: UiContext, check: SearchCheck) -> E2eResult<()> {
    let search = prepare(&ctx).await?;
    perform_search_and_verify(&search, &check).await
}

async fn admin(ctx: UiContext) -> E2eResult<()> {
    let check = SearchCheck::new("Admin")
        .expect_text("Admin")
        .expect_url(Regex::new(r"/admin/viewSystemUsers")?);
    verify(ctx, check).await
}

async fn pim(ctx: UiContext) -> E2eResult<()> {
    let check = SearchCheck::new("PIM")
        .expect_text("PIM")
        .expect_url(Regex::new(r"/pim/viewEmployeeList")?);
    verify(ctx, check).await
}

async fn lowercase_leave(ctx: UiContext) -> E2eResult<()> {
    let check = SearchCheck::new("leave")
        .expect_text("leave")
        .expect_url(Regex::new(r"/leave/viewLeaveList")?);
    verify(ctx, check).await
}

async fn prefix(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("Ti").expect_text("Time").without_click()).await
}

async fn infix(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("for").expect_text("Performance").without_click()).await
}

async fn special_characters(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("@#$")).await
}

async fn unknown_module(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("Payroll")).await
}

async fn padded_term(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("  Time  ")).await
}

async fn enter_on_empty(ctx: UiContext) -> E2eResult<()> {
    let search = prepare(&ctx).await?;
    search.clear_search().await?;
    search.press_enter().await?;
    search.base().expect_url(&Regex::new(r"/dashboard")?).await
}

async fn space_lists_my_info(ctx: UiContext) -> E2eResult<()> {
    let search = prepare(&ctx).await?;
    search.focus().await?;
    search.press_space().await?;
    search.page().wait_for_timeout(Duration::from_millis(500)).await?;

    let texts = search.dropdown_texts().await?;
    ensure(
        texts.iter().any(|t| t.contains("My Info")),
        format!("\"My Info\" missing from {:?}", texts),
    )?;

    search.open_menu_item("My Info").await?;
    search
        .base()
        .expect_url(&Regex::new(r"/pim/viewPersonalDetails")?)
        .await
}

async fn arrow_keys_do_not_navigate(ctx: UiContext) -> E2eResult<()> {
    let search = prepare(&ctx).await?;
    search.search("a").await?;
    search.press_arrow_down().await?;
    search.press_enter().await?;
    search.base().expect_url(&Regex::new("dashboard")?).await
}

async fn dropdown_performance(ctx: UiContext) -> E2eResult<()> {
    let search = prepare(&ctx).await?;
    let start = Instant::now();
    search.search("Admin").await?;
    let elapsed = start.elapsed();
    debug!("Dropdown filtered in {:?}", elapsed);
    ensure(
        elapsed < DROPDOWN_BUDGET,
        format!("search took {:?}, budget {:?}", elapsed, DROPDOWN_BUDGET),
    )
}

async fn overlong_input(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("a".repeat(MAX_INPUT_LEN))).await
}

async fn sql_injection(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("' OR 1=1 --")).await
}

async fn repeated_backspace(ctx: UiContext) -> E2eResult<()> {
    let search = prepare(&ctx).await?;
    search.search("Admin").await?;
    for _ in 0..5 {
        search.press_backspace().await?;
        search.page().wait_for_timeout(Duration::from_millis(200)).await?;
    }
    // Only that the dropdown is still readable
    let count = search.dropdown_count().await?;
    debug!("{} entries after clearing the term", count);
    Ok(())
}

async fn mixed_case(ctx: UiContext) -> E2eResult<()> {
    let check = SearchCheck::new("AdMiN")
        .expect_text("Admin")
        .expect_url(Regex::new(r"/admin/viewSystemUsers")?);
    verify(ctx, check).await
}

async fn digits(ctx: UiContext) -> E2eResult<()> {
    verify(ctx, SearchCheck::new("123")).await
}
