//! Sidebar search widget

use std::sync::Arc;
use std::time::Duration;

use crate::error::E2eResult;
use crate::page::{Key, Locator, Page};
use crate::pages::BasePage;

pub const SEARCH_PLACEHOLDER: &str = "Search";
pub const MENU_ITEM: &str = "a.oxd-main-menu-item";
pub const MENU_ITEM_NAME: &str = "span.oxd-main-menu-item--name";

/// Time the sidebar needs to re-filter after typing
const SETTLE: Duration = Duration::from_millis(500);

pub struct SearchPage {
    base: BasePage,
    pub search_input: Locator,
    pub dropdown_items: Locator,
}

impl SearchPage {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self {
            base: BasePage::new(page),
            search_input: Locator::placeholder(SEARCH_PLACEHOLDER),
            dropdown_items: Locator::new(MENU_ITEM),
        }
    }

    /// Timeout for this page's assertions
    pub fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.base = self.base.with_expect_timeout(timeout);
        self
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub fn page(&self) -> &dyn Page {
        self.base.page()
    }

    pub async fn search(&self, term: &str) -> E2eResult<()> {
        self.base.fill(&self.search_input, term).await?;
        self.page().wait_for_timeout(SETTLE).await
    }

    pub async fn press_enter(&self) -> E2eResult<()> {
        self.page().press(&self.search_input, Key::Enter).await
    }

    pub async fn press_space(&self) -> E2eResult<()> {
        self.page().press(&self.search_input, Key::Space).await
    }

    pub async fn press_arrow_down(&self) -> E2eResult<()> {
        self.page().press(&self.search_input, Key::ArrowDown).await
    }

    pub async fn press_backspace(&self) -> E2eResult<()> {
        self.page().press(&self.search_input, Key::Backspace).await
    }

    pub async fn focus(&self) -> E2eResult<()> {
        self.page().focus(&self.search_input).await
    }

    pub async fn clear_search(&self) -> E2eResult<()> {
        self.base.fill(&self.search_input, "").await
    }

    pub async fn click_first_result(&self) -> E2eResult<()> {
        let first = self.dropdown_items.first();
        self.base
            .expect()
            .with_timeout(Duration::from_secs(10))
            .to_be_visible(&first)
            .await?;
        self.base.click(&first).await
    }

    /// Click the first menu entry whose label contains `name`
    pub async fn open_menu_item(&self, name: &str) -> E2eResult<()> {
        self.base.click(Locator::has_text(MENU_ITEM, name).first()).await
    }

    pub async fn dropdown_count(&self) -> E2eResult<usize> {
        self.page().count(&self.dropdown_items).await
    }

    /// Trimmed labels of the visible menu entries, in order
    pub async fn dropdown_texts(&self) -> E2eResult<Vec<String>> {
        let count = self.dropdown_count().await?;
        let mut texts = Vec::with_capacity(count);
        for i in 0..count {
            let label = self.dropdown_items.nth(i).locator(MENU_ITEM_NAME);
            let text = self.page().text_content(&label).await?;
            texts.push(text.map(|t| t.trim().to_string()).unwrap_or_default());
        }
        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeHrm;

    const BASE: &str = "https://opensource-demo.orangehrmlive.com";

    async fn on_dashboard() -> SearchPage {
        let page = FakeHrm::new(BASE).logged_in();
        page.goto("/web/index.php/dashboard/index").await.unwrap();
        SearchPage::new(Arc::new(page))
    }

    #[tokio::test]
    async fn empty_search_lists_every_module() {
        let search = on_dashboard().await;
        let texts = search.dropdown_texts().await.unwrap();
        assert_eq!(texts.len(), 12);
        assert_eq!(texts[0], "Admin");
        assert!(texts.contains(&"My Info".to_string()));
    }

    #[tokio::test]
    async fn search_filters_case_insensitively() {
        let search = on_dashboard().await;
        search.search("aDmIn").await.unwrap();
        assert_eq!(search.dropdown_texts().await.unwrap(), vec!["Admin".to_string()]);
    }

    #[tokio::test]
    async fn backspace_widens_results() {
        let search = on_dashboard().await;
        search.search("Time").await.unwrap();
        assert_eq!(search.dropdown_count().await.unwrap(), 1);
        search.press_backspace().await.unwrap();
        search.press_backspace().await.unwrap();
        // "Ti" matches Time only
        assert_eq!(search.dropdown_count().await.unwrap(), 1);
        search.press_backspace().await.unwrap();
        assert!(search.dropdown_count().await.unwrap() > 1);
    }

    #[tokio::test]
    async fn clicking_first_result_navigates() {
        let search = on_dashboard().await;
        search.search("PIM").await.unwrap();
        search.click_first_result().await.unwrap();
        let url = search.page().url().await.unwrap();
        assert!(url.ends_with("/web/index.php/pim/viewEmployeeList"));
    }

    #[tokio::test]
    async fn no_results_leaves_nothing_to_click() {
        let search = on_dashboard().await;
        search.search("Payroll").await.unwrap();
        assert_eq!(search.dropdown_count().await.unwrap(), 0);
        assert!(search.base().click(search.dropdown_items.first()).await.is_err());
    }
}
