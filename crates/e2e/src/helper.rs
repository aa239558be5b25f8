//! Shared search assertion used by the search scenarios

use regex::Regex;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::pages::SearchPage;

/// What a search should produce
#[derive(Debug, Clone)]
pub struct SearchCheck {
    pub term: String,
    /// Labels that must appear (case-insensitive substring); empty means
    /// the dropdown must be empty
    pub expected: Vec<String>,
    pub url: Option<Regex>,
    pub click_first_result: bool,
}

impl SearchCheck {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            expected: Vec::new(),
            url: None,
            click_first_result: true,
        }
    }

    pub fn expect_text(mut self, text: impl Into<String>) -> Self {
        self.expected.push(text.into());
        self
    }

    pub fn expect_url(mut self, pattern: Regex) -> Self {
        self.url = Some(pattern);
        self
    }

    pub fn without_click(mut self) -> Self {
        self.click_first_result = false;
        self
    }
}

pub async fn perform_search_and_verify(search_page: &SearchPage, check: &SearchCheck) -> E2eResult<()> {
    search_page.search(&check.term).await?;

    if check.expected.is_empty() {
        let count = search_page.dropdown_count().await?;
        if count != 0 {
            return Err(E2eError::AssertionFailed(format!(
                "expected no results for {:?}, got {}",
                check.term, count
            )));
        }
        return Ok(());
    }

    let texts: Vec<String> = search_page
        .dropdown_texts()
        .await?
        .into_iter()
        .map(|t| t.to_lowercase())
        .collect();
    debug!("Search {:?} returned {:?}", check.term, texts);

    for expected in &check.expected {
        let needle = expected.to_lowercase();
        let needle = needle.trim();
        if !texts.iter().any(|t| t.contains(needle)) {
            return Err(E2eError::AssertionFailed(format!(
                "expected a result containing {:?} for {:?}, got {:?}",
                expected, check.term, texts
            )));
        }
    }

    if check.click_first_result {
        search_page.click_first_result().await?;
        if let Some(pattern) = &check.url {
            search_page.base().expect_url(pattern).await?;
        }
    }
    Ok(())
}
