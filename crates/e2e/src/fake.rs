//! In-memory stand-in for the OrangeHRM screens the suite touches
//!
//! [`FakeHrm`] implements [`Page`] over a tiny model of the login form and
//! the sidebar menu, so scenarios can run without a browser. Selectors are
//! resolved against the same strings the page objects use; anything else
//! matches nothing.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::models::Credentials;
use crate::page::{Key, LoadState, Locator, Page};
use crate::pages::login::{
    DASHBOARD_HEADING, ERROR_ALERT, FIELD_ERROR, FORGOT_PASSWORD, INPUT_GROUP, PASSWORD_INPUT,
    SUBMIT_BUTTON, USERNAME_INPUT,
};
use crate::pages::search::{MENU_ITEM, MENU_ITEM_NAME, SEARCH_PLACEHOLDER};

pub const LOGIN_PATH: &str = "/web/index.php/auth/login";
pub const DASHBOARD_PATH: &str = "/web/index.php/dashboard/index";
pub const RESET_PASSWORD_PATH: &str = "/web/index.php/auth/requestPasswordResetCode";

/// Sidebar entries and the route each one opens
pub const MENU: &[(&str, &str)] = &[
    ("Admin", "/web/index.php/admin/viewSystemUsers"),
    ("PIM", "/web/index.php/pim/viewEmployeeList"),
    ("Leave", "/web/index.php/leave/viewLeaveList"),
    ("Time", "/web/index.php/time/viewEmployeeTimesheet"),
    ("Recruitment", "/web/index.php/recruitment/viewCandidates"),
    ("My Info", "/web/index.php/pim/viewPersonalDetails/empNumber/7"),
    ("Performance", "/web/index.php/performance/searchEvaluatePerformanceReview"),
    ("Dashboard", DASHBOARD_PATH),
    ("Directory", "/web/index.php/directory/viewDirectory"),
    ("Maintenance", "/web/index.php/maintenance/purgeEmployee"),
    ("Claim", "/web/index.php/claim/viewAssignClaim"),
    ("Buzz", "/web/index.php/buzz/viewBuzz"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Username,
    Password,
    Submit,
    Alert,
    InputGroup(usize),
    FieldError(usize),
    ForgotLink,
    DashboardHeading,
    SearchInput,
    MenuItem(usize),
    MenuItemName(usize),
}

#[derive(Debug, Default)]
struct State {
    path: String,
    logged_in: bool,
    username: String,
    password: String,
    alert: bool,
    /// "Required" flags for the username and password groups
    required: [bool; 2],
    search: String,
    closed: bool,
}

impl State {
    fn on_login_form(&self) -> bool {
        self.path == LOGIN_PATH
    }

    fn has_sidebar(&self) -> bool {
        self.logged_in && !self.path.starts_with("/web/index.php/auth/")
    }

    fn visible_menu(&self) -> Vec<usize> {
        let needle = self.search.to_lowercase();
        MENU.iter()
            .enumerate()
            .filter(|(_, (name, _))| name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    fn navigate(&mut self, path: &str) {
        let path = if path.is_empty() { "/" } else { path };
        let target = if path == "/" || path == "/web/index.php" {
            if self.logged_in { DASHBOARD_PATH } else { LOGIN_PATH }
        } else if !self.logged_in && !path.starts_with("/web/index.php/auth/") {
            LOGIN_PATH
        } else {
            path
        };
        debug!("[fake] navigate {} -> {}", path, target);

        self.path = target.to_string();
        self.username.clear();
        self.password.clear();
        self.alert = false;
        self.required = [false, false];
        self.search.clear();
    }
}

/// In-memory OrangeHRM
pub struct FakeHrm {
    origin: String,
    credentials: Credentials,
    state: Mutex<State>,
}

impl FakeHrm {
    pub fn new(base_url: &str) -> Self {
        let origin = url::Url::parse(base_url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| base_url.trim_end_matches('/').to_string());
        Self {
            origin,
            credentials: Credentials::new("Admin", "admin123"),
            state: Mutex::new(State {
                path: "/".to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Start with an authenticated session
    pub fn logged_in(self) -> Self {
        self.state.lock().logged_in = true;
        self
    }

    fn path_of(&self, url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            return parsed.path().to_string();
        }
        if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{}", url)
        }
    }

    fn resolve(&self, state: &State, locator: &Locator) -> Vec<Node> {
        let mut segments = locator.as_str().split(" >> ");
        let mut nodes = match segments.next() {
            Some(root) => self.query(state, root),
            None => return Vec::new(),
        };
        for segment in segments {
            nodes = match segment.strip_prefix("nth=") {
                Some(index) => index
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| nodes.get(i).copied())
                    .into_iter()
                    .collect(),
                None => nodes
                    .iter()
                    .flat_map(|node| self.query_within(state, *node, segment))
                    .collect(),
            };
        }
        nodes
    }

    fn query(&self, state: &State, selector: &str) -> Vec<Node> {
        let login = state.on_login_form();
        let sidebar = state.has_sidebar();
        let group_errors = || -> Vec<Node> {
            (0..2).filter(|i| state.required[*i]).map(Node::FieldError).collect()
        };

        if let Some(text) = selector.strip_prefix("text=") {
            return if login && text == FORGOT_PASSWORD { vec![Node::ForgotLink] } else { vec![] };
        }
        if let Some(rest) = selector.strip_prefix(MENU_ITEM) {
            if !sidebar {
                return vec![];
            }
            let filter = rest
                .strip_prefix(":has-text(\"")
                .and_then(|r| r.strip_suffix("\")"))
                .map(str::to_lowercase);
            if !rest.is_empty() && filter.is_none() {
                return vec![];
            }
            return state
                .visible_menu()
                .into_iter()
                .filter(|i| {
                    filter
                        .as_deref()
                        .map_or(true, |f| MENU[*i].0.to_lowercase().contains(f))
                })
                .map(Node::MenuItem)
                .collect();
        }

        let search_input = Locator::placeholder(SEARCH_PLACEHOLDER);
        let scoped_error = format!("{} {}", INPUT_GROUP, FIELD_ERROR);
        match selector {
            USERNAME_INPUT if login => vec![Node::Username],
            PASSWORD_INPUT if login => vec![Node::Password],
            SUBMIT_BUTTON if login => vec![Node::Submit],
            ERROR_ALERT if login && state.alert => vec![Node::Alert],
            INPUT_GROUP if login => vec![Node::InputGroup(0), Node::InputGroup(1)],
            DASHBOARD_HEADING if sidebar && state.path.contains("/dashboard") => {
                vec![Node::DashboardHeading]
            }
            s if login && s == scoped_error => group_errors(),
            s if sidebar && s == search_input.as_str() => vec![Node::SearchInput],
            _ => vec![],
        }
    }

    fn query_within(&self, state: &State, node: Node, selector: &str) -> Vec<Node> {
        match node {
            Node::InputGroup(i) if selector == FIELD_ERROR && state.required[i] => {
                vec![Node::FieldError(i)]
            }
            Node::MenuItem(i) if selector == MENU_ITEM_NAME => vec![Node::MenuItemName(i)],
            _ => vec![],
        }
    }

    fn text_of(&self, state: &State, node: Node) -> Option<String> {
        match node {
            Node::Username | Node::Password | Node::SearchInput => Some(String::new()),
            Node::Submit => Some(" Login ".to_string()),
            Node::Alert => Some("Invalid credentials".to_string()),
            Node::FieldError(_) => Some("Required".to_string()),
            Node::InputGroup(i) => {
                let label = if i == 0 { "Username" } else { "Password" };
                if state.required[i] {
                    Some(format!("{}Required", label))
                } else {
                    Some(label.to_string())
                }
            }
            Node::ForgotLink => Some(format!("{} ", FORGOT_PASSWORD)),
            Node::DashboardHeading => Some("Dashboard".to_string()),
            Node::MenuItem(i) | Node::MenuItemName(i) => Some(MENU[i].0.to_string()),
        }
    }

    /// Exactly one element, like Playwright's strict mode
    fn single(&self, state: &State, locator: &Locator) -> E2eResult<Node> {
        ensure_open(state)?;
        match self.resolve(state, locator).as_slice() {
            [node] => Ok(*node),
            [] => Err(E2eError::Playwright(format!(
                "waiting for locator('{}'): no element matches",
                locator
            ))),
            many => Err(E2eError::Playwright(format!(
                "strict mode violation: locator('{}') resolved to {} elements",
                locator,
                many.len()
            ))),
        }
    }

    fn submit(&self, state: &mut State) {
        state.required = [state.username.is_empty(), state.password.is_empty()];
        state.alert = false;
        if state.required.iter().any(|r| *r) {
            return;
        }
        if state.username == self.credentials.username
            && state.password == self.credentials.password
        {
            state.logged_in = true;
            state.navigate(DASHBOARD_PATH);
        } else {
            state.alert = true;
        }
    }
}

fn ensure_open(state: &State) -> E2eResult<()> {
    if state.closed {
        return Err(E2eError::Playwright("Target page has been closed".into()));
    }
    Ok(())
}

#[async_trait]
impl Page for FakeHrm {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let path = self.path_of(url);
        let mut state = self.state.lock();
        ensure_open(&state)?;
        state.navigate(&path);
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        let state = self.state.lock();
        ensure_open(&state)?;
        Ok(format!("{}{}", self.origin, state.path))
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        match self.single(&state, locator)? {
            Node::Username => state.username = value.to_string(),
            Node::Password => state.password = value.to_string(),
            Node::SearchInput => state.search = value.to_string(),
            other => {
                return Err(E2eError::Playwright(format!(
                    "element {:?} is not an <input>",
                    other
                )))
            }
        }
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let mut state = self.state.lock();
        let node = self.single(&state, locator)?;
        match node {
            Node::Submit => self.submit(&mut state),
            Node::ForgotLink => state.navigate(RESET_PASSWORD_PATH),
            Node::MenuItem(i) | Node::MenuItemName(i) => state.navigate(MENU[i].1),
            _ => {}
        }
        Ok(())
    }

    async fn press(&self, locator: &Locator, key: Key) -> E2eResult<()> {
        let mut state = self.state.lock();
        let node = self.single(&state, locator)?;
        match (node, key) {
            (Node::SearchInput, Key::Space) => state.search.push(' '),
            (Node::SearchInput, Key::Backspace) => {
                state.search.pop();
            }
            (Node::Username | Node::Password, Key::Enter) => self.submit(&mut state),
            (Node::Username, Key::Space) => state.username.push(' '),
            (Node::Password, Key::Space) => state.password.push(' '),
            (Node::Username, Key::Backspace) => {
                state.username.pop();
            }
            (Node::Password, Key::Backspace) => {
                state.password.pop();
            }
            _ => {}
        }
        Ok(())
    }

    async fn focus(&self, locator: &Locator) -> E2eResult<()> {
        let state = self.state.lock();
        self.single(&state, locator).map(|_| ())
    }

    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>> {
        let state = self.state.lock();
        let node = self.single(&state, locator)?;
        Ok(self.text_of(&state, node))
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let state = self.state.lock();
        ensure_open(&state)?;
        Ok(self.resolve(&state, locator).len())
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let state = self.state.lock();
        ensure_open(&state)?;
        match self.resolve(&state, locator).len() {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(E2eError::Playwright(format!(
                "strict mode violation: locator('{}') resolved to {} elements",
                locator, n
            ))),
        }
    }

    async fn wait_for_load_state(&self, _state: LoadState) -> E2eResult<()> {
        ensure_open(&self.state.lock())
    }

    async fn wait_for_timeout(&self, _duration: Duration) -> E2eResult<()> {
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        ensure_open(&self.state.lock())?;
        debug!("[fake] screenshot requested at {} (nothing rendered)", path.display());
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}
