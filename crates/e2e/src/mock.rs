//! Local HTTP backend with one-shot interceptors
//!
//! Register a [`Mock`] for each request a test expects; the server answers
//! matching requests with the canned reply and consumes the interceptor.
//! Requests nothing matches are recorded and answered with `501`.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone)]
struct MockReply {
    status: StatusCode,
    body: Option<Value>,
}

/// Expected request plus the canned reply
#[derive(Debug, Clone)]
pub struct Mock {
    method: Method,
    path: String,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    query: Option<Vec<(String, String)>>,
    reply: MockReply,
    remaining: usize,
}

impl Mock {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            body: None,
            headers: Vec::new(),
            query: None,
            reply: MockReply { status: StatusCode::OK, body: None },
            remaining: 1,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Require a JSON body deep-equal to `body`
    pub fn match_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn match_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// Require exactly these query parameters, repeated keys included
    pub fn match_query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut pairs: Vec<(String, String)> =
            params.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        pairs.sort();
        self.query = Some(pairs);
        self
    }

    /// Allow the interceptor to answer `n` requests. Zero counts as one.
    pub fn times(mut self, n: usize) -> Self {
        self.remaining = n.max(1);
        self
    }

    pub fn reply(mut self, status: u16, body: Value) -> Self {
        self.reply = MockReply {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: Some(body),
        };
        self
    }

    pub fn reply_empty(mut self, status: u16) -> Self {
        self.reply = MockReply {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: None,
        };
        self
    }

    fn matches(&self, request: &RecordedRequest, headers: &HeaderMap) -> bool {
        if self.method != request.method || self.path != request.path {
            return false;
        }
        let query_ok = match &self.query {
            Some(expected) => {
                let mut actual = request.query.clone();
                actual.sort();
                *expected == actual
            }
            None => request.query.is_empty(),
        };
        if !query_ok {
            return false;
        }
        let headers_ok = self.headers.iter().all(|(name, value)| {
            headers
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == value)
        });
        if !headers_ok {
            return false;
        }
        match &self.body {
            Some(expected) => request.body.as_ref() == Some(expected),
            None => true,
        }
    }
}

impl fmt::Display for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A request as the server saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    /// Decoded query pairs in arrival order
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl fmt::Display for RecordedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if !self.query.is_empty() {
            let pairs: Vec<String> = self.query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            write!(f, "?{}", pairs.join("&"))?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct MockState {
    mocks: Mutex<Vec<Mock>>,
    unmatched: Mutex<Vec<RecordedRequest>>,
}

/// Running mock backend, stopped on drop
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// Bind an ephemeral local port and start serving
    pub async fn start() -> E2eResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(MockState::default());

        let router = Router::new()
            .fallback(intercept)
            .with_state(Arc::clone(&state));

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                warn!("Mock server stopped with error: {}", e);
            }
        });

        info!("Mock server listening on {}", addr);
        Ok(Self {
            addr,
            state,
            shutdown: Some(tx),
        })
    }

    /// Base URL to point clients at
    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn register(&self, mock: Mock) {
        debug!("Registering interceptor {}", mock);
        self.state.mocks.lock().push(mock);
    }

    /// Drop every interceptor and the unmatched log
    pub fn clean_all(&self) {
        self.state.mocks.lock().clear();
        self.state.unmatched.lock().clear();
    }

    /// Interceptors that have not been used up yet
    pub fn pending(&self) -> Vec<String> {
        self.state.mocks.lock().iter().map(|m| m.to_string()).collect()
    }

    pub fn is_done(&self) -> bool {
        self.state.mocks.lock().is_empty()
    }

    pub fn unmatched(&self) -> Vec<RecordedRequest> {
        self.state.unmatched.lock().clone()
    }

    /// Fail unless every interceptor was consumed
    pub fn assert_done(&self) -> E2eResult<()> {
        let pending = self.pending();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(E2eError::MockServer(format!(
                "pending interceptors: {}",
                pending.join(", ")
            )))
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn intercept(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query = raw_query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&body).ok()
    };
    let request = RecordedRequest {
        method,
        path: uri.path().to_string(),
        query,
        body,
    };

    let reply = {
        let mut mocks = state.mocks.lock();
        match mocks.iter().position(|m| m.matches(&request, &headers)) {
            Some(index) => {
                let reply = mocks[index].reply.clone();
                mocks[index].remaining -= 1;
                if mocks[index].remaining == 0 {
                    mocks.remove(index);
                }
                Some(reply)
            }
            None => None,
        }
    };

    match reply {
        Some(MockReply { status, body: Some(body) }) => {
            debug!("Mocked {} -> {}", request, status);
            (status, Json(body)).into_response()
        }
        Some(MockReply { status, body: None }) => {
            debug!("Mocked {} -> {}", request, status);
            status.into_response()
        }
        None => {
            warn!("No interceptor matched {}", request);
            let message = format!("no match for request {}", request);
            state.unmatched.lock().push(request);
            (StatusCode::NOT_IMPLEMENTED, Json(json!({ "error": message }))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded(method: Method, path: &str) -> RecordedRequest {
        RecordedRequest {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn query_must_match_exactly() {
        let mock = Mock::get("/employees/search").match_query([("query", "John")]);
        let mut request = recorded(Method::GET, "/employees/search");
        assert!(!mock.matches(&request, &HeaderMap::new()));

        request.query.push(("query".into(), "John".into()));
        assert!(mock.matches(&request, &HeaderMap::new()));

        request.query.push(("page".into(), "2".into()));
        assert!(!mock.matches(&request, &HeaderMap::new()));
    }

    #[test]
    fn repeated_query_keys_are_not_collapsed() {
        let mock = Mock::get("/employees/search").match_query([("query", "John")]);
        let mut request = recorded(Method::GET, "/employees/search");
        request.query.push(("query".into(), "Jane".into()));
        request.query.push(("query".into(), "John".into()));
        assert!(!mock.matches(&request, &HeaderMap::new()));

        let both = Mock::get("/employees/search").match_query([("query", "John"), ("query", "Jane")]);
        assert!(both.matches(&request, &HeaderMap::new()));
    }

    #[test]
    fn zero_times_answers_once() {
        let mock = Mock::get("/x").times(0);
        assert_eq!(mock.remaining, 1);
        assert_eq!(Mock::get("/x").times(3).remaining, 3);
    }

    #[test]
    fn unqueried_mock_rejects_query_string() {
        let mock = Mock::get("/viewEmployeeList");
        let mut request = recorded(Method::GET, "/viewEmployeeList");
        request.query.push(("x".into(), "1".into()));
        assert!(!mock.matches(&request, &HeaderMap::new()));
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let mock = Mock::get("/viewEmployeeList").match_header("Authorization", "Bearer t");
        let request = recorded(Method::GET, "/viewEmployeeList");
        let mut headers = HeaderMap::new();
        assert!(!mock.matches(&request, &headers));
        headers.insert("authorization", "Bearer t".parse().unwrap());
        assert!(mock.matches(&request, &headers));
    }

    #[test]
    fn body_is_compared_as_json() {
        let mock = Mock::post("/auth/login").match_body(json!({ "username": "Admin", "password": "admin123" }));
        let mut request = recorded(Method::POST, "/auth/login");
        request.body = Some(json!({ "password": "admin123", "username": "Admin" }));
        assert!(mock.matches(&request, &HeaderMap::new()));
        request.body = Some(json!({ "username": "Admin" }));
        assert!(!mock.matches(&request, &HeaderMap::new()));
    }

    #[test]
    fn recorded_request_display() {
        let mut request = recorded(Method::GET, "/employees/search");
        request.query.push(("query".into(), "John".into()));
        assert_eq!(request.to_string(), "GET /employees/search?query=John");
    }
}
