//! Typed client for the employee REST API

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};
use crate::models::{Employee, EmployeeUpdate, LoginResponse, LogoutResponse, NewEmployee};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the employee API
///
/// Every method performs exactly one HTTP call. Any non-2xx status becomes
/// [`E2eError::Http`] carrying the status code.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> E2eResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> E2eResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach a bearer token unless it is empty
    fn authorized(request: RequestBuilder, token: &str) -> RequestBuilder {
        if token.is_empty() {
            request
        } else {
            request.bearer_auth(token)
        }
    }

    async fn send(request: RequestBuilder, operation: &'static str) -> E2eResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} -> {}", operation, status);
        if !status.is_success() {
            warn!("{} failed with status {}", operation, status.as_u16());
            return Err(E2eError::Http {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        operation: &'static str,
    ) -> E2eResult<T> {
        let response = Self::send(request, operation).await?;
        Ok(response.json().await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> E2eResult<LoginResponse> {
        let request = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }));
        Self::send_json(request, "Login").await
    }

    pub async fn logout(&self, token: &str) -> E2eResult<LogoutResponse> {
        let request = Self::authorized(self.http.post(self.url("/auth/logout")), token);
        Self::send_json(request, "Logout").await
    }

    /// Employee list; an empty token sends no Authorization header
    pub async fn get_employees(&self, token: &str) -> E2eResult<Vec<Employee>> {
        let request = Self::authorized(self.http.get(self.url("/viewEmployeeList")), token);
        Self::send_json(request, "Get employees").await
    }

    pub async fn get_employee_by_id(&self, token: &str, id: u64) -> E2eResult<Employee> {
        let path = format!("/employees/{}", id);
        let request = Self::authorized(self.http.get(self.url(&path)), token);
        Self::send_json(request, "Get employee by ID").await
    }

    pub async fn create_employee(&self, token: &str, employee: &NewEmployee) -> E2eResult<Employee> {
        let request = Self::authorized(self.http.post(self.url("/employees")), token).json(employee);
        Self::send_json(request, "Create employee").await
    }

    pub async fn update_employee(
        &self,
        token: &str,
        id: u64,
        update: &EmployeeUpdate,
    ) -> E2eResult<Employee> {
        let path = format!("/employees/{}", id);
        let request = Self::authorized(self.http.put(self.url(&path)), token).json(update);
        Self::send_json(request, "Update employee").await
    }

    /// Returns the response status (204 on success)
    pub async fn delete_employee(&self, token: &str, id: u64) -> E2eResult<u16> {
        let path = format!("/employees/{}", id);
        let request = Self::authorized(self.http.delete(self.url(&path)), token);
        let response = Self::send(request, "Delete employee").await?;
        Ok(response.status().as_u16())
    }

    pub async fn search_employees(&self, token: &str, query: &str) -> E2eResult<Vec<Employee>> {
        let request = Self::authorized(self.http.get(self.url("/employees/search")), token)
            .query(&[("query", query)]);
        Self::send_json(request, "Search employees").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("https://opensource-demo.orangehrmlive.com/").unwrap();
        assert_eq!(client.base_url(), "https://opensource-demo.orangehrmlive.com");
        assert_eq!(
            client.url("/employees/1"),
            "https://opensource-demo.orangehrmlive.com/employees/1"
        );
    }

    #[test]
    fn empty_token_sends_no_header() {
        let http = reqwest::Client::new();
        let request = ApiClient::authorized(http.get("http://localhost/x"), "")
            .build()
            .unwrap();
        assert!(request.headers().get("authorization").is_none());

        let request = ApiClient::authorized(http.get("http://localhost/x"), "abc")
            .build()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer abc");
    }
}
