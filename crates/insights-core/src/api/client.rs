use crate::api::models::{
    AccountsPage, ApiEnvelope, Audience, ChartData, IngestionResult, LoginRequest, Summary,
    TokenResponse, UsageByStatus,
};
use crate::core::query::QueryParams;
use crate::error::ApiError;
use crate::utils::error_helpers::*;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const UPLOAD_TIMEOUT_SECS: u64 = 120;
const USER_AGENT: &str = concat!("insights-console/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct InsightsClient {
    client: Client,
    pub base_url: String,
    pub token: Option<String>,
}

impl InsightsClient {
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init", DEFAULT_TIMEOUT_SECS))?;

        Ok(InsightsClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(base_url: String, token: String) -> Result<Self, ApiError> {
        let mut client = InsightsClient::new(base_url)?;
        client.token = Some(token);
        Ok(client)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request
    }

    /// Unwrap the `{status, data}` envelope or map the failure body.
    async fn handle_response<T: DeserializeOwned>(
        response: Response,
        endpoint: &str,
        timeout_secs: u64,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| convert_request_error(e, endpoint, timeout_secs))?;

        if !status.is_success() {
            return Err(convert_status_error(
                status.as_u16(),
                &body,
                endpoint,
                timeout_secs,
            ));
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&body).map_err(|e| convert_json_error(e, endpoint))?;
        Ok(envelope.data)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        log::debug!("GET {} {:?}", endpoint, query);
        let response = self
            .build_request(Method::GET, endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, DEFAULT_TIMEOUT_SECS))?;

        Self::handle_response(response, endpoint, DEFAULT_TIMEOUT_SECS).await
    }

    /// Exchange credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let endpoint = "/api/auth/token";
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .build_request(Method::POST, endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, DEFAULT_TIMEOUT_SECS))?;

        Self::handle_response(response, endpoint, DEFAULT_TIMEOUT_SECS).await
    }

    /// One page of accounts for the given query
    pub async fn list_accounts(&self, query: &QueryParams) -> Result<AccountsPage, ApiError> {
        self.get_json("/api/insights/accounts", &query.to_query_pairs())
            .await
    }

    pub async fn get_summary(&self, audience: Audience) -> Result<Summary, ApiError> {
        self.get_json(
            "/api/insights/summary",
            &[("audience", audience.as_str().to_string())],
        )
        .await
    }

    pub async fn subscriptions_by_status(&self) -> Result<ChartData, ApiError> {
        self.get_json("/api/insights/analytics/subscriptions-by-status", &[])
            .await
    }

    pub async fn notifications_sent_vs_billed(&self) -> Result<ChartData, ApiError> {
        self.get_json("/api/insights/analytics/notifications-sent-vs-billed", &[])
            .await
    }

    pub async fn top_workflows(&self, limit: u32) -> Result<ChartData, ApiError> {
        self.get_json(
            "/api/insights/analytics/workflows/top",
            &[("limit", limit.to_string())],
        )
        .await
    }

    pub async fn usage_by_subscription_status(&self) -> Result<UsageByStatus, ApiError> {
        self.get_json("/api/insights/analytics/usage/by-subscription-status", &[])
            .await
    }

    /// Upload a CSV export as multipart field `file`
    pub async fn upload_csv(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<IngestionResult, ApiError> {
        let endpoint = "/api/ingest";
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| convert_request_error(e, endpoint, UPLOAD_TIMEOUT_SECS))?;
        let form = Form::new().part("file", part);

        let response = self
            .build_request(Method::POST, endpoint)
            .multipart(form)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, UPLOAD_TIMEOUT_SECS))?;

        Self::handle_response(response, endpoint, UPLOAD_TIMEOUT_SECS).await
    }

    /// Reload the server's bundled sample data
    pub async fn reload_sample(&self) -> Result<IngestionResult, ApiError> {
        let endpoint = "/api/ingest/reload";
        let response = self
            .build_request(Method::POST, endpoint)
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, DEFAULT_TIMEOUT_SECS))?;

        Self::handle_response(response, endpoint, DEFAULT_TIMEOUT_SECS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ErrorDetails;
    use crate::core::query::{AccountStatus, PageSize, SortDirection, SortField};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_body() -> serde_json::Value {
        json!({
            "status": true,
            "data": {
                "page": 2,
                "page_size": 10,
                "total_items": 11,
                "total_pages": 2,
                "items": [{
                    "account_uuid": "a1",
                    "account_label": "Acme",
                    "subscription": {"status": "active", "admin_seats": 1, "user_seats": 2, "read_only_seats": 0},
                    "usage": {
                        "total_records": 10,
                        "automation_count": 2,
                        "messages_processed": 300,
                        "notifications_sent": 40,
                        "notifications_billed": 38
                    },
                    "workflows": {"count": 1, "titles": ["Onboarding"]}
                }]
            }
        })
    }

    #[test]
    fn test_client_creation() {
        let client = InsightsClient::new("http://insights.test/".to_string()).unwrap();
        assert_eq!(client.base_url, "http://insights.test");
        assert!(!client.is_authenticated());

        let client =
            InsightsClient::with_token("http://insights.test".to_string(), "t".to_string())
                .unwrap();
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_list_accounts_sends_query_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/insights/accounts"))
            .and(header("authorization", "Bearer secret"))
            .and(query_param("page", "2"))
            .and(query_param("page_size", "10"))
            .and(query_param("sort_by", "total_records"))
            .and(query_param("sort_dir", "desc"))
            .and(query_param("status", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = InsightsClient::with_token(server.uri(), "secret".to_string()).unwrap();
        let query = QueryParams {
            page: 2,
            page_size: PageSize::new(10).unwrap(),
            sort_field: SortField::TotalRecords,
            sort_direction: SortDirection::Descending,
            status: Some(AccountStatus::Active),
            ..QueryParams::default()
        };

        let page = client.list_accounts(&query).await.unwrap();
        assert_eq!(page.total_items, 11);
        assert_eq!(page.items[0].account_label, "Acme");
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/insights/accounts"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": false,
                "data": null,
                "error": {"message": "Invalid token"}
            })))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        let err = client
            .list_accounts(&QueryParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_validation_error_keeps_details() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ingest"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "status": false,
                "data": null,
                "error": {
                    "message": "CSV headers do not match expected schema",
                    "details": {
                        "message": "CSV headers do not match expected schema",
                        "expected": ["account_uuid", "account_label"],
                        "missing": ["account_label"],
                        "extra": ["label"],
                        "headers_present": ["account_uuid", "label"]
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        let err = client
            .upload_csv("export.csv", b"account_uuid,label\n".to_vec())
            .await
            .unwrap_err();
        match err {
            ApiError::Validation {
                details: Some(ErrorDetails::CsvHeaders(report)),
                ..
            } => {
                assert_eq!(report.missing, vec!["account_label"]);
                assert_eq!(report.extra, vec!["label"]);
            }
            other => panic!("Expected CSV header report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_top_workflows_passes_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/insights/analytics/workflows/top"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": {"labels": ["Onboarding", "Billing"], "values": [12, 7]}
            })))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        let chart = client.top_workflows(5).await.unwrap();
        assert_eq!(chart.labels, vec!["Onboarding", "Billing"]);
        assert_eq!(chart.values, vec![12.0, 7.0]);
    }

    #[tokio::test]
    async fn test_login_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": {
                    "access_token": "jwt",
                    "token_type": "bearer",
                    "expires_in": 3600,
                    "email": "lead@example.com"
                }
            })))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        let token = client.login("lead@example.com", "pw").await.unwrap();
        assert_eq!(token.access_token, "jwt");
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/insights/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = InsightsClient::new(server.uri()).unwrap();
        let err = client.get_summary(Audience::Leadership).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
