use crate::core::session::AuthContext;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClientError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!("swiftmatch-client/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper around `reqwest` that knows the API base URL, attaches the
/// bearer credential and turns HTTP failures into `ClientError`s.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        crate::utils::validation::validate_url("api.base_url", base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.base_url(), config.request_timeout(), config.user_agent())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::ConfigError {
            message: format!("cannot build URL '{}': {}", raw, e),
        })
    }

    pub(crate) fn get(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.client.get(self.endpoint(path)?))
    }

    pub(crate) fn post(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.client.post(self.endpoint(path)?))
    }

    /// Sends the request, adding the bearer header when `auth` is given.
    /// Does not look at the status code.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        auth: Option<&AuthContext>,
    ) -> Result<Response> {
        let request = match auth {
            Some(ctx) if !ctx.is_valid() => return Err(ClientError::NotAuthenticated),
            Some(ctx) => request.header(reqwest::header::AUTHORIZATION, ctx.bearer()),
            None => request,
        };
        let response = request.send().await?;
        tracing::debug!("{} -> {}", response.url().path(), response.status());
        Ok(response)
    }

    /// 401 invalidates the session; any other non-2xx becomes `Api` with the
    /// server's own explanation when it gave one.
    pub(crate) async fn expect_success(
        &self,
        response: Response,
        auth: Option<&AuthContext>,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            if let Some(ctx) = auth {
                ctx.invalidate();
            }
            tracing::warn!("{} rejected the session (401)", response.url().path());
            return Err(ClientError::AuthExpired);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: extract_error_message(&body, status),
        })
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, auth: Option<&AuthContext>) -> Result<T> {
        let response = self.send(self.get(path)?, auth).await?;
        let response = self.expect_success(response, auth).await?;
        Self::decode(response, path).await
    }

    /// POSTs `body` and discards whatever comes back.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        auth: Option<&AuthContext>,
    ) -> Result<Response> {
        let response = self.send(self.post(path)?.json(body), auth).await?;
        self.expect_success(response, auth).await
    }
}

/// Picks the most useful message out of a DRF-style error body.
pub fn extract_error_message(body: &str, status: StatusCode) -> String {
    let fallback = || format!("request failed with status {}", status.as_u16());
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };

    for key in ["detail", "error", "message"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }
    if let Some(first) = value
        .get("non_field_errors")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .and_then(|v| v.as_str())
    {
        return first.to_string();
    }
    if let Some(errors) = value.get("errors") {
        return errors.to_string();
    }
    if let Some(fields) = value.as_object() {
        for (field, messages) in fields {
            if let Some(first) = messages
                .as_array()
                .and_then(|list| list.first())
                .and_then(|v| v.as_str())
            {
                return format!("{}: {}", field_label(field), first);
            }
        }
    }
    fallback()
}

fn field_label(field: &str) -> String {
    match field {
        "email" => "Email".to_string(),
        "username" => "Username".to_string(),
        "password" => "Password".to_string(),
        "first_name" => "First name".to_string(),
        "country" => "Country".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.base_url(), Duration::from_secs(5), DEFAULT_USER_AGENT).unwrap()
    }

    #[test]
    fn test_extract_error_message_variants() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(extract_error_message(r#"{"detail": "nope"}"#, status), "nope");
        assert_eq!(extract_error_message(r#"{"error": "already friends"}"#, status), "already friends");
        assert_eq!(
            extract_error_message(r#"{"non_field_errors": ["bad login"]}"#, status),
            "bad login"
        );
        assert_eq!(
            extract_error_message(r#"{"errors": {"rankings": ["missing"]}}"#, status),
            r#"{"rankings":["missing"]}"#
        );
        assert_eq!(
            extract_error_message(r#"{"email": ["already taken"]}"#, status),
            "Email: already taken"
        );
        assert_eq!(extract_error_message("<html>", status), "request failed with status 400");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ApiClient::new("localhost:8000", Duration::from_secs(1), DEFAULT_USER_AGENT).is_err());
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let api = ApiClient::new("http://localhost:8000/", Duration::from_secs(1), DEFAULT_USER_AGENT).unwrap();
        assert_eq!(
            api.endpoint("/api/albums/all/").unwrap().as_str(),
            "http://localhost:8000/api/albums/all/"
        );
    }

    #[tokio::test]
    async fn test_get_json_attaches_bearer() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/users/me/")
                .header("Authorization", "Bearer tok");
            then.status(200).json_body(serde_json::json!({"id": 1, "username": "ana"}));
        });

        let auth = AuthContext::issue("tok");
        let value: serde_json::Value = client(&server).get_json("/api/users/me/", Some(&auth)).await.unwrap();

        mock.assert();
        assert_eq!(value["username"], "ana");
    }

    #[tokio::test]
    async fn test_unauthorized_invalidates_session() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/users/me/");
            then.status(401).json_body(serde_json::json!({"detail": "expired"}));
        });

        let auth = AuthContext::issue("tok");
        let api = client(&server);
        let result: Result<serde_json::Value> = api.get_json("/api/users/me/", Some(&auth)).await;
        assert!(matches!(result, Err(ClientError::AuthExpired)));
        assert!(!auth.is_valid());

        let again: Result<serde_json::Value> = api.get_json("/api/users/me/", Some(&auth)).await;
        assert!(matches!(again, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/albums/all/");
            then.status(200).body("not json");
        });

        let result: Result<Vec<crate::domain::model::Album>> =
            client(&server).get_json("/api/albums/all/", None).await;
        assert!(matches!(result, Err(ClientError::MalformedResponse { .. })));
    }
}
