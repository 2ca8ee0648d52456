use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ApiError;
use crate::config::ProviderConfig;

const CLIENT_USER_AGENT: &str = concat!("pipes-provider/", env!("CARGO_PKG_VERSION"));

/// Typed client for the Pipes REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct PipesClient {
    client: reqwest::Client,
    base_url: String,
}

/// Error body returned by the API for non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Paginated list envelope.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_token: Option<String>,
}

impl PipesClient {
    /// Build a client for the configured host.
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        Self::with_base_url(&config.token, config.base_url())
    }

    /// Build a client against an explicit base URL, e.g. a mock server.
    pub fn with_base_url(token: &str, base_url: impl Into<String>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let auth =
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| ApiError::Auth {
                message: "Invalid token format".to_string(),
            })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(method = "GET", path, "API request");
        let response = self.client.get(self.url(path)).send().await?;
        decode(path, response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = "POST", path, "API request");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        decode(path, response).await
    }

    pub(crate) async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = "PATCH", path, "API request");
        let response = self.client.patch(self.url(path)).json(body).send().await?;
        decode(path, response).await
    }

    /// DELETE ignoring any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(method = "DELETE", path, "API request");
        let response = self.client.delete(self.url(path)).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Follow `next_token` until the listing is exhausted.
    pub(crate) async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page_path = match &next_token {
                Some(token) => format!(
                    "{}?limit=100&next_token={}",
                    path,
                    urlencoding::encode(token)
                ),
                None => format!("{}?limit=100", path),
            };
            let page: ListResponse<T> = self.get_json(&page_path).await?;
            items.extend(page.items);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }
}

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
    let message = parsed
        .detail
        .filter(|d| !d.is_empty())
        .or(parsed.title.filter(|t| !t.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
        context: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = PipesClient::with_base_url("token", "http://localhost:9999/api/v0/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/api/v0");
        assert_eq!(client.url("/actor"), "http://localhost:9999/api/v0/actor");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = PipesClient::with_base_url("bad\ntoken", "http://localhost");
        assert!(matches!(result, Err(ApiError::Auth { .. })));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("jane@example.com"), "jane%40example.com");
        assert_eq!(segment("dev"), "dev");
    }

    #[test]
    fn test_list_response_defaults() {
        let page: ListResponse<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_token.is_none());
    }
}
