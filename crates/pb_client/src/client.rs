//! HTTP transport for the remote play store.

use pb_core::GatewayError;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.playbook3d.shop";

/// Connection settings for the remote store.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token from the auth flow; passed through opaquely.
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
        }
    }
}

/// Thin request helper: auth header, error-body extraction, and the mapping
/// from transport/status failures to [`GatewayError`].
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        // A stalled remote call must not hold its caller forever.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| {
                GatewayError::Connection(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone(),
        })
    }

    pub async fn get(&self, endpoint: &str) -> Result<String, GatewayError> {
        let request = self.client.get(self.url(endpoint));
        self.execute(request, "GET", endpoint).await
    }

    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<String, GatewayError> {
        let request = self.client.post(self.url(endpoint)).json(body);
        self.execute(request, "POST", endpoint).await
    }

    pub async fn put<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<String, GatewayError> {
        let request = self.client.put(self.url(endpoint)).json(body);
        self.execute(request, "PUT", endpoint).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<String, GatewayError> {
        let request = self.client.delete(self.url(endpoint));
        self.execute(request, "DELETE", endpoint).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> Result<String, GatewayError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        log::debug!("{} -> {}", method, endpoint);
        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                GatewayError::Connection(format!("request timed out: {err}"))
            } else {
                GatewayError::Connection(err.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::Connection(err.to_string()))?;

        if status.is_success() {
            log::debug!("{} {} succeeded", method, endpoint);
            return Ok(body);
        }

        let detail = extract_detail(&body);
        log::error!("{} {} failed: {} ({})", method, endpoint, status, detail);

        Err(match status.as_u16() {
            404 => GatewayError::NotFound(detail),
            401 | 403 => GatewayError::Permission(detail),
            code => GatewayError::Remote { code, detail },
        })
    }
}

/// Pull the `detail` field out of a JSON error body, falling back to the
/// raw text. Some proxies prepend garbage before the JSON object, so the
/// parse starts at the first brace.
fn extract_detail(body: &str) -> String {
    if let Some(start) = body.find('{') {
        if let Ok(parsed) = serde_json::from_str::<ErrorDetail>(&body[start..]) {
            if !parsed.detail.is_empty() {
                return parsed.detail;
            }
        }
    }
    body.to_string()
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: String,
}
