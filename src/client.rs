use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use crate::error::NetworkError;
use crate::models::CatalogRecord;

/// Default API root of the public SpaceX v4 API.
pub const DEFAULT_BASE_URL: &str = "https://api.spacexdata.com/v4";

/// Source of the remote rocket catalog.
///
/// The whole catalog arrives in one response: it either decodes completely
/// or the call fails.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<CatalogRecord>, NetworkError>;
}

// ---------------------------------------------------------------------------
// Internal response handling
// ---------------------------------------------------------------------------

/// Shared logic for building a configured [`Client`] and making requests.
struct BaseClient {
    base_url: String,
    http: Client,
}

impl BaseClient {
    fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, NetworkError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Map the status code to an error, or hand back the parsed body.
    async fn handle_response(&self, response: Response) -> Result<serde_json::Value, NetworkError> {
        let status = response.status().as_u16();
        let body = response.text().await?;

        if (200..300).contains(&status) {
            return serde_json::from_str(&body).map_err(|e| NetworkError::Decode(e.to_string()));
        }

        // Error bodies are best-effort: the API answers `{"error": "..."}`
        // but proxies in between may not.
        let msg = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|data| {
                data.get("error")
                    .or_else(|| data.get("message"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        Err(NetworkError::Api {
            status,
            message: if msg.is_empty() {
                format!("HTTP {status}")
            } else {
                msg
            },
        })
    }

    async fn get(&self, endpoint: &str) -> Result<serde_json::Value, NetworkError> {
        let url = self.url(endpoint);
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// HTTP client for the SpaceX rocket catalog.
///
/// ```no_run
/// use rocket_catalog::{CatalogSource, SpaceXClient};
///
/// # async fn run() -> Result<(), rocket_catalog::NetworkError> {
/// let client = SpaceXClient::new("https://api.spacexdata.com/v4", None)?;
/// for rocket in client.fetch_all().await? {
///     println!("{}: {}", rocket.id, rocket.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SpaceXClient {
    base: BaseClient,
}

impl SpaceXClient {
    /// Create a new client.
    ///
    /// * `base_url` – API root, e.g. `https://api.spacexdata.com/v4`
    /// * `timeout`  – optional per-request timeout
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, NetworkError> {
        Ok(Self {
            base: BaseClient::new(base_url, timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base.base_url
    }
}

#[async_trait]
impl CatalogSource for SpaceXClient {
    async fn fetch_all(&self) -> Result<Vec<CatalogRecord>, NetworkError> {
        let data = self.base.get("/rockets").await?;
        serde_json::from_value(data).map_err(|e| NetworkError::Decode(e.to_string()))
    }
}
