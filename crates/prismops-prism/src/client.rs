//! HTTP client for Prism Central

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{PrismError, Result};
use crate::types::{ListRequest, VmListResponse};

/// Prism Central's default API port
pub const DEFAULT_PRISM_PORT: u16 = 9440;

/// Largest page the v3 list API accepts
const MAX_PAGE: u32 = 500;

const API_PREFIX: &str = "api/nutanix/v3/";

/// Connection settings for Prism Central
#[derive(Clone)]
pub struct PrismConfig {
    /// `host`, `host:port` or full URL
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate validation (self-signed Prism certificates)
    pub insecure: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl PrismConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            insecure: false,
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Normalize the endpoint into the API base URL
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL
    pub fn base_url(&self) -> Result<Url> {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        let with_scheme = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };

        let mut url = Url::parse(&with_scheme)?;
        if url.port().is_none() && !self.endpoint.contains("://") {
            // Url only rejects this for cannot-be-a-base URLs, which https is not
            let _ = url.set_port(Some(DEFAULT_PRISM_PORT));
        }
        Ok(url.join(API_PREFIX)?)
    }
}

impl fmt::Debug for PrismConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrismConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Prism Central v3 API client
#[derive(Debug, Clone)]
pub struct PrismClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl PrismClient {
    /// Create a new Prism client
    ///
    /// # Errors
    /// Returns an error if the endpoint is invalid or the HTTP client cannot
    /// be built
    pub fn new(config: &PrismConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// API base URL
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(PrismError::Url)
    }

    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PrismError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        Self::handle(response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: impl serde::Serialize) -> Result<T> {
        let url = self.url(path)?;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// List one page of VMs
    ///
    /// # Errors
    /// Returns an error if the request fails or Prism returns an error.
    #[instrument(skip(self))]
    pub async fn list_vms(
        &self,
        length: u32,
        offset: u32,
        filter: Option<&str>,
    ) -> Result<VmListResponse> {
        let body = ListRequest {
            kind: "vm",
            length: length.clamp(1, MAX_PAGE),
            offset,
            filter: filter.map(str::to_string),
        };
        self.post("vms/list", body).await
    }

    /// List every VM, following pages until `total_matches` is reached
    ///
    /// # Errors
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_all_vms(&self, filter: Option<&str>) -> Result<VmListResponse> {
        let mut all = self.list_vms(MAX_PAGE, 0, filter).await?;

        loop {
            let fetched = all.entities.len() as u64;
            if fetched >= all.total() {
                break;
            }

            let offset = u32::try_from(fetched).unwrap_or(u32::MAX);
            let page = self.list_vms(MAX_PAGE, offset, filter).await?;
            if page.entities.is_empty() {
                break;
            }
            debug!(offset, fetched = page.entities.len(), "fetched VM page");
            all.entities.extend(page.entities);
        }

        Ok(all)
    }

    /// Count VMs matching `filter`
    ///
    /// # Errors
    /// Returns an error if the request fails or Prism returns an error.
    #[instrument(skip(self))]
    pub async fn count_vms(&self, filter: Option<&str>) -> Result<u64> {
        let page = self.list_vms(1, 0, filter).await?;
        Ok(page.total())
    }

    /// Fetch one VM by UUID
    ///
    /// # Errors
    /// Returns an error if the request fails or Prism returns an error.
    #[instrument(skip(self))]
    pub async fn get_vm(&self, uuid: &str) -> Result<Value> {
        self.get(&format!("vms/{uuid}")).await
    }
}
