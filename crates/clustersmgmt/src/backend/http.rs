//! Blocking HTTP backend for a clusters_mgmt service.
//!
//! Transport settings (URL, token, timeout) come in through [`HttpConfig`];
//! nothing is read from the environment here.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{
    ClusterList, ClusterRef, OidcConfig, OidcConfigRequest, Thumbprint, ThumbprintRequest,
    clusters_using_oidc_config,
};
use std::time::Duration;

/// Default API URL.
pub const DEFAULT_URL: &str = "https://api.openshift.com";

/// Default timeout for a whole request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_PREFIX: &str = "/api/clusters_mgmt/v1";

/// Page size of the cluster search; enough to name a few users of a config.
const CLUSTER_SEARCH_SIZE: u32 = 10;

/// Transport configuration for [`HttpBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Base URL of the API, without the `/api/...` prefix.
    pub url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Timeout for a whole request, including reading the body.
    pub timeout: Option<Duration>,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            token: None,
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!("clustersmgmt-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Backend talking to a real clusters_mgmt service.
pub struct HttpBackend {
    agent: ureq::Agent,
    config: HttpConfig,
}

impl HttpBackend {
    /// Create a backend from its transport configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the URL is not an http(s) URL.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let url = config.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                config.url
            )));
        }

        let agent_config = ureq::Agent::config_builder()
            .timeout_global(config.timeout)
            .build();

        Ok(Self {
            agent: ureq::Agent::new_with_config(agent_config),
            config,
        })
    }

    /// Get the configured API URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.config.url.trim().trim_end_matches('/'),
            API_PREFIX,
            path
        )
    }

    fn oidc_configs_url(&self) -> String {
        self.endpoint("/oidc_configs")
    }

    /// The id is percent-encoded so it always stays one path segment.
    fn oidc_config_url(&self, id: &str) -> String {
        self.endpoint(&format!("/oidc_configs/{}", urlencoding::encode(id)))
    }

    fn thumbprint_url(&self) -> String {
        self.endpoint("/aws_inquiries/oidc_thumbprint")
    }

    fn clusters_url(&self) -> String {
        self.endpoint("/clusters")
    }

    /// Add the headers every request carries.
    fn prepare<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        let request = request
            .header("Accept", "application/json")
            .header("User-Agent", &self.config.user_agent);

        match self.config.token.as_deref() {
            Some(token) => request.header("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }
}

impl Backend for HttpBackend {
    fn create_oidc_config(&self, request: &OidcConfigRequest) -> Result<OidcConfig> {
        let url = self.oidc_configs_url();
        log::debug!("POST {url} (managed: {})", request.managed);

        let config: OidcConfig = self
            .prepare(self.agent.post(&url))
            .send_json(request)?
            .body_mut()
            .read_json()?;

        Ok(config)
    }

    fn compute_thumbprint(&self, issuer_url: &str) -> Result<Thumbprint> {
        let url = self.thumbprint_url();
        log::debug!("POST {url} (issuer: {issuer_url})");

        let body = ThumbprintRequest {
            issuer_url: issuer_url.to_string(),
        };
        let thumbprint: Thumbprint = self
            .prepare(self.agent.post(&url))
            .send_json(&body)?
            .body_mut()
            .read_json()?;

        Ok(thumbprint)
    }

    fn get_oidc_config(&self, id: &str) -> Result<OidcConfig> {
        let url = self.oidc_config_url(id);
        log::debug!("GET {url}");

        let mut response = self
            .prepare(self.agent.get(&url))
            .call()
            .map_err(|e| Error::from(e).with_resource(format!("OIDC config '{id}'")))?;

        Ok(response.body_mut().read_json()?)
    }

    fn list_clusters_using_oidc_config(&self, id: &str) -> Result<Vec<ClusterRef>> {
        let url = self.clusters_url();
        let search = clusters_using_oidc_config(id);
        log::debug!("GET {url} (search: {search})");

        let list: ClusterList = self
            .prepare(self.agent.get(&url))
            .query("search", &search)
            .query("size", CLUSTER_SEARCH_SIZE.to_string())
            .call()
            .map_err(|e| Error::from(e).with_resource("cluster search"))?
            .body_mut()
            .read_json()?;

        Ok(list.items)
    }

    fn delete_oidc_config(&self, id: &str) -> Result<()> {
        let url = self.oidc_config_url(id);
        log::debug!("DELETE {url}");

        self.prepare(self.agent.delete(&url))
            .call()
            .map_err(|e| Error::from(e).with_resource(format!("OIDC config '{id}'")))?;

        Ok(())
    }
}
