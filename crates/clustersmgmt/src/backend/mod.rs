//! Backend trait and implementations for the clusters_mgmt API.
//!
//! This module provides the [`Backend`] trait, the blocking
//! [`http::HttpBackend`] used against a real service, and [`MockBackend`], an
//! in-memory stand-in that records every call.
//!
//! # Testing
//!
//! ```
//! use clustersmgmt::{Backend, MockBackend, OidcConfigRequest, Operation};
//!
//! let mock = MockBackend::new().with_next_id("23f6gk51qi5ng15mm095c90hhajbf7c5");
//! let config = mock.create_oidc_config(&OidcConfigRequest::managed()).unwrap();
//!
//! assert_eq!(config.id.as_deref(), Some("23f6gk51qi5ng15mm095c90hhajbf7c5"));
//! assert_eq!(mock.count(Operation::CreateOidcConfig), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{ClusterRef, OidcConfig, OidcConfigRequest, Thumbprint};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Remote operations needed to manage OIDC configs.
///
/// Every method blocks until the remote call completes. Implementations
/// perform no retries.
pub trait Backend: Send + Sync {
    /// Register a new OIDC config.
    fn create_oidc_config(&self, request: &OidcConfigRequest) -> Result<OidcConfig>;

    /// Compute the certificate thumbprint of an issuer.
    fn compute_thumbprint(&self, issuer_url: &str) -> Result<Thumbprint>;

    /// Fetch an OIDC config by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no config has that id.
    fn get_oidc_config(&self, id: &str) -> Result<OidcConfig>;

    /// List the clusters that reference an OIDC config.
    ///
    /// An empty vector means no cluster uses the config; a failed search is
    /// always an error, never an empty result.
    fn list_clusters_using_oidc_config(&self, id: &str) -> Result<Vec<ClusterRef>>;

    /// Delete an OIDC config.
    fn delete_oidc_config(&self, id: &str) -> Result<()>;
}

impl<T: Backend + ?Sized> Backend for Box<T> {
    fn create_oidc_config(&self, request: &OidcConfigRequest) -> Result<OidcConfig> {
        (**self).create_oidc_config(request)
    }

    fn compute_thumbprint(&self, issuer_url: &str) -> Result<Thumbprint> {
        (**self).compute_thumbprint(issuer_url)
    }

    fn get_oidc_config(&self, id: &str) -> Result<OidcConfig> {
        (**self).get_oidc_config(id)
    }

    fn list_clusters_using_oidc_config(&self, id: &str) -> Result<Vec<ClusterRef>> {
        (**self).list_clusters_using_oidc_config(id)
    }

    fn delete_oidc_config(&self, id: &str) -> Result<()> {
        (**self).delete_oidc_config(id)
    }
}

impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn create_oidc_config(&self, request: &OidcConfigRequest) -> Result<OidcConfig> {
        (**self).create_oidc_config(request)
    }

    fn compute_thumbprint(&self, issuer_url: &str) -> Result<Thumbprint> {
        (**self).compute_thumbprint(issuer_url)
    }

    fn get_oidc_config(&self, id: &str) -> Result<OidcConfig> {
        (**self).get_oidc_config(id)
    }

    fn list_clusters_using_oidc_config(&self, id: &str) -> Result<Vec<ClusterRef>> {
        (**self).list_clusters_using_oidc_config(id)
    }

    fn delete_oidc_config(&self, id: &str) -> Result<()> {
        (**self).delete_oidc_config(id)
    }
}

/// Kinds of remote operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateOidcConfig,
    ComputeThumbprint,
    GetOidcConfig,
    ListClusters,
    DeleteOidcConfig,
}

/// A call recorded by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateOidcConfig(OidcConfigRequest),
    ComputeThumbprint(String),
    GetOidcConfig(String),
    ListClusters(String),
    DeleteOidcConfig(String),
}

impl Call {
    /// The operation this call belongs to.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::CreateOidcConfig(_) => Operation::CreateOidcConfig,
            Self::ComputeThumbprint(_) => Operation::ComputeThumbprint,
            Self::GetOidcConfig(_) => Operation::GetOidcConfig,
            Self::ListClusters(_) => Operation::ListClusters,
            Self::DeleteOidcConfig(_) => Operation::DeleteOidcConfig,
        }
    }
}

const DEFAULT_MANAGED_ISSUER_BASE: &str = "https://oidc.mock.invalid";

#[derive(Debug, Default)]
struct MockState {
    configs: HashMap<String, OidcConfig>,
    thumbprints: HashMap<String, String>,
    clusters: HashMap<String, Vec<ClusterRef>>,
    failures: HashMap<Operation, Error>,
    next_ids: VecDeque<String>,
    managed_issuer_base: Option<String>,
    generated: u64,
    calls: Vec<Call>,
}

impl MockState {
    fn next_id(&mut self) -> String {
        self.next_ids.pop_front().unwrap_or_else(|| {
            self.generated += 1;
            format!("mock{:028}", self.generated)
        })
    }

    /// Record a call and return the injected failure for its operation, if any.
    fn record(&mut self, call: Call) -> Result<()> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// In-memory backend for testing without network access.
///
/// Behaves like a tiny clusters_mgmt service: created configs can be read
/// back and deleted, thumbprints and referencing clusters are configured up
/// front, and failures can be injected per [`Operation`]. Clones share state,
/// so a test can keep a handle while the code under test owns another.
///
/// Like the real service, reads do not echo `installer_role_arn`.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create an empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the id assigned to the next created config.
    #[must_use]
    pub fn with_next_id(self, id: impl Into<String>) -> Self {
        self.state().next_ids.push_back(id.into());
        self
    }

    /// Base URL for issuers of managed configs; the config id is appended.
    #[must_use]
    pub fn with_managed_issuer_base(self, base: impl Into<String>) -> Self {
        self.state().managed_issuer_base = Some(base.into());
        self
    }

    /// Thumbprint returned for an issuer URL.
    #[must_use]
    pub fn with_thumbprint(self, issuer_url: impl Into<String>, thumbprint: impl Into<String>) -> Self {
        self.state()
            .thumbprints
            .insert(issuer_url.into(), thumbprint.into());
        self
    }

    /// Store an existing config, as if created earlier.
    pub fn add_config(&self, config: OidcConfig) {
        if let Some(id) = config.id.clone() {
            self.state().configs.insert(id, config);
        }
    }

    /// Register a cluster that uses an OIDC config.
    pub fn add_cluster(&self, oidc_config_id: impl Into<String>, cluster: ClusterRef) {
        self.state()
            .clusters
            .entry(oidc_config_id.into())
            .or_default()
            .push(cluster);
    }

    /// Make every call of an operation fail with the given error.
    pub fn fail(&self, operation: Operation, error: Error) {
        self.state().failures.insert(operation, error);
    }

    /// Get a stored config.
    #[must_use]
    pub fn config(&self, id: &str) -> Option<OidcConfig> {
        self.state().configs.get(id).cloned()
    }

    /// All calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of calls received for an operation.
    #[must_use]
    pub fn count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Forget recorded calls.
    pub fn reset_calls(&self) {
        self.state().calls.clear();
    }
}

impl Backend for MockBackend {
    fn create_oidc_config(&self, request: &OidcConfigRequest) -> Result<OidcConfig> {
        let mut state = self.state();
        state.record(Call::CreateOidcConfig(request.clone()))?;

        let id = state.next_id();
        let issuer_url = if request.managed {
            let base = state
                .managed_issuer_base
                .as_deref()
                .unwrap_or(DEFAULT_MANAGED_ISSUER_BASE);
            Some(format!("{}/{}", base.trim_end_matches('/'), id))
        } else {
            request.issuer_url.clone()
        };

        let config = OidcConfig {
            href: Some(format!("/api/clusters_mgmt/v1/oidc_configs/{id}")),
            id: Some(id.clone()),
            issuer_url,
            managed: request.managed,
            reusable: request.reusable,
            secret_arn: request.secret_arn.clone(),
            installer_role_arn: None,
        };
        state.configs.insert(id, config.clone());
        Ok(config)
    }

    fn compute_thumbprint(&self, issuer_url: &str) -> Result<Thumbprint> {
        let mut state = self.state();
        state.record(Call::ComputeThumbprint(issuer_url.to_string()))?;

        state
            .thumbprints
            .get(issuer_url)
            .map(Thumbprint::new)
            .ok_or_else(|| Error::http(format!("no thumbprint available for {issuer_url}"), Some(400)))
    }

    fn get_oidc_config(&self, id: &str) -> Result<OidcConfig> {
        let mut state = self.state();
        state.record(Call::GetOidcConfig(id.to_string()))?;

        state
            .configs
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("OIDC config '{id}'")))
    }

    fn list_clusters_using_oidc_config(&self, id: &str) -> Result<Vec<ClusterRef>> {
        let mut state = self.state();
        state.record(Call::ListClusters(id.to_string()))?;

        Ok(state.clusters.get(id).cloned().unwrap_or_default())
    }

    fn delete_oidc_config(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        state.record(Call::DeleteOidcConfig(id.to_string()))?;

        state
            .configs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("OIDC config '{id}'")))
    }
}
