//! Entry points for managing OIDC configs against a backend

use crate::create::{self, CreateOutcome};
use crate::error::{Error, Result, Step};
use crate::guard;
use crate::project::project;
use crate::state::OidcConfigState;
use crate::validate::{Intent, ValidIntent};
use clustersmgmt::Backend;

/// Creates, reads, imports and destroys OIDC configs
///
/// Each operation is a blocking sequence of remote calls with no retries.
#[derive(Debug, Clone)]
pub struct Reconciler<B> {
    backend: B,
}

impl<B: Backend> Reconciler<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate an intent without touching the backend
    pub fn validate(&self, intent: &Intent) -> Result<ValidIntent> {
        Ok(intent.validate()?)
    }

    /// Create a config: create, thumbprint, read back, project
    pub fn create(&self, intent: &Intent) -> Result<CreateOutcome> {
        create::create(&self.backend, intent)
    }

    /// Refresh a known config
    ///
    /// Returns `None` if the config no longer exists. A config left
    /// incomplete by a failed create is completed here.
    pub fn read(&self, prior: &OidcConfigState) -> Result<Option<OidcConfigState>> {
        match create::read_back(&self.backend, prior) {
            Ok(state) => Ok(Some(state)),
            Err(err) if err.is_not_found() => {
                log::debug!("OIDC config {} not found", prior.id);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Build the state of an existing config from its id
    pub fn import(&self, id: &str) -> Result<OidcConfigState> {
        let remote = create::get(&self.backend, id)?;
        let issuer_url = remote
            .issuer_url
            .as_deref()
            .ok_or(Error::MalformedResponse { field: "issuer_url" })?;
        let thumbprint = self
            .backend
            .compute_thumbprint(issuer_url)
            .map_err(Error::remote(Step::ComputeThumbprint))?;

        project(&remote, &thumbprint, None)
    }

    /// Delete a config unless a cluster uses it
    pub fn destroy(&self, state: &mut OidcConfigState) -> Result<()> {
        guard::destroy(&self.backend, state)
    }
}
