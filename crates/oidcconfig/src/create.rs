//! Creation of OIDC configs
//!
//! Creating a config takes three remote calls: the create itself, the
//! thumbprint of the issuer, and a read-back of the config. Only the first
//! one is needed for the config to exist, so a failure after it leaves a
//! [`Lifecycle::Created`] config that a later read completes.

use crate::error::{Error, Result, Step};
use crate::project::project;
use crate::state::OidcConfigState;
use crate::validate::{Intent, ValidIntent};
use clustersmgmt::Backend;
use declarative::Lifecycle;

/// Result of a create that got past the create call
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// Created and fully read back
    Ready(OidcConfigState),
    /// Created remotely, but a later step failed
    Incomplete {
        state: OidcConfigState,
        error: Error,
    },
}

impl CreateOutcome {
    pub fn state(&self) -> &OidcConfigState {
        match self {
            Self::Ready(state) | Self::Incomplete { state, .. } => state,
        }
    }

    /// The ready state, or the error that left the config incomplete
    pub fn into_result(self) -> Result<OidcConfigState> {
        match self {
            Self::Ready(state) => Ok(state),
            Self::Incomplete { error, .. } => Err(error),
        }
    }
}

/// Validate an intent and create the config it describes
///
/// # Errors
///
/// Fails without any remote call if the intent is invalid, and without
/// anything to clean up if the create call fails. Later failures are
/// reported as [`CreateOutcome::Incomplete`].
pub fn create<B: Backend + ?Sized>(backend: &B, intent: &Intent) -> Result<CreateOutcome> {
    let valid = intent.validate()?;

    let remote = backend
        .create_oidc_config(&valid.request())
        .map_err(Error::remote(Step::CreateOidcConfig))?;
    let id = remote
        .id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or(Error::MalformedResponse { field: "id" })?;
    log::info!("Created OIDC config {id}");

    let issuer_url = remote.issuer_url.as_deref().filter(|url| !url.trim().is_empty());
    let state = created_state(id, issuer_url, &valid);
    match complete(backend, &state, issuer_url) {
        Ok(ready) => Ok(CreateOutcome::Ready(ready)),
        Err(error) => {
            log::warn!("OIDC config {} was created but could not be read back: {error}", state.id);
            Ok(CreateOutcome::Incomplete { state, error })
        }
    }
}

fn created_state(id: String, issuer_url: Option<&str>, valid: &ValidIntent) -> OidcConfigState {
    match valid {
        ValidIntent::Managed => OidcConfigState {
            id,
            issuer_url: issuer_url.unwrap_or_default().to_string(),
            managed: true,
            lifecycle: Lifecycle::Created,
            ..OidcConfigState::default()
        },
        ValidIntent::Unmanaged {
            secret_arn,
            issuer_url,
            installer_role_arn,
        } => OidcConfigState {
            id,
            issuer_url: issuer_url.clone(),
            managed: false,
            secret_arn: Some(secret_arn.clone()),
            installer_role_arn: Some(installer_role_arn.clone()),
            lifecycle: Lifecycle::Created,
            ..OidcConfigState::default()
        },
    }
}

/// Read back a config that was just created
///
/// The thumbprint is computed for the issuer the create call returned, which
/// the server may have normalized. The projection still keeps the declared
/// spelling when the two differ only by case.
fn complete<B: Backend + ?Sized>(
    backend: &B,
    created: &OidcConfigState,
    issuer_url: Option<&str>,
) -> Result<OidcConfigState> {
    let Some(issuer_url) = issuer_url else {
        return read_back(backend, created);
    };

    let thumbprint = backend
        .compute_thumbprint(issuer_url)
        .map_err(Error::remote(Step::ComputeThumbprint))?;
    let remote = get(backend, &created.id)?;
    project(&remote, &thumbprint, Some(created))
}

/// Fetch the thumbprint and the remote config, and project them onto `prior`
///
/// The thumbprint is computed for the issuer already known locally. If none
/// is known yet, the config is read first to learn it.
pub fn read_back<B: Backend + ?Sized>(backend: &B, prior: &OidcConfigState) -> Result<OidcConfigState> {
    let (remote, thumbprint) = if prior.issuer_url.trim().is_empty() {
        let remote = get(backend, &prior.id)?;
        let issuer_url = remote
            .issuer_url
            .clone()
            .ok_or(Error::MalformedResponse { field: "issuer_url" })?;
        let thumbprint = backend
            .compute_thumbprint(&issuer_url)
            .map_err(Error::remote(Step::ComputeThumbprint))?;
        (remote, thumbprint)
    } else {
        let thumbprint = backend
            .compute_thumbprint(&prior.issuer_url)
            .map_err(Error::remote(Step::ComputeThumbprint))?;
        (get(backend, &prior.id)?, thumbprint)
    };

    project(&remote, &thumbprint, Some(prior))
}

pub(crate) fn get<B: Backend + ?Sized>(backend: &B, id: &str) -> Result<clustersmgmt::OidcConfig> {
    backend
        .get_oidc_config(id)
        .map_err(Error::remote(Step::GetOidcConfig))
}
