//! Local representation of a managed OIDC config

use declarative::Lifecycle;

/// What is known locally about one OIDC config
///
/// `thumbprint` and `oidc_endpoint_url` are only guaranteed once the config
/// is [`Lifecycle::Ready`]; a [`Lifecycle::Created`] config exists remotely
/// but has not been read back yet, and its `issuer_url` may still be empty
/// for managed configs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OidcConfigState {
    pub id: String,
    pub issuer_url: String,
    pub managed: bool,
    pub secret_arn: Option<String>,
    pub installer_role_arn: Option<String>,
    pub thumbprint: Option<String>,
    pub oidc_endpoint_url: Option<String>,
    pub lifecycle: Lifecycle,
}

impl OidcConfigState {
    /// Whether the config exists remotely but was never fully read
    pub fn is_incomplete(&self) -> bool {
        self.lifecycle.is_incomplete()
    }
}
