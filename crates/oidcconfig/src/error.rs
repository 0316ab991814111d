//! Error types for OIDC config lifecycle operations

use std::fmt;

/// Result type for OIDC config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Number of referencing clusters named in an [`Error::InUse`] message
const LISTED_CLUSTERS: usize = 3;

/// A declaration that cannot be turned into a create request
///
/// Raised before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "In order to create managed OIDC Configuration, the attributes' values of `secret_arn`, `issuer_url` and `installer_role_arn` should be empty"
    )]
    ManagedWithSelfHostedAttributes,

    #[error(
        "In order to create unmanaged OIDC Configuration, the attributes' values of `secret_arn`, `issuer_url` and `installer_role_arn` should not be empty: missing {}",
        .missing.join(", ")
    )]
    UnmanagedMissingAttributes { missing: Vec<&'static str> },

    #[error("attribute `{name}` is required")]
    MissingAttribute { name: &'static str },

    #[error("attribute `{name}` must be a {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("unsupported attribute `{name}`")]
    UnknownAttribute { name: String },
}

/// A remote call made while creating or reading a config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateOidcConfig,
    ComputeThumbprint,
    GetOidcConfig,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateOidcConfig => "create the OIDC config",
            Self::ComputeThumbprint => "compute the OIDC thumbprint",
            Self::GetOidcConfig => "read the OIDC config",
        })
    }
}

/// Errors raised by the OIDC config lifecycle
///
/// The remote cause, when there is one, is available through
/// [`std::error::Error::source`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to {step}")]
    RemoteCall {
        step: Step,
        #[source]
        source: clustersmgmt::Error,
    },

    #[error("There was a problem checking if any clusters are using OIDC config '{id}'")]
    PreconditionCheckFailed {
        id: String,
        #[source]
        source: clustersmgmt::Error,
    },

    #[error(
        "there are clusters using OIDC config '{id}', can't delete the configuration ({})",
        describe_clusters(.clusters)
    )]
    InUse { id: String, clusters: Vec<String> },

    #[error("There was a problem deleting the OIDC config '{id}'")]
    DeletionFailed {
        id: String,
        #[source]
        source: clustersmgmt::Error,
    },

    #[error("malformed OIDC config response: `{field}` is missing")]
    MalformedResponse { field: &'static str },
}

impl Error {
    pub(crate) fn remote(step: Step) -> impl FnOnce(clustersmgmt::Error) -> Self {
        move |source| Self::RemoteCall { step, source }
    }

    /// The underlying remote error, if any
    pub fn remote_source(&self) -> Option<&clustersmgmt::Error> {
        match self {
            Self::RemoteCall { source, .. }
            | Self::PreconditionCheckFailed { source, .. }
            | Self::DeletionFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the config was not found when reading it
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RemoteCall {
                step: Step::GetOidcConfig,
                source,
            } if source.is_not_found()
        )
    }
}

fn describe_clusters(clusters: &[String]) -> String {
    let mut shown = clusters
        .iter()
        .take(LISTED_CLUSTERS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if clusters.len() > LISTED_CLUSTERS {
        shown.push_str(&format!(" and {} more", clusters.len() - LISTED_CLUSTERS));
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::ManagedWithSelfHostedAttributes.to_string(),
            "In order to create managed OIDC Configuration, the attributes' values of `secret_arn`, `issuer_url` and `installer_role_arn` should be empty"
        );

        let err = ValidationError::UnmanagedMissingAttributes {
            missing: vec!["secret_arn", "installer_role_arn"],
        };
        assert!(err.to_string().ends_with("missing secret_arn, installer_role_arn"));
    }

    #[test]
    fn test_in_use_lists_first_clusters() {
        let err = Error::InUse {
            id: "abc".into(),
            clusters: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
        };
        let message = err.to_string();
        assert!(message.contains("there are clusters using OIDC config"));
        assert!(message.ends_with("(a, b, c and 2 more)"));
    }

    #[test]
    fn test_remote_source_is_chained() {
        let err = Error::DeletionFailed {
            id: "abc".into(),
            source: clustersmgmt::Error::http("HTTP 500", Some(500)),
        };
        assert_eq!(
            err.to_string(),
            "There was a problem deleting the OIDC config 'abc'"
        );
        assert!(err.source().is_some());
        assert_eq!(err.remote_source().and_then(clustersmgmt::Error::status), Some(500));
    }

    #[test]
    fn test_is_not_found() {
        let gone = Error::remote(Step::GetOidcConfig)(clustersmgmt::Error::not_found("OIDC config"));
        assert!(gone.is_not_found());

        let other = Error::remote(Step::ComputeThumbprint)(clustersmgmt::Error::not_found("x"));
        assert!(!other.is_not_found());
    }
}
