//! Guarded deletion of OIDC configs
//!
//! A config is only deleted after a search finds no cluster using it. The
//! search and the delete are separate calls and the service offers no
//! compare-and-delete, so a cluster created in between is not detected.

use crate::error::{Error, Result};
use crate::state::OidcConfigState;
use clustersmgmt::Backend;
use declarative::Lifecycle;

/// Fail unless no cluster uses the config
pub fn ensure_unused<B: Backend + ?Sized>(backend: &B, id: &str) -> Result<()> {
    let clusters = backend
        .list_clusters_using_oidc_config(id)
        .map_err(|source| Error::PreconditionCheckFailed {
            id: id.to_string(),
            source,
        })?;

    if clusters.is_empty() {
        return Ok(());
    }

    Err(Error::InUse {
        id: id.to_string(),
        clusters: clusters
            .iter()
            .map(|cluster| cluster.display_name().to_string())
            .collect(),
    })
}

/// Delete a config if no cluster uses it
///
/// On success the state ends up [`Lifecycle::Deleted`] and can be discarded.
/// On failure it keeps its previous phase.
pub fn destroy<B: Backend + ?Sized>(backend: &B, state: &mut OidcConfigState) -> Result<()> {
    ensure_unused(backend, &state.id)?;

    let previous = state.lifecycle;
    state.lifecycle = Lifecycle::Deleting;
    log::debug!("Deleting OIDC config {}", state.id);

    match backend.delete_oidc_config(&state.id) {
        Ok(()) => {
            state.lifecycle = Lifecycle::Deleted;
            log::info!("Deleted OIDC config {}", state.id);
            Ok(())
        }
        Err(source) => {
            state.lifecycle = previous;
            Err(Error::DeletionFailed {
                id: state.id.clone(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clustersmgmt::{ClusterRef, MockBackend, OidcConfig, Operation};

    const ID: &str = "23f6gk51qi5ng15mm095c90hhajbf7c5";

    fn stored(mock: &MockBackend) -> OidcConfigState {
        mock.add_config(OidcConfig {
            id: Some(ID.into()),
            issuer_url: Some("https://oidc-f3y4.s3.us-east-1.amazonaws.com".into()),
            ..OidcConfig::default()
        });
        OidcConfigState {
            id: ID.into(),
            lifecycle: Lifecycle::Ready,
            ..OidcConfigState::default()
        }
    }

    #[test]
    fn test_destroy_unused_config() {
        let mock = MockBackend::new();
        let mut state = stored(&mock);

        destroy(&mock, &mut state).unwrap();
        assert_eq!(state.lifecycle, Lifecycle::Deleted);
        assert!(mock.config(ID).is_none());
    }

    #[test]
    fn test_destroy_in_use_never_deletes() {
        let mock = MockBackend::new();
        let mut state = stored(&mock);
        mock.add_cluster(ID, ClusterRef::named("my-cluster"));

        let err = destroy(&mock, &mut state).unwrap_err();
        assert!(matches!(&err, Error::InUse { clusters, .. } if clusters == &["my-cluster"]));
        assert!(err.to_string().contains("there are clusters using OIDC config"));
        assert_eq!(mock.count(Operation::DeleteOidcConfig), 0);
        assert_eq!(state.lifecycle, Lifecycle::Ready);
    }

    #[test]
    fn test_destroy_failed_listing_never_deletes() {
        let mock = MockBackend::new();
        let mut state = stored(&mock);
        mock.fail(Operation::ListClusters, clustersmgmt::Error::not_found("cluster search"));

        let err = destroy(&mock, &mut state).unwrap_err();
        assert!(
            err.to_string()
                .contains("There was a problem checking if any clusters are using OIDC config")
        );
        assert_eq!(mock.count(Operation::DeleteOidcConfig), 0);
    }

    #[test]
    fn test_destroy_failure_restores_phase() {
        let mock = MockBackend::new();
        let mut state = stored(&mock);
        mock.fail(
            Operation::DeleteOidcConfig,
            clustersmgmt::Error::http("HTTP 500", Some(500)),
        );

        let err = destroy(&mock, &mut state).unwrap_err();
        assert!(err.to_string().contains("There was a problem deleting the OIDC config"));
        assert_eq!(state.lifecycle, Lifecycle::Ready);
    }
}
