//! Resource types managed by oidc-provisioner
//!
//! Every declared resource type is a [`declarative::Resource`] registered
//! here; the rest of the binary only talks to the registry.

pub mod oidc_config;

use clustersmgmt::Backend;
use declarative::ResourceRegistry;
use std::sync::Arc;

pub use oidc_config::OidcConfigResource;

/// Registry with every resource type, all sharing one backend
pub fn registry(backend: Arc<dyn Backend>) -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry.register(Box::new(OidcConfigResource::new(backend)));
    registry
}
