//! # clustersmgmt
//!
//! Blocking client for the parts of the `clusters_mgmt` API needed to manage
//! OIDC configs:
//!
//! - creating, reading and deleting OIDC configs
//! - computing an issuer's certificate thumbprint
//! - searching for clusters that use an OIDC config
//!
//! ## Example
//!
//! ```no_run
//! use clustersmgmt::{Backend, HttpBackend, HttpConfig, OidcConfigRequest};
//!
//! let backend = HttpBackend::new(HttpConfig {
//!     token: Some("...".to_string()),
//!     ..HttpConfig::default()
//! })
//! .expect("valid configuration");
//!
//! let config = backend.create_oidc_config(&OidcConfigRequest::managed()).unwrap();
//! println!("created {:?}", config.id);
//! ```
//!
//! Use [`MockBackend`] to exercise callers without a server.

#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::http::{DEFAULT_TIMEOUT, DEFAULT_URL, HttpBackend, HttpConfig};
pub use backend::{Backend, Call, MockBackend, Operation};
pub use error::{Error, ErrorCategory, Result};
pub use types::{ClusterList, ClusterRef, OidcConfig, OidcConfigRequest, Thumbprint};
