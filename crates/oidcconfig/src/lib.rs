//! # oidcconfig
//!
//! Lifecycle management of OIDC configs on the `clusters_mgmt` API.
//!
//! - [`validate`]: managed/unmanaged attribute rules, checked before any call
//! - [`create`]: create → thumbprint → read back, with incomplete creations
//!   recorded instead of lost
//! - [`guard`]: delete only after a search finds no cluster using the config
//! - [`project`]: pure mapping of remote data onto [`OidcConfigState`]
//! - [`Reconciler`]: the entry points tying these together
//!
//! ## Example
//!
//! ```
//! use clustersmgmt::MockBackend;
//! use oidcconfig::{Intent, Reconciler};
//!
//! let backend = MockBackend::new()
//!     .with_next_id("abc")
//!     .with_thumbprint("https://oidc.mock.invalid/abc", "9e99");
//! let reconciler = Reconciler::new(backend);
//!
//! let state = reconciler.create(&Intent::managed())?.into_result()?;
//! assert_eq!(state.oidc_endpoint_url.as_deref(), Some("oidc.mock.invalid/abc"));
//! # Ok::<(), oidcconfig::Error>(())
//! ```

pub mod create;
pub mod error;
pub mod guard;
pub mod project;
pub mod reconciler;
pub mod state;
pub mod validate;

pub use create::CreateOutcome;
pub use error::{Error, Result, Step, ValidationError};
pub use project::{endpoint_url, project};
pub use reconciler::Reconciler;
pub use state::OidcConfigState;
pub use validate::{Intent, ValidIntent, attr};
