//! Command implementations

pub mod config;
pub mod import;
pub mod lifecycle;
pub mod show;

use crate::Context;
use crate::config::Settings;
use crate::resource;
use crate::state::ProvisionerState;
use anyhow::{Context as _, Result};
use clustersmgmt::{Backend, HttpBackend};
use declarative::ResourceRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// Stored state plus the resource handlers that act on it
pub struct Session {
    pub state_path: PathBuf,
    pub state: ProvisionerState,
    pub registry: ResourceRegistry,
}

impl Session {
    /// Load settings and state, and connect handlers to the API
    pub fn open(ctx: &Context) -> Result<Self> {
        let settings = Settings::load()?;
        let state_path = settings.state_path(ctx.state.as_deref())?;
        let state = ProvisionerState::load(&state_path)?;

        let http = settings.http_config(ctx.url.as_deref(), ctx.token.as_deref());
        log::debug!("Using clusters_mgmt API at {}", http.url);
        let backend: Arc<dyn Backend> =
            Arc::new(HttpBackend::new(http).context("Failed to set up the API client")?);

        Ok(Self::with_backend(state_path, state, backend))
    }

    pub fn with_backend(state_path: PathBuf, state: ProvisionerState, backend: Arc<dyn Backend>) -> Self {
        Self {
            state_path,
            state,
            registry: resource::registry(backend),
        }
    }

    /// Persist the stored state
    pub fn save(&mut self) -> Result<()> {
        self.state.touch(&self.state_path)
    }
}
