//! Adopt an existing OIDC config into state

use anyhow::{Context as _, Result, bail};
use declarative::{Address, Instance};

use super::Session;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let address: Address = address.parse()?;

    let instance = import(&mut session, &address, id)?;
    ui::success(&format!("Imported {address} (id {})", instance.id));
    if !ctx.quiet {
        ui::dim("Declare it in the manifest with matching attributes or the next apply will destroy it");
    }
    Ok(())
}

fn import(session: &mut Session, address: &Address, id: &str) -> Result<Instance> {
    if let Some(existing) = session.state.get(address) {
        bail!("{address} is already managed (id {})", existing.id);
    }

    let resource = session.registry.require(&address.resource_type)?;
    let instance = resource
        .import(id)
        .with_context(|| format!("Failed to import {address} from id {id}"))?;

    session.state.resources.insert(address.clone(), instance.clone());
    session.save()?;
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProvisionerState;
    use clustersmgmt::{MockBackend, OidcConfig};
    use declarative::Lifecycle;
    use std::sync::Arc;
    use tempfile::TempDir;

    const ID: &str = "23f6gk51qi5ng15mm095c90hhajbf7c5";
    const ISSUER_URL: &str = "https://oidc-f3y4.s3.us-east-1.amazonaws.com";
    const THUMBPRINT: &str = "9e99a48a9960b14926bb7f3b02e22da2b0ab7280";

    fn session(dir: &TempDir, mock: &MockBackend) -> Session {
        Session::with_backend(
            dir.path().join("state.toml"),
            ProvisionerState::default(),
            Arc::new(mock.clone()),
        )
    }

    fn existing() -> MockBackend {
        let mock = MockBackend::new().with_thumbprint(ISSUER_URL, THUMBPRINT);
        mock.add_config(OidcConfig {
            id: Some(ID.into()),
            issuer_url: Some(ISSUER_URL.into()),
            managed: false,
            secret_arn: Some(
                "arn:aws:secretsmanager:us-east-1:765374464689:secret:rosa-private-key-oidc-f3y4-fEqj4c"
                    .into(),
            ),
            ..OidcConfig::default()
        });
        mock
    }

    #[test]
    fn test_import_adds_ready_instance() {
        let dir = TempDir::new().unwrap();
        let mock = existing();
        let mut session = session(&dir, &mock);
        let address = Address::new("rosa_oidc_config", "adopted");

        let instance = import(&mut session, &address, ID).unwrap();
        assert_eq!(instance.id, ID);
        assert_eq!(instance.lifecycle, Lifecycle::Ready);
        assert_eq!(instance.str_attr("thumbprint"), Some(THUMBPRINT));

        let saved = ProvisionerState::load(&session.state_path).unwrap();
        assert!(saved.get(&address).is_some());
    }

    #[test]
    fn test_import_refuses_managed_address() {
        let dir = TempDir::new().unwrap();
        let mock = existing();
        let mut session = session(&dir, &mock);
        let address = Address::new("rosa_oidc_config", "adopted");

        import(&mut session, &address, ID).unwrap();
        let err = import(&mut session, &address, ID).unwrap_err();
        assert!(err.to_string().contains("already managed"));
    }

    #[test]
    fn test_import_unknown_id_fails() {
        let dir = TempDir::new().unwrap();
        let mock = existing();
        let mut session = session(&dir, &mock);

        let err = import(&mut session, &Address::new("rosa_oidc_config", "x"), "missing").unwrap_err();
        assert!(err.to_string().contains("Failed to import"));
        assert!(session.state.resources.is_empty());
    }
}
