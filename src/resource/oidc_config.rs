//! `rosa_oidc_config` resource

use anyhow::{Context, Result, anyhow};
use clustersmgmt::Backend;
use declarative::{ApplyContext, Attributes, Instance, Resource, Value};
use oidcconfig::{CreateOutcome, Intent, OidcConfigState, Reconciler, attr};
use std::fmt;
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "rosa_oidc_config";

/// OIDC config resource backed by the clusters_mgmt API
pub struct OidcConfigResource {
    reconciler: Reconciler<Arc<dyn Backend>>,
}

impl OidcConfigResource {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            reconciler: Reconciler::new(backend),
        }
    }
}

impl fmt::Debug for OidcConfigResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcConfigResource").finish_non_exhaustive()
    }
}

/// Stored form of an OIDC config
pub fn to_instance(state: &OidcConfigState) -> Instance {
    let mut instance = Instance::new(RESOURCE_TYPE, &state.id, state.lifecycle);
    let attributes = &mut instance.attributes;

    attributes.insert(attr::MANAGED.into(), Value::from(state.managed));
    let optional = [
        (attr::ISSUER_URL, Some(&state.issuer_url)),
        (attr::SECRET_ARN, state.secret_arn.as_ref()),
        (attr::INSTALLER_ROLE_ARN, state.installer_role_arn.as_ref()),
        (attr::THUMBPRINT, state.thumbprint.as_ref()),
        (attr::OIDC_ENDPOINT_URL, state.oidc_endpoint_url.as_ref()),
    ];
    for (name, value) in optional {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            attributes.insert(name.into(), Value::from(value.as_str()));
        }
    }

    instance
}

/// OIDC config from its stored form
pub fn from_instance(instance: &Instance) -> Result<OidcConfigState> {
    if instance.resource_type != RESOURCE_TYPE {
        return Err(anyhow!(
            "stored instance {} is a {}, not a {RESOURCE_TYPE}",
            instance.id,
            instance.resource_type
        ));
    }
    let string = |name: &str| instance.str_attr(name).map(str::to_string);

    Ok(OidcConfigState {
        id: instance.id.clone(),
        issuer_url: string(attr::ISSUER_URL).unwrap_or_default(),
        managed: instance
            .bool_attr(attr::MANAGED)
            .with_context(|| format!("stored OIDC config {} has no `managed` flag", instance.id))?,
        secret_arn: string(attr::SECRET_ARN),
        installer_role_arn: string(attr::INSTALLER_ROLE_ARN),
        thumbprint: string(attr::THUMBPRINT),
        oidc_endpoint_url: string(attr::OIDC_ENDPOINT_URL),
        lifecycle: instance.lifecycle,
    })
}

/// What to tell the user about an error the API returned
///
/// Core errors that never reached the API (validation, in use) get none.
pub fn advice(err: &oidcconfig::Error) -> Option<String> {
    let category = err.remote_source()?.category();
    let transient = if category.is_retryable() {
        " (transient, running the command again may succeed)"
    } else {
        ""
    };
    Some(format!("{category}{transient}: {}", category.advice()))
}

fn failure(err: oidcconfig::Error) -> anyhow::Error {
    if let Some(advice) = advice(&err) {
        log::warn!("{advice}");
    }
    err.into()
}

impl Resource for OidcConfigResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn validate(&self, declared: &Attributes) -> Result<()> {
        let intent = Intent::from_attributes(declared)?;
        self.reconciler.validate(&intent)?;
        Ok(())
    }

    fn create(&self, declared: &Attributes, ctx: &mut ApplyContext) -> Result<Instance> {
        let intent = Intent::from_attributes(declared)?;
        match self.reconciler.create(&intent).map_err(failure)? {
            CreateOutcome::Ready(state) => Ok(to_instance(&state)),
            CreateOutcome::Incomplete { state, error } => {
                ctx.checkpoint(to_instance(&state));
                Err(failure(error))
            }
        }
    }

    fn read(&self, prior: &Instance) -> Result<Option<Instance>> {
        let prior = from_instance(prior)?;
        let current = self.reconciler.read(&prior).map_err(failure)?;
        Ok(current.as_ref().map(to_instance))
    }

    fn import(&self, id: &str) -> Result<Instance> {
        let state = self.reconciler.import(id).map_err(failure)?;
        Ok(to_instance(&state))
    }

    fn destroy(&self, prior: &Instance) -> Result<()> {
        let mut state = from_instance(prior)?;
        self.reconciler.destroy(&mut state).map_err(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clustersmgmt::{ClusterRef, MockBackend, Operation};
    use declarative::{
        Address, AutoConfirm, ExecuteOptions, ExecutionPlan, Lifecycle, NoProgress, execute,
    };
    use std::collections::BTreeMap;

    const ID: &str = "23f6gk51qi5ng15mm095c90hhajbf7c5";
    const THUMBPRINT: &str = "9e99a48a9960b14926bb7f3b02e22da2b0ab7280";
    const ISSUER_URL: &str = "https://oidc-f3y4.s3.us-east-1.amazonaws.com";
    const SECRET_ARN: &str =
        "arn:aws:secretsmanager:us-east-1:765374464689:secret:rosa-private-key-oidc-f3y4-fEqj4c";
    const INSTALLER_ROLE_ARN: &str = "arn:aws:iam::765374464689:role/terr-account2-Installer-Role";

    fn unmanaged() -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(attr::MANAGED.into(), Value::from(false));
        attributes.insert(attr::SECRET_ARN.into(), Value::from(SECRET_ARN));
        attributes.insert(attr::ISSUER_URL.into(), Value::from(ISSUER_URL));
        attributes.insert(attr::INSTALLER_ROLE_ARN.into(), Value::from(INSTALLER_ROLE_ARN));
        attributes
    }

    fn resource() -> (OidcConfigResource, MockBackend) {
        let mock = MockBackend::new()
            .with_next_id(ID)
            .with_thumbprint(ISSUER_URL, THUMBPRINT);
        (OidcConfigResource::new(Arc::new(mock.clone())), mock)
    }

    #[test]
    fn test_instance_round_trip() {
        let state = OidcConfigState {
            id: ID.into(),
            issuer_url: ISSUER_URL.into(),
            managed: false,
            secret_arn: Some(SECRET_ARN.into()),
            installer_role_arn: Some(INSTALLER_ROLE_ARN.into()),
            thumbprint: Some(THUMBPRINT.into()),
            oidc_endpoint_url: Some("oidc-f3y4.s3.us-east-1.amazonaws.com".into()),
            lifecycle: Lifecycle::Ready,
        };

        let instance = to_instance(&state);
        assert_eq!(instance.id, ID);
        assert_eq!(instance.str_attr(attr::THUMBPRINT), Some(THUMBPRINT));
        assert_eq!(from_instance(&instance).unwrap(), state);
    }

    #[test]
    fn test_validate_rejects_before_remote_calls() {
        let (resource, mock) = resource();
        let mut declared = unmanaged();
        declared.insert(attr::MANAGED.into(), Value::from(true));

        let err = resource.validate(&declared).unwrap_err();
        assert!(err.to_string().contains("should be empty"));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_create_read_destroy() {
        let (resource, mock) = resource();
        let mut ctx = ApplyContext::new();

        let created = resource.create(&unmanaged(), &mut ctx).unwrap();
        assert_eq!(created.lifecycle, Lifecycle::Ready);
        assert_eq!(created.str_attr(attr::INSTALLER_ROLE_ARN), Some(INSTALLER_ROLE_ARN));
        assert!(resource.requires_replace(&unmanaged(), &created).is_empty());

        assert_eq!(resource.read(&created).unwrap(), Some(created.clone()));

        resource.destroy(&created).unwrap();
        assert!(resource.read(&created).unwrap().is_none());
        assert_eq!(mock.count(Operation::DeleteOidcConfig), 1);
    }

    #[test]
    fn test_incomplete_create_is_checkpointed() {
        let mock = MockBackend::new().with_next_id(ID);
        let resource = OidcConfigResource::new(Arc::new(mock));
        let mut ctx = ApplyContext::new();

        let err = resource.create(&unmanaged(), &mut ctx).unwrap_err();
        assert!(err.to_string().contains("thumbprint"));

        let checkpoint = ctx.take_checkpoint().unwrap();
        assert_eq!(checkpoint.id, ID);
        assert_eq!(checkpoint.lifecycle, Lifecycle::Created);
    }

    #[test]
    fn test_destroy_in_use_keeps_state_through_executor() {
        let (resource, mock) = resource();
        let created = resource
            .create(&unmanaged(), &mut ApplyContext::new())
            .unwrap();
        mock.add_cluster(ID, ClusterRef::named("cluster-name"));

        let mut registry = declarative::ResourceRegistry::new();
        registry.register(Box::new(resource));
        let address = Address::new(RESOURCE_TYPE, "main");
        let mut state = BTreeMap::from([(address.clone(), created)]);

        let plan = ExecutionPlan::destroy_all(&registry, &state).unwrap();
        let report = execute(
            plan,
            &registry,
            &ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();
        report.apply_to(&mut state);

        let (_, error) = report.failures().next().unwrap();
        assert!(error.contains("there are clusters using OIDC config"));
        assert!(state.contains_key(&address));
        assert_eq!(mock.count(Operation::DeleteOidcConfig), 0);
    }

    #[test]
    fn test_advice_only_for_api_errors() {
        let unavailable = oidcconfig::Error::DeletionFailed {
            id: ID.into(),
            source: clustersmgmt::Error::http("HTTP 503", Some(503)),
        };
        let text = advice(&unavailable).unwrap();
        assert!(text.starts_with("API server error"));
        assert!(text.contains("transient"));

        let forbidden = oidcconfig::Error::PreconditionCheckFailed {
            id: ID.into(),
            source: clustersmgmt::Error::http("HTTP 403", Some(403)),
        };
        let text = advice(&forbidden).unwrap();
        assert!(text.contains("permissions"));
        assert!(!text.contains("transient"));

        let in_use = oidcconfig::Error::InUse {
            id: ID.into(),
            clusters: vec!["cluster-name".into()],
        };
        assert!(advice(&in_use).is_none());
    }
}
