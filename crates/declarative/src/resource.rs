//! Resource trait for declarative state management
//!
//! A Resource handles one resource type: it validates declarations and
//! creates, reads and destroys remote instances of that type.

use crate::context::ApplyContext;
use crate::types::{Attributes, Instance, same_value};
use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::fmt;

/// Core trait for declarative resources
///
/// Every resource type in the system implements this trait, which provides:
/// - Validation of declared attributes (before any remote call)
/// - Creation, read/refresh and destruction of instances
/// - Replacement policy for changed declarations
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, Attributes, Instance, Lifecycle, Resource};
///
/// #[derive(Debug)]
/// struct Bucket;
///
/// impl Resource for Bucket {
///     fn resource_type(&self) -> &'static str {
///         "bucket"
///     }
///
///     fn validate(&self, _declared: &Attributes) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     fn create(&self, declared: &Attributes, _ctx: &mut ApplyContext) -> anyhow::Result<Instance> {
///         let mut instance = Instance::new("bucket", "b-1", Lifecycle::Ready);
///         instance.attributes = declared.clone();
///         Ok(instance)
///     }
///
///     fn read(&self, prior: &Instance) -> anyhow::Result<Option<Instance>> {
///         Ok(Some(prior.clone()))
///     }
///
///     fn destroy(&self, _prior: &Instance) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Resource type name, the first part of an address
    fn resource_type(&self) -> &'static str;

    /// Check declared attributes
    ///
    /// Must not make remote calls; the planner runs it for every
    /// declaration before anything is executed.
    fn validate(&self, declared: &Attributes) -> Result<()>;

    /// Create an instance from declared attributes
    ///
    /// If the instance exists remotely before the operation fails, record it
    /// with [`ApplyContext::checkpoint`] so it is kept in state.
    fn create(&self, declared: &Attributes, ctx: &mut ApplyContext) -> Result<Instance>;

    /// Read the current remote representation of an instance
    ///
    /// Returns `None` if the instance no longer exists.
    fn read(&self, prior: &Instance) -> Result<Option<Instance>>;

    /// Build an instance from an existing remote object
    fn import(&self, id: &str) -> Result<Instance> {
        Err(anyhow!(
            "{} does not support import (id {})",
            self.resource_type(),
            id
        ))
    }

    /// Destroy an instance
    fn destroy(&self, prior: &Instance) -> Result<()>;

    /// Names of declared attributes whose change forces a replacement
    ///
    /// Default: every declared attribute that differs from the stored one.
    fn requires_replace(&self, declared: &Attributes, prior: &Instance) -> Vec<String> {
        declared
            .iter()
            .filter(|(name, value)| !same_value(prior.attributes.get(*name), Some(value)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Whether instances of this type can be handled in parallel with others
    fn can_parallelize(&self) -> bool {
        true
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;

/// Resource handlers by type name
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    handlers: BTreeMap<&'static str, BoxedResource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same type
    pub fn register(&mut self, resource: BoxedResource) {
        self.handlers.insert(resource.resource_type(), resource);
    }

    /// Get the handler for a resource type
    pub fn get(&self, resource_type: &str) -> Option<&dyn Resource> {
        self.handlers.get(resource_type).map(|resource| &**resource)
    }

    /// Get the handler for a resource type, or error if none is registered
    pub fn require(&self, resource_type: &str) -> Result<&dyn Resource> {
        self.get(resource_type)
            .ok_or_else(|| anyhow!("unknown resource type '{resource_type}'"))
    }

    /// Registered resource type names
    pub fn types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Lifecycle, Value};

    #[derive(Debug)]
    struct Dummy;

    impl Resource for Dummy {
        fn resource_type(&self) -> &'static str {
            "dummy"
        }

        fn validate(&self, _declared: &Attributes) -> Result<()> {
            Ok(())
        }

        fn create(&self, _declared: &Attributes, _ctx: &mut ApplyContext) -> Result<Instance> {
            Ok(Instance::new("dummy", "1", Lifecycle::Ready))
        }

        fn read(&self, prior: &Instance) -> Result<Option<Instance>> {
            Ok(Some(prior.clone()))
        }

        fn destroy(&self, _prior: &Instance) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_requires_replace_lists_changed_declared_attributes() {
        let mut prior = Instance::new("dummy", "1", Lifecycle::Ready);
        prior.attributes.insert("managed".into(), Value::from(false));
        prior.attributes.insert("issuer_url".into(), Value::from("https://a"));
        prior.attributes.insert("thumbprint".into(), Value::from("abc"));

        let mut declared = Attributes::new();
        declared.insert("managed".into(), Value::from(false));
        declared.insert("issuer_url".into(), Value::from("https://b"));

        assert_eq!(Dummy.requires_replace(&declared, &prior), vec!["issuer_url"]);

        declared.insert("issuer_url".into(), Value::from("https://a"));
        assert!(Dummy.requires_replace(&declared, &prior).is_empty());
    }

    #[test]
    fn test_default_import_is_unsupported() {
        let err = Dummy.import("1").unwrap_err();
        assert!(err.to_string().contains("does not support import"));
    }

    #[test]
    fn test_registry() {
        let mut registry = ResourceRegistry::new();
        registry.register(Box::new(Dummy));

        assert!(registry.get("dummy").is_some());
        assert!(registry.require("other").is_err());
        assert_eq!(registry.types().collect::<Vec<_>>(), vec!["dummy"]);
    }
}
