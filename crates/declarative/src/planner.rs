//! Execution planner - builds resource execution plans

use crate::diff::{Action, ResourceDiff, diff_resource};
use crate::resource::ResourceRegistry;
use crate::types::{Address, Attributes, Declaration, Instance};
use anyhow::{Context, Result, bail};
use std::collections::{BTreeMap, HashSet};

/// One planned action with the data needed to execute it
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub address: Address,
    pub action: Action,
    /// Declared attributes (absent for deletions)
    pub declared: Option<Attributes>,
    /// Stored instance (absent for creations)
    pub prior: Option<Instance>,
}

impl PlannedChange {
    pub fn diff(&self) -> ResourceDiff {
        ResourceDiff {
            address: self.address.clone(),
            action: self.action.clone(),
            lifecycle: self.prior.as_ref().map(|p| p.lifecycle),
        }
    }
}

/// An execution plan: one change per address
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub changes: Vec<PlannedChange>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan the changes that make `state` match `declarations`
    ///
    /// Every declaration is validated here, before anything talks to a
    /// remote service; the first invalid declaration fails the whole plan.
    pub fn build(
        registry: &ResourceRegistry,
        declarations: &[Declaration],
        state: &BTreeMap<Address, Instance>,
    ) -> Result<Self> {
        let mut plan = Self::new();
        let mut declared = HashSet::new();

        for declaration in declarations {
            let address = &declaration.address;
            if !declared.insert(address.clone()) {
                bail!("{address} is declared more than once");
            }

            let resource = registry.require(&address.resource_type)?;
            resource
                .validate(&declaration.attributes)
                .with_context(|| format!("Invalid {address}"))?;

            let prior = state.get(address);
            if let Some(action) = diff_resource(resource, Some(&declaration.attributes), prior) {
                plan.changes.push(PlannedChange {
                    address: address.clone(),
                    action,
                    declared: Some(declaration.attributes.clone()),
                    prior: prior.cloned(),
                });
            }
        }

        for (address, instance) in state {
            if declared.contains(address) {
                continue;
            }
            registry.require(&address.resource_type)?;
            plan.changes.push(PlannedChange {
                address: address.clone(),
                action: Action::Delete,
                declared: None,
                prior: Some(instance.clone()),
            });
        }

        Ok(plan)
    }

    /// Plan the destruction of every stored instance
    pub fn destroy_all(registry: &ResourceRegistry, state: &BTreeMap<Address, Instance>) -> Result<Self> {
        Self::for_state(registry, state, || Action::Delete)
    }

    /// Plan a read-back of every stored instance
    pub fn refresh_all(registry: &ResourceRegistry, state: &BTreeMap<Address, Instance>) -> Result<Self> {
        Self::for_state(registry, state, || Action::Refresh)
    }

    fn for_state(
        registry: &ResourceRegistry,
        state: &BTreeMap<Address, Instance>,
        action: impl Fn() -> Action,
    ) -> Result<Self> {
        let mut plan = Self::new();
        for (address, instance) in state {
            registry.require(&address.resource_type)?;
            plan.changes.push(PlannedChange {
                address: address.clone(),
                action: action(),
                declared: None,
                prior: Some(instance.clone()),
            });
        }
        Ok(plan)
    }

    /// Filter plan to only include changes matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&PlannedChange) -> bool,
    {
        Self {
            changes: self.changes.into_iter().filter(|c| predicate(c)).collect(),
        }
    }

    /// Filter plan to only include addresses matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|c| matches_filter(&c.address, resource_type.as_deref(), name.as_deref()))
            }
        }
    }

    /// Diffs of all planned changes
    pub fn diffs(&self) -> Vec<ResourceDiff> {
        self.changes.iter().map(PlannedChange::diff).collect()
    }

    /// Total number of planned entries
    pub fn total_resources(&self) -> usize {
        self.changes.len()
    }

    /// Number of entries that change remote state
    pub fn change_count(&self) -> usize {
        self.changes.iter().filter(|c| c.action.is_change()).count()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Check if plan changes remote state
    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = target.split('.').collect();
    match parts.len() {
        1 => (Some(parts[0].to_string()), None),
        2 => (Some(parts[0].to_string()), Some(parts[1].to_string())),
        _ => (None, Some(target.to_string())),
    }
}

/// Check if an address matches the filter criteria
fn matches_filter(address: &Address, resource_type: Option<&str>, name: Option<&str>) -> bool {
    if let Some(rt) = resource_type
        && address.resource_type != rt
    {
        return false;
    }

    if let Some(n) = name
        && address.name != n
    {
        return false;
    }

    true
}
