//! Diff computation for resources

use crate::resource::Resource;
use crate::types::{Address, Attributes, Instance, Lifecycle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// What has to happen to bring one address in line with its declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Declared but not in state
    Create,
    /// Declared and stored, but an immutable attribute changed
    Replace { reasons: Vec<String> },
    /// Declared and stored with no change: read it back
    Refresh,
    /// Stored but no longer declared
    Delete,
}

impl Action {
    /// Whether this action changes remote state
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Refresh)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Replace { .. } => "replace",
            Self::Refresh => "refresh",
            Self::Delete => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace { reasons } if !reasons.is_empty() => {
                write!(f, "replace (forced by {})", reasons.join(", "))
            }
            other => f.write_str(other.verb()),
        }
    }
}

/// Decide the action for one address
///
/// Returns `None` when the address is neither declared nor stored.
pub fn diff_resource(
    resource: &dyn Resource,
    declared: Option<&Attributes>,
    prior: Option<&Instance>,
) -> Option<Action> {
    match (declared, prior) {
        (Some(_), None) => Some(Action::Create),
        (Some(declared), Some(prior)) => {
            let reasons = resource.requires_replace(declared, prior);
            if reasons.is_empty() {
                Some(Action::Refresh)
            } else {
                Some(Action::Replace { reasons })
            }
        }
        (None, Some(_)) => Some(Action::Delete),
        (None, None) => None,
    }
}

/// A planned action for one address, for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    pub address: Address,
    pub action: Action,
    /// Lifecycle of the stored instance, if any
    pub lifecycle: Option<Lifecycle>,
}

impl ResourceDiff {
    /// A stored instance that never finished creation
    pub fn is_incomplete(&self) -> bool {
        self.lifecycle.is_some_and(|l| l.is_incomplete())
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources to replace
    pub replacements: usize,
    /// Number of resources to destroy
    pub removals: usize,
    /// Number of resources only read back
    pub refreshes: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                Action::Create => summary.additions += 1,
                Action::Replace { .. } => summary.replacements += 1,
                Action::Delete => summary.removals += 1,
                Action::Refresh => summary.refreshes += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.replacements + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(diffs: &[ResourceDiff]) -> HashMap<String, Vec<&ResourceDiff>> {
    let mut groups: HashMap<String, Vec<&ResourceDiff>> = HashMap::new();
    for diff in diffs {
        groups
            .entry(diff.address.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApplyContext;
    use crate::types::Value;
    use anyhow::Result;

    #[derive(Debug)]
    struct Fixed;

    impl Resource for Fixed {
        fn resource_type(&self) -> &'static str {
            "fixed"
        }

        fn validate(&self, _declared: &Attributes) -> Result<()> {
            Ok(())
        }

        fn create(&self, _declared: &Attributes, _ctx: &mut ApplyContext) -> Result<Instance> {
            Ok(Instance::new("fixed", "1", Lifecycle::Ready))
        }

        fn read(&self, prior: &Instance) -> Result<Option<Instance>> {
            Ok(Some(prior.clone()))
        }

        fn destroy(&self, _prior: &Instance) -> Result<()> {
            Ok(())
        }
    }

    fn declared(managed: bool) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("managed".into(), Value::from(managed));
        attributes
    }

    fn stored(managed: bool) -> Instance {
        let mut instance = Instance::new("fixed", "1", Lifecycle::Ready);
        instance.attributes = declared(managed);
        instance
    }

    #[test]
    fn test_diff_resource_actions() {
        assert_eq!(diff_resource(&Fixed, Some(&declared(true)), None), Some(Action::Create));
        assert_eq!(
            diff_resource(&Fixed, Some(&declared(true)), Some(&stored(true))),
            Some(Action::Refresh)
        );
        assert_eq!(
            diff_resource(&Fixed, Some(&declared(true)), Some(&stored(false))),
            Some(Action::Replace {
                reasons: vec!["managed".to_string()]
            })
        );
        assert_eq!(diff_resource(&Fixed, None, Some(&stored(true))), Some(Action::Delete));
        assert_eq!(diff_resource(&Fixed, None, None), None);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Create.to_string(), "create");
        assert_eq!(
            Action::Replace {
                reasons: vec!["managed".into(), "issuer_url".into()]
            }
            .to_string(),
            "replace (forced by managed, issuer_url)"
        );
        assert!(!Action::Refresh.is_change());
        assert!(Action::Delete.is_change());
    }

    #[test]
    fn test_diff_summary() {
        let address = Address::new("fixed", "a");
        let diffs = vec![
            ResourceDiff {
                address: address.clone(),
                action: Action::Create,
                lifecycle: None,
            },
            ResourceDiff {
                address: address.clone(),
                action: Action::Refresh,
                lifecycle: Some(Lifecycle::Created),
            },
            ResourceDiff {
                address,
                action: Action::Delete,
                lifecycle: Some(Lifecycle::Ready),
            },
        ];

        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.removals, 1);
        assert_eq!(summary.refreshes, 1);
        assert_eq!(summary.total(), 2);
        assert!(diffs[1].is_incomplete());
        assert_eq!(group_by_type(&diffs)["fixed"].len(), 3);
    }
}
