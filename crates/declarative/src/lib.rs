//! # Declarative
//!
//! A framework for declarative management of remote resources.
//!
//! Declarations say which resources should exist; stored state records the
//! instances known to exist. The planner compares the two and the executor
//! converges the remote side, reporting how stored state has to change.
//!
//! ## Core Concepts
//!
//! - **Resource**: A handler for one resource type (validate, create, read, destroy)
//! - **Instance**: A stored record of something that exists remotely
//! - **ExecutionPlan**: One action per address (create, replace, refresh, destroy)
//! - **Executor**: Applies a plan with parallelism and reports state changes
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ExecuteOptions, ExecutionPlan, ResourceRegistry, execute_simple};
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(Box::new(Bucket));
//!
//! let plan = ExecutionPlan::build(&registry, &declarations, &state)?;
//! let report = execute_simple(plan, &registry, &ExecuteOptions::default())?;
//! report.apply_to(&mut state);
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback,
};
pub use diff::{Action, DiffSummary, ResourceDiff, diff_resource, group_by_type};
pub use executor::{ExecuteReport, Outcome, StateChange, execute, execute_simple};
pub use planner::{ExecutionPlan, PlannedChange};
pub use resource::{BoxedResource, Resource, ResourceRegistry};
pub use types::{
    Address, AddressError, ApplyResult, Attributes, Declaration, ExecuteOptions, ExecuteSummary,
    Instance, Lifecycle, Value, same_value,
};
