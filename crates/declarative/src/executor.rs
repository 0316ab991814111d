//! Execution engine - applies planned changes with parallelism

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::Action;
use crate::planner::{ExecutionPlan, PlannedChange};
use crate::resource::{Resource, ResourceRegistry};
use crate::types::{Address, ApplyResult, Attributes, ExecuteOptions, ExecuteSummary, Instance};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// How stored state changes after one planned change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Keep,
    Set(Instance),
    Remove,
}

/// Outcome of one planned change
#[derive(Debug, Clone)]
pub struct Outcome {
    pub address: Address,
    pub result: ApplyResult,
    pub state: StateChange,
}

/// Everything an execution did, in plan order
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    pub summary: ExecuteSummary,
    pub outcomes: Vec<Outcome>,
}

impl ExecuteReport {
    /// Write the state changes into a stored state map
    pub fn apply_to(&self, state: &mut BTreeMap<Address, Instance>) {
        for outcome in &self.outcomes {
            match &outcome.state {
                StateChange::Keep => {}
                StateChange::Set(instance) => {
                    state.insert(outcome.address.clone(), instance.clone());
                }
                StateChange::Remove => {
                    state.remove(&outcome.address);
                }
            }
        }
    }

    /// Error messages of failed changes
    pub fn failures(&self) -> impl Iterator<Item = (&Address, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            ApplyResult::Failed { error } => Some((&o.address, error.as_str())),
            _ => None,
        })
    }
}

/// Execute a plan with the given options and callbacks
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `registry` - Handlers for every resource type in the plan
/// * `opts` - Execution options (jobs)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, asked only when the plan changes something
///
/// # Returns
/// The summary plus one outcome per executed change
pub fn execute<P, C>(
    plan: ExecutionPlan,
    registry: &ResourceRegistry,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    if plan.is_empty() {
        return Ok(ExecuteReport::default());
    }

    if plan.has_changes() && !confirm.confirm("Apply changes?")? {
        let outcomes: Vec<_> = plan
            .changes
            .into_iter()
            .map(|change| Outcome {
                address: change.address,
                result: ApplyResult::Skipped {
                    reason: "not confirmed".into(),
                },
                state: StateChange::Keep,
            })
            .collect();
        let summary = ExecuteSummary {
            skipped: outcomes.len(),
            ..Default::default()
        };
        return Ok(ExecuteReport { summary, outcomes });
    }

    let sequential = opts.jobs <= 1
        || plan.changes.len() == 1
        || plan
            .changes
            .iter()
            .filter_map(|c| registry.get(&c.address.resource_type))
            .any(|r| !r.can_parallelize());

    progress.on_batch_start(plan.changes.len());
    let outcomes = if sequential {
        execute_sequential(&plan.changes, registry, progress)
    } else {
        execute_parallel(&plan.changes, registry, opts, progress)?
    };
    progress.on_batch_complete();

    let mut summary = ExecuteSummary::default();
    for outcome in &outcomes {
        summary.add_result(&outcome.result);
    }
    Ok(ExecuteReport { summary, outcomes })
}

fn execute_sequential<P: ProgressCallback>(
    changes: &[PlannedChange],
    registry: &ResourceRegistry,
    progress: &mut P,
) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(changes.len());
    for change in changes {
        progress.on_change_start(&change.address, &change.action);
        let outcome = apply_change(change, registry);
        progress.on_change_complete(&outcome.address, &outcome.result);
        outcomes.push(outcome);
    }
    outcomes
}

/// Execute changes in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    changes: &[PlannedChange],
    registry: &ResourceRegistry,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<Vec<Outcome>> {
    // The progress callback is not thread-safe, so results are reported
    // after the batch finishes.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {e}"))?;

    let outcomes: Vec<Outcome> = pool.install(|| {
        changes
            .par_iter()
            .map(|change| apply_change(change, registry))
            .collect()
    });

    for outcome in &outcomes {
        progress.on_change_complete(&outcome.address, &outcome.result);
    }

    Ok(outcomes)
}

fn failed(address: &Address, err: &anyhow::Error, state: StateChange) -> Outcome {
    log::debug!("{address}: {err:#}");
    Outcome {
        address: address.clone(),
        result: ApplyResult::Failed {
            error: format!("{err:#}"),
        },
        state,
    }
}

/// Apply a single planned change
fn apply_change(change: &PlannedChange, registry: &ResourceRegistry) -> Outcome {
    let address = &change.address;
    let resource = match registry.require(&address.resource_type) {
        Ok(resource) => resource,
        Err(e) => return failed(address, &e, StateChange::Keep),
    };
    let empty = Attributes::new();
    let declared = change.declared.as_ref().unwrap_or(&empty);

    match (&change.action, change.prior.as_ref()) {
        (Action::Create, _) => create(
            resource,
            address,
            declared,
            ApplyResult::Created,
            StateChange::Keep,
        ),
        (Action::Replace { .. }, Some(prior)) => {
            if let Err(e) = resource.destroy(prior) {
                return failed(address, &e, StateChange::Keep);
            }
            log::info!("{address}: destroyed {} for replacement", prior.id);
            create(
                resource,
                address,
                declared,
                ApplyResult::Replaced,
                StateChange::Remove,
            )
        }
        (Action::Refresh, Some(prior)) => refresh(resource, address, prior),
        (Action::Delete, Some(prior)) => match resource.destroy(prior) {
            Ok(()) => Outcome {
                address: address.clone(),
                result: ApplyResult::Removed,
                state: StateChange::Remove,
            },
            Err(e) => failed(address, &e, StateChange::Keep),
        },
        (action, None) => failed(
            address,
            &anyhow::anyhow!("cannot {} without a stored instance", action.verb()),
            StateChange::Keep,
        ),
    }
}

/// Create an instance; on failure keep whatever the resource checkpointed,
/// otherwise fall back to `on_failure`
fn create(
    resource: &dyn Resource,
    address: &Address,
    declared: &Attributes,
    result: ApplyResult,
    on_failure: StateChange,
) -> Outcome {
    let mut ctx = ApplyContext::new();
    match resource.create(declared, &mut ctx) {
        Ok(instance) => Outcome {
            address: address.clone(),
            result,
            state: StateChange::Set(instance),
        },
        Err(e) => {
            let state = match ctx.take_checkpoint() {
                Some(instance) => {
                    log::warn!(
                        "{address}: {} exists remotely but creation did not finish",
                        instance.id
                    );
                    StateChange::Set(instance)
                }
                None => on_failure,
            };
            failed(address, &e, state)
        }
    }
}

fn refresh(resource: &dyn Resource, address: &Address, prior: &Instance) -> Outcome {
    match resource.read(prior) {
        Ok(Some(instance)) if instance == *prior => Outcome {
            address: address.clone(),
            result: ApplyResult::NoChange,
            state: StateChange::Keep,
        },
        Ok(Some(instance)) => Outcome {
            address: address.clone(),
            result: ApplyResult::Refreshed,
            state: StateChange::Set(instance),
        },
        Ok(None) => {
            log::warn!("{address}: {} no longer exists, removing it from state", prior.id);
            Outcome {
                address: address.clone(),
                result: ApplyResult::Removed,
                state: StateChange::Remove,
            }
        }
        Err(e) => failed(address, &e, StateChange::Keep),
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(
    plan: ExecutionPlan,
    registry: &ResourceRegistry,
    opts: &ExecuteOptions,
) -> Result<ExecuteReport> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, registry, opts, &mut NoProgress, &mut AutoConfirm)
}
