//! Plan, apply, refresh and destroy

use anyhow::{Result, bail};
use declarative::{
    AutoConfirm, ConfirmCallback, ExecuteOptions, ExecuteReport, ExecutionPlan, ProgressCallback,
    execute,
};

use super::Session;
use crate::Context;
use crate::engine::{PromptConfirm, SpinnerProgress, display_plan, print_failures, print_summary};
use crate::schema::Manifest;
use crate::ui;

/// Options for `apply`
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub target: Option<String>,
    pub dry_run: bool,
    pub yes: bool,
    pub jobs: usize,
}

/// Show what `apply` would do; makes no remote calls
pub fn plan(ctx: &Context, target: Option<&str>) -> Result<()> {
    let session = Session::open(ctx)?;
    let manifest = load_manifest(ctx)?;

    let plan = ExecutionPlan::build(&session.registry, &manifest.declarations, &session.state.resources)?
        .filter_by_target(target);

    ui::header("OIDC Provisioner Plan");
    display_plan(&plan.diffs(), ctx.verbose > 0);
    Ok(())
}

/// Make remote state match the manifest
pub fn apply(ctx: &Context, opts: &ApplyOptions) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let manifest = load_manifest(ctx)?;

    let plan = ExecutionPlan::build(&session.registry, &manifest.declarations, &session.state.resources)?
        .filter_by_target(opts.target.as_deref());

    if !ctx.quiet {
        ui::header("Applying OIDC Configs");
        display_plan(&plan.diffs(), ctx.verbose > 0);
    }

    if opts.dry_run {
        ui::warn("Dry run - no changes will be made");
        return Ok(());
    }

    let report = run(
        &mut session,
        plan,
        &execute_options(opts.jobs),
        &mut SpinnerProgress::new(ctx.quiet),
        &mut PromptConfirm { yes: opts.yes },
    )?;
    finish(ctx, &report)
}

/// Read every stored instance back from the API
pub fn refresh(ctx: &Context, target: Option<&str>) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let plan = ExecutionPlan::refresh_all(&session.registry, &session.state.resources)?
        .filter_by_target(target);

    if plan.is_empty() {
        ui::info("Nothing to refresh");
        return Ok(());
    }

    let report = run(
        &mut session,
        plan,
        &execute_options(1),
        &mut SpinnerProgress::new(ctx.quiet),
        &mut AutoConfirm,
    )?;
    finish(ctx, &report)
}

/// Destroy stored instances, whether declared or not
pub fn destroy(ctx: &Context, target: Option<&str>, yes: bool) -> Result<()> {
    let mut session = Session::open(ctx)?;
    let plan = ExecutionPlan::destroy_all(&session.registry, &session.state.resources)?
        .filter_by_target(target);

    if !ctx.quiet {
        ui::header("Destroying OIDC Configs");
        display_plan(&plan.diffs(), ctx.verbose > 0);
    }

    let report = run(
        &mut session,
        plan,
        &execute_options(1),
        &mut SpinnerProgress::new(ctx.quiet),
        &mut PromptConfirm { yes },
    )?;
    finish(ctx, &report)
}

fn load_manifest(ctx: &Context) -> Result<Manifest> {
    let manifest = Manifest::load(&ctx.manifest)?;
    if manifest.is_empty() {
        ui::warn(&format!("{} declares no resources", ctx.manifest.display()));
    }
    Ok(manifest)
}

fn execute_options(jobs: usize) -> ExecuteOptions {
    ExecuteOptions { jobs }
}

/// Execute a plan and persist the resulting state
///
/// State is saved even when some changes failed, so instances that were
/// created before a later step failed are not forgotten.
fn run<P, C>(
    session: &mut Session,
    plan: ExecutionPlan,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let report = execute(plan, &session.registry, opts, progress, confirm)?;
    if !report.outcomes.is_empty() {
        report.apply_to(&mut session.state.resources);
        session.save()?;
    }
    Ok(report)
}

fn finish(ctx: &Context, report: &ExecuteReport) -> Result<()> {
    if !ctx.quiet && !report.outcomes.is_empty() {
        print_summary(&report.summary);
    }

    if !report.summary.is_success() {
        print_failures(report);
        bail!(
            "{} of {} changes failed",
            report.summary.failed,
            report.summary.total()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProvisionerState;
    use clustersmgmt::{ClusterRef, MockBackend, Operation};
    use declarative::{Address, AutoDecline, Lifecycle, NoProgress};
    use std::sync::Arc;
    use tempfile::TempDir;

    const ID: &str = "23f6gk51qi5ng15mm095c90hhajbf7c5";
    const THUMBPRINT: &str = "9e99a48a9960b14926bb7f3b02e22da2b0ab7280";
    const ISSUER_BASE: &str = "https://d3gt1gce2zmg3d.cloudfront.net";

    const MANIFEST: &str = r#"
[rosa_oidc_config.main]
managed = true
"#;

    fn setup(dir: &TempDir) -> (Session, MockBackend) {
        let mock = MockBackend::new()
            .with_next_id(ID)
            .with_managed_issuer_base(ISSUER_BASE)
            .with_thumbprint(format!("{ISSUER_BASE}/{ID}"), THUMBPRINT);
        let session = Session::with_backend(
            dir.path().join("state.toml"),
            ProvisionerState::default(),
            Arc::new(mock.clone()),
        );
        (session, mock)
    }

    fn apply_manifest(session: &mut Session, content: &str) -> ExecuteReport {
        let manifest = Manifest::parse(content).unwrap();
        let plan =
            ExecutionPlan::build(&session.registry, &manifest.declarations, &session.state.resources)
                .unwrap();
        run(session, plan, &ExecuteOptions::default(), &mut NoProgress, &mut AutoConfirm).unwrap()
    }

    #[test]
    fn test_apply_creates_and_saves_state() {
        let dir = TempDir::new().unwrap();
        let (mut session, mock) = setup(&dir);

        let report = apply_manifest(&mut session, MANIFEST);
        assert_eq!(report.summary.created, 1);
        assert_eq!(mock.count(Operation::CreateOidcConfig), 1);

        let saved = ProvisionerState::load(&session.state_path).unwrap();
        let instance = saved.get(&Address::new("rosa_oidc_config", "main")).unwrap();
        assert_eq!(instance.id, ID);
        assert_eq!(instance.lifecycle, Lifecycle::Ready);
        assert_eq!(instance.str_attr("thumbprint"), Some(THUMBPRINT));
    }

    #[test]
    fn test_second_apply_only_refreshes() {
        let dir = TempDir::new().unwrap();
        let (mut session, mock) = setup(&dir);

        apply_manifest(&mut session, MANIFEST);
        mock.reset_calls();

        let report = apply_manifest(&mut session, MANIFEST);
        assert_eq!(report.summary.no_change, 1);
        assert_eq!(mock.count(Operation::CreateOidcConfig), 0);
    }

    #[test]
    fn test_destroy_in_use_fails_and_keeps_state() {
        let dir = TempDir::new().unwrap();
        let (mut session, mock) = setup(&dir);
        apply_manifest(&mut session, MANIFEST);
        mock.add_cluster(ID, ClusterRef::named("prod-1"));

        let plan = ExecutionPlan::destroy_all(&session.registry, &session.state.resources).unwrap();
        let report = run(
            &mut session,
            plan,
            &ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(report.summary.failed, 1);
        let (_, error) = report.failures().next().unwrap();
        assert!(error.contains("there are clusters using OIDC config"));
        assert_eq!(mock.count(Operation::DeleteOidcConfig), 0);

        let saved = ProvisionerState::load(&session.state_path).unwrap();
        assert_eq!(saved.resources.len(), 1);
        assert!(mock.config(ID).is_some());
    }

    #[test]
    fn test_removed_declaration_destroys_config() {
        let dir = TempDir::new().unwrap();
        let (mut session, mock) = setup(&dir);
        apply_manifest(&mut session, MANIFEST);

        let report = apply_manifest(&mut session, "");
        assert_eq!(report.summary.removed, 1);
        assert!(mock.config(ID).is_none());
        assert!(ProvisionerState::load(&session.state_path).unwrap().resources.is_empty());
    }

    #[test]
    fn test_declined_apply_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut session, mock) = setup(&dir);

        let manifest = Manifest::parse(MANIFEST).unwrap();
        let plan = ExecutionPlan::build(&session.registry, &manifest.declarations, &session.state.resources)
            .unwrap();
        let report = run(
            &mut session,
            plan,
            &ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();

        assert_eq!(report.summary.skipped, 1);
        assert!(mock.calls().is_empty());
        assert!(ProvisionerState::load(&session.state_path).unwrap().resources.is_empty());
    }

    #[test]
    fn test_invalid_manifest_fails_before_remote_calls() {
        let dir = TempDir::new().unwrap();
        let (session, mock) = setup(&dir);

        let manifest = Manifest::parse(
            r#"
[rosa_oidc_config.main]
managed = true
issuer_url = "https://oidc-f3y4.s3.us-east-1.amazonaws.com"
"#,
        )
        .unwrap();
        let err = ExecutionPlan::build(&session.registry, &manifest.declarations, &session.state.resources)
            .unwrap_err();

        assert!(format!("{err:#}").contains("should be empty"));
        assert!(mock.calls().is_empty());
    }
}
