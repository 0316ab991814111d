//! Plan and summary display

use colored::Colorize;
use declarative::{Action, DiffSummary, ExecuteReport, ExecuteSummary, ResourceDiff, group_by_type};

fn type_name(resource_type: &str) -> &str {
    match resource_type {
        crate::resource::oidc_config::RESOURCE_TYPE => "OIDC configs (rosa_oidc_config)",
        other => other,
    }
}

/// Display planned changes grouped by resource type
///
/// Refreshes are only listed when `verbose` is set or the stored instance
/// never finished creation.
pub fn display_plan(diffs: &[ResourceDiff], verbose: bool) {
    let summary = DiffSummary::from_diffs(diffs);
    let shown: Vec<_> = diffs
        .iter()
        .filter(|d| d.action.is_change() || verbose || d.is_incomplete())
        .cloned()
        .collect();

    if shown.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");

    let mut groups: Vec<_> = group_by_type(&shown).into_iter().collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    for (resource_type, type_diffs) in groups {
        println!("│ {}", type_name(&resource_type).bold());

        for diff in type_diffs {
            let symbol = match diff.action {
                Action::Create => "+".green(),
                Action::Replace { .. } => "±".yellow(),
                Action::Delete => "-".red(),
                Action::Refresh => "↻".dimmed(),
            };

            let note = if diff.is_incomplete() {
                " (creation did not finish)".yellow().to_string()
            } else {
                String::new()
            };

            println!(
                "│   {} {:<40} {}{}",
                symbol,
                diff.address.to_string(),
                diff.action.to_string().dimmed(),
                note
            );
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Plan: {} to create, {} to replace, {} to destroy",
        summary.additions.to_string().green(),
        summary.replacements.to_string().yellow(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Done", "✓".green().bold());
    } else {
        println!("  {} Finished with errors", "⚠".yellow().bold());
    }

    let lines = [
        (summary.created, "created"),
        (summary.replaced, "replaced"),
        (summary.refreshed, "refreshed"),
        (summary.removed, "removed"),
        (summary.skipped, "skipped"),
    ];
    for (count, what) in lines {
        if count > 0 {
            println!("    • {count} resources {what}");
        }
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

/// Print the error of every failed change
pub fn print_failures(report: &ExecuteReport) {
    for (address, error) in report.failures() {
        crate::ui::error(&format!("{}: {}", address.to_string().bold(), error));
    }
}
