//! Progress and confirmation callbacks backed by the terminal

use anyhow::Result;
use colored::Colorize;
use declarative::{Action, Address, ApplyResult, ConfirmCallback, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner showing the change being applied, with one line per result
pub struct SpinnerProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl SpinnerProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

fn result_symbol(result: &ApplyResult) -> colored::ColoredString {
    match result {
        ApplyResult::NoChange => "○".dimmed(),
        ApplyResult::Created | ApplyResult::Replaced | ApplyResult::Refreshed => "✓".green(),
        ApplyResult::Removed => "✓".red(),
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".yellow(),
    }
}

fn result_text(result: &ApplyResult) -> &str {
    match result {
        ApplyResult::NoChange => "up to date",
        ApplyResult::Created => "created",
        ApplyResult::Replaced => "replaced",
        ApplyResult::Refreshed => "refreshed",
        ApplyResult::Removed => "removed",
        ApplyResult::Failed { .. } => "failed",
        ApplyResult::Skipped { reason } => reason,
    }
}

impl ProgressCallback for SpinnerProgress {
    fn on_batch_start(&mut self, count: usize) {
        if self.quiet {
            return;
        }
        println!();
        println!("  {} Applying {} resources...", "→".cyan(), count);

        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn on_change_start(&mut self, address: &Address, action: &Action) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("{} {}", action.verb(), address));
        }
    }

    fn on_change_complete(&mut self, address: &Address, result: &ApplyResult) {
        if !self.quiet {
            self.println(format!(
                "    {} {} {}",
                result_symbol(result),
                address,
                result_text(result).dimmed()
            ));
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Confirmation prompt, skipped with `--yes`
pub struct PromptConfirm {
    pub yes: bool,
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;

        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_skips_prompt() {
        assert!(PromptConfirm { yes: true }.confirm("Apply changes?").unwrap());
    }

    #[test]
    fn test_result_text() {
        assert_eq!(result_text(&ApplyResult::Created), "created");
        assert_eq!(
            result_text(&ApplyResult::Skipped {
                reason: "not confirmed".into()
            }),
            "not confirmed"
        );
    }

    #[test]
    fn test_quiet_progress_has_no_bar() {
        let mut progress = SpinnerProgress::new(true);
        progress.on_batch_start(2);
        assert!(progress.bar.is_none());
        progress.on_change_complete(&Address::new("t", "a"), &ApplyResult::NoChange);
        progress.on_batch_complete();
    }
}
