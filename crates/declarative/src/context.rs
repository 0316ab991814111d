//! Apply context and callback traits
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific UI.

use crate::diff::Action;
use crate::types::{Address, ApplyResult, Instance};
use anyhow::Result;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called before a batch of changes is applied
    fn on_batch_start(&mut self, count: usize);

    /// Called when starting to apply a single change
    fn on_change_start(&mut self, address: &Address, action: &Action);

    /// Called when a change completes
    fn on_change_complete(&mut self, address: &Address, result: &ApplyResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_change_start(&mut self, _address: &Address, _action: &Action) {}
    fn on_change_complete(&mut self, _address: &Address, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Context passed to resource create operations
#[derive(Debug, Default)]
pub struct ApplyContext {
    checkpoint: Option<Instance>,
}

impl ApplyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an instance that exists remotely even if the operation
    /// later fails, so it is kept in state
    pub fn checkpoint(&mut self, instance: Instance) {
        self.checkpoint = Some(instance);
    }

    /// Take the last recorded checkpoint
    pub fn take_checkpoint(&mut self) -> Option<Instance> {
        self.checkpoint.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Lifecycle;

    #[test]
    fn test_checkpoint_is_taken_once() {
        let mut ctx = ApplyContext::new();
        assert!(ctx.take_checkpoint().is_none());

        ctx.checkpoint(Instance::new("test", "abc", Lifecycle::Created));
        let instance = ctx.take_checkpoint().unwrap();
        assert_eq!(instance.id, "abc");
        assert!(ctx.take_checkpoint().is_none());
    }

    #[test]
    fn test_confirm_callbacks() {
        assert!(AutoConfirm.confirm("?").unwrap());
        assert!(!AutoDecline.confirm("?").unwrap());
    }
}
