//! Terminal integration for the declarative engine
//!
//! The engine crate stays UI-agnostic; this module provides:
//! 1. Display - plan and summary rendering
//! 2. Callbacks - spinner progress and confirmation prompts

pub mod callbacks;
pub mod display;

pub use callbacks::{PromptConfirm, SpinnerProgress};
pub use display::{display_plan, print_failures, print_summary};
