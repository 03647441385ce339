//! CLI command implementations.

pub trait Command {
    fn execute(self);
}

pub mod analyze;
pub mod delete;
pub mod resume;
pub mod run;
pub mod sessions;
pub mod show;
pub mod top_moves;

// Shared utilities for commands
pub(crate) mod util;
