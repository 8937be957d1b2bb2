//! Command handlers for CLI operations
//!
//! Handlers run against an already connected [`Cache`](crate::cache::Cache)
//! and return a [`CommandOutput`] instead of printing, so they can be driven
//! from tests.

pub mod keys;
pub mod lock;

pub use keys::KeyCommandHandler;
pub use lock::LockCommandHandler;

/// What a command wants printed and whether it succeeded
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Lines for stdout
    pub lines: Vec<String>,
    /// Maps to the process exit status
    pub success: bool,
}

impl CommandOutput {
    pub fn ok(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            success: true,
        }
    }

    pub fn silent(success: bool) -> Self {
        Self {
            lines: Vec::new(),
            success,
        }
    }

    pub fn failed(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            success: false,
        }
    }
}
