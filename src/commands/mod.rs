//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `generate` - Reconcile and write the service artifacts
//! - `show` - Display configuration

pub mod generate;
pub mod show;

pub use generate::cmd_generate;
pub use show::cmd_show;
