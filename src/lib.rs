//! mksvc library exports.
//!
//! The binary is a thin clap front end; everything it does is reachable from
//! here so integration tests can drive whole generate runs.

pub mod commands;
pub mod common;
pub mod config;
pub mod flags;
pub mod identity;
pub mod render;
pub mod settings;
pub mod template;
pub mod unit;
pub mod wizard;
