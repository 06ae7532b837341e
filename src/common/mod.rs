//! Shared utilities across mksvc modules.

pub mod files;

pub use files::write_file_atomic;
