//! Shared test utilities for mksvc tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use mksvc::config::Config;
use mksvc::flags::FeatureFlags;
use mksvc::identity::ServiceIdentity;
use mksvc::unit::{ManagedKeys, Reconciled, Reconciler, UnitTarget};

/// Test environment with a temporary conf directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Generated files land here
    pub conf_dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with temporary directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let conf_dir = temp_dir.path().join("conf");

        Self {
            _temp_dir: temp_dir,
            conf_dir,
        }
    }

    pub fn config(&self) -> Config {
        Config::with_conf_dir(&self.conf_dir)
    }

    pub fn read(&self, file: &str) -> String {
        let path = self.conf_dir.join(file);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    pub fn write(&self, file: &str, content: &str) {
        fs::create_dir_all(&self.conf_dir).expect("Failed to create conf dir");
        fs::write(self.conf_dir.join(file), content).expect("Failed to write file");
    }
}

/// Service root used by the in-memory tests.
pub const SERVICE_ROOT: &str = "/opt/app";

pub fn target(name: &str, flags: FeatureFlags) -> UnitTarget {
    UnitTarget::new(ServiceIdentity::new(name), SERVICE_ROOT, flags)
}

/// Reconcile `existing` unit text with the built-in registry.
pub fn reconcile(name: &str, flags: FeatureFlags, existing: Option<&str>) -> Reconciled {
    let registry = ManagedKeys::service().expect("service template registry");
    Reconciler::new(&registry)
        .reconcile_content(target(name, flags), existing)
        .expect("reconcile")
}

/// Like [`reconcile`], for a unit last generated with `previous` flags.
pub fn reconcile_from(
    name: &str,
    previous: FeatureFlags,
    flags: FeatureFlags,
    existing: Option<&str>,
) -> Reconciled {
    let registry = ManagedKeys::service().expect("service template registry");
    Reconciler::new(&registry)
        .with_previous(target(name, previous))
        .reconcile_content(target(name, flags), existing)
        .expect("reconcile")
}

/// Assert that a file contains the expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    assert!(
        content.contains(expected),
        "File {} should contain '{}'\n--- content ---\n{}",
        path.display(),
        expected,
        content
    );
}
