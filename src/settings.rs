//! Persisted service settings (`svc.yml`).
//!
//! The identity and flags are the only state that survives between runs;
//! everything else is recomputed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::common::write_file_atomic;
use crate::flags::FeatureFlags;
use crate::identity::ServiceIdentity;
use crate::unit::UnitTarget;

/// Name, service root and flags of one generated service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(flatten)]
    pub flags: FeatureFlags,
}

impl ServiceSettings {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            flags: FeatureFlags::default(),
        }
    }

    /// Load settings from `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let settings = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(settings))
    }

    /// The target these settings last generated.
    pub fn target(&self) -> UnitTarget {
        UnitTarget::new(ServiceIdentity::new(&self.name), &self.path, self.flags.clone())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("serializing settings")?;
        write_file_atomic(path, yaml, 0o644)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("svc.yml");

        let mut settings = ServiceSettings::new("demo", "/opt/demo");
        settings.flags.devices = true;
        settings.flags.memory_max = Some("512M".to_string());
        settings.save(&path).unwrap();

        let loaded = ServiceSettings::load(&path).unwrap().unwrap();
        assert_eq!(loaded, settings);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("privileged_ports: false"));
        assert!(text.contains("memory_max: 512M"));
        assert!(!text.contains("cpu_quota"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("svc.yml");
        fs::write(&path, "name: demo\npath: /opt/demo\ndevices: true\n").unwrap();

        let loaded = ServiceSettings::load(&path).unwrap().unwrap();
        assert!(loaded.flags.devices);
        assert!(loaded.flags.network);
        assert!(loaded.flags.separate_log_dir);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(ServiceSettings::load(&dir.path().join("svc.yml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("svc.yml");
        fs::write(&path, "network: [unterminated\n").unwrap();
        assert!(ServiceSettings::load(&path).is_err());
    }
}
