//! Configuration management for mksvc.
//!
//! Reads configuration from environment variables. `main` loads a `.env`
//! file first, so values there act as defaults that the real environment
//! overrides.

use std::env;
use std::path::PathBuf;

/// Default directory for generated files and the settings file.
pub const DEFAULT_CONF_DIR: &str = "conf";
/// Default settings file name inside the conf dir.
pub const DEFAULT_SETTINGS_FILE: &str = "svc.yml";
/// Default root the install script copies artifacts under.
pub const DEFAULT_INSTALL_PREFIX: &str = "/etc";

/// mksvc configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory generated files are written to (default: conf)
    pub conf_dir: PathBuf,
    /// Settings file name inside `conf_dir` (default: svc.yml)
    pub settings_file: String,
    /// Prefix for sysusers.d, logrotate.d and systemd/system in setup.sh
    pub install_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from(DEFAULT_CONF_DIR),
            settings_file: DEFAULT_SETTINGS_FILE.to_string(),
            install_prefix: DEFAULT_INSTALL_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Self {
        let defaults = Self::default();

        let conf_dir = non_empty_var("MKSVC_CONF_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.conf_dir);

        let settings_file = non_empty_var("MKSVC_SETTINGS_FILE").unwrap_or(defaults.settings_file);

        // Templates append `/<dir>`, so `/` itself becomes the empty prefix.
        let install_prefix = non_empty_var("MKSVC_INSTALL_PREFIX")
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or(defaults.install_prefix);

        Self {
            conf_dir,
            settings_file,
            install_prefix,
        }
    }

    /// Config rooted at `conf_dir`, other values default.
    pub fn with_conf_dir(conf_dir: impl Into<PathBuf>) -> Self {
        Self {
            conf_dir: conf_dir.into(),
            ..Self::default()
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.conf_dir.join(&self.settings_file)
    }

    /// Path of the generated unit file for `name`.
    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.conf_dir.join(format!("{}.service", name))
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  MKSVC_CONF_DIR: {}", self.conf_dir.display());
        println!("  MKSVC_SETTINGS_FILE: {}", self.settings_file);
        if self.install_prefix.is_empty() {
            println!("  MKSVC_INSTALL_PREFIX: /");
        } else {
            println!("  MKSVC_INSTALL_PREFIX: {}", self.install_prefix);
        }
        if self.settings_path().exists() {
            println!("  Settings: FOUND ({})", self.settings_path().display());
        } else {
            println!("  Settings: NOT FOUND (first run will create it)");
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        env::remove_var("MKSVC_CONF_DIR");
        env::remove_var("MKSVC_SETTINGS_FILE");
        env::remove_var("MKSVC_INSTALL_PREFIX");
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear();
        assert_eq!(Config::load(), Config::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        clear();
        env::set_var("MKSVC_CONF_DIR", "/tmp/out");
        env::set_var("MKSVC_SETTINGS_FILE", "");
        env::set_var("MKSVC_INSTALL_PREFIX", "/usr/local/etc/");

        let config = Config::load();
        clear();

        assert_eq!(config.conf_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.settings_file, DEFAULT_SETTINGS_FILE);
        assert_eq!(config.install_prefix, "/usr/local/etc");
        assert_eq!(config.unit_path("demo"), PathBuf::from("/tmp/out/demo.service"));
    }

    #[test]
    #[serial]
    fn test_root_install_prefix() {
        clear();
        env::set_var("MKSVC_INSTALL_PREFIX", "/");
        let config = Config::load();
        clear();

        assert_eq!(config.install_prefix, "");
    }
}
