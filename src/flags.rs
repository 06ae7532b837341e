//! Feature flags describing what a service needs.
//!
//! Each flag maps to one or more hardening directives in the service
//! template. Some flags only make sense with a prerequisite enabled
//! (`listening` needs `network`, `full_devices` needs `devices`);
//! [`FeatureFlags::normalize`] enforces that.

use serde::{Deserialize, Serialize};

/// Merged flag state for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub network: bool,
    pub listening: bool,
    pub privileged_ports: bool,
    pub exec_memory: bool,
    pub writable_files: bool,
    pub runtime_dir: bool,
    pub devices: bool,
    pub full_devices: bool,
    pub subprocess: bool,
    pub separate_log_dir: bool,
    pub localhost_only: bool,
    pub private_users: bool,

    /// `CPUQuota=` value, e.g. `200%`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_quota: Option<String>,
    /// `MemoryMax=` value, e.g. `2G`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            network: true,
            listening: true,
            privileged_ports: false,
            exec_memory: false,
            writable_files: false,
            runtime_dir: false,
            devices: false,
            full_devices: false,
            subprocess: false,
            separate_log_dir: true,
            localhost_only: false,
            private_users: false,
            cpu_quota: None,
            memory_max: None,
            env_file: None,
        }
    }
}

impl FeatureFlags {
    /// Force dependent flags off when their prerequisite is off.
    pub fn normalize(&mut self) {
        if !self.network {
            self.listening = false;
            self.privileged_ports = false;
            self.localhost_only = false;
        }
        if !self.devices {
            self.full_devices = false;
        }
    }
}

/// Tri-state overrides from the command line, layered onto loaded flags.
///
/// `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub network: Option<bool>,
    pub listening: Option<bool>,
    pub privileged_ports: Option<bool>,
    pub exec_memory: Option<bool>,
    pub writable_files: Option<bool>,
    pub runtime_dir: Option<bool>,
    pub devices: Option<bool>,
    pub full_devices: Option<bool>,
    pub subprocess: Option<bool>,
    pub separate_log_dir: Option<bool>,
    pub localhost_only: Option<bool>,
    pub private_users: Option<bool>,
    pub cpu_quota: Option<String>,
    pub memory_max: Option<String>,
    pub env_file: Option<String>,
}

impl FlagOverrides {
    pub fn apply(&self, flags: &mut FeatureFlags) {
        let toggles = [
            (self.network, &mut flags.network),
            (self.listening, &mut flags.listening),
            (self.privileged_ports, &mut flags.privileged_ports),
            (self.exec_memory, &mut flags.exec_memory),
            (self.writable_files, &mut flags.writable_files),
            (self.runtime_dir, &mut flags.runtime_dir),
            (self.devices, &mut flags.devices),
            (self.full_devices, &mut flags.full_devices),
            (self.subprocess, &mut flags.subprocess),
            (self.separate_log_dir, &mut flags.separate_log_dir),
            (self.localhost_only, &mut flags.localhost_only),
            (self.private_users, &mut flags.private_users),
        ];
        for (value, slot) in toggles {
            if let Some(value) = value {
                *slot = value;
            }
        }

        override_text(&self.cpu_quota, &mut flags.cpu_quota);
        override_text(&self.memory_max, &mut flags.memory_max);
        override_text(&self.env_file, &mut flags.env_file);
    }
}

// Empty strings count as "not given".
fn override_text(value: &Option<String>, slot: &mut Option<String>) {
    if let Some(value) = value.as_deref().map(str::trim) {
        if !value.is_empty() {
            *slot = Some(value.to_string());
        }
    }
}
