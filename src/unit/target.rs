//! The service a unit file is generated for.

use crate::flags::FeatureFlags;
use crate::identity::ServiceIdentity;
use crate::template::Context;

/// Identity, install root and flags of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTarget {
    pub identity: ServiceIdentity,
    /// Service root directory, without a trailing `/`.
    pub path: String,
    pub flags: FeatureFlags,
}

impl UnitTarget {
    pub fn new(identity: ServiceIdentity, path: &str, flags: FeatureFlags) -> Self {
        Self {
            identity,
            path: path.trim_end_matches('/').to_string(),
            flags,
        }
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Directory the service logs into.
    pub fn log_dir(&self) -> String {
        if self.flags.separate_log_dir {
            format!("{}/logs", self.path)
        } else {
            self.path.clone()
        }
    }

    /// Variables the `[Service]` directive lines are rendered from.
    pub fn context(&self) -> Context {
        let flags = &self.flags;
        let mut ctx = Context::new();
        ctx.text("name", self.name())
            .text("path", &self.path)
            .text("log_dir", self.log_dir())
            .text("cpu_quota", flags.cpu_quota.clone().unwrap_or_default())
            .text("memory_max", flags.memory_max.clone().unwrap_or_default())
            .text("env_file", flags.env_file.clone().unwrap_or_default())
            .flag("network", flags.network)
            .flag("listening", flags.listening)
            .flag("privileged_ports", flags.privileged_ports)
            .flag("exec_memory", flags.exec_memory)
            .flag("writable_files", flags.writable_files)
            .flag("runtime_dir", flags.runtime_dir)
            .flag("devices", flags.devices)
            .flag("full_devices", flags.full_devices)
            .flag("subprocess", flags.subprocess)
            .flag("separate_log_dir", flags.separate_log_dir)
            .flag("localhost_only", flags.localhost_only)
            .flag("private_users", flags.private_users);
        ctx
    }
}
