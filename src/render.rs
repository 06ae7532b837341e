//! Turn a reconciled service into the files mksvc writes.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::template::{self, Context};
use crate::unit::Reconciled;

/// Everything the templates consume, with ordering and directive blocks
/// already formatted for verbatim insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitModel {
    pub name: String,
    pub label: String,
    /// Service root directory.
    pub path: String,
    pub after: String,
    pub requires: String,
    pub defaults: String,
    pub custom: String,
    pub reconciled: Reconciled,
}

impl UnitModel {
    pub fn new(reconciled: Reconciled) -> Self {
        let target = &reconciled.target;
        Self {
            name: target.name().to_string(),
            label: target.identity.label().to_string(),
            path: target.path.clone(),
            after: reconciled.ordering.after_line(),
            requires: reconciled.ordering.requires_line(),
            defaults: reconciled.defaults_block(),
            custom: reconciled.custom_block(),
            reconciled,
        }
    }

    /// The directive variables plus the formatted blocks and install prefix.
    pub fn context(&self, install_prefix: &str) -> Context {
        let mut ctx = self.reconciled.target.context();
        ctx.text("label", &self.label)
            .text("after", &self.after)
            .text("requires", &self.requires)
            .text("defaults", &self.defaults)
            .text("custom", &self.custom)
            .text("install_prefix", install_prefix);
        ctx
    }
}

/// A rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
    pub mode: u32,
}

/// Which template produces which file.
struct ArtifactSpec {
    file: fn(&str) -> String,
    source: &'static str,
    mode: u32,
}

const ARTIFACTS: &[ArtifactSpec] = &[
    ArtifactSpec {
        file: unit_file,
        source: template::SERVICE,
        mode: 0o644,
    },
    ArtifactSpec {
        file: sysusers_file,
        source: template::SYSUSERS,
        mode: 0o644,
    },
    ArtifactSpec {
        file: logrotate_file,
        source: template::LOGROTATE,
        mode: 0o644,
    },
    ArtifactSpec {
        file: setup_file,
        source: template::SETUP,
        mode: 0o755,
    },
    ArtifactSpec {
        file: uninstall_file,
        source: template::UNINSTALL,
        mode: 0o755,
    },
];

fn unit_file(name: &str) -> String {
    format!("{}.service", name)
}

fn sysusers_file(name: &str) -> String {
    format!("{}.conf", name)
}

fn logrotate_file(name: &str) -> String {
    format!("{}_logs.conf", name)
}

fn setup_file(_: &str) -> String {
    "setup.sh".to_string()
}

fn uninstall_file(_: &str) -> String {
    "uninstall.sh".to_string()
}

/// Render every artifact into `conf_dir`.
pub fn render_artifacts(
    model: &UnitModel,
    conf_dir: &Path,
    install_prefix: &str,
) -> Result<Vec<Artifact>> {
    let ctx = model.context(install_prefix);

    ARTIFACTS
        .iter()
        .map(|spec| -> Result<Artifact> {
            let file = (spec.file)(&model.name);
            let contents = template::render(spec.source, &ctx)
                .with_context(|| format!("rendering {}", file))?;
            Ok(Artifact {
                path: conf_dir.join(file),
                contents,
                mode: spec.mode,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FeatureFlags;
    use crate::identity::ServiceIdentity;
    use crate::unit::{ManagedKeys, Reconciler, UnitTarget};

    fn target(flags: FeatureFlags) -> UnitTarget {
        UnitTarget::new(ServiceIdentity::new("demo"), "/opt/demo/", flags)
    }

    fn model(flags: FeatureFlags) -> UnitModel {
        let registry = ManagedKeys::service().unwrap();
        let reconciled = Reconciler::new(&registry)
            .reconcile_content(target(flags), None)
            .unwrap();
        UnitModel::new(reconciled)
    }

    fn service(flags: FeatureFlags) -> String {
        let artifacts = render_artifacts(&model(flags), Path::new("conf"), "/etc").unwrap();
        artifacts[0].contents.clone()
    }

    #[test]
    fn test_all_templates_render() {
        let artifacts =
            render_artifacts(&model(FeatureFlags::default()), Path::new("conf"), "/etc").unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("conf/demo.service"),
                PathBuf::from("conf/demo.conf"),
                PathBuf::from("conf/demo_logs.conf"),
                PathBuf::from("conf/setup.sh"),
                PathBuf::from("conf/uninstall.sh"),
            ]
        );
        assert_eq!(artifacts[3].mode, 0o755);
        assert!(artifacts[3].contents.contains("install -Dm644 demo.service /etc/systemd/system/demo.service"));
        assert!(artifacts[2].contents.starts_with("/opt/demo/logs/*.log {"));
    }

    #[test]
    fn test_root_install_prefix() {
        let artifacts =
            render_artifacts(&model(FeatureFlags::default()), Path::new("conf"), "").unwrap();
        let setup = &artifacts[3].contents;
        assert!(setup.contains("install -Dm644 demo.service /systemd/system/demo.service"));
        assert!(setup.contains("systemd-sysusers /sysusers.d/demo.conf"));
        assert!(!setup.contains("//"));
        assert!(!artifacts[4].contents.contains("//"));
    }

    #[test]
    fn test_default_service_unit() {
        let unit = service(FeatureFlags::default());
        assert!(unit.contains("Description=Demo\n"));
        assert!(unit.contains("After=network-online.target\n"));
        assert!(unit.contains("Requires=network-online.target\n"));
        assert!(unit.contains("ExecStart=/opt/demo/demo\n"));
        assert!(unit.contains("RestrictAddressFamilies=AF_UNIX AF_INET AF_INET6 AF_NETLINK\n"));
        assert!(unit.contains("LimitNOFILE=65536\n"));
        assert!(unit.contains("MemoryDenyWriteExecute=yes\n"));
        assert!(unit.contains("ReadWritePaths=/opt/demo/logs\n"));
        assert!(!unit.contains("PrivateNetwork"));
        assert!(!unit.contains("# Custom directives"));
        assert!(!unit.contains("CPUQuota"));
    }

    #[test]
    fn test_offline_service_unit() {
        let unit = service(FeatureFlags {
            network: false,
            devices: true,
            cpu_quota: Some("50%".to_string()),
            ..FeatureFlags::default()
        });
        assert!(unit.contains("After=local-fs.target\n"));
        assert!(!unit.contains("Requires="));
        assert!(unit.contains("PrivateNetwork=yes\n"));
        assert!(unit.contains("DevicePolicy=closed\n"));
        assert!(unit.contains("CPUQuota=50%\n"));
        assert!(unit.contains("# Custom directives"));
        assert!(unit.contains("DeviceAllow=char-usb rwm\nDeviceAllow=char-tty rwm\n"));
    }

    #[test]
    fn test_rendered_unit_is_fully_managed() {
        // Every [Service] directive the template emits must classify as managed,
        // otherwise regeneration would copy it into the custom block.
        let registry = ManagedKeys::service().unwrap();
        for flags in [
            FeatureFlags::default(),
            FeatureFlags {
                network: false,
                exec_memory: true,
                writable_files: true,
                runtime_dir: true,
                subprocess: true,
                private_users: true,
                separate_log_dir: false,
                memory_max: Some("1G".to_string()),
                env_file: Some("/etc/demo.env".to_string()),
                ..FeatureFlags::default()
            },
            FeatureFlags {
                privileged_ports: true,
                localhost_only: true,
                ..FeatureFlags::default()
            },
        ] {
            let unit = service(flags.clone());
            let mut rendered = target(flags);
            rendered.flags.normalize();
            let managed = registry.resolve(&rendered).unwrap();
            let mut defaults = crate::unit::baseline::default_limits();
            let preserved = crate::unit::parser::classify(&unit, &managed, &mut defaults);
            assert!(preserved.custom.is_empty(), "{:?}", preserved.custom);
            assert_eq!(defaults.len(), 5);
        }
    }
}
