//! Generate command - reconciles the unit file and writes all artifacts.

use anyhow::{bail, Result};
use log::warn;
use std::io;

use crate::common::write_file_atomic;
use crate::config::Config;
use crate::flags::FlagOverrides;
use crate::identity::ServiceIdentity;
use crate::render::{self, Artifact, UnitModel};
use crate::settings::ServiceSettings;
use crate::unit::parser::read_existing;
use crate::unit::{ManagedKeys, Reconciled, Reconciler, UnitTarget};
use crate::wizard::Wizard;

/// Inputs to one generate run.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Service name; falls back to the saved settings.
    pub name: Option<String>,
    /// Service root directory; falls back to the saved settings.
    pub path: Option<String>,
    pub interactive: bool,
    pub dry_run: bool,
    pub overrides: FlagOverrides,
}

/// Result of planning a run, before anything is written.
pub struct Plan {
    pub settings: ServiceSettings,
    pub model: UnitModel,
    pub artifacts: Vec<Artifact>,
}

impl Plan {
    fn reconciled(&self) -> &Reconciled {
        &self.model.reconciled
    }

    /// Print the dry-run summary.
    pub fn print_summary(&self, config: &Config) {
        let flags = &self.reconciled().target.flags;

        println!("Dry run - no files written.");
        println!();
        println!("Configuration:");
        println!("  Name:             {}", self.model.name);
        println!("  Path:             {}", self.model.path);
        println!();
        println!("Core Options:");
        println!("  Network:          {}", flags.network);
        println!("  Listening:        {}", flags.listening);
        println!("  PrivilegedPorts:  {}", flags.privileged_ports);
        println!("  ExecMemory:       {}", flags.exec_memory);
        println!("  WritableFiles:    {}", flags.writable_files);
        println!("  RuntimeDir:       {}", flags.runtime_dir);
        println!("  Devices:          {}", flags.devices);
        println!("  FullDevices:      {}", flags.full_devices);
        println!("  Subprocess:       {}", flags.subprocess);
        println!("  SeparateLogDir:   {}", flags.separate_log_dir);
        println!();
        println!("Advanced Security:");
        println!("  LocalhostOnly:    {}", flags.localhost_only);
        println!("  PrivateUsers:     {}", flags.private_users);
        println!();
        println!("Resource Limits:");
        println!("  CPUQuota:         {}", flags.cpu_quota.as_deref().unwrap_or("none"));
        println!("  MemoryMax:        {}", flags.memory_max.as_deref().unwrap_or("none"));
        if let Some(env_file) = &flags.env_file {
            println!("  EnvFile:          {}", env_file);
        }
        println!();
        println!("Ordering:");
        println!("  After:            {}", self.model.after);
        println!("  Requires:         {}", none_if_empty(&self.model.requires));
        println!();
        println!("Would generate:");
        for artifact in &self.artifacts {
            println!("  {}", artifact.path.display());
        }
        println!("  {}", config.settings_path().display());
    }
}

fn none_if_empty(s: &str) -> &str {
    if s.is_empty() {
        "none"
    } else {
        s
    }
}

/// Resolve settings, reconcile against the existing unit and render everything.
pub fn plan(config: &Config, request: &GenerateRequest) -> Result<Plan> {
    let settings_path = config.settings_path();
    let saved = match ServiceSettings::load(&settings_path) {
        Ok(saved) => saved,
        Err(e) => {
            warn!("Could not load settings: {:#}", e);
            None
        }
    };
    if saved.is_some() {
        println!("Loaded existing configuration from {}", settings_path.display());
    }

    let name = request
        .name
        .clone()
        .or_else(|| saved.as_ref().map(|s| s.name.clone()))
        .filter(|n| !n.trim().is_empty());
    let path = request
        .path
        .clone()
        .or_else(|| saved.as_ref().map(|s| s.path.clone()))
        .filter(|p| !p.trim().is_empty());
    let (Some(name), Some(path)) = (name, path) else {
        bail!("Usage: mksvc <name> <path> [options]\nRun 'mksvc --help' for detailed help.");
    };

    let identity = ServiceIdentity::new(&name);
    let previous = saved.as_ref().map(ServiceSettings::target);
    let mut flags = saved.map(|s| s.flags).unwrap_or_default();
    request.overrides.apply(&mut flags);

    if request.interactive {
        let stdin = io::stdin();
        Wizard::new(stdin.lock(), io::stdout()).run(&mut flags)?;
    }

    let target = UnitTarget::new(identity, &path, flags);
    let reconciled = reconcile(config, target, previous)?;
    if !reconciled.custom.is_empty() {
        println!(
            "Preserved {} custom configuration keys.",
            reconciled.custom.len()
        );
    }

    let settings = ServiceSettings {
        name: reconciled.target.name().to_string(),
        path,
        flags: reconciled.target.flags.clone(),
    };
    let model = UnitModel::new(reconciled);
    let artifacts = render::render_artifacts(&model, &config.conf_dir, &config.install_prefix)?;

    Ok(Plan {
        settings,
        model,
        artifacts,
    })
}

/// Reconcile against the previously generated unit.
///
/// An unreadable unit file is not fatal: losing custom directives is better
/// than refusing to generate the service at all.
fn reconcile(
    config: &Config,
    target: UnitTarget,
    previous: Option<UnitTarget>,
) -> Result<Reconciled> {
    let registry = ManagedKeys::service()?;
    let mut reconciler = Reconciler::new(&registry);
    if let Some(previous) = previous {
        reconciler = reconciler.with_previous(previous);
    }

    let unit_path = config.unit_path(target.name());
    let existing = match read_existing(&unit_path) {
        Ok(existing) => existing,
        Err(e) => {
            warn!("Could not read existing service file: {:#}", e);
            None
        }
    };
    reconciler.reconcile_content(target, existing.as_deref())
}

/// Execute the generate command.
pub fn cmd_generate(config: &Config, request: GenerateRequest) -> Result<()> {
    let plan = plan(config, &request)?;

    if request.dry_run {
        plan.print_summary(config);
        return Ok(());
    }

    println!("Writing configs...");
    for artifact in &plan.artifacts {
        write_file_atomic(&artifact.path, &artifact.contents, artifact.mode)?;
        println!("  {}", artifact.path.display());
    }
    plan.settings.save(&config.settings_path())?;
    println!("  {}", config.settings_path().display());

    println!(
        "Done. Run 'sudo bash {}' to install.",
        config.conf_dir.join("setup.sh").display()
    );
    Ok(())
}
