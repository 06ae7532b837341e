//! mksvc - hardened systemd service generator.
//!
//! Generates a sandboxed unit file plus sysusers, logrotate and install
//! scaffolding from a handful of feature flags. Regenerating keeps any
//! directive that was edited by hand.

use anyhow::Result;
use clap::{Args, Parser};

use mksvc::commands::{self, generate::GenerateRequest, show::ShowTarget};
use mksvc::config::Config;
use mksvc::flags::FlagOverrides;

#[derive(Parser)]
#[command(name = "mksvc", version)]
#[command(about = "Hardened systemd service generator")]
#[command(
    after_help = "QUICK START:\n  mksvc myapp /opt/myapp         Generate conf/ for /opt/myapp/myapp\n  mksvc -n                       Preview using conf/svc.yml\n  mksvc -i                       Walk through every option\n  sudo bash conf/setup.sh        Install the generated service\n\nRe-running keeps manual edits to conf/<name>.service."
)]
struct Cli {
    /// Name of the service and executable
    name: Option<String>,

    /// Path to the service root directory
    path: Option<String>,

    /// Enable interactive configuration mode
    #[arg(short, long)]
    interactive: bool,

    /// Preview generated files without writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show configuration and saved settings, then exit
    #[arg(long)]
    show_config: bool,

    /// List the directive keys the generator manages, then exit
    #[arg(long)]
    show_managed: bool,

    #[command(flatten)]
    flags: FlagArgs,
}

/// Negatable feature flags; the last of `--x` / `--no-x` wins.
#[derive(Args)]
struct FlagArgs {
    /// Network access
    #[arg(long, overrides_with = "no_network")]
    network: bool,
    #[arg(long, overrides_with = "network", hide = true)]
    no_network: bool,

    /// Server mode (port binding)
    #[arg(long, overrides_with = "no_listening")]
    listening: bool,
    #[arg(long, overrides_with = "listening", hide = true)]
    no_listening: bool,

    /// Ports below 1024
    #[arg(long, overrides_with = "no_privileged_ports")]
    privileged_ports: bool,
    #[arg(long, overrides_with = "privileged_ports", hide = true)]
    no_privileged_ports: bool,

    /// JIT/executable memory
    #[arg(long, overrides_with = "no_exec_memory")]
    exec_memory: bool,
    #[arg(long, overrides_with = "exec_memory", hide = true)]
    no_exec_memory: bool,

    /// Writable working directory
    #[arg(long = "writable", overrides_with = "no_writable")]
    writable: bool,
    #[arg(long = "no-writable", overrides_with = "writable", hide = true)]
    no_writable: bool,

    /// Runtime directory (/run)
    #[arg(long, overrides_with = "no_runtime_dir")]
    runtime_dir: bool,
    #[arg(long, overrides_with = "runtime_dir", hide = true)]
    no_runtime_dir: bool,

    /// Hardware device access
    #[arg(long, overrides_with = "no_devices")]
    devices: bool,
    #[arg(long, overrides_with = "devices", hide = true)]
    no_devices: bool,

    /// Unrestricted device access
    #[arg(long, overrides_with = "no_full_devices")]
    full_devices: bool,
    #[arg(long, overrides_with = "full_devices", hide = true)]
    no_full_devices: bool,

    /// Shell/subprocess execution
    #[arg(long, overrides_with = "no_subprocess")]
    subprocess: bool,
    #[arg(long, overrides_with = "subprocess", hide = true)]
    no_subprocess: bool,

    /// Separate logs subdirectory
    #[arg(long = "log-dir", overrides_with = "no_log_dir")]
    log_dir: bool,
    #[arg(long = "no-log-dir", overrides_with = "log_dir", hide = true)]
    no_log_dir: bool,

    /// Restrict network to localhost
    #[arg(long, overrides_with = "no_localhost_only")]
    localhost_only: bool,
    #[arg(long, overrides_with = "localhost_only", hide = true)]
    no_localhost_only: bool,

    /// User namespace isolation
    #[arg(long, overrides_with = "no_private_users")]
    private_users: bool,
    #[arg(long, overrides_with = "private_users", hide = true)]
    no_private_users: bool,

    /// CPU quota (e.g., 200% for 2 cores)
    #[arg(long)]
    cpu_quota: Option<String>,

    /// Memory limit (e.g., 2G, 512M)
    #[arg(long)]
    memory_max: Option<String>,

    /// Path to environment file
    #[arg(long)]
    env_file: Option<String>,
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl FlagArgs {
    fn into_overrides(self) -> FlagOverrides {
        FlagOverrides {
            network: toggle(self.network, self.no_network),
            listening: toggle(self.listening, self.no_listening),
            privileged_ports: toggle(self.privileged_ports, self.no_privileged_ports),
            exec_memory: toggle(self.exec_memory, self.no_exec_memory),
            writable_files: toggle(self.writable, self.no_writable),
            runtime_dir: toggle(self.runtime_dir, self.no_runtime_dir),
            devices: toggle(self.devices, self.no_devices),
            full_devices: toggle(self.full_devices, self.no_full_devices),
            subprocess: toggle(self.subprocess, self.no_subprocess),
            separate_log_dir: toggle(self.log_dir, self.no_log_dir),
            localhost_only: toggle(self.localhost_only, self.no_localhost_only),
            private_users: toggle(self.private_users, self.no_private_users),
            cpu_quota: self.cpu_quota,
            memory_max: self.memory_max,
            env_file: self.env_file,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
    let config = Config::load();

    if cli.show_config {
        return commands::cmd_show(ShowTarget::Config, &config);
    }
    if cli.show_managed {
        return commands::cmd_show(ShowTarget::ManagedKeys, &config);
    }

    let request = GenerateRequest {
        name: cli.name,
        path: cli.path,
        interactive: cli.interactive,
        dry_run: cli.dry_run,
        overrides: cli.flags.into_overrides(),
    };
    commands::cmd_generate(&config, request)
}
