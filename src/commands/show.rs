//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;
use crate::settings::ServiceSettings;
use crate::unit::ManagedKeys;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration and saved settings
    Config,
    /// Show the directive keys the generator manages
    ManagedKeys,
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
            if let Some(settings) = ServiceSettings::load(&config.settings_path())? {
                println!();
                println!("Saved settings:");
                print!("{}", serde_yaml::to_string(&settings)?);
            }
        }
        ShowTarget::ManagedKeys => {
            let registry = ManagedKeys::service()?;
            println!("Managed [Service] keys ({}):", registry.len());
            for key in registry.keys() {
                println!("  {}", key);
            }
        }
    }
    Ok(())
}
