//! Interactive flag configuration.
//!
//! Questions follow the flag dependencies: dependent questions are only
//! asked when their prerequisite is enabled, and are forced off otherwise.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::flags::FeatureFlags;

/// Prompts on `output`, reads answers from `input`.
pub struct Wizard<R, W> {
    input: R,
    output: W,
    eof: bool,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            eof: false,
        }
    }

    /// Walk through every flag, starting from the current values.
    pub fn run(&mut self, flags: &mut FeatureFlags) -> Result<()> {
        writeln!(self.output, "Interactive Configuration")?;
        writeln!(self.output, "Press Enter to accept defaults.")?;

        flags.network = self.ask(
            "Network Access",
            "Required for internet/intranet. Disabling creates an airgapped namespace.",
            flags.network,
        )?;

        if flags.network {
            flags.listening = self.ask(
                "Server Mode",
                "Allows port binding. Waits for network-online.target before starting.",
                flags.listening,
            )?;

            if flags.listening {
                flags.privileged_ports = self.ask(
                    "Privileged Ports",
                    "Allow binding to ports <1024 (80/443) via CAP_NET_BIND_SERVICE.",
                    flags.privileged_ports,
                )?;
            } else {
                flags.privileged_ports = false;
            }

            flags.localhost_only = self.ask(
                "Localhost Only",
                "Restrict network to 127.0.0.0/8 and ::1. For local database access.",
                flags.localhost_only,
            )?;
        } else {
            flags.listening = false;
            flags.privileged_ports = false;
            flags.localhost_only = false;
        }

        flags.exec_memory = self.ask(
            "Executable Memory",
            "Required for JIT runtimes (Node, Java) or WASM engines.",
            flags.exec_memory,
        )?;
        flags.writable_files = self.ask(
            "Writable Directory",
            "Allows the service to modify files in its working directory.",
            flags.writable_files,
        )?;
        flags.runtime_dir = self.ask(
            "Runtime Directory",
            "Creates /run/<name> for sockets or PID files.",
            flags.runtime_dir,
        )?;

        flags.devices = self.ask(
            "Hardware Devices",
            "Access to /dev (USB, serial, GPU).",
            flags.devices,
        )?;
        if flags.devices {
            flags.full_devices = self.ask(
                "Full Device Access",
                "Disables device sandboxing. Use if standard rules fail.",
                flags.full_devices,
            )?;
        } else {
            flags.full_devices = false;
        }

        flags.subprocess = self.ask(
            "Subprocesses",
            "Allow spawning shell commands or external binaries.",
            flags.subprocess,
        )?;
        flags.private_users = self.ask(
            "Private Users",
            "User namespace isolation. May break user lookups or capabilities.",
            flags.private_users,
        )?;
        flags.separate_log_dir = self.ask(
            "Separate Logs",
            "Organize logs into a 'logs' subdirectory.",
            flags.separate_log_dir,
        )?;

        writeln!(self.output)?;
        writeln!(self.output, "Resource Limits (leave empty for no limit)")?;
        flags.cpu_quota = self.ask_string("  CPU Quota (e.g., 200%)", flags.cpu_quota.take())?;
        flags.memory_max = self.ask_string("  Memory Max (e.g., 2G)", flags.memory_max.take())?;
        writeln!(self.output)?;

        Ok(())
    }

    /// Yes/no question. Unrecognized answers repeat the question.
    pub fn ask(&mut self, title: &str, description: &str, default: bool) -> Result<bool> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", title)?;
        writeln!(self.output, "  {}", description)?;

        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "  Enable [{}]: ", hint)?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(default);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "  Please answer y or n.")?,
            }
        }
    }

    /// Free-text question; an empty answer keeps `default`.
    pub fn ask_string(&mut self, prompt: &str, default: Option<String>) -> Result<Option<String>> {
        write!(
            self.output,
            "{} [{}]: ",
            prompt,
            default.as_deref().unwrap_or("none")
        )?;
        self.output.flush()?;

        match self.read_answer()? {
            Some(answer) if !answer.is_empty() => Ok(Some(answer)),
            _ => Ok(default),
        }
    }

    // None once input is exhausted; every later question takes its default.
    fn read_answer(&mut self) -> Result<Option<String>> {
        if self.eof {
            return Ok(None);
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(answers: &str, flags: &mut FeatureFlags) -> String {
        let mut out = Vec::new();
        Wizard::new(Cursor::new(answers.as_bytes()), &mut out)
            .run(flags)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_enter_keeps_defaults() {
        let mut flags = FeatureFlags::default();
        run(&"\n".repeat(20), &mut flags);
        assert_eq!(flags, FeatureFlags::default());
    }

    #[test]
    fn test_eof_keeps_defaults() {
        let mut flags = FeatureFlags::default();
        run("", &mut flags);
        assert_eq!(flags, FeatureFlags::default());
    }

    #[test]
    fn test_no_network_skips_dependent_questions() {
        let mut flags = FeatureFlags {
            privileged_ports: true,
            localhost_only: true,
            ..FeatureFlags::default()
        };
        // network=n, then exec_memory=y, the rest default, then cpu quota.
        let output = run("n\ny\n\n\n\n\n\n\n150%\n\n", &mut flags);

        assert!(!flags.network);
        assert!(!flags.listening);
        assert!(!flags.privileged_ports);
        assert!(!flags.localhost_only);
        assert!(flags.exec_memory);
        assert_eq!(flags.cpu_quota.as_deref(), Some("150%"));
        assert!(!output.contains("Server Mode"));
    }

    #[test]
    fn test_invalid_answer_is_repeated() {
        let mut out = Vec::new();
        let mut wizard = Wizard::new(Cursor::new("maybe\nYES\n".as_bytes()), &mut out);
        assert!(wizard.ask("Title", "desc", false).unwrap());
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Please answer y or n."));
    }
}
