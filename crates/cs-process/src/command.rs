//! Command line of the external simulator.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use cs_core::{ProcessConfig, SimTime};

/// Program and argument vector, kept separate so nothing goes through a
/// shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SumoCommand {
    program: PathBuf,
    args:    Vec<String>,
}

impl SumoCommand {
    /// Build the invocation for `config`, listening on `port` and stepping by
    /// `step_length`.
    ///
    /// Argument order:
    ///
    /// ```text
    /// sumo[-gui] -c <config> --remote-port <port> --step-length <secs>
    ///     [--error-log <config dir>/SumoError.log] --no-step-log <bool>
    ///     [--seed <n>] <extra options...> --start --quit-on-end
    /// ```
    pub fn build(config: &ProcessConfig, port: u16, step_length: SimTime) -> Self {
        let binary = if config.gui { "sumo-gui" } else { "sumo" };
        let program = if config.binary_dir.as_os_str().is_empty() {
            PathBuf::from(binary)
        } else {
            config.binary_dir.join(binary)
        };

        let mut args = vec![
            "-c".to_owned(),
            config.config_path.display().to_string(),
            "--remote-port".to_owned(),
            port.to_string(),
            "--step-length".to_owned(),
            step_length.as_secs_f64().to_string(),
        ];

        if config.error_log {
            args.push("--error-log".to_owned());
            args.push(error_log_path(&config.config_path).display().to_string());
        }

        args.push("--no-step-log".to_owned());
        args.push((!config.step_log).to_string());

        // Zero means "unseeded".
        if let Some(seed) = config.seed.filter(|&s| s != 0) {
            args.push("--seed".to_owned());
            args.push(seed.to_string());
        }

        args.extend(config.extra_options.split_whitespace().map(str::to_owned));
        args.push("--start".to_owned());
        args.push("--quit-on-end".to_owned());

        Self { program, args }
    }

    /// Wrap the invocation as `sudo ip netns exec <name> ...`.
    pub fn in_netns(self, name: &str) -> Self {
        let mut args = vec![
            "ip".to_owned(),
            "netns".to_owned(),
            "exec".to_owned(),
            name.to_owned(),
            self.program.display().to_string(),
        ];
        args.extend(self.args);
        Self { program: PathBuf::from("sudo"), args }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value following `flag`, if present.
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for SumoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// `SumoError.log` in the scenario file's directory.
fn error_log_path(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join("SumoError.log"),
        _ => PathBuf::from("SumoError.log"),
    }
}
