//! Configuration surface of the co-simulation bridge.
//!
//! Loaded from JSON by the application and handed to the process manager
//! and the step scheduler.  Every field has a default, so a config file only
//! needs to name what it changes:
//!
//! ```json
//! {
//!   "process": { "config_path": "scenarios/highway.sumocfg", "seed": 7 },
//!   "sync":    { "interval_secs": 0.1, "penetration_rate": 0.5 }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, SimTime};

// ── CoSimConfig ───────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoSimConfig {
    pub process:    ProcessConfig,
    pub sync:       SyncConfig,
    /// Optional visualiser sink.  `None` disables it.
    pub visualizer: Option<VisualizerConfig>,
}

impl CoSimConfig {
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let config: CoSimConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the constraints the engine relies on.
    pub fn validate(&self) -> CoreResult<()> {
        self.process.validate()?;
        self.sync.validate()
    }
}

// ── ProcessConfig ─────────────────────────────────────────────────────────────

/// How the external traffic simulator is launched and reached.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Scenario configuration file passed with `-c`.  Required.
    pub config_path: PathBuf,

    /// Directory holding the `sumo` / `sumo-gui` binaries.  Empty means
    /// "resolve through `PATH`".
    pub binary_dir: PathBuf,

    /// Host the control channel connects to.
    pub host: String,

    /// First control port to try.  Occupied ports are skipped upwards.
    pub port: u16,

    /// Grace period between spawning the process and the first connect.
    pub wait_for_socket_secs: f64,

    /// Launch the graphical front-end instead of the headless binary.
    pub gui: bool,

    /// Free-form extra arguments, split on whitespace.
    pub extra_options: String,

    /// Deterministic seed for the external simulator.
    pub seed: Option<u32>,

    /// Write `SumoError.log` next to the scenario configuration file.
    pub error_log: bool,

    /// Keep the per-step progress output of the headless binary.
    pub step_log: bool,

    /// Run the process inside this network namespace (needs root).
    pub netns: Option<String>,

    pub connect: ConnectConfig,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            config_path:          PathBuf::new(),
            binary_dir:           PathBuf::new(),
            host:                 "localhost".to_owned(),
            port:                 1338,
            wait_for_socket_secs: 1.0,
            gui:                  false,
            extra_options:        String::new(),
            seed:                 None,
            error_log:            false,
            step_log:             false,
            netns:                None,
            connect:              ConnectConfig::default(),
        }
    }
}

impl ProcessConfig {
    pub fn wait_for_socket(&self) -> Duration {
        Duration::from_secs_f64(self.wait_for_socket_secs.max(0.0))
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.config_path.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "no path specified for the traffic simulator configuration".into(),
            ));
        }
        if self.port == 0 {
            return Err(CoreError::Config("control port must be >= 1".into()));
        }
        if !self.wait_for_socket_secs.is_finite() || self.wait_for_socket_secs < 0.0 {
            return Err(CoreError::Config(format!(
                "invalid startup wait {}s",
                self.wait_for_socket_secs
            )));
        }
        if self.connect.attempts == 0 {
            return Err(CoreError::Config("connect.attempts must be >= 1".into()));
        }
        if let Some(ns) = &self.netns {
            if ns.trim().is_empty() {
                return Err(CoreError::Config("network namespace name is empty".into()));
            }
        }
        Ok(())
    }
}

/// Readiness policy for the control-channel connect after launch.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Total connect attempts before startup is declared failed.
    pub attempts: u32,
    /// Delay before the second attempt; doubled after every failure.
    pub initial_backoff_ms: u64,
    /// Upper bound for the doubled delay.
    pub max_backoff_ms: u64,
    /// Per-attempt TCP connect timeout.
    pub timeout_ms: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            attempts:           5,
            initial_backoff_ms: 200,
            max_backoff_ms:     2_000,
            timeout_ms:         1_000,
        }
    }
}

/// Upper bound for configured interval and start offset (about 31 years).
pub const MAX_TIME_SECS: f64 = 1e9;

// ── SyncConfig ────────────────────────────────────────────────────────────────

/// Joint-step and mirroring parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Length of one joint step in seconds; also the external step length.
    pub interval_secs: f64,

    /// External simulator time corresponding to local time zero.
    pub start_offset_secs: f64,

    /// Probability that a newly-appeared vehicle is mirrored locally.
    pub penetration_rate: f64,

    /// Seed of the sampling draw sequence.  `None` seeds from entropy.
    pub sampling_seed: Option<u64>,

    /// Constant third coordinate written into node positions.
    pub altitude: f64,

    /// Also mirror heading and speed into the host nodes.
    pub mirror_kinematics: bool,

    /// Pace the local timeline to wall-clock time.
    pub real_time: bool,

    /// Identifier prefixes that receive full protocol services.  Empty means
    /// every vehicle does; otherwise non-matching vehicles are broadcast-only.
    pub full_service_prefixes: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs:         1.0,
            start_offset_secs:     0.0,
            penetration_rate:      1.0,
            sampling_seed:         None,
            altitude:              1.5,
            mirror_kinematics:     false,
            real_time:             false,
            full_service_prefixes: Vec::new(),
        }
    }
}

impl SyncConfig {
    #[inline]
    pub fn interval(&self) -> SimTime {
        SimTime::from_secs_f64(self.interval_secs)
    }

    #[inline]
    pub fn start_offset(&self) -> SimTime {
        SimTime::from_secs_f64(self.start_offset_secs)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.interval_secs.is_finite() || self.interval().is_zero() {
            return Err(CoreError::Config(format!(
                "synchronisation interval must be at least 1 ms, got {}s",
                self.interval_secs
            )));
        }
        if self.interval_secs > MAX_TIME_SECS {
            return Err(CoreError::Config(format!(
                "synchronisation interval must be at most {MAX_TIME_SECS}s, got {}s",
                self.interval_secs
            )));
        }
        if !self.start_offset_secs.is_finite() || self.start_offset_secs < 0.0 {
            return Err(CoreError::Config(format!(
                "start offset must be >= 0, got {}s",
                self.start_offset_secs
            )));
        }
        if self.start_offset_secs > MAX_TIME_SECS {
            return Err(CoreError::Config(format!(
                "start offset must be at most {MAX_TIME_SECS}s, got {}s",
                self.start_offset_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.penetration_rate) {
            return Err(CoreError::Config(format!(
                "penetration rate must lie in [0, 1], got {}",
                self.penetration_rate
            )));
        }
        if !self.altitude.is_finite() {
            return Err(CoreError::Config("altitude must be finite".into()));
        }
        Ok(())
    }
}

// ── VisualizerConfig ──────────────────────────────────────────────────────────

/// Where the visualiser sink listens.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// `host:port` of the visualiser's datagram endpoint.
    pub address: String,
}
