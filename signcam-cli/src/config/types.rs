use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::runtime_env::EnvKind;

/// Default service unit for the device-management daemon
pub const DEFAULT_DAEMON_UNIT: &str = "systemd-udevd";

/// Default application root (expanded against the home directory)
pub const DEFAULT_APP_ROOT: &str = "~/sign-recognition";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSigncamConfig {
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    #[serde(default)]
    pub operator: RawOperatorConfig,

    #[serde(default)]
    pub app: RawAppConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDaemonConfig {
    pub unit: Option<String>,
    pub use_sudo: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawOperatorConfig {
    pub wait_for_confirmation: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAppConfig {
    pub root: Option<PathBuf>,
    pub env_dir: Option<PathBuf>,
    pub env_kind: Option<EnvKind>,
    pub vendor_dir: Option<PathBuf>,
    pub interpreter: Option<String>,
    pub entry_point: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SigncamConfig {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub operator: OperatorConfig,

    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    /// Service unit checked and started before launch
    pub unit: String,

    /// Prefix the start command with sudo when not running as root
    pub use_sudo: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            unit: DEFAULT_DAEMON_UNIT.to_string(),
            use_sudo: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OperatorConfig {
    /// Wait for Enter after the replug instruction
    pub wait_for_confirmation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Application root; a leading `~/` is expanded
    pub root: PathBuf,

    /// Runtime environment, relative to `root`
    pub env_dir: PathBuf,

    /// Kind of runtime environment at `env_dir`
    pub env_kind: EnvKind,

    /// Vendor application directory, relative to `root`
    pub vendor_dir: PathBuf,

    /// Interpreter looked up in the environment's bin directory
    pub interpreter: String,

    /// Script handed to the interpreter
    pub entry_point: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_APP_ROOT),
            env_dir: PathBuf::from("env"),
            env_kind: EnvKind::Venv,
            vendor_dir: PathBuf::from("vendor"),
            interpreter: "python".to_string(),
            entry_point: "main.py".to_string(),
        }
    }
}

impl AppConfig {
    /// Application root with `~` expanded.
    pub fn root_dir(&self) -> PathBuf {
        signcam_paths::expand_home(&self.root)
    }
}
