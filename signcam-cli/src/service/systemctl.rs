//! systemd-backed service control.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Error, Result, ServiceManager, ServiceState};

const SYSTEMCTL: &str = "systemctl";

/// Drives units through `systemctl`.
#[derive(Debug, Clone)]
pub struct Systemctl {
    /// Prefix `start` with sudo when not already root.
    use_sudo: bool,
}

impl Systemctl {
    #[must_use]
    pub fn new(use_sudo: bool) -> Self {
        Self { use_sudo }
    }

    /// Check if the `systemctl` binary is in PATH.
    #[must_use]
    pub fn is_installed() -> bool {
        which::which(SYSTEMCTL).is_ok()
    }

    /// Program and arguments used to start `unit`.
    fn start_argv(&self, unit: &str, is_root: bool) -> Vec<String> {
        let mut argv = Vec::with_capacity(4);
        if self.use_sudo && !is_root {
            argv.push("sudo".to_string());
        }
        argv.extend([SYSTEMCTL.to_string(), "start".to_string(), unit.to_string()]);
        argv
    }
}

#[async_trait]
impl ServiceManager for Systemctl {
    async fn state(&self, unit: &str) -> Result<ServiceState> {
        if !Self::is_installed() {
            return Err(Error::NotInstalled(SYSTEMCTL));
        }

        let status = Command::new(SYSTEMCTL)
            .args(["is-active", "--quiet", unit])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        debug!(unit = %unit, status = ?status, "systemctl is-active");
        Ok(if status.success() {
            ServiceState::Active
        } else {
            ServiceState::Inactive
        })
    }

    async fn start(&self, unit: &str) -> Result<()> {
        if !Self::is_installed() {
            return Err(Error::NotInstalled(SYSTEMCTL));
        }

        let argv = self.start_argv(unit, is_root());
        debug!(command = %argv.join(" "), "Issuing start");

        // Inherit stdio so a sudo password prompt and the tool's own
        // diagnostics reach the operator.
        let status = Command::new(&argv[0]).args(&argv[1..]).status().await?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::StartFailed {
                unit: unit.to_string(),
                status,
            })
        }
    }
}

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}
