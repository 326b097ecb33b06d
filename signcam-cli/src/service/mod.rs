//! Device-management daemon control
//!
//! Checks whether the daemon unit is active and starts it when it is not.
//! The daemon itself is an external collaborator; this module only drives
//! its control interface.

mod systemctl;

pub use systemctl::Systemctl;

use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the service manager.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The control tool is not on PATH.
    #[error("{0} is not installed or not in PATH")]
    NotInstalled(&'static str),

    /// Failed to spawn the control tool.
    #[error("Failed to run service control command: {0}")]
    Spawn(#[from] std::io::Error),

    /// The start command ran but reported failure.
    #[error("Starting {unit} failed ({status})")]
    StartFailed {
        unit: String,
        status: std::process::ExitStatus,
    },
}

/// Whether a unit is running, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Active,
    Inactive,
}

/// What [`ensure_running`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonOutcome {
    /// The unit was already active; nothing was started.
    AlreadyActive,
    /// The unit was inactive and the start command succeeded.
    Started,
    /// The unit was inactive and the start command failed.
    StartFailed(String),
}

impl DaemonOutcome {
    /// True when a start was issued, successful or not.
    pub fn start_attempted(&self) -> bool {
        !matches!(self, DaemonOutcome::AlreadyActive)
    }
}

/// Control interface for system services.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Query the current state of `unit`.
    async fn state(&self, unit: &str) -> Result<ServiceState>;

    /// Start `unit`, blocking until the control command returns.
    async fn start(&self, unit: &str) -> Result<()>;
}

/// Ensure `unit` is active, starting it at most once.
///
/// A failed state query counts as inactive. Start failures are logged and
/// returned as [`DaemonOutcome::StartFailed`] rather than an error so the
/// launch sequence can continue.
pub async fn ensure_running<M: ServiceManager + ?Sized>(manager: &M, unit: &str) -> DaemonOutcome {
    match manager.state(unit).await {
        Ok(ServiceState::Active) => {
            debug!(unit = %unit, "Daemon already active");
            return DaemonOutcome::AlreadyActive;
        }
        Ok(ServiceState::Inactive) => {}
        Err(e) => {
            warn!(unit = %unit, error = %e, "Could not query daemon state, assuming inactive");
        }
    }

    info!(unit = %unit, "Starting daemon");
    match manager.start(unit).await {
        Ok(()) => {
            info!(unit = %unit, "Daemon started");
            DaemonOutcome::Started
        }
        Err(e) => {
            warn!(unit = %unit, error = %e, "Daemon start failed");
            DaemonOutcome::StartFailed(e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted service manager that counts calls.
    pub struct FakeServiceManager {
        pub state: Option<ServiceState>,
        pub start_ok: bool,
        pub state_calls: AtomicUsize,
        pub start_calls: AtomicUsize,
    }

    impl FakeServiceManager {
        pub fn new(state: Option<ServiceState>, start_ok: bool) -> Self {
            Self {
                state,
                start_ok,
                state_calls: AtomicUsize::new(0),
                start_calls: AtomicUsize::new(0),
            }
        }

        pub fn active() -> Self {
            Self::new(Some(ServiceState::Active), true)
        }

        pub fn inactive() -> Self {
            Self::new(Some(ServiceState::Inactive), true)
        }

        pub fn starts(&self) -> usize {
            self.start_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ServiceManager for FakeServiceManager {
        async fn state(&self, _unit: &str) -> Result<ServiceState> {
            self.state_calls.fetch_add(1, Ordering::SeqCst);
            self.state.ok_or(Error::NotInstalled("systemctl"))
        }

        async fn start(&self, _unit: &str) -> Result<()> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            if self.start_ok {
                Ok(())
            } else {
                Err(Error::Spawn(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "Access denied",
                )))
            }
        }
    }
}
