//! Vendor recognition program.
//!
//! The program is opaque: it is started with the environment activated,
//! inherits the terminal, and is waited on until it exits.

use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::runtime_env::Activation;

/// Exit code a shell reports when a command can't be executed.
const SPAWN_FAILED_CODE: i32 = 127;

/// Where and how to start the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Vendor application directory, used as the working directory
    pub dir: PathBuf,
    /// Interpreter name, resolved against the activated environment
    pub interpreter: String,
    /// Script passed as the interpreter's only argument
    pub script: String,
}

/// How the recognizer finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerExit {
    Exited(i32),
    Signaled(i32),
    SpawnFailed(String),
}

impl RecognizerExit {
    fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return RecognizerExit::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return RecognizerExit::Signaled(signal);
            }
        }
        RecognizerExit::Exited(1)
    }

    /// Shell-compatible exit code.
    pub fn code(&self) -> i32 {
        match self {
            RecognizerExit::Exited(code) => *code,
            RecognizerExit::Signaled(signal) => 128 + signal,
            RecognizerExit::SpawnFailed(_) => SPAWN_FAILED_CODE,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, RecognizerExit::Exited(0))
    }
}

impl EntryPoint {
    /// Build the child command with the activation applied.
    ///
    /// No caller arguments are forwarded and stdio is left inherited.
    pub fn command(&self, activation: &Activation) -> Command {
        let program = activation.resolve_interpreter(&self.interpreter);
        let mut cmd = Command::new(program);
        cmd.arg(&self.script).current_dir(&self.dir);
        activation.apply(&mut cmd);
        cmd
    }

    /// Run the recognizer to completion.
    ///
    /// Ctrl-C reaches the child through the terminal's foreground process
    /// group. It is swallowed here so the launcher outlives the child and
    /// can finish its own sequence.
    pub async fn run(&self, activation: &Activation) -> RecognizerExit {
        let mut cmd = self.command(activation);
        debug!(command = ?cmd.as_std(), "Spawning recognizer");

        // Listen before spawning so an early Ctrl-C can't kill the launcher.
        let mut interrupts = Interrupts::listen();

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    interpreter = %self.interpreter,
                    dir = %self.dir.display(),
                    error = %e,
                    "Failed to start recognizer"
                );
                return RecognizerExit::SpawnFailed(e.to_string());
            }
        };

        info!(pid = ?child.id(), "Recognizer started");

        loop {
            tokio::select! {
                status = child.wait() => {
                    return match status {
                        Ok(status) => {
                            info!(status = ?status, "Recognizer exited");
                            RecognizerExit::from_status(status)
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed waiting for recognizer");
                            RecognizerExit::Exited(1)
                        }
                    };
                }
                () = interrupts.recv() => {
                    info!("Interrupt received, waiting for recognizer to exit");
                }
            }
        }
    }
}

/// SIGINT listener, installed at construction.
#[cfg(unix)]
struct Interrupts(Option<tokio::signal::unix::Signal>);

#[cfg(unix)]
impl Interrupts {
    fn listen() -> Self {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::interrupt()) {
            Ok(stream) => Self(Some(stream)),
            Err(e) => {
                warn!(error = %e, "Could not install interrupt handler");
                Self(None)
            }
        }
    }

    async fn recv(&mut self) {
        if let Some(stream) = self.0.as_mut()
            && stream.recv().await.is_some()
        {
            return;
        }
        // No handler or the stream closed: never fire again
        self.0 = None;
        std::future::pending::<()>().await
    }
}

#[cfg(not(unix))]
struct Interrupts;

#[cfg(not(unix))]
impl Interrupts {
    fn listen() -> Self {
        Self
    }

    async fn recv(&mut self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await
        }
    }
}
