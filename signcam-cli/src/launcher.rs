//! The launch sequence.
//!
//! Steps run strictly in order and none of them short-circuits the rest: a
//! failed daemon start or a missing environment is reported and the
//! sequence carries on, so the recognizer's own diagnostics surface and the
//! working directory always ends up back at `$HOME`.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::SigncamConfig;
use crate::prompts;
use crate::recognizer::{EntryPoint, RecognizerExit};
use crate::runtime_env::RuntimeEnv;
use crate::service::{self, DaemonOutcome, ServiceManager};

/// What happened during one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub daemon: DaemonOutcome,
    pub env_found: bool,
    pub exit: RecognizerExit,
    pub final_dir: Option<PathBuf>,
}

impl LaunchReport {
    /// Process exit code for the launcher.
    pub fn exit_code(&self) -> i32 {
        self.exit.code()
    }
}

pub struct Launcher<'a, M: ServiceManager + ?Sized> {
    config: &'a SigncamConfig,
    services: &'a M,
}

impl<'a, M: ServiceManager + ?Sized> Launcher<'a, M> {
    pub fn new(config: &'a SigncamConfig, services: &'a M) -> Self {
        Self { config, services }
    }

    /// Run the full sequence, writing operator output to `out` and reading
    /// confirmations from `input`.
    pub async fn run<W: Write, R: BufRead>(&self, out: &mut W, input: &mut R) -> LaunchReport {
        emit(prompts::print_header_to(out, "signcam"));
        emit(prompts::print_session_warning_to(out));

        let daemon = self.ensure_daemon(out, input).await;
        // Resolve before the first cd so a relative root means relative to
        // where signcam was started, not to itself.
        let root = absolute_root(&self.config.app.root_dir());
        let (env, env_found) = self.enter_environment(&root);
        let exit = self.run_recognizer(&root, &env).await;
        let final_dir = return_home();

        if !exit.success() {
            let message = match &exit {
                RecognizerExit::SpawnFailed(reason) => format!("Could not start recognizer: {reason}"),
                other => format!("Recognizer exited with code {}", other.code()),
            };
            emit(prompts::print_error_to(out, &message));
        }

        LaunchReport {
            daemon,
            env_found,
            exit,
            final_dir,
        }
    }

    async fn ensure_daemon<W: Write, R: BufRead>(&self, out: &mut W, input: &mut R) -> DaemonOutcome {
        let unit = &self.config.daemon.unit;
        let outcome = service::ensure_running(self.services, unit).await;
        if !outcome.start_attempted() {
            return outcome;
        }

        match &outcome {
            DaemonOutcome::AlreadyActive => {}
            DaemonOutcome::Started => {
                emit(prompts::print_success_to(out, &format!("Started {unit}")));
            }
            DaemonOutcome::StartFailed(reason) => {
                emit(prompts::print_error_to(out, &format!("Could not start {unit}: {reason}")));
            }
        }

        // The daemon only applies rules to devices it sees arrive, so the
        // camera has to be reconnected whether or not we can confirm it.
        emit(prompts::print_replug_instruction_to(out));
        if self.config.operator.wait_for_confirmation
            && let Err(e) = prompts::wait_for_enter(out, input)
        {
            warn!(error = %e, "Could not read operator confirmation");
        }

        outcome
    }

    /// Move into the application root and the environment, and resolve it.
    fn enter_environment(&self, root: &Path) -> (RuntimeEnv, bool) {
        let app = &self.config.app;
        change_dir(root);

        let env = RuntimeEnv::new(app.env_kind, root.join(&app.env_dir));
        let env_found = env.exists();
        if env_found {
            change_dir(env.root());
            info!(kind = %env.kind(), root = %env.root().display(), "Activating environment");
        } else {
            warn!(
                kind = %env.kind(),
                root = %env.root().display(),
                "Runtime environment not found, continuing without it"
            );
        }

        (env, env_found)
    }

    async fn run_recognizer(&self, root: &Path, env: &RuntimeEnv) -> RecognizerExit {
        let app = &self.config.app;
        let entry = EntryPoint {
            dir: root.join(&app.vendor_dir),
            interpreter: app.interpreter.clone(),
            script: app.entry_point.clone(),
        };
        change_dir(&entry.dir);

        let current_path = std::env::var_os("PATH");
        let activation = env.activation(current_path.as_deref());
        entry.run(&activation).await
    }
}

/// Log operator output that couldn't be written; the sequence carries on.
fn emit(result: io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "Could not write operator output");
    }
}

fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|e| {
        warn!(root = %root.display(), error = %e, "Could not resolve application root");
        root.to_path_buf()
    })
}

fn change_dir(dir: &Path) {
    match std::env::set_current_dir(dir) {
        Ok(()) => debug!(dir = %dir.display(), "Changed directory"),
        Err(e) => warn!(dir = %dir.display(), error = %e, "Could not change directory"),
    }
}

/// Change back to the invoking user's home directory.
fn return_home() -> Option<PathBuf> {
    change_dir(&signcam_paths::home_dir());
    std::env::current_dir().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, OperatorConfig};
    use crate::service::testing::FakeServiceManager;
    use serial_test::serial;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Lay out `env/` and `vendor/entry.sh` running `body` under `root`.
    fn populate(root: &Path, body: &str) {
        std::fs::create_dir_all(root.join("env/bin")).unwrap();
        let vendor = root.join("vendor");
        std::fs::create_dir_all(&vendor).unwrap();
        std::fs::write(vendor.join("entry.sh"), body).unwrap();
    }

    /// App tree whose entry point records its argument count and exits with `code`.
    fn app_tree(code: i32) -> TempDir {
        let temp = TempDir::new().unwrap();
        populate(temp.path(), &format!("echo \"$#\" > args.txt\nexit {code}\n"));
        temp
    }

    /// Writer whose every write fails, like a closed stdout.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn config_for(root: &Path) -> SigncamConfig {
        SigncamConfig {
            app: AppConfig {
                root: root.to_path_buf(),
                interpreter: "sh".to_string(),
                entry_point: "entry.sh".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn assert_at_home(report: &LaunchReport) {
        let home = std::fs::canonicalize(signcam_paths::home_dir()).unwrap();
        let final_dir = std::fs::canonicalize(report.final_dir.as_ref().unwrap()).unwrap();
        assert_eq!(final_dir, home);
        assert_eq!(std::fs::canonicalize(std::env::current_dir().unwrap()).unwrap(), home);
    }

    async fn launch(config: &SigncamConfig, services: &FakeServiceManager) -> (LaunchReport, String) {
        let mut out = Vec::new();
        let mut input = Cursor::new(b"\n".to_vec());
        let report = Launcher::new(config, services).run(&mut out, &mut input).await;
        (report, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    #[serial]
    async fn active_daemon_skips_start_and_replug() {
        let app = app_tree(0);
        let config = config_for(app.path());
        let services = FakeServiceManager::active();

        let (report, output) = launch(&config, &services).await;

        assert_eq!(report.daemon, DaemonOutcome::AlreadyActive);
        assert_eq!(services.starts(), 0);
        assert!(!output.contains("Unplug the USB camera"));
        assert!(report.env_found);
        assert_eq!(report.exit, RecognizerExit::Exited(0));
        assert_eq!(report.exit_code(), 0);
        assert_at_home(&report);
    }

    #[tokio::test]
    #[serial]
    async fn inactive_daemon_is_started_once_and_replug_requested() {
        let app = app_tree(0);
        let config = config_for(app.path());
        let services = FakeServiceManager::inactive();

        let (report, output) = launch(&config, &services).await;

        assert_eq!(report.daemon, DaemonOutcome::Started);
        assert_eq!(services.starts(), 1);
        assert!(output.contains("Unplug the USB camera"));
        assert!(output.contains("Started systemd-udevd"));
        assert_at_home(&report);
    }

    #[tokio::test]
    #[serial]
    async fn failed_start_still_runs_recognizer() {
        let app = app_tree(4);
        let config = config_for(app.path());
        let services = FakeServiceManager::new(Some(service::ServiceState::Inactive), false);

        let (report, output) = launch(&config, &services).await;

        assert!(matches!(report.daemon, DaemonOutcome::StartFailed(_)));
        assert_eq!(services.starts(), 1);
        assert!(output.contains("Could not start systemd-udevd"));
        assert_eq!(report.exit, RecognizerExit::Exited(4));
        assert!(output.contains("Recognizer exited with code 4"));
        assert_at_home(&report);
    }

    #[tokio::test]
    #[serial]
    async fn recognizer_gets_no_arguments() {
        let app = app_tree(0);
        let config = config_for(app.path());
        let services = FakeServiceManager::active();

        launch(&config, &services).await;

        let args = std::fs::read_to_string(app.path().join("vendor/args.txt")).unwrap();
        assert_eq!(args.trim(), "0");
    }

    #[tokio::test]
    #[serial]
    async fn missing_app_tree_still_returns_home() {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp.path().join("missing"));
        let services = FakeServiceManager::active();

        let (report, _) = launch(&config, &services).await;

        assert!(!report.env_found);
        // The vendor dir doesn't exist, so the child can't get a working directory
        assert!(matches!(report.exit, RecognizerExit::SpawnFailed(_)));
        assert_eq!(report.exit_code(), 127);
        assert_at_home(&report);
    }

    #[tokio::test]
    #[serial]
    async fn confirmation_waits_for_enter() {
        let app = app_tree(0);
        let mut config = config_for(app.path());
        config.operator = OperatorConfig {
            wait_for_confirmation: true,
        };
        let services = FakeServiceManager::inactive();

        let (_, output) = launch(&config, &services).await;

        assert!(output.contains("Press Enter"));
    }

    #[tokio::test]
    #[serial]
    async fn no_confirmation_prompt_by_default() {
        let app = app_tree(0);
        let config = config_for(app.path());
        let services = FakeServiceManager::inactive();

        let (_, output) = launch(&config, &services).await;

        assert!(!output.contains("Press Enter"));
    }

    #[tokio::test]
    #[serial]
    async fn relative_root_resolves_from_starting_directory() {
        let base = TempDir::new().unwrap();
        populate(&base.path().join("app"), "echo \"$#\" > args.txt\nexit 0\n");
        std::env::set_current_dir(base.path()).unwrap();
        let config = config_for(Path::new("app"));
        let services = FakeServiceManager::active();

        let (report, _) = launch(&config, &services).await;

        assert!(report.env_found);
        assert_eq!(report.exit, RecognizerExit::Exited(0));
        assert!(base.path().join("app/vendor/args.txt").exists());
        assert_at_home(&report);
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn interrupted_recognizer_still_returns_home() {
        let temp = TempDir::new().unwrap();
        populate(temp.path(), "kill -INT $$\nsleep 5\n");
        let config = config_for(temp.path());
        let services = FakeServiceManager::active();

        let (report, output) = launch(&config, &services).await;

        assert_eq!(report.exit, RecognizerExit::Signaled(2));
        assert_eq!(report.exit_code(), 130);
        assert!(output.contains("Recognizer exited with code 130"));
        assert_at_home(&report);
    }

    #[tokio::test]
    #[serial]
    async fn unwritable_output_does_not_stop_the_sequence() {
        let app = app_tree(0);
        let config = config_for(app.path());
        let services = FakeServiceManager::inactive();
        let mut input = Cursor::new(Vec::new());

        let report = Launcher::new(&config, &services)
            .run(&mut BrokenPipe, &mut input)
            .await;

        assert_eq!(services.starts(), 1);
        assert_eq!(report.exit, RecognizerExit::Exited(0));
        assert_at_home(&report);
    }
}
