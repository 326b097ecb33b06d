use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::ConfigLoader;
use crate::launcher::Launcher;
use crate::service::Systemctl;

/// Run the launch sequence and return the recognizer's exit code.
pub async fn run() -> Result<ExitCode> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;
    let services = Systemctl::new(config.daemon.use_sudo);

    let mut stdout = io::stdout();
    let mut stdin = io::stdin().lock();
    let report = Launcher::new(&config, &services)
        .run(&mut stdout, &mut stdin)
        .await;

    info!(
        daemon = ?report.daemon,
        env_found = report.env_found,
        exit = ?report.exit,
        final_dir = ?report.final_dir,
        "Launch finished"
    );

    Ok(exit_code(report.exit_code()))
}

/// Truncate to the 8 bits a process exit status can carry.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}
