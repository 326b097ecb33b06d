use super::types::{
    AppConfig, DaemonConfig, OperatorConfig, RawAppConfig, RawDaemonConfig, RawOperatorConfig,
    RawSigncamConfig, SigncamConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<SigncamConfig> {
        Self::load_layers(&[Self::user_config_path(), Self::project_config_path()])
    }

    /// Get user config path (`$XDG_CONFIG_HOME/signcam/config.toml`)
    pub fn user_config_path() -> PathBuf {
        signcam_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with SIGNCAM_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("SIGNCAM_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".signcam/config.toml")
        }
    }

    /// Load and merge the given files in order; missing files are skipped
    fn load_layers(paths: &[PathBuf]) -> Result<SigncamConfig> {
        let mut raw = RawSigncamConfig::default();

        for path in paths {
            if let Some(layer) = Self::read_raw(path)? {
                tracing::debug!(path = %path.display(), "Loaded config layer");
                raw = Self::merge_raw(raw, layer);
            }
        }

        Ok(Self::finalize(raw))
    }

    fn read_raw(path: &Path) -> Result<Option<RawSigncamConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawSigncamConfig, overlay: RawSigncamConfig) -> RawSigncamConfig {
        RawSigncamConfig {
            daemon: RawDaemonConfig {
                unit: overlay.daemon.unit.or(base.daemon.unit),
                use_sudo: overlay.daemon.use_sudo.or(base.daemon.use_sudo),
            },
            operator: RawOperatorConfig {
                wait_for_confirmation: overlay
                    .operator
                    .wait_for_confirmation
                    .or(base.operator.wait_for_confirmation),
            },
            app: RawAppConfig {
                root: overlay.app.root.or(base.app.root),
                env_dir: overlay.app.env_dir.or(base.app.env_dir),
                env_kind: overlay.app.env_kind.or(base.app.env_kind),
                vendor_dir: overlay.app.vendor_dir.or(base.app.vendor_dir),
                interpreter: overlay.app.interpreter.or(base.app.interpreter),
                entry_point: overlay.app.entry_point.or(base.app.entry_point),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawSigncamConfig) -> SigncamConfig {
        let daemon = DaemonConfig::default();
        let app = AppConfig::default();

        SigncamConfig {
            daemon: DaemonConfig {
                unit: raw.daemon.unit.unwrap_or(daemon.unit),
                use_sudo: raw.daemon.use_sudo.unwrap_or(daemon.use_sudo),
            },
            operator: OperatorConfig {
                wait_for_confirmation: raw.operator.wait_for_confirmation.unwrap_or(false),
            },
            app: AppConfig {
                root: raw.app.root.unwrap_or(app.root),
                env_dir: raw.app.env_dir.unwrap_or(app.env_dir),
                env_kind: raw.app.env_kind.unwrap_or(app.env_kind),
                vendor_dir: raw.app.vendor_dir.unwrap_or(app.vendor_dir),
                interpreter: raw.app.interpreter.unwrap_or(app.interpreter),
                entry_point: raw.app.entry_point.unwrap_or(app.entry_point),
            },
        }
    }
}
