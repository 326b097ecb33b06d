//! Isolated runtime environment activation.
//!
//! Activation is computed as a set of environment changes and applied to the
//! recognizer's `Command`, never to this process. That is the compiled
//! equivalent of `source env/bin/activate` followed by running the program.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Kind of pre-built environment the recognizer ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvKind {
    /// Python virtualenv (`python -m venv`)
    Venv,
    /// Conda prefix (`conda create -p`)
    Conda,
}

impl std::fmt::Display for EnvKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvKind::Venv => write!(f, "venv"),
            EnvKind::Conda => write!(f, "conda"),
        }
    }
}

/// A runtime environment rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnv {
    kind: EnvKind,
    root: PathBuf,
}

impl RuntimeEnv {
    pub fn new(kind: EnvKind, root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            root: root.into(),
        }
    }

    pub fn kind(&self) -> EnvKind {
        self.kind
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Directory holding the environment's executables.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Compute the activation against the given `PATH` value.
    pub fn activation(&self, current_path: Option<&OsStr>) -> Activation {
        let mut dirs = vec![self.bin_dir()];
        if let Some(path) = current_path {
            dirs.extend(std::env::split_paths(path));
        }
        // join_paths only fails on entries containing the separator, and
        // those came out of split_paths so they can't.
        let path = std::env::join_paths(&dirs).unwrap_or_else(|_| self.bin_dir().into_os_string());

        let mut set = vec![(OsString::from("PATH"), path)];
        match self.kind {
            EnvKind::Venv => {
                set.push(("VIRTUAL_ENV".into(), self.root.clone().into_os_string()));
            }
            EnvKind::Conda => {
                set.push(("CONDA_PREFIX".into(), self.root.clone().into_os_string()));
                let name = self
                    .root
                    .file_name()
                    .map(OsStr::to_os_string)
                    .unwrap_or_else(|| self.root.clone().into_os_string());
                set.push(("CONDA_DEFAULT_ENV".into(), name));
            }
        }

        Activation {
            bin_dir: self.bin_dir(),
            set,
            remove: vec!["PYTHONHOME".into()],
        }
    }
}

/// Environment changes that activate a [`RuntimeEnv`] for a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    bin_dir: PathBuf,
    set: Vec<(OsString, OsString)>,
    remove: Vec<OsString>,
}

impl Activation {
    /// Value this activation assigns to `key`, if any.
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.set
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    #[cfg(test)]
    pub fn removes(&self, key: &str) -> bool {
        self.remove.iter().any(|k| k == key)
    }

    /// Resolve the interpreter, preferring the environment's own copy.
    pub fn resolve_interpreter(&self, interpreter: &str) -> PathBuf {
        let candidate = self.bin_dir.join(interpreter);
        if candidate.is_file() {
            return candidate;
        }
        let path = self.get("PATH").map(OsStr::to_os_string);
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(interpreter, path, cwd).unwrap_or_else(|_| PathBuf::from(interpreter))
    }

    /// Apply the changes to a child command.
    pub fn apply(&self, cmd: &mut Command) {
        for key in &self.remove {
            cmd.env_remove(key);
        }
        for (key, value) in &self.set {
            cmd.env(key, value);
        }
    }
}
