//! Per-entry Sass compilation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Result, anyhow};

use crate::config::AssetConfig;
use crate::utils::exec::{Cmd, FilterRule};

/// Turns one stylesheet entry into plain CSS.
pub trait StyleCompiler: Send + Sync {
    fn name(&self) -> &str;

    fn compile(&self, path: &Path) -> Result<String>;
}

/// Deprecation chatter dart-sass prints on stderr.
static SASS_FILTER: FilterRule = FilterRule::new(&["Deprecation", "More info", "DEPRECATION"]);

/// The external `sass` executable (or the configured command).
pub struct SassCommand {
    command: Vec<String>,
    /// Working directory, so relative load paths resolve from the project root
    root: Option<PathBuf>,
    resolved: OnceLock<Result<PathBuf, String>>,
}

impl SassCommand {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            root: None,
            resolved: OnceLock::new(),
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            root: Some(config.root.clone()),
            ..Self::new(config.style.compiler.clone())
        }
    }

    /// Locate the program on `PATH` once per process.
    fn program(&self) -> Result<&Path> {
        let resolved = self.resolved.get_or_init(|| {
            let program = self.command.first().map(String::as_str).unwrap_or_default();
            which::which(program).map_err(|_| format!("`{program}` not found in PATH"))
        });
        resolved.as_deref().map_err(|e| anyhow!("{e}"))
    }
}

impl StyleCompiler for SassCommand {
    fn name(&self) -> &str {
        self.command.first().map_or("sass", String::as_str)
    }

    fn compile(&self, path: &Path) -> Result<String> {
        let program = self.program()?;
        let extra: Vec<OsString> = self.command.iter().skip(1).map(OsString::from).collect();

        let mut cmd = Cmd::new(program)
            .args(extra)
            .args(["--style=expanded", "--no-source-map"])
            .arg(path)
            .filter(&SASS_FILTER);
        if let Some(root) = &self.root
            && root.is_dir()
        {
            cmd = cmd.cwd(root);
        }

        let output = cmd.run()?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
