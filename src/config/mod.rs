//! Project configuration management for `assetflow.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   ├── style      # [style], [style.targets], [style.lint]
//! │   ├── markup     # [markup]
//! │   ├── script     # [script]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # AssetConfig (this file)
//! ```
//!
//! The config file is optional. Without one, every section takes its
//! defaults and the project root is the current directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    LintRule, MarkupConfig, PathsConfig, ScriptConfig, ServeConfig, StyleConfig,
    StyleLintConfig, WatchConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name searched for when `-C` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "assetflow.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetflow.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory: parent of the config file, or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub markup: MarkupConfig,

    #[serde(default)]
    pub script: ScriptConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl AssetConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when there is none.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let mut config = match find_config_file(&cli.config, cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path
                    .parent()
                    .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
                config.config_path = Some(path);
                config
            }
            // An explicitly named config must exist
            None if cli.config != Path::new(DEFAULT_CONFIG_NAME) => {
                bail!(ConfigError::Validation(format!(
                    "config file `{}` not found",
                    cli.config.display()
                )));
            }
            None => Self {
                root: cwd.to_path_buf(),
                ..Self::default()
            },
        };

        config.finalize(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Apply CLI overrides and resolve paths against the root.
    fn finalize(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Commands::Dev { interface, port } = cli.command() {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        self.root = crate::utils::path::normalize_path(&self.root);
        let root = self.root.clone();
        self.paths.normalize(&root);
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Get path relative to the project root, for log output
    pub fn root_relative(&self, path: impl AsRef<Path>) -> String {
        crate::utils::path::display_relative(path.as_ref(), &self.root)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the finalized configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&mut diag);
        self.style.validate(&mut diag);
        self.script.validate(&mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AssetConfig {
    let (parsed, ignored) = AssetConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted at `root` with normalized paths.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> AssetConfig {
    let mut config = AssetConfig {
        root: root.to_path_buf(),
        ..AssetConfig::default()
    };
    config.paths.normalize(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = AssetConfig::from_str("[paths\nsrc = \"src\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_default() {
        let config = AssetConfig::default();
        assert!(config.config_path.is_none());
        assert_eq!(config.root, PathBuf::new());
        assert_eq!(config.serve.port, 5277);
        assert!(config.style.enable);
        assert!(config.script.enable);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\nsrc = \"assets\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = AssetConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.paths.src, PathBuf::from("assets"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = AssetConfig::parse_with_ignored("[serve]\nport = 1").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_load_without_config_uses_cwd() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from(["assetflow"]);

        let config = AssetConfig::load_from(&cli, dir.path()).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert!(config.config_path.is_none());
        assert_eq!(config.root, root);
        assert_eq!(config.paths.src, root.join("src"));
        assert_eq!(config.paths.dest, root.join("dest"));
    }

    #[test]
    fn test_load_finds_config_upward() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            "[paths]\ndest = \"public\"\n",
        )
        .unwrap();
        let nested = dir.path().join("src").join("js");
        fs::create_dir_all(&nested).unwrap();
        let cli = Cli::parse_from(["assetflow", "build"]);

        let config = AssetConfig::load_from(&cli, &nested).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.paths.dest, root.join("public"));
    }

    #[test]
    fn test_load_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from(["assetflow", "-C", "missing-config.toml"]);
        assert!(AssetConfig::load_from(&cli, dir.path()).is_err());
    }

    #[test]
    fn test_load_applies_dev_overrides() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from(["assetflow", "dev", "--port", "4000", "-i", "0.0.0.0"]);

        let config = AssetConfig::load_from(&cli, dir.path()).unwrap();
        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.serve.interface.to_string(), "0.0.0.0");
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            "[paths]\nsrc = \"site\"\ndest = \"site\"\n",
        )
        .unwrap();
        let cli = Cli::parse_from(["assetflow"]);
        assert!(AssetConfig::load_from(&cli, dir.path()).is_err());
    }

    #[test]
    fn test_root_relative() {
        let config = test_config_at(Path::new("/project"));
        assert_eq!(
            config.root_relative("/project/src/index.html"),
            "src/index.html"
        );
    }
}
