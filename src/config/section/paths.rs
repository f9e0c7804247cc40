//! `[paths]` section configuration.
//!
//! ```toml
//! [paths]
//! src = "src"     # source tree (sass/, js/, *.html)
//! dest = "dest"   # output tree, fully owned by assetflow
//! ```
//!
//! Relative paths are resolved against the project root.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source and output roots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub src: PathBuf,
    pub dest: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: "src".into(),
            dest: "dest".into(),
        }
    }
}

impl PathsConfig {
    /// Stylesheet sources live under `<src>/sass`.
    pub fn style_dir(&self) -> PathBuf {
        self.src.join("sass")
    }

    /// Script sources live under `<src>/js`.
    pub fn script_dir(&self) -> PathBuf {
        self.src.join("js")
    }

    pub fn css_dir(&self) -> PathBuf {
        self.dest.join("css")
    }

    pub fn js_dir(&self) -> PathBuf {
        self.dest.join("js")
    }

    /// Resolve both roots against the project root.
    pub fn normalize(&mut self, root: &Path) {
        self.src = crate::utils::path::normalize_path(&root.join(&self.src));
        self.dest = crate::utils::path::normalize_path(&root.join(&self.dest));
    }

    /// Call after `normalize()`.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.src == self.dest {
            diag.error_with_hint(
                FieldPath::new("paths.dest"),
                "output directory must differ from the source directory",
                "use a separate directory such as `dest`",
            );
        } else if self.src.starts_with(&self.dest) {
            diag.error(
                FieldPath::new("paths.dest"),
                "source directory must not live inside the output directory",
            );
        } else if self.dest.starts_with(&self.src) {
            diag.error_with_hint(
                FieldPath::new("paths.dest"),
                "output directory must not live inside the source directory",
                "writing output under `src` would retrigger the watcher",
            );
        }
    }
}
