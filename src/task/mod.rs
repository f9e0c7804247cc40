//! Build tasks.
//!
//! Each task wraps one tool and runs to completion before returning:
//!
//! | Task         | Input                  | Output                          |
//! |--------------|------------------------|---------------------------------|
//! | `StyleTask`  | `src/sass/**/*.sass`   | `dest/css/style.min.css` + map  |
//! | `MarkupTask` | `src/*.html`           | `dest/*.html`                   |
//! | `ScriptTask` | `src/js/**/*.js`       | `dest/js/main.min.js` + map     |

mod error;
pub mod markup;
pub mod script;
pub mod style;

pub use error::TaskError;
pub use markup::MarkupTask;
pub use script::ScriptTask;
pub use style::StyleTask;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::BuildContext;

/// A named build step.
pub trait Task: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &BuildContext) -> Result<TaskReport>;
}

/// What a task produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Files written, in write order.
    pub outputs: Vec<PathBuf>,
    /// Inputs skipped after a caught compile error.
    pub failed: Vec<PathBuf>,
    pub lint_warnings: usize,
    pub lint_errors: usize,
}

impl TaskReport {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Write `content` to `path`, creating parent directories.
pub(crate) fn write_output(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Source map path next to an output file: `style.min.css.map`.
pub(crate) fn map_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use crate::config::test_config_at;
    use crate::core::BuildContext;
    use crate::reload::LiveReload;

    use super::style::StyleCompiler;

    /// Write `content` to `root/rel`, creating directories.
    pub fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Compiler that echoes the source back, failing on files containing
    /// `@error`.
    pub struct EchoCompiler;

    impl StyleCompiler for EchoCompiler {
        fn name(&self) -> &str {
            "echo"
        }

        fn compile(&self, path: &Path) -> anyhow::Result<String> {
            let source = fs::read_to_string(path)?;
            if source.contains("@error") {
                anyhow::bail!("{}: @error", path.display());
            }
            Ok(source)
        }
    }

    /// Context rooted at `root` with the echo compiler.
    pub fn context(root: &Path, live: LiveReload) -> BuildContext {
        let config = Arc::new(test_config_at(root));
        BuildContext::new(config, live).with_compiler(Box::new(EchoCompiler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_output_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dest/css/style.min.css");
        write_output(&path, "a{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "a{}");
    }

    #[test]
    fn test_map_path_for() {
        assert_eq!(
            map_path_for(Path::new("dest/js/main.min.js")),
            PathBuf::from("dest/js/main.min.js.map")
        );
    }

    #[test]
    fn test_report_is_empty() {
        let mut report = TaskReport::default();
        assert!(report.is_empty());
        report.outputs.push("dest/index.html".into());
        assert!(!report.is_empty());
    }
}
