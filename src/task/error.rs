//! Task error taxonomy.
//!
//! Lint findings are not errors: they are printed and the run continues.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// The source root does not exist.
    #[error("source directory not found: {}", .0.display())]
    MissingSource(PathBuf),

    /// A style entry or the script bundle failed to compile.
    #[error("failed to compile {}: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    /// A markup file could not be parsed for minification.
    #[error("failed to minify {}: {message}", path.display())]
    Minify { path: PathBuf, message: String },
}

impl TaskError {
    pub fn compile(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Compile {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn minify(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Minify {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaskError::MissingSource("/p/src".into());
        assert_eq!(err.to_string(), "source directory not found: /p/src");

        let err = TaskError::compile("src/sass/main.sass", "expected \"}\"");
        assert_eq!(
            err.to_string(),
            "failed to compile src/sass/main.sass: expected \"}\""
        );

        let err = TaskError::minify("src/index.html", "unexpected end of input");
        assert!(err.to_string().starts_with("failed to minify src/index.html"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = TaskError::MissingSource("src".into()).into();
        let err = err.context("markup");
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::MissingSource(_))
        ));
    }
}
