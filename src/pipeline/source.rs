//! Source tree enumeration and change matching.
//!
//! | Kind   | Pattern (relative to `paths.src`) |
//! |--------|-----------------------------------|
//! | style  | `sass/**/*.sass`                  |
//! | markup | `*.html`                          |
//! | script | `js/**/*.js`                      |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use jwalk::WalkDir;

use crate::task::TaskError;

pub const STYLE_PATTERN: &str = "sass/**/*.sass";
pub const MARKUP_PATTERN: &str = "*.html";
pub const SCRIPT_PATTERN: &str = "js/**/*.js";

/// Fail with `MissingSource` when the source root does not exist.
pub fn require_root(src: &Path) -> Result<(), TaskError> {
    if src.is_dir() {
        Ok(())
    } else {
        Err(TaskError::MissingSource(src.to_path_buf()))
    }
}

/// All files with extension `ext` under `dir`, in sorted path order.
///
/// A missing `dir` yields no files.
pub fn collect(dir: &Path, ext: &str) -> Vec<PathBuf> {
    walk(dir, usize::MAX, ext)
}

/// Files with extension `ext` directly inside `dir`, in sorted path order.
pub fn collect_top_level(dir: &Path, ext: &str) -> Vec<PathBuf> {
    walk(dir, 1, ext)
}

fn walk(dir: &Path, max_depth: usize, ext: &str) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .skip_hidden(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    files
}

/// Sass partials (`_name.sass`) are imported, never compiled on their own.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Compiled style, markup and script patterns rooted at `paths.src`.
pub struct SourcePatterns {
    root: PathBuf,
    set: GlobSet,
}

impl SourcePatterns {
    pub fn new(src: &Path) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in [STYLE_PATTERN, MARKUP_PATTERN, SCRIPT_PATTERN] {
            // `*` must not cross directories: `*.html` is top-level only
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid glob pattern: {pattern}"))?;
            builder.add(glob);
        }
        Ok(Self {
            root: src.to_path_buf(),
            set: builder.build()?,
        })
    }

    /// Whether a changed path belongs to any build input.
    pub fn matches(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root)
            .is_ok_and(|rel| self.set.is_match(rel))
    }
}
