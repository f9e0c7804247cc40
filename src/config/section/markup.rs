//! `[markup]` section configuration.
//!
//! All options default to `true`.
//!
//! ```toml
//! [markup]
//! enable = true
//! collapse_whitespace = true
//! remove_comments = true
//! remove_empty_attributes = true
//! sort_attributes = true
//! sort_class_name = true
//! ```

use serde::{Deserialize, Serialize};

/// HTML minifier settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MarkupConfig {
    pub enable: bool,
    pub collapse_whitespace: bool,
    pub remove_comments: bool,
    /// Drop empty `class`, `id`, `style`, `title`, `lang`, `dir` and `on*`.
    pub remove_empty_attributes: bool,
    pub sort_attributes: bool,
    pub sort_class_name: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            enable: true,
            collapse_whitespace: true,
            remove_comments: true,
            remove_empty_attributes: true,
            sort_attributes: true,
            sort_class_name: true,
        }
    }
}
