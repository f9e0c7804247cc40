//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetflow.toml`:
//!
//! | Module   | TOML Section | Purpose                               |
//! |----------|--------------|---------------------------------------|
//! | `paths`  | `[paths]`    | Source and output roots               |
//! | `style`  | `[style]`    | Sass compiler, browser targets, lint  |
//! | `markup` | `[markup]`   | HTML minifier options                 |
//! | `script` | `[script]`   | ES target, mangling, lint             |
//! | `serve`  | `[serve]`    | Development server                    |
//! | `watch`  | `[watch]`    | Debounce timings                      |

mod markup;
mod paths;
mod script;
mod serve;
pub mod style;
mod watch;

pub use markup::MarkupConfig;
pub use paths::PathsConfig;
pub use script::ScriptConfig;
pub use serve::ServeConfig;
pub use style::{LintRule, StyleConfig, StyleLintConfig};
pub use watch::WatchConfig;
