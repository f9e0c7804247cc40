//! `[script]` section configuration.
//!
//! ```toml
//! [script]
//! enable = true
//! target = "es2015"   # transpile and compress target
//! mangle = true       # rename local bindings
//! lint = true         # eqeqeq, no-eval, no-with
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Script build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub enable: bool,
    pub target: String,
    pub mangle: bool,
    pub lint: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            enable: true,
            target: "es2015".to_string(),
            mangle: true,
            lint: true,
        }
    }
}

/// ES targets accepted by the transformer and the compressor.
pub const KNOWN_TARGETS: &[&str] = &[
    "es5", "es2015", "es2016", "es2017", "es2018", "es2019", "es2020", "es2021", "es2022",
    "es2023", "es2024", "esnext",
];

impl ScriptConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let target = self.target.to_ascii_lowercase();
        if !KNOWN_TARGETS.contains(&target.as_str()) {
            diag.error_with_hint(
                FieldPath::new("script.target"),
                format!("unknown target `{}`", self.target),
                format!("expected one of: {}", KNOWN_TARGETS.join(", ")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_script_defaults() {
        let config = test_parse_config("");
        assert!(config.script.enable);
        assert_eq!(config.script.target, "es2015");
        assert!(config.script.mangle);
        assert!(config.script.lint);
    }

    #[test]
    fn test_script_disable() {
        let config = test_parse_config("[script]\nenable = false");
        assert!(!config.script.enable);
    }

    #[test]
    fn test_script_validate_target() {
        let mut diag = ConfigDiagnostics::new();
        test_parse_config("[script]\ntarget = \"ES2020\"")
            .script
            .validate(&mut diag);
        assert!(!diag.has_errors());

        let mut diag = ConfigDiagnostics::new();
        test_parse_config("[script]\ntarget = \"es1999\"")
            .script
            .validate(&mut diag);
        assert!(diag.has_errors());
    }
}
