//! `[style]` section configuration.
//!
//! ```toml
//! [style]
//! enable = true
//! compiler = ["sass"]             # command used to compile one entry
//!
//! [style.targets]                 # browsers to prefix for (major[.minor])
//! chrome = "80"
//! safari = "13.1"
//!
//! [style.lint]
//! enable = true
//!
//! [style.lint.rules]              # 0 = off, 1 = warning, 2 = error
//! no-ids = 1
//! indentation = 2
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stylesheet build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub enable: bool,

    /// Compiler command; the entry path is appended as the last argument.
    pub compiler: Vec<String>,

    /// Browser name to minimum version, fed to the prefixer.
    pub targets: BTreeMap<String, String>,

    pub lint: StyleLintConfig,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let targets = [
            ("chrome", "80"),
            ("edge", "88"),
            ("firefox", "78"),
            ("ios_saf", "13"),
            ("safari", "13"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            enable: true,
            compiler: vec!["sass".to_string()],
            targets,
            lint: StyleLintConfig::default(),
        }
    }
}

/// Browsers the prefixer understands.
pub const KNOWN_BROWSERS: &[&str] = &[
    "android", "chrome", "edge", "firefox", "ie", "ios_saf", "opera", "safari", "samsung",
];

impl StyleConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.compiler.first().is_none_or(|program| program.trim().is_empty()) {
            diag.error_with_hint(
                FieldPath::new("style.compiler"),
                "compiler command must not be empty",
                "use `compiler = [\"sass\"]`",
            );
        }

        for (browser, version) in &self.targets {
            if !KNOWN_BROWSERS.contains(&browser.as_str()) {
                diag.error_with_hint(
                    FieldPath::new("style.targets"),
                    format!("unknown browser `{browser}`"),
                    format!("expected one of: {}", KNOWN_BROWSERS.join(", ")),
                );
            } else if parse_browser_version(version).is_none() {
                diag.error(
                    FieldPath::new("style.targets"),
                    format!("invalid version `{version}` for `{browser}`"),
                );
            }
        }

        self.lint.validate(diag);
    }
}

/// Encode `major[.minor[.patch]]` the way the prefixer expects it:
/// `major << 16 | minor << 8 | patch`.
pub fn parse_browser_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map_or(Some(0), |s| s.parse().ok())?;
    let patch: u32 = parts.next().map_or(Some(0), |s| s.parse().ok())?;
    if parts.next().is_some() || major > 0xff || minor > 0xff || patch > 0xff {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}

// ============================================================================
// lint
// ============================================================================

/// Style lint rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintRule {
    NoIds,
    NoMergeableSelectors,
    FinalNewline,
    Indentation,
    NoImportant,
    NoTrailingWhitespace,
}

impl LintRule {
    pub const ALL: [Self; 6] = [
        Self::NoIds,
        Self::NoMergeableSelectors,
        Self::FinalNewline,
        Self::Indentation,
        Self::NoImportant,
        Self::NoTrailingWhitespace,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::NoIds => "no-ids",
            Self::NoMergeableSelectors => "no-mergeable-selectors",
            Self::FinalNewline => "final-newline",
            Self::Indentation => "indentation",
            Self::NoImportant => "no-important",
            Self::NoTrailingWhitespace => "no-trailing-whitespace",
        }
    }

    pub const fn default_severity(self) -> u8 {
        match self {
            Self::FinalNewline | Self::Indentation => 0,
            _ => 1,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.name() == name)
    }
}

/// `[style.lint]` settings. Rules not listed keep their default severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleLintConfig {
    pub enable: bool,
    pub rules: BTreeMap<String, u8>,
}

impl Default for StyleLintConfig {
    fn default() -> Self {
        Self {
            enable: true,
            rules: BTreeMap::new(),
        }
    }
}

impl StyleLintConfig {
    /// Effective severity of a rule (0 off, 1 warning, 2 error).
    pub fn severity(&self, rule: LintRule) -> u8 {
        self.rules
            .get(rule.name())
            .copied()
            .unwrap_or_else(|| rule.default_severity())
    }

    fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (name, severity) in &self.rules {
            if LintRule::from_name(name).is_none() {
                diag.warn(
                    FieldPath::new("style.lint.rules"),
                    format!("unknown rule `{name}` is ignored"),
                );
            }
            if *severity > 2 {
                diag.error_with_hint(
                    FieldPath::new("style.lint.rules"),
                    format!("invalid severity {severity} for `{name}`"),
                    "use 0 (off), 1 (warning) or 2 (error)",
                );
            }
        }
    }
}
