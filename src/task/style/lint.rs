//! Rule-based linter for the indented Sass syntax.
//!
//! A line is treated as a selector when the next non-blank line is
//! indented deeper. Comment lines are skipped by every content rule.

use std::collections::BTreeMap;

use owo_colors::OwoColorize;
use rustc_hash::FxHashSet;

use crate::config::{LintRule, StyleLintConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// 0 is off.
    fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => None,
            1 => Some(Self::Warning),
            _ => Some(Self::Error),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub rule: LintRule,
    pub message: String,
}

/// Findings grouped by display path.
#[derive(Debug, Default)]
pub struct LintReport {
    pub files: BTreeMap<String, Vec<LintFinding>>,
}

impl LintReport {
    pub fn add(&mut self, file: String, findings: Vec<LintFinding>) {
        if !findings.is_empty() {
            self.files.insert(file, findings);
        }
    }

    fn count(&self, severity: Severity) -> usize {
        self.files
            .values()
            .flatten()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stylish output: file header, one row per finding, summary line.
    pub fn print(&self) {
        if self.is_empty() {
            return;
        }

        for (file, findings) in &self.files {
            eprintln!();
            eprintln!("{}", file.underline());
            for f in findings {
                let severity = match f.severity {
                    Severity::Warning => f.severity.as_str().yellow().to_string(),
                    Severity::Error => f.severity.as_str().red().to_string(),
                };
                eprintln!(
                    "  {}  {}  {}  {}",
                    format!("{}:{}", f.line, f.column).dimmed(),
                    severity,
                    f.message,
                    f.rule.name().dimmed()
                );
            }
        }
        eprintln!();

        let summary = self.summary();
        if self.error_count() > 0 {
            eprintln!("{}", summary.red().bold());
        } else {
            eprintln!("{}", summary.yellow().bold());
        }
    }

    /// `✖ 3 problems (1 error, 2 warnings)`
    pub fn summary(&self) -> String {
        let errors = self.error_count();
        let warnings = self.warning_count();
        let total = errors + warnings;
        format!(
            "✖ {total} problem{} ({errors} error{}, {warnings} warning{})",
            plural_s(total),
            plural_s(errors),
            plural_s(warnings)
        )
    }
}

fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Lint one indented-syntax source.
pub fn lint_source(source: &str, config: &StyleLintConfig) -> Vec<LintFinding> {
    let mut linter = Linter {
        config,
        findings: Vec::new(),
    };
    linter.check(source);
    linter.findings
}

struct Linter<'a> {
    config: &'a StyleLintConfig,
    findings: Vec<LintFinding>,
}

impl Linter<'_> {
    fn report(&mut self, rule: LintRule, line: usize, column: usize, message: impl Into<String>) {
        if let Some(severity) = Severity::from_level(self.config.severity(rule)) {
            self.findings.push(LintFinding {
                line,
                column,
                severity,
                rule,
                message: message.into(),
            });
        }
    }

    fn check(&mut self, source: &str) {
        let lines: Vec<&str> = source
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();

        // Selectors seen under the current parent, keyed by indentation
        let mut siblings: Vec<(usize, FxHashSet<String>)> = Vec::new();

        for (idx, raw) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let content = raw.trim_start();
            let indent = raw.len() - content.len();

            if raw.ends_with([' ', '\t']) && !content.is_empty() {
                let column = raw.trim_end().len() + 1;
                self.report(
                    LintRule::NoTrailingWhitespace,
                    line_no,
                    column,
                    "Trailing whitespace",
                );
            }

            let content = content.trim_end();
            if content.is_empty() {
                continue;
            }

            let leading = &raw[..indent];
            if leading.contains('\t') {
                self.report(LintRule::Indentation, line_no, 1, "Indentation must use spaces");
            } else if indent % 2 != 0 {
                self.report(
                    LintRule::Indentation,
                    line_no,
                    1,
                    format!("Expected indentation to be a multiple of 2, found {indent}"),
                );
            }

            if is_comment(content) {
                continue;
            }

            if let Some(pos) = content.find("!important") {
                self.report(
                    LintRule::NoImportant,
                    line_no,
                    indent + pos + 1,
                    "!important should not be used",
                );
            }

            while siblings.last().is_some_and(|(level, _)| *level > indent) {
                siblings.pop();
            }

            if !opens_block(&lines, idx, indent) || is_directive(content) {
                continue;
            }

            if let Some(pos) = find_id_selector(content) {
                self.report(
                    LintRule::NoIds,
                    line_no,
                    indent + pos + 1,
                    "Id selectors should not be used",
                );
            }

            if siblings.last().is_none_or(|(level, _)| *level != indent) {
                siblings.push((indent, FxHashSet::default()));
            }
            if let Some((_, seen)) = siblings.last_mut()
                && !seen.insert(normalize_selector(content))
            {
                self.report(
                    LintRule::NoMergeableSelectors,
                    line_no,
                    indent + 1,
                    format!("Rule `{content}` should be merged with its duplicate"),
                );
            }
        }

        if !source.is_empty() && !source.ends_with('\n') {
            let last = lines.len();
            let column = lines.last().map_or(0, |l| l.len()) + 1;
            self.report(LintRule::FinalNewline, last, column, "Files must end with a new line");
        }
    }
}

fn is_comment(content: &str) -> bool {
    content.starts_with("//") || content.starts_with("/*") || content.starts_with('*')
}

/// At-rules, mixin definitions and includes open blocks but are not selectors.
fn is_directive(content: &str) -> bool {
    content.starts_with(['@', '=', '+', '$'])
}

/// The next non-blank line is indented deeper than `indent`.
fn opens_block(lines: &[&str], idx: usize, indent: usize) -> bool {
    lines[idx + 1..]
        .iter()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|next| next.len() - next.trim_start().len() > indent)
}

/// Byte offset of the first `#id` in a selector, skipping `#{...}`
/// interpolation.
fn find_id_selector(selector: &str) -> Option<usize> {
    let bytes = selector.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        let next = bytes.get(i + 1).copied()?;
        (b == b'#' && (next.is_ascii_alphabetic() || next == b'_' || next == b'-')).then_some(i)
    })
}

fn normalize_selector(selector: &str) -> String {
    selector.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn lint(source: &str) -> Vec<LintFinding> {
        lint_source(source, &StyleLintConfig::default())
    }

    fn rules(findings: &[LintFinding]) -> Vec<(&'static str, usize)> {
        findings.iter().map(|f| (f.rule.name(), f.line)).collect()
    }

    #[test]
    fn test_clean_source() {
        let source = "$primary: #333\n\n.nav\n  color: $primary\n  a\n    margin: 0\n";
        assert!(lint(source).is_empty());
    }

    #[test]
    fn test_no_ids() {
        let findings = lint("#header\n  color: red\n.nav\n  &#{$x}\n    margin: 0\n");
        assert_eq!(rules(&findings), vec![("no-ids", 1)]);
        assert_eq!(findings[0].column, 1);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_hex_color_is_not_id() {
        assert!(lint("a\n  color: #fff\n").is_empty());
    }

    #[test]
    fn test_no_mergeable_selectors() {
        let source = ".a\n  color: red\n.b\n  color: blue\n.a\n  margin: 0\n";
        assert_eq!(rules(&lint(source)), vec![("no-mergeable-selectors", 5)]);
    }

    #[test]
    fn test_same_selector_under_different_parents() {
        let source = ".a\n  span\n    color: red\n.b\n  span\n    color: blue\n";
        assert!(lint(source).is_empty());
    }

    #[test]
    fn test_no_important() {
        let findings = lint("a\n  color: red !important\n");
        assert_eq!(rules(&findings), vec![("no-important", 2)]);
        assert_eq!(findings[0].column, 14);
    }

    #[test]
    fn test_trailing_whitespace() {
        let findings = lint("a  \n  color: red\n");
        assert_eq!(rules(&findings), vec![("no-trailing-whitespace", 1)]);
        assert_eq!(findings[0].column, 2);
    }

    #[test]
    fn test_off_by_default_rules() {
        assert!(lint("a\n   color: red").is_empty());
    }

    #[test]
    fn test_enabled_indentation_and_final_newline() {
        let config = test_parse_config(
            "[style.lint.rules]\nindentation = 2\nfinal-newline = 1",
        );
        let findings = lint_source("a\n   color: red\nb\n\tcolor: blue", &config.style.lint);
        assert_eq!(
            rules(&findings),
            vec![("indentation", 2), ("indentation", 4), ("final-newline", 4)]
        );
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[2].severity, Severity::Warning);
    }

    #[test]
    fn test_comments_skipped() {
        assert!(lint("// #id !important\na\n  color: red\n").is_empty());
    }

    #[test]
    fn test_report_summary() {
        let mut report = LintReport::default();
        report.add("src/sass/a.sass".into(), lint("#a\n  color: red\n"));
        report.add("src/sass/b.sass".into(), Vec::new());
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.summary(), "✖ 1 problem (0 errors, 1 warning)");
    }
}
