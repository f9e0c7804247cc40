//! Stylesheet task.
//!
//! ```text
//! src/sass/**/*.sass --lint--> report
//!                    --compile (entries only)--> concat --lightningcss--> dest/css/style.min.css
//! ```
//!
//! A failing entry is logged and skipped; the others still compile. After a
//! write, connected browsers re-fetch the stylesheet in place.

mod compile;
pub mod lint;
mod process;

pub use compile::{SassCommand, StyleCompiler};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::BuildContext;
use crate::pipeline::source;
use crate::task::{Task, TaskError, TaskReport, map_path_for, write_output};
use lint::LintReport;

/// Fixed output basename under `dest/css`.
pub const OUTPUT_NAME: &str = "style.min.css";
/// URL the browser loads the stylesheet from.
pub const OUTPUT_HREF: &str = "/css/style.min.css";

pub struct StyleTask;

impl Task for StyleTask {
    fn name(&self) -> &'static str {
        "style"
    }

    fn run(&self, ctx: &BuildContext) -> Result<TaskReport> {
        let paths = ctx.paths();
        source::require_root(&paths.src)?;

        let files = source::collect(&paths.style_dir(), "sass");
        let mut report = TaskReport::default();
        if files.is_empty() {
            return Ok(report);
        }

        let lint = lint_files(ctx, &files);
        lint.print();
        report.lint_warnings = lint.warning_count();
        report.lint_errors = lint.error_count();

        let mut entries = Vec::new();
        let mut compiled = Vec::new();
        for entry in files.iter().filter(|p| !source::is_partial(p)) {
            match ctx.compiler.compile(entry) {
                Ok(css) => {
                    entries.push(process::EntryCss {
                        name: ctx.config.root_relative(entry),
                        css,
                    });
                    compiled.push(entry);
                }
                Err(e) => skip_entry(ctx, &mut report, entry, e),
            }
        }

        if entries.is_empty() {
            crate::debug!("style"; "no entries compiled, nothing written");
            return Ok(report);
        }

        let targets = process::browser_targets(&ctx.config.style.targets);
        let bundle = match process::bundle(&entries, targets) {
            Ok(bundle) => bundle,
            Err(e) => {
                let err = TaskError::compile(ctx.config.root_relative(paths.style_dir()), e);
                crate::log!("error"; "{}", err);
                report.failed.extend(compiled.into_iter().cloned());
                return Ok(report);
            }
        };
        let written = entries.len() - bundle.rejected.len();
        for (index, e) in bundle.rejected {
            skip_entry(ctx, &mut report, compiled[index], e);
        }
        let Some(out) = bundle.output else {
            crate::debug!("style"; "no entries processed, nothing written");
            return Ok(report);
        };

        let css_path = paths.css_dir().join(OUTPUT_NAME);
        let map_path = map_path_for(&css_path);
        let code = format!("{}\n/*# sourceMappingURL={OUTPUT_NAME}.map */\n", out.code);
        write_output(&css_path, code)?;
        write_output(&map_path, &out.map)?;

        crate::debug!("style"; "wrote {} ({} entries)", ctx.config.root_relative(&css_path), written);
        ctx.live.stream(OUTPUT_HREF);

        report.outputs.push(css_path);
        report.outputs.push(map_path);
        Ok(report)
    }
}

/// Log a failed entry and leave it out of the output.
fn skip_entry(ctx: &BuildContext, report: &mut TaskReport, entry: &Path, e: anyhow::Error) {
    let err = TaskError::compile(ctx.config.root_relative(entry), e);
    crate::log!("error"; "{}", err);
    report.failed.push(entry.to_path_buf());
}

fn lint_files(ctx: &BuildContext, files: &[PathBuf]) -> LintReport {
    let mut report = LintReport::default();
    let config = &ctx.config.style.lint;
    if !config.enable {
        return report;
    }

    for file in files {
        match fs::read_to_string(file) {
            Ok(content) => {
                let findings = lint::lint_source(&content, config);
                report.add(ctx.config.root_relative(file), findings);
            }
            Err(e) => crate::log!("lint"; "failed to read {}: {}", file.display(), e),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::{LiveReload, ReloadMsg};
    use crate::task::test_support::{context, write};
    use tempfile::TempDir;

    #[test]
    fn test_compiles_entries_skips_partials() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/_vars.sass", ".partial { color: red; }\n");
        write(root, "src/sass/b.sass", ".b { color: blue; }\n");
        write(root, "src/sass/a.sass", ".a { margin: 0px; }\n");
        let ctx = context(root, LiveReload::disabled());

        let report = StyleTask.run(&ctx).unwrap();
        let css = fs::read_to_string(root.join("dest/css/style.min.css")).unwrap();
        assert_eq!(
            css,
            ".a{margin:0}.b{color:#00f}\n/*# sourceMappingURL=style.min.css.map */\n"
        );
        assert!(root.join("dest/css/style.min.css.map").is_file());
        assert_eq!(report.outputs.len(), 2);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_output_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/main.sass", ".box { display: flex; user-select: none; }\n");
        let ctx = context(root, LiveReload::disabled());
        let out = root.join("dest/css/style.min.css");

        StyleTask.run(&ctx).unwrap();
        let first = fs::read(&out).unwrap();
        let first_map = fs::read(map_path_for(&out)).unwrap();
        StyleTask.run(&ctx).unwrap();
        assert_eq!(first, fs::read(&out).unwrap());
        assert_eq!(first_map, fs::read(map_path_for(&out)).unwrap());
    }

    #[test]
    fn test_failed_entry_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/bad.sass", "@error broken\n");
        write(root, "src/sass/good.sass", ".ok { color: red; }\n");
        let ctx = context(root, LiveReload::disabled());

        let report = StyleTask.run(&ctx).unwrap();
        assert_eq!(report.failed, vec![root.join("src/sass/bad.sass")]);
        let css = fs::read_to_string(root.join("dest/css/style.min.css")).unwrap();
        assert!(css.starts_with(".ok{color:red}"));
    }

    #[test]
    fn test_invalid_css_entry_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/a_bad.sass", ".x { color: red; } @import \"late.css\";\n");
        write(root, "src/sass/b_good.sass", ".ok { color: red; }\n");
        let ctx = context(root, LiveReload::disabled());

        let report = StyleTask.run(&ctx).unwrap();
        assert_eq!(report.failed, vec![root.join("src/sass/a_bad.sass")]);
        let css = fs::read_to_string(root.join("dest/css/style.min.css")).unwrap();
        assert!(css.starts_with(".ok{color:red}\n"), "{css}");
    }

    #[test]
    fn test_import_in_later_entry() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/a.sass", ".a { color: red; }\n");
        write(root, "src/sass/b.sass", "@import url(\"fonts.css\");\n.b { margin: 0; }\n");
        let ctx = context(root, LiveReload::disabled());

        let report = StyleTask.run(&ctx).unwrap();
        assert!(report.failed.is_empty());
        let css = fs::read_to_string(root.join("dest/css/style.min.css")).unwrap();
        assert!(css.starts_with("@import"), "{css}");
        assert!(css.contains(".a{color:red}.b{margin:0}"), "{css}");
    }

    #[test]
    fn test_no_entries_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/_only_partial.sass", "a { color: red; }\n");
        let (live, mut rx) = LiveReload::channel();
        let ctx = context(root, live);

        let report = StyleTask.run(&ctx).unwrap();
        assert!(report.is_empty());
        assert!(!root.join("dest").exists());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_streams_after_write() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/main.sass", "a { color: red; }\n");
        let (live, mut rx) = LiveReload::channel();
        let ctx = context(root, live);

        StyleTask.run(&ctx).unwrap();
        match rx.try_recv() {
            Ok(ReloadMsg::Stream { href }) => assert_eq!(href, OUTPUT_HREF),
            other => panic!("expected stream, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_lint_counts_do_not_fail() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/sass/main.sass", "#main { color: red !important; }\n");
        let ctx = context(root, LiveReload::disabled());

        let report = StyleTask.run(&ctx).unwrap();
        assert_eq!(report.lint_warnings, 1);
        assert_eq!(report.outputs.len(), 2);
    }

    #[test]
    fn test_missing_source_root() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), LiveReload::disabled());
        let err = StyleTask.run(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::MissingSource(_))
        ));
    }
}
