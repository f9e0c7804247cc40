//! `build` command: run the pipeline once and exit.

use std::sync::Arc;

use anyhow::Result;

use crate::config::AssetConfig;
use crate::core::BuildContext;
use crate::log;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::reload::LiveReload;

/// Build every enabled task into the output directory.
pub fn build_assets(config: Arc<AssetConfig>) -> Result<PipelineReport> {
    let ctx = BuildContext::new(config, LiveReload::disabled());
    let pipeline = Pipeline::build(&ctx.config);
    crate::debug!("build"; "steps: {}", pipeline.step_names().join(" -> "));

    let report = pipeline.run(&ctx)?;
    log_summary(&ctx.config, &report);
    Ok(report)
}

/// One line per run, plus any skipped entries.
pub fn log_summary(config: &AssetConfig, report: &PipelineReport) {
    let failed: Vec<_> = report
        .steps
        .iter()
        .flat_map(|(_, r)| &r.failed)
        .map(|p| config.root_relative(p))
        .collect();
    let (warnings, errors) = report.steps.iter().fold((0, 0), |(w, e), (_, r)| {
        (w + r.lint_warnings, e + r.lint_errors)
    });

    let count = report.output_count();
    log!(
        "build";
        "wrote {} file{} in {}ms",
        count,
        if count == 1 { "" } else { "s" },
        report.elapsed.as_millis()
    );
    if warnings + errors > 0 {
        log!("lint"; "{} error(s), {} warning(s)", errors, warnings);
    }
    if !failed.is_empty() {
        log!("build"; "skipped: {}", failed.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::task::test_support::write;
    use tempfile::TempDir;

    #[test]
    fn test_build_empty_source_tree() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        let config = Arc::new(test_config_at(dir.path()));

        let report = build_assets(config).unwrap();
        assert_eq!(report.output_count(), 0);
        assert!(!dir.path().join("dest").exists());
    }

    #[test]
    fn test_build_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(test_config_at(dir.path()));
        assert!(build_assets(config).is_err());
    }

    #[test]
    fn test_build_markup_and_script() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/index.html", "<p>  hello  </p>\n");
        write(dir.path(), "src/js/app.js", "var answer = 42;\n");
        let config = Arc::new(test_config_at(dir.path()));

        let report = build_assets(config).unwrap();
        assert_eq!(report.step("markup").unwrap().outputs.len(), 1);
        assert_eq!(report.step("script").unwrap().outputs.len(), 2);
        assert!(dir.path().join("dest/js/main.min.js").is_file());
    }
}
