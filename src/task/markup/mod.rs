//! Markup task: minify each top-level `src/*.html` into `dest/`.
//!
//! A file that cannot be read as UTF-8 or parsed aborts the pipeline run
//! with `TaskError::Minify`.

pub mod minify;

use std::fs;

use anyhow::{Context, Result};

use crate::core::BuildContext;
use crate::pipeline::source;
use crate::task::{Task, TaskError, TaskReport, write_output};

pub struct MarkupTask;

impl Task for MarkupTask {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn run(&self, ctx: &BuildContext) -> Result<TaskReport> {
        let paths = ctx.paths();
        source::require_root(&paths.src)?;

        let mut report = TaskReport::default();
        for file in source::collect_top_level(&paths.src, "html") {
            let bytes =
                fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let relative = ctx.config.root_relative(&file);

            let html = String::from_utf8(bytes).map_err(|e| TaskError::minify(&relative, e))?;
            let minified = minify::minify(&html, &ctx.config.markup)
                .map_err(|e| TaskError::minify(&relative, e))?;

            let Some(name) = file.file_name() else {
                continue;
            };
            let output = paths.dest.join(name);
            write_output(&output, minified)?;
            crate::debug!("markup"; "{} -> {}", relative, ctx.config.root_relative(&output));
            report.outputs.push(output);
        }

        Ok(report)
    }
}
