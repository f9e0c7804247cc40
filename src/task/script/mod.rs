//! Script task.
//!
//! ```text
//! src/js/**/*.js --concat--> IIFE --parse--> transform (target)
//!     --lint--> minify (compress + mangle) --codegen + map--> dest/js/main.min.js
//! ```
//!
//! Read, parse and transform errors are logged; nothing is written and the
//! run continues with the next task.

mod bundle;
pub mod lint;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{EngineTargets, TransformOptions, Transformer};

use crate::config::ScriptConfig;
use crate::core::BuildContext;
use crate::pipeline::source;
use crate::task::{Task, TaskError, TaskReport, map_path_for, write_output};
use bundle::Bundle;
use lint::ScriptFinding;

/// Fixed output basename under `dest/js`.
pub const OUTPUT_NAME: &str = "main.min.js";

/// Source name recorded in the map for the concatenated bundle.
const BUNDLE_NAME: &str = "main.js";

pub struct ScriptTask;

impl Task for ScriptTask {
    fn name(&self) -> &'static str {
        "script"
    }

    fn run(&self, ctx: &BuildContext) -> Result<TaskReport> {
        let paths = ctx.paths();
        source::require_root(&paths.src)?;

        let files = source::collect(&paths.script_dir(), "js");
        let mut report = TaskReport::default();
        if files.is_empty() {
            return Ok(report);
        }

        let mut sources = Vec::with_capacity(files.len());
        for file in &files {
            match fs::read_to_string(file) {
                Ok(content) => sources.push((PathBuf::from(ctx.config.root_relative(file)), content)),
                Err(e) => {
                    let err = TaskError::compile(ctx.config.root_relative(file), e);
                    crate::log!("error"; "{}", err);
                    report.failed = files.clone();
                    return Ok(report);
                }
            }
        }
        let bundle = Bundle::concat(&sources);

        let compiled = match compile(&bundle, &ctx.config.script) {
            Ok(compiled) => compiled,
            Err(message) => {
                let err = TaskError::compile(ctx.config.root_relative(paths.script_dir()), message);
                crate::log!("error"; "{}", err);
                report.failed = files;
                return Ok(report);
            }
        };

        report.lint_warnings = compiled.findings.len();
        print_findings(&bundle, &compiled.findings);

        let js_path = paths.js_dir().join(OUTPUT_NAME);
        let map_path = map_path_for(&js_path);
        let code = format!("{}\n//# sourceMappingURL={OUTPUT_NAME}.map\n", compiled.code.trim_end());
        write_output(&js_path, code)?;
        write_output(&map_path, &compiled.map)?;

        crate::debug!("script"; "bundled {} files into {}", bundle.file_count(), ctx.config.root_relative(&js_path));
        ctx.live.reload(ctx.config.root_relative(&js_path));

        report.outputs.push(js_path);
        report.outputs.push(map_path);
        Ok(report)
    }
}

struct CompiledScript {
    code: String,
    map: String,
    findings: Vec<ScriptFinding>,
}

/// Parse, transpile, lint, minify and print the bundle.
fn compile(bundle: &Bundle, config: &ScriptConfig) -> Result<CompiledScript, String> {
    let target_name = config.target.to_ascii_lowercase();
    let target = EngineTargets::from_target(&target_name)?;
    let transform_options = TransformOptions::from_target(&target_name)?;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &bundle.code, SourceType::cjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(err.to_string());
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let ret = Transformer::new(&allocator, Path::new(BUNDLE_NAME), &transform_options)
        .build_with_scoping(scoping, &mut program);
    if let Some(err) = ret.errors.first() {
        return Err(err.to_string());
    }

    let findings = if config.lint {
        lint::lint_program(&program)
    } else {
        Vec::new()
    };

    let options = MinifierOptions {
        mangle: config.mangle.then(MangleOptions::default),
        compress: Some(CompressOptions {
            target,
            ..CompressOptions::smallest()
        }),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);

    let ret = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: Some(PathBuf::from(BUNDLE_NAME)),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    let map = ret.map.map(|m| m.to_json_string()).unwrap_or_default();
    Ok(CompiledScript {
        code: ret.code,
        map,
        findings,
    })
}

fn print_findings(bundle: &Bundle, findings: &[ScriptFinding]) {
    for finding in findings {
        match bundle.locate(finding.offset) {
            Some((file, line)) => crate::log!(
                "lint";
                "{}:{}  warning  {}  {}",
                file.display(),
                line,
                finding.message,
                finding.rule
            ),
            None => crate::log!("lint"; "warning  {}  {}", finding.message, finding.rule),
        }
    }
}
