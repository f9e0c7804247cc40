//! Build pipeline: an ordered list of named steps run one after another.
//!
//! ```text
//! script.enable = true:   ScriptTask -> MarkupTask -> StyleTask
//! script.enable = false:  MarkupTask -> StyleTask
//! ```
//!
//! A step returning an error aborts the remaining steps of that run.

pub mod source;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::AssetConfig;
use crate::core::BuildContext;
use crate::task::{MarkupTask, ScriptTask, StyleTask, Task, TaskReport};

/// Declarative step list.
pub struct Pipeline {
    name: &'static str,
    steps: Vec<Box<dyn Task>>,
}

/// Per-step reports of one completed run.
#[derive(Debug)]
pub struct PipelineReport {
    pub steps: Vec<(&'static str, TaskReport)>,
    pub elapsed: Duration,
}

impl PipelineReport {
    /// Total number of files written.
    pub fn output_count(&self) -> usize {
        self.steps.iter().map(|(_, r)| r.outputs.len()).sum()
    }

    pub fn step(&self, name: &str) -> Option<&TaskReport> {
        self.steps.iter().find(|(n, _)| *n == name).map(|(_, r)| r)
    }
}

impl Pipeline {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step(mut self, task: impl Task + 'static) -> Self {
        self.steps.push(Box::new(task));
        self
    }

    /// The build pipeline for `config`, skipping disabled tasks.
    pub fn build(config: &AssetConfig) -> Self {
        let mut pipeline = Self::new("build");
        if config.script.enable {
            pipeline = pipeline.step(ScriptTask);
        }
        if config.markup.enable {
            pipeline = pipeline.step(MarkupTask);
        }
        if config.style.enable {
            pipeline = pipeline.step(StyleTask);
        }
        pipeline
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order, stopping at the first error.
    pub fn run(&self, ctx: &BuildContext) -> Result<PipelineReport> {
        let start = Instant::now();
        let mut steps = Vec::with_capacity(self.steps.len());

        for task in &self.steps {
            crate::debug!(self.name; "running {}", task.name());
            let report = task
                .run(ctx)
                .with_context(|| format!("{} failed", task.name()))?;
            steps.push((task.name(), report));
        }

        Ok(PipelineReport {
            steps,
            elapsed: start.elapsed(),
        })
    }
}
