//! Per-invocation build context handed to every task.

use std::sync::Arc;

use crate::config::{AssetConfig, PathsConfig};
use crate::reload::LiveReload;
use crate::task::style::{SassCommand, StyleCompiler};

/// Everything a task needs: configuration, the style compiler and the
/// live reload handle. Created once per `build` or `dev` invocation.
pub struct BuildContext {
    pub config: Arc<AssetConfig>,
    pub compiler: Box<dyn StyleCompiler>,
    pub live: LiveReload,
}

impl BuildContext {
    /// Context using the configured `sass` command.
    pub fn new(config: Arc<AssetConfig>, live: LiveReload) -> Self {
        let compiler = Box::new(SassCommand::from_config(&config));
        Self {
            config,
            compiler,
            live,
        }
    }

    /// Replace the style compiler.
    pub fn with_compiler(mut self, compiler: Box<dyn StyleCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    #[inline]
    pub fn paths(&self) -> &PathsConfig {
        &self.config.paths
    }
}
