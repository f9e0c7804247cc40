//! Watch loop: rebuilds on source changes and reloads connected browsers.
//!
//! ```text
//! notify thread --> Debouncer (quiet period, cooldown, dedup)
//!               --> SourcePatterns filter --> Pipeline (spawn_blocking)
//!               --> one full reload
//! ```
//!
//! The watcher is attached before the caller runs its first build, so edits
//! made during that build are buffered instead of lost.

mod debouncer;
mod types;
mod watch_roots;


use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel;
use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use crate::core::BuildContext;
use crate::log;
use crate::pipeline::source::SourcePatterns;
use crate::pipeline::{Pipeline, PipelineReport};
use debouncer::Debouncer;
use types::ChangeBatch;
use watch_roots::WatchRoots;

/// How often the loop checks for Ctrl+C and missing watch roots.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

pub struct WatchLoop {
    /// notify callback -> bridge thread
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to arrive
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    debouncer: Debouncer,
    patterns: SourcePatterns,
    pipeline: Arc<Pipeline>,
    ctx: Arc<BuildContext>,
}

impl WatchLoop {
    /// Start watching `<src>` immediately; events buffer until [`run`](Self::run).
    pub fn new(ctx: Arc<BuildContext>) -> Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create file watcher")?;

        let src = ctx.paths().src.clone();
        let mut watch_roots = WatchRoots::new(vec![src.clone()]);
        watch_roots
            .attach_existing(&mut watcher)
            .with_context(|| format!("failed to watch {}", src.display()))?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            debouncer: Debouncer::new(&ctx.config.watch),
            patterns: SourcePatterns::new(&src)?,
            pipeline: Arc::new(Pipeline::build(&ctx.config)),
            ctx,
        })
    }

    /// Process batches until `shutdown` fires or Ctrl+C is seen.
    pub async fn run(self, shutdown: channel::Receiver<()>) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            mut debouncer,
            patterns,
            pipeline,
            ctx,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        let bridge = std::thread::Builder::new()
            .name("assetflow-notify".into())
            .spawn(move || {
                while let Ok(result) = notify_rx.recv() {
                    match result {
                        Ok(event) => {
                            if async_tx.blocking_send(event).is_err() {
                                break;
                            }
                        }
                        Err(e) => log!("watch"; "notify error: {}", e),
                    }
                }
            });
        if let Err(e) = bridge {
            log!("watch"; "failed to start watcher thread: {}", e);
            return;
        }

        log!("watch"; "watching {}", ctx.config.root_relative(&ctx.paths().src));
        let mut poll = tokio::time::interval(SHUTDOWN_POLL);

        loop {
            tokio::select! {
                biased;
                _ = poll.tick() => {
                    if shutdown.try_recv().is_ok() || crate::core::is_shutdown() {
                        break;
                    }
                    watch_roots.maintain(&mut watcher);
                }
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                () = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if let Some(batch) = debouncer.take_if_ready() {
                        if batch.paths().any(|p| patterns.matches(p)) {
                            debouncer.mark_built();
                        }
                        handle_changes(batch, &patterns, &pipeline, &ctx).await;
                    }
                }
            }
        }

        crate::logger::status_detach();
        crate::debug!("watch"; "stopped");
    }
}

/// Rebuild for one debounced batch, then ask browsers for a full reload.
///
/// Reloads requested by tasks are held back during the run so the batch
/// produces exactly one. Returns `None` when nothing in the batch is a build
/// input or the run failed.
async fn handle_changes(
    batch: ChangeBatch,
    patterns: &SourcePatterns,
    pipeline: &Arc<Pipeline>,
    ctx: &Arc<BuildContext>,
) -> Option<PipelineReport> {
    let relevant: Vec<_> = batch.paths().filter(|p| patterns.matches(p)).collect();
    let Some(first) = relevant.first() else {
        crate::debug!("watch"; "ignoring {} change(s) outside build inputs", batch.len());
        return None;
    };

    let reason = match relevant.len() {
        1 => ctx.config.root_relative(first),
        n => format!("{} (+{} more)", ctx.config.root_relative(first), n - 1),
    };
    for (path, kind) in &batch.0 {
        crate::debug!("watch"; "{}: {}", kind.label(), ctx.config.root_relative(path));
    }

    let run_pipeline = Arc::clone(pipeline);
    let run_ctx = Arc::clone(ctx);
    let hold = ctx.live.hold_reloads();
    let result = tokio::task::spawn_blocking(move || run_pipeline.run(&run_ctx)).await;
    drop(hold);

    match result {
        Ok(Ok(report)) => {
            let skipped: Vec<_> = report
                .steps
                .iter()
                .flat_map(|(_, r)| &r.failed)
                .map(|p| ctx.config.root_relative(p))
                .collect();
            if skipped.is_empty() {
                crate::logger::status_success(&format!(
                    "{} changed, rebuilt in {}ms",
                    reason,
                    report.elapsed.as_millis()
                ));
            } else {
                crate::logger::status_warning(&format!(
                    "{} changed, rebuilt without {}",
                    reason,
                    skipped.join(", ")
                ));
            }
            ctx.live.reload(reason);
            Some(report)
        }
        Ok(Err(e)) => {
            crate::logger::status_error(&format!("{reason} changed, build failed"), &format!("{e:#}"));
            None
        }
        Err(e) => {
            log!("watch"; "build task panicked: {}", e);
            None
        }
    }
}
