//! `dev` command: build, serve `dest`, rebuild on change.
//!
//! ```text
//! main thread:  watcher attached -> first build -> serve::start -> block_on(watch loop)
//! tokio:        WatchLoop, ReloadHub
//! threads:      HTTP request loop (+ rayon pool), WebSocket acceptor, notify bridge
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::AssetConfig;
use crate::core::BuildContext;
use crate::pipeline::Pipeline;
use crate::reload::LiveReload;
use crate::watch::WatchLoop;
use crate::{log, serve};

/// Run the dev session until Ctrl+C.
pub fn dev(config: Arc<AssetConfig>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("assetflow-rt")
        .build()
        .context("failed to start async runtime")?;

    let (live, hub_rx) = LiveReload::channel();
    let ctx = Arc::new(BuildContext::new(Arc::clone(&config), live.clone()));

    // Attached before the first build so its edits are buffered
    let watch = WatchLoop::new(Arc::clone(&ctx))?;

    match Pipeline::build(&config).run(&ctx) {
        Ok(report) => super::build::log_summary(&config, &report),
        Err(e) => log!("build"; "initial build failed: {:#}", e),
    }

    let server = serve::start(&config, &live, hub_rx, runtime.handle())?;
    let shutdown = server.shutdown_signal();
    crate::debug!("dev"; "http on {}, live reload on port {}", server.addr, server.ws_port);

    runtime.block_on(async move {
        watch.run(shutdown).await;
        live.shutdown();
        server.stop().await;
    });

    Ok(())
}
