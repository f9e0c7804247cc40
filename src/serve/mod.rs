//! Development server with live reload support.
//!
//! ```text
//! HTTP thread (rayon pool) --serves--> dest/ (+ livereload.js from memory)
//! WS acceptor thread --AddClient--> ReloadHub (tokio) --broadcast--> browsers
//! ```

mod lifecycle;
mod path;
mod response;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::AssetConfig;
use crate::embed::serve::LIVERELOAD_URL;
use crate::reload::{LiveReload, ReloadHub, ReloadMsg, server::start_ws_server};
use crate::{debug, log};

/// Number of request worker threads
const REQUEST_WORKERS: usize = 4;

/// What the request handlers need.
struct ServeState {
    root: PathBuf,
    ws_port: u16,
}

/// Running server. Listeners are bound; requests are served on background
/// threads until shutdown.
pub struct ServeHandle {
    pub addr: SocketAddr,
    pub ws_port: u16,
    server: Arc<Server>,
    request_loop: JoinHandle<()>,
    hub: tokio::task::JoinHandle<()>,
    shutdown_rx: channel::Receiver<()>,
}

impl ServeHandle {
    /// Fires when Ctrl+C is received.
    pub fn shutdown_signal(&self) -> channel::Receiver<()> {
        self.shutdown_rx.clone()
    }

    /// Unblock the request loop and wait briefly for it and the hub.
    pub async fn stop(self) {
        self.server.unblock();
        let _ = self.hub.await;
        lifecycle::wait_for_thread(self.request_loop);
    }
}

/// Start the HTTP server, the WebSocket acceptor and the reload hub.
///
/// `hub_rx` is the receiving end of `live`'s channel; the hub is spawned on
/// `runtime`.
pub fn start(
    config: &AssetConfig,
    live: &LiveReload,
    hub_rx: UnboundedReceiver<ReloadMsg>,
    runtime: &tokio::runtime::Handle,
) -> Result<ServeHandle> {
    let hub_tx = live
        .sender()
        .context("live reload handle is disabled")?;
    let ws_port = start_ws_server(config.serve.interface, config.serve.ws_port, hub_tx)?;
    debug!("reload"; "ws://{}:{}", config.serve.interface, ws_port);
    let hub = runtime.spawn(ReloadHub::new(hub_rx).run());

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    let state = ServeState {
        root: config.paths.dest.clone(),
        ws_port,
    };
    let request_loop = spawn_request_loop(Arc::clone(&server), state)?;

    log!("serve"; "http://{}", addr);

    Ok(ServeHandle {
        addr,
        ws_port,
        server,
        request_loop,
        hub,
        shutdown_rx,
    })
}

fn spawn_request_loop(server: Arc<Server>, state: ServeState) -> Result<JoinHandle<()>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_WORKERS)
        .thread_name(|i| format!("assetflow-http-{i}"))
        .build()
        .context("failed to create request thread pool")?;
    let state = Arc::new(state);

    let handle = thread::Builder::new()
        .name("assetflow-http".into())
        .spawn(move || {
            for request in server.incoming_requests() {
                let state = Arc::clone(&state);
                pool.spawn(move || {
                    if let Err(e) = handle_request(request, &state) {
                        log!("serve"; "request error: {e}");
                    }
                });
            }
        })?;
    Ok(handle)
}

/// Handle a single HTTP request
fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url_path = request.url().split(['?', '#']).next().unwrap_or_default();
    if url_path == LIVERELOAD_URL {
        return response::respond_livereload_js(request, state.ws_port);
    }

    match path::resolve_path(request.url(), &state.root) {
        Some(file) => response::respond_file(request, &file, true),
        None => response::respond_not_found(request, &state.root, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{IpAddr, Ipv4Addr, TcpStream};
    use std::path::Path;
    use tempfile::TempDir;

    /// Serve `root` on an ephemeral port without registering for shutdown.
    fn serve(root: &Path) -> (SocketAddr, Arc<Server>, JoinHandle<()>) {
        let (server, addr) = lifecycle::bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let server = Arc::new(server);
        let state = ServeState {
            root: root.to_path_buf(),
            ws_port: 35799,
        };
        let handle = spawn_request_loop(Arc::clone(&server), state).unwrap();
        (addr, server, handle)
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_serves_files_with_injection() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html><body><p>hi</p></body></html>").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/style.min.css"), "a{color:red}").unwrap();
        let (addr, server, handle) = serve(dir.path());

        let page = get(addr, "/");
        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.contains("<p>hi</p><script src=\"/__assetflow/livereload.js\" defer></script></body>"));

        let css = get(addr, "/css/style.min.css?t=1");
        assert!(css.contains("text/css"));
        assert!(css.ends_with("a{color:red}"));

        let js = get(addr, LIVERELOAD_URL);
        assert!(js.starts_with("HTTP/1.1 200"));
        assert!(js.contains("35799"));

        assert!(get(addr, "/missing.html").starts_with("HTTP/1.1 404"));
        assert!(get(addr, "/../secret").starts_with("HTTP/1.1 404"));

        server.unblock();
        handle.join().unwrap();
    }
}
