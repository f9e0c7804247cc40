//! Live Reload
//!
//! Pushes change notifications from build tasks to connected browsers.
//!
//! # Architecture
//!
//! ```text
//! StyleTask  --stream(href)--+
//! ScriptTask --reload()------+--> LiveReload --ReloadMsg--> ReloadHub --> Browsers
//! WatchLoop  --reload()------+                                 ^
//!                     acceptor thread --handshake--AddClient---+
//! ```
//!
//! While the watch loop rebuilds it holds task reloads back and sends one
//! reload for the whole batch.
//!
//! # Modules
//!
//! - `message` - JSON wire messages (connected, reload, css)
//! - `server` - WebSocket acceptor with port retry
//! - `hub` - Actor owning the connected clients

mod hub;
pub mod message;
pub mod server;

pub use hub::ReloadHub;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tungstenite::WebSocket;

/// Messages to the reload hub
#[derive(Debug)]
pub enum ReloadMsg {
    /// Full page reload
    Reload { reason: Option<String> },
    /// Re-fetch one stylesheet in place
    Stream { href: String },
    /// Client whose WebSocket handshake has completed
    AddClient(WebSocket<TcpStream>),
    /// Close all clients and stop
    Shutdown,
}

/// Cloneable handle build tasks use to notify browsers.
///
/// A disabled handle (plain `build`) drops every notification.
#[derive(Debug, Clone, Default)]
pub struct LiveReload {
    tx: Option<mpsc::UnboundedSender<ReloadMsg>>,
    /// Shared by clones; set while a [`ReloadHold`] is alive.
    held: Arc<AtomicBool>,
}

impl LiveReload {
    /// Handle that ignores all notifications.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Connected handle plus the receiving end for a [`ReloadHub`].
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReloadMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let live = Self {
            tx: Some(tx),
            held: Arc::default(),
        };
        (live, rx)
    }

    /// Swallow full reloads from every clone until the guard drops.
    ///
    /// Stylesheet streams still go through.
    pub fn hold_reloads(&self) -> ReloadHold {
        self.held.store(true, Ordering::SeqCst);
        ReloadHold {
            held: Arc::clone(&self.held),
        }
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Ask every browser for a full page refresh.
    pub fn reload(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.held.load(Ordering::SeqCst) {
            crate::debug!("reload"; "held: {}", reason);
            return;
        }
        crate::debug!("reload"; "reload: {}", reason);
        self.send(ReloadMsg::Reload {
            reason: Some(reason),
        });
    }

    /// Ask every browser to re-fetch the stylesheet served at `href`.
    pub fn stream(&self, href: impl Into<String>) {
        let href = href.into();
        crate::debug!("reload"; "stream: {}", href);
        self.send(ReloadMsg::Stream { href });
    }

    /// Stop the hub and close every client.
    pub fn shutdown(&self) {
        self.send(ReloadMsg::Shutdown);
    }

    fn send(&self, msg: ReloadMsg) {
        if let Some(tx) = &self.tx {
            // Hub already stopped: nothing left to notify
            let _ = tx.send(msg);
        }
    }

    pub(crate) fn sender(&self) -> Option<mpsc::UnboundedSender<ReloadMsg>> {
        self.tx.clone()
    }
}

/// Guard returned by [`LiveReload::hold_reloads`].
pub struct ReloadHold {
    held: Arc<AtomicBool>,
}

impl Drop for ReloadHold {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_handle_is_silent() {
        let live = LiveReload::disabled();
        assert!(!live.is_enabled());
        live.reload("ignored");
        live.stream("/css/style.min.css");
        assert!(live.sender().is_none());
    }

    #[test]
    fn test_channel_delivers_in_order() {
        let (live, mut rx) = LiveReload::channel();
        assert!(live.is_enabled());

        live.stream("/css/style.min.css");
        live.clone().reload("js updated");

        match rx.try_recv() {
            Ok(ReloadMsg::Stream { href }) => assert_eq!(href, "/css/style.min.css"),
            other => panic!("expected stream, got {other:?}"),
        }
        match rx.try_recv() {
            Ok(ReloadMsg::Reload { reason }) => assert_eq!(reason.as_deref(), Some("js updated")),
            other => panic!("expected reload, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_hold_swallows_reloads_only() {
        let (live, mut rx) = LiveReload::channel();
        let task_handle = live.clone();

        let hold = live.hold_reloads();
        task_handle.reload("js updated");
        task_handle.stream("/css/style.min.css");
        drop(hold);
        live.reload("src/js/app.js");

        assert!(matches!(rx.try_recv(), Ok(ReloadMsg::Stream { .. })));
        match rx.try_recv() {
            Ok(ReloadMsg::Reload { reason }) => assert_eq!(reason.as_deref(), Some("src/js/app.js")),
            other => panic!("expected reload, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (live, rx) = LiveReload::channel();
        drop(rx);
        live.reload("nobody listening");
    }
}
