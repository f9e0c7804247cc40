//! Reload hub actor: owns the WebSocket clients and fans out notifications.

use std::net::TcpStream;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::ReloadMsg;
use super::message::ReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Poll interval of the disconnect detector
const READ_POLL: Duration = Duration::from_millis(100);

/// Reload hub - manages client connections and broadcasts
pub struct ReloadHub {
    rx: mpsc::UnboundedReceiver<ReloadMsg>,
    clients: Clients,
}

impl ReloadHub {
    pub fn new(rx: mpsc::UnboundedReceiver<ReloadMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run the actor event loop until `Shutdown` or every sender is dropped.
    pub async fn run(mut self) {
        let weak = Arc::downgrade(&self.clients);
        std::thread::spawn(move || client_reader_loop(&weak));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                ReloadMsg::Reload { reason } => {
                    self.broadcast(&ReloadMessage::reload(reason));
                }
                ReloadMsg::Stream { href } => {
                    self.broadcast(&ReloadMessage::css(href));
                }
                ReloadMsg::AddClient(stream) => self.add_client(stream),
                ReloadMsg::Shutdown => {
                    crate::debug!("reload"; "shutting down");
                    break;
                }
            }
        }

        for mut client in self.clients.lock().drain(..) {
            let _ = client.close(None);
        }
    }

    /// Register a client that has already been greeted.
    fn add_client(&self, ws: WebSocket<TcpStream>) {
        // Reads are polled from the detector thread
        if let Err(e) = ws.get_ref().set_nonblocking(true) {
            crate::log!("reload"; "failed to register client: {}", e);
            return;
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("reload"; "client connected (total: {})", clients.len());
    }

    /// Send to every client, dropping the ones that fail.
    ///
    /// A full socket buffer is not a failure: the frame stays queued in the
    /// client and is flushed by the detector thread.
    fn broadcast(&self, msg: &ReloadMessage) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        let text = msg.to_json();
        clients.retain_mut(|ws| match ws.send(Message::Text(text.clone().into())) {
            Ok(()) => true,
            Err(e) if is_would_block(&e) => true,
            Err(e) => {
                crate::debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} clients", clients.len());
    }
}

/// The socket had no room or no data; the operation can be retried.
fn is_would_block(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Io(io) if io.kind() == std::io::ErrorKind::WouldBlock)
}

/// Flush queued frames and drop clients that closed their side. Exits once
/// the hub is gone.
fn client_reader_loop(clients: &Weak<Mutex<Vec<WebSocket<TcpStream>>>>) {
    loop {
        std::thread::sleep(READ_POLL);
        let Some(clients) = clients.upgrade() else {
            break;
        };

        clients.lock().retain_mut(|ws| {
            if let Err(e) = ws.flush()
                && !is_would_block(&e)
            {
                return false;
            }
            match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(e) => is_would_block(&e),
            }
        });
    }
}
