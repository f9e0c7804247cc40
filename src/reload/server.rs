//! WebSocket Server for Live Reload
//!
//! Accepts TCP connections on its own thread. Each connection is upgraded
//! and greeted on a short-lived thread with a read timeout, so a client that
//! never finishes the handshake cannot stall the acceptor or the
//! [`ReloadHub`](super::ReloadHub).

use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc::UnboundedSender;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::ReloadMsg;
use super::message::ReloadMessage;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Poll interval of the non-blocking acceptor
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Longest a client may take to send its upgrade request
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// Start the WebSocket acceptor and return the port actually bound.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    hub_tx: UnboundedSender<ReloadMsg>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    if actual_port != base_port {
        crate::log!("reload"; "port {} in use, using {} instead", base_port, actual_port);
    }

    std::thread::Builder::new()
        .name("assetflow-ws-accept".into())
        .spawn(move || accept_loop(&listener, &hub_tx))?;

    Ok(actual_port)
}

fn accept_loop(listener: &TcpListener, hub_tx: &UnboundedSender<ReloadMsg>) {
    while !crate::core::is_shutdown() {
        if hub_tx.is_closed() {
            crate::debug!("reload"; "hub stopped, closing acceptor");
            break;
        }
        match listener.accept() {
            Ok((stream, addr)) => {
                crate::debug!("reload"; "connection from {}", addr);
                let hub_tx = hub_tx.clone();
                let spawned = std::thread::Builder::new()
                    .name("assetflow-ws-handshake".into())
                    .spawn(move || match handshake(stream) {
                        Ok(ws) => {
                            let _ = hub_tx.send(ReloadMsg::AddClient(ws));
                        }
                        Err(e) => crate::debug!("reload"; "handshake with {} failed: {}", addr, e),
                    });
                if let Err(e) = spawned {
                    crate::log!("reload"; "failed to start handshake thread: {}", e);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                crate::log!("reload"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

/// Upgrade `stream` and send the greeting, giving up after [`HANDSHAKE_TIMEOUT`].
fn handshake(stream: TcpStream) -> Result<WebSocket<TcpStream>> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    stream.set_write_timeout(Some(HANDSHAKE_TIMEOUT))?;

    let mut ws = tungstenite::accept(stream).map_err(|e| anyhow!("{e}"))?;
    let connected = ReloadMessage::connected();
    ws.send(Message::Text(connected.to_json().into()))?;

    ws.get_ref().set_read_timeout(None)?;
    ws.get_ref().set_write_timeout(None)?;
    Ok(ws)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_try_bind_port_skips_taken_port() {
        let taken = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let (_listener, port) = try_bind_port(LOCALHOST, taken_port, 10).unwrap();
        assert_ne!(port, taken_port);
    }

    #[test]
    fn test_try_bind_port_gives_up() {
        let taken = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        assert!(try_bind_port(LOCALHOST, taken_port, 1).is_err());
    }

    fn recv_client(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ReloadMsg>) -> WebSocket<TcpStream> {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            match rx.try_recv() {
                Ok(ReloadMsg::AddClient(ws)) => return ws,
                Ok(other) => panic!("unexpected message: {other:?}"),
                Err(_) if std::time::Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(20));
                }
                Err(e) => panic!("no client forwarded: {e}"),
            }
        }
    }

    #[test]
    fn test_handshaken_client_reaches_hub() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let port = start_ws_server(LOCALHOST, 0, tx).unwrap();

        let (mut client, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        let _server_side = recv_client(&mut rx);

        let Message::Text(greeting) = client.read().unwrap() else {
            panic!("expected text greeting");
        };
        assert!(matches!(
            ReloadMessage::from_json(greeting.as_str()).unwrap(),
            ReloadMessage::Connected { .. }
        ));
    }

    #[test]
    fn test_silent_connection_does_not_block_others() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let port = start_ws_server(LOCALHOST, 0, tx).unwrap();

        // Connects but never sends an upgrade request
        let _silent = TcpStream::connect((LOCALHOST, port)).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let (_client, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        let _server_side = recv_client(&mut rx);
        assert!(started.elapsed() < HANDSHAKE_TIMEOUT);
    }

    #[test]
    fn test_handshake_times_out() {
        let listener = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        let _silent = TcpStream::connect((LOCALHOST, port)).unwrap();
        let (stream, _) = listener.accept().unwrap();

        let started = std::time::Instant::now();
        assert!(handshake(stream).is_err());
        assert!(started.elapsed() < HANDSHAKE_TIMEOUT * 2);
    }
}
