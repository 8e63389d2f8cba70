//! Shared test fixtures: a real loopback `Connection` (same pattern as
//! `obs-connection`'s `fake_daemon()`) and a fresh `FakeCatalog` per test,
//! so event tests exercise the real wire/connection stack rather than a
//! mocked one.

use obs_adapters::FakeCatalog;
use obs_connection::Connection;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

/// Spin up a loopback listener, accept exactly one connection, consume the
/// `getProperties` handshake, and hand the raw socket back so the test can
/// script further reads/writes (or simply drop it, for events that never
/// touch the wire).
pub async fn fake_daemon() -> (Connection, TcpStream) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind loopback listener");
    let port = listener.local_addr().expect("listener has local addr").port();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept loopback connection");
        let mut buf = vec![0u8; 256];
        let n = socket.read(&mut buf).await.expect("read getProperties handshake");
        assert!(String::from_utf8_lossy(&buf[..n]).contains("getProperties"));
        socket
    });
    let conn = Connection::connect("127.0.0.1", port).await.expect("connect to loopback daemon");
    let socket = handle.await.expect("daemon task did not panic");
    (conn, socket)
}

pub fn fake_catalog() -> FakeCatalog {
    FakeCatalog::new()
}
