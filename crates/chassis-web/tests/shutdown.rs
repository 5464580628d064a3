//! Live-listener lifecycle test: serve, cancel, bounded drain.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use chassis_web::Server;

/// Reserve an ephemeral port and release it for the server to take.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn cancellation_stops_the_server_within_the_grace_period() {
    let port = free_port();
    let mut server = Server::builder().port(port.to_string()).build().unwrap();
    server.handle("GET /helloworld", || async { "hello" }).unwrap();

    let token = CancellationToken::new();
    let handle = tokio::spawn(server.start(token.clone()));

    let addr = format!("127.0.0.1:{port}");
    let mut listening = false;
    for _ in 0..100 {
        if TcpStream::connect(&addr).await.is_ok() {
            listening = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(listening, "server never started listening");

    let mut stream = TcpStream::connect(&addr).await.unwrap();
    stream
        .write_all(b"GET /helloworld HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert!(response.ends_with("hello"), "got: {response}");

    token.cancel();

    // No in-flight requests: drain completes well inside the 10s grace.
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("start did not return after cancellation")
        .unwrap();
    assert!(result.is_ok());

    // The listener is closed; no new connections are accepted.
    assert!(TcpStream::connect(&addr).await.is_err());
}
