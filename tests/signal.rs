#![cfg(unix)]

use std::net::SocketAddr;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::process::Command;

use tinyhttpd::{Server, ServerConfig};

async fn free_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Retries until the server answers a GET, or gives up after ~5 s.
async fn wait_until_serving(addr: SocketAddr) -> String {
    for _ in 0..100 {
        if let Ok(mut stream) = TcpStream::connect(addr).await {
            stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
            let mut out = String::new();
            stream.read_to_string(&mut out).await.unwrap();
            return out;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server never started listening on {addr}");
}

#[tokio::test]
async fn sigint_stops_the_binary_and_frees_the_port() {
    let port = free_port().await;
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();

    let mut child = Command::new(env!("CARGO_BIN_EXE_tinyhttpd"))
        .arg(port.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("spawn tinyhttpd");

    let response = wait_until_serving(addr).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with("hello world"));

    let pid = child.id().expect("child still running");
    let killed = Command::new("kill")
        .args(["-INT", &pid.to_string()])
        .status()
        .await
        .expect("run kill");
    assert!(killed.success());

    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("server exited in time")
        .expect("wait for child");
    assert!(status.success(), "exit status: {status:?}");

    let rebound = Server::bind(ServerConfig {
        addr: addr.to_string(),
        ..ServerConfig::default()
    })
    .await
    .expect("port is free after SIGINT");
    assert_eq!(rebound.local_addr(), addr);
}
