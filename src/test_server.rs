//! Minimal in-process tile server for tests.

use reqwest::Client;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub const TILE_BODY: &[u8] = b"\xff\xd8\xff\xe0 not really a jpeg \xff\xd9";

pub fn client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Answers `GET /tiles/<quadkey>` with [`TILE_BODY`], or 404 for the
/// quadkeys it was started with. Optionally stalls every response, or
/// promises a long body and hangs up after [`TILE_BODY`].
pub struct StubTileServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubTileServer {
    pub async fn start(missing: &[String]) -> StubTileServer {
        StubTileServer::start_with_delay(missing, Duration::from_millis(0)).await
    }

    pub async fn start_with_delay(missing: &[String], delay: Duration) -> StubTileServer {
        StubTileServer::spawn(missing, delay, false).await
    }

    pub async fn start_truncating() -> StubTileServer {
        StubTileServer::spawn(&[], Duration::from_millis(0), true).await
    }

    async fn spawn(missing: &[String], delay: Duration, truncate: bool) -> StubTileServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let missing = Arc::new(missing.to_vec());

        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let seen = seen.clone();
                let missing = missing.clone();
                tokio::spawn(async move {
                    let _ = respond(stream, &seen, &missing, delay, truncate).await;
                });
            }
        });

        StubTileServer { addr, requests }
    }

    pub fn url_template(&self) -> String {
        format!("http://{}/tiles/{{quadkey}}?mkt=en-us", self.addr)
    }

    /// Quadkeys requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(
    stream: TcpStream,
    seen: &Mutex<Vec<String>>,
    missing: &[String],
    delay: Duration,
    truncate: bool,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).await? == 0 || header == "\r\n" {
            break;
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("");
    let quadkey = path
        .trim_start_matches("/tiles/")
        .split('?')
        .next()
        .unwrap_or("")
        .to_string();
    seen.lock().unwrap().push(quadkey.clone());

    tokio::time::sleep(delay).await;

    let mut stream = reader.into_inner();
    if missing.contains(&quadkey) {
        stream
            .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await?;
    } else {
        let length = if truncate { 100_000 } else { TILE_BODY.len() };
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            length
        );
        stream.write_all(head.as_bytes()).await?;
        stream.write_all(TILE_BODY).await?;
    }
    stream.shutdown().await
}
